mod sv;
mod variant;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing_subscriber::EnvFilter;

use varloc_locate::{ResolverConfig, VariantResolver};

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "varloc";
    pub const BIN_NAME: &str = "varloc";

    pub const CONFIG_ARG: &str = "config";
    pub const DATA_ROOT_ARG: &str = "data-root";
    pub const VERBOSE_ARG: &str = "verbose";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Resolve variants and structural variants by contig:position:identifier from the VCF sources of a genome.")
        .subcommand_required(true)
        .arg(
            Arg::new(consts::CONFIG_ARG)
                .long(consts::CONFIG_ARG)
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("TOML file with resolver settings"),
        )
        .arg(
            Arg::new(consts::DATA_ROOT_ARG)
                .long(consts::DATA_ROOT_ARG)
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Directory holding one directory per genome; overrides the config file"),
        )
        .arg(
            Arg::new(consts::VERBOSE_ARG)
                .short('v')
                .long(consts::VERBOSE_ARG)
                .global(true)
                .action(ArgAction::Count)
                .help("More logging on stderr, repeat for more"),
        )
        .subcommand(variant::cli::create_variant_cli())
        .subcommand(sv::cli::create_sv_cli())
}

fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<ResolverConfig> {
    let mut config = match matches.get_one::<PathBuf>(consts::CONFIG_ARG) {
        Some(path) => ResolverConfig::try_from(path.as_path())
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => ResolverConfig::default(),
    };

    if let Some(data_root) = matches.get_one::<PathBuf>(consts::DATA_ROOT_ARG) {
        config = config.with_data_root(data_root);
    }

    Ok(config)
}

fn main() -> Result<()> {
    let app = build_parser();
    let matches = app.get_matches();

    init_logging(matches.get_count(consts::VERBOSE_ARG));

    let config = load_config(&matches)?;
    tracing::debug!("{} v{} reading {}", consts::PKG_NAME, consts::VERSION, config.data_root.display());
    let resolver = VariantResolver::new(config);

    match matches.subcommand() {
        //
        // SMALL VARIANTS
        //
        Some((variant::cli::VARIANT_CMD, matches)) => {
            variant::handlers::run_variant(matches, &resolver)?;
        }

        //
        // STRUCTURAL VARIANTS
        //
        Some((sv::cli::SV_CMD, matches)) => {
            sv::handlers::run_sv(matches, &resolver)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}
