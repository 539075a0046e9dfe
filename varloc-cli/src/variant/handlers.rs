use anyhow::{Context, Result};
use clap::ArgMatches;

use varloc_annotation::views::VariantView;
use varloc_locate::VariantResolver;

pub fn run_variant(matches: &ArgMatches, resolver: &VariantResolver) -> Result<()> {
    // required by the parser
    let genome = matches
        .get_one::<String>("genome")
        .context("--genome is required")?;
    let id = matches.get_one::<String>("id").context("--id is required")?;
    let track = matches.get_one::<String>("track").map(String::as_str);

    let variant = resolver
        .resolve_variant(genome, id, track)
        .with_context(|| format!("Failed to resolve {} in {}", id, genome))?;

    let view = variant
        .as_ref()
        .map(VariantView::try_from)
        .transpose()
        .with_context(|| format!("Failed to derive the fields of {}", id))?;

    println!("{}", serde_json::to_string_pretty(&view)?);

    Ok(())
}
