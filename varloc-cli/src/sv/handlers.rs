use anyhow::{Context, Result};
use clap::ArgMatches;

use varloc_annotation::views::StructuralVariantView;
use varloc_locate::VariantResolver;

pub fn run_sv(matches: &ArgMatches, resolver: &VariantResolver) -> Result<()> {
    let genome = matches
        .get_one::<String>("genome")
        .context("--genome is required")?;
    let id = matches.get_one::<String>("id").context("--id is required")?;
    let source = matches.get_one::<String>("source").map(String::as_str);

    let variant = resolver
        .resolve_structural_variant(genome, id, source)
        .with_context(|| format!("Failed to resolve structural variant {} in {}", id, genome))?;

    let view = variant.as_ref().map(StructuralVariantView::from);
    println!("{}", serde_json::to_string_pretty(&view)?);

    Ok(())
}
