use clap::{Command, arg};

pub const VARIANT_CMD: &str = "variant";

pub fn create_variant_cli() -> Command {
    Command::new(VARIANT_CMD)
        .about("Resolve a small variant, merged with the annotation sources of its genome. Prints JSON, or null when absent.")
        .arg(arg!(--genome <genome> "Genome UUID, the directory under the data root").required(true))
        .arg(arg!(--id <id> "Variant as contig:position:identifier").required(true))
        .arg(arg!(--track <track> "Read base records from this track directory instead"))
}
