use clap::{Command, arg};

pub const SV_CMD: &str = "sv";

pub fn create_sv_cli() -> Command {
    Command::new(SV_CMD)
        .about("Resolve a structural variant through the index, or from one named source. Prints JSON, or null when absent.")
        .arg(arg!(--genome <genome> "Genome UUID, the directory under the data root").required(true))
        .arg(arg!(--id <id> "Variant as contig:position:identifier").required(true))
        .arg(arg!(--source <source> "Only search structural-variation/variation_<source>.vcf.gz"))
}
