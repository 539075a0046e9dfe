//! File layout and INFO field names shared by the resolvers.

/// Small-variant file of a genome (or of a track under the genome directory).
pub const VARIATION_FILE: &str = "variation.vcf.gz";

/// Directory, relative to the genome directory, holding annotation-source files.
pub const ANNOTATION_SOURCES_DIR: &str = "annotation/frequencies";

/// Directory, relative to the genome directory, holding structural-variant files.
pub const STRUCTURAL_VARIATION_DIR: &str = "structural-variation";

/// File name prefix of a per-source structural-variant file: `variation_<source>.vcf.gz`.
pub const STRUCTURAL_VARIATION_PREFIX: &str = "variation_";

/// SQLite index mapping structural-variant ids to their file.
pub const STRUCTURAL_VARIATION_INDEX: &str = "variants.db";

pub const VCF_GZ_EXT: &str = ".vcf.gz";

/// INFO key of the packed per-transcript consequence annotations.
pub const CSQ_KEY: &str = "CSQ";

/// INFO key of the packed per-population frequencies.
pub const FREQ_KEY: &str = "FREQ";

/// Marker preceding the sub-field list in the annotation INFO description.
pub const FORMAT_MARKER: &str = "Format: ";
