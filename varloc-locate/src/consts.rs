//! Environment variables, defaults and external tool arguments.

// Environment variable names

/// Root of the genome directories.
///
/// # Example
///
/// ```bash
/// export VARLOC_DATA_ROOT=/nfs/variation/data
/// ```
pub const VARLOC_DATA_ROOT_ENV: &str = "VARLOC_DATA_ROOT";

/// Path or name of the bcftools binary.
pub const VARLOC_BCFTOOLS_ENV: &str = "VARLOC_BCFTOOLS";

// Defaults

pub const DEFAULT_DATA_ROOT: &str = "./data";
pub const DEFAULT_BCFTOOLS: &str = "bcftools";

/// Bound for a region view over one file, in seconds.
pub const DEFAULT_VIEW_TIMEOUT_SECS: u64 = 10;

/// Bound for an identifier query over every source file, in seconds.
pub const DEFAULT_QUERY_TIMEOUT_SECS: u64 = 30;

// bcftools

pub const BCFTOOLS_VIEW: &str = "view";
pub const BCFTOOLS_QUERY: &str = "query";

/// Row layout requested from `bcftools query`: contig, position, id, file.
/// The escapes are expanded by bcftools itself.
pub const BCFTOOLS_QUERY_FORMAT: &str = r"%CHROM\t%POS\t%ID\t%FILENAME\n";

// Structural variant index

pub const INDEX_LOOKUP_SQL: &str = "SELECT chrom, pos, filename FROM variants WHERE id = ?1";
