//! # Variant record lookup
//!
//! Finds variant records by `contig:position:identifier` in the file layout of a genome:
//!
//! - small variants in a base VCF, merged with any annotation-source VCFs
//! - structural variants in per-source VCFs, through a SQLite identifier index, bcftools,
//!   or an in-process reader when bcftools is not installed
//!
//! ```no_run
//! use varloc_locate::{ResolverConfig, VariantResolver};
//!
//! let resolver = VariantResolver::new(ResolverConfig::default().with_data_root("/data"));
//! let variant = resolver
//!     .resolve_variant("a7335667-93e7-11ec-a39d-005056b38ce3", "1:10007:rs1639538116", None)
//!     .unwrap();
//! ```

pub mod cache;
pub mod config;
pub mod consts;
pub mod layout;
pub mod locator;
pub mod resolver;
pub mod structural;
pub mod tool;

pub use cache::HeaderCache;
pub use config::{ConfigError, ResolverConfig};
pub use layout::SourceLayout;
pub use locator::{RecordLocator, find_record, locate};
pub use resolver::VariantResolver;
pub use structural::{
    BcftoolsFetcher, InProcessFetcher, RecordFetcher, StructuralVariantLocator,
};
pub use tool::ExternalTool;
