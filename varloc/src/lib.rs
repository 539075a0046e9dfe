//! # varloc
//!
//! Variant lookup by `contig:position:identifier` over the VCF sources of a genome.
//! Each part lives in its own crate and is re-exported here behind a feature:
//!
//! - `core` - identifiers, records, headers and the error type
//! - `annotation` - allele types, consequences, prediction results and frequencies
//! - `locate` - the record and structural variant locators

#[cfg(feature = "core")]
#[doc(inline)]
pub use varloc_core as core;

#[cfg(feature = "annotation")]
#[doc(inline)]
pub use varloc_annotation as annotation;

#[cfg(feature = "locate")]
#[doc(inline)]
pub use varloc_locate as locate;
