//! # Core data model for variant resolution
//!
//! This crate holds what every other varloc crate shares:
//!
//! - `models` - variant identifiers, VCF headers and raw records, allele minimisation
//! - `errors` - the error taxonomy of the resolvers
//! - `utils` - readers for plain and (b)gzipped VCF text
//! - `consts` - file layout and INFO field names
pub mod consts;
pub mod errors;
pub mod models;
pub mod utils;

pub use errors::{Result, VariantError};
pub use models::*;
