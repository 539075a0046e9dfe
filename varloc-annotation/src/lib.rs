//! # Derived fields of resolved variants
//!
//! Everything computed from the raw records once a variant has been located:
//!
//! - `columns` - offsets of the named sub-fields of packed VEP annotation entries
//! - `classifier` - allele types and their Sequence Ontology terms
//! - `consequence` - phenotypes, molecular consequences and tool scores per allele
//! - `ranker` - the most severe consequence of a variant
//! - `frequency` - reference population frequencies and the minor allele flag
//! - `variant`, `structural` - the resolved entities and their accessors
//! - `views` - owned snapshots of every derived field, for rendering
pub mod classifier;
pub mod columns;
pub mod consequence;
pub mod frequency;
pub mod models;
pub mod ranker;
pub mod slice;
pub mod structural;
pub mod variant;
pub mod views;

pub use classifier::{AlleleType, classify, classify_allele, classify_alleles};
pub use columns::AnnotationIndexMap;
pub use structural::StructuralVariant;
pub use variant::{Variant, VariantAllele};
pub use views::{StructuralVariantView, VariantAlleleView, VariantView};
