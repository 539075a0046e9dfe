pub mod allele;
pub mod header;
pub mod identifier;
pub mod record;

// re-export for cleaner imports
pub use self::allele::{MinimisedAllele, minimise_allele};
pub use self::header::{InfoDefinition, VcfHeader};
pub use self::identifier::VariantIdentifier;
pub use self::record::{InfoValue, RawRecord};
