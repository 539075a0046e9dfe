use std::collections::HashMap;

use varloc_core::consts::FORMAT_MARKER;

// sub-fields of a VEP annotation entry
pub const ALLELE: &str = "Allele";
pub const CONSEQUENCE: &str = "Consequence";
pub const FEATURE: &str = "Feature";
pub const FEATURE_TYPE: &str = "Feature_type";
pub const SIFT: &str = "SIFT";
pub const POLYPHEN: &str = "PolyPhen";
pub const SPDI: &str = "SPDI";
pub const CADD: &str = "CADD_PHRED";
pub const CONSERVATION: &str = "Conservation";
pub const PHENOTYPES: &str = "PHENOTYPES";

///
/// Column offsets of the named sub-fields of a packed `|`-delimited annotation entry.
///
/// Names are matched case-insensitively. A name the declaration does not list is
/// simply absent.
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationIndexMap {
    columns: HashMap<String, usize>,
}

impl AnnotationIndexMap {
    ///
    /// Build the map from an INFO description such as
    /// `Consequence annotations from Ensembl VEP. Format: Allele|Consequence|...`.
    ///
    /// A description without the `Format: ` marker yields an empty map.
    pub fn build(format_declaration: &str) -> AnnotationIndexMap {
        let Some((_, format)) = format_declaration.split_once(FORMAT_MARKER) else {
            return AnnotationIndexMap::default();
        };

        let mut columns = HashMap::new();
        for (offset, name) in format.trim().split('|').enumerate() {
            // first declaration wins on duplicated names
            columns.entry(name.trim().to_lowercase()).or_insert(offset);
        }

        AnnotationIndexMap { columns }
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.columns.get(&name.to_lowercase()).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    ///
    /// Value of a named sub-field in an already split entry. Empty values count as absent.
    ///
    pub fn field<'a>(&self, fields: &[&'a str], name: &str) -> Option<&'a str> {
        self.get(name)
            .and_then(|offset| fields.get(offset).copied())
            .filter(|value| !value.is_empty())
    }
}
