//! Presentation structs handed to consumers of resolved variants.

#[cfg(feature = "serde")]
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AnalysisMethod {
    pub tool: String,
    pub qualifier: String,
    pub version: Option<String>,
}

impl AnalysisMethod {
    /// A method whose qualifier is the tool name itself (SIFT, PolyPhen, CADD, GERP).
    pub fn tool(tool: &str) -> AnalysisMethod {
        AnalysisMethod {
            tool: tool.to_string(),
            qualifier: tool.to_string(),
            version: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PredictionResult {
    pub result: String,
    pub score: Option<f64>,
    pub analysis_method: AnalysisMethod,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PhenotypeAssertion {
    pub phenotype: String,
    pub source: String,
    pub feature: String,
    pub feature_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PredictedMolecularConsequence {
    pub allele_name: Option<String>,
    pub feature_stable_id: Option<String>,
    pub feature_type: Option<String>,
    pub consequences: Vec<String>,
    pub prediction_results: Vec<PredictionResult>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PopulationFrequency {
    pub population: String,
    pub allele_frequency: f64,
    pub is_minor_allele: bool,
    pub is_hpmaf: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Location {
    pub start: u64,
    pub end: u64,
    pub length: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Region {
    pub name: String,
    pub code: String,
    pub topology: String,
    pub so_term: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Strand {
    pub code: String,
    pub value: i8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Slice {
    pub location: Location,
    pub region: Region,
    pub strand: Strand,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct AssignmentMethod {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Source {
    pub id: String,
    pub name: String,
    pub description: String,
    pub url: String,
    pub release: Option<String>,
}

/// The record's identifier in the database it was imported from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ExternalReference {
    pub accession_id: String,
    pub name: String,
    pub description: String,
    pub assignment_method: AssignmentMethod,
    pub url: String,
    pub source: Source,
}
