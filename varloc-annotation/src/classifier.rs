//! Allele type classification.
//!
//! The type of an allele follows from three facts about its lengths: whether the
//! allele is a single base, whether the reference is, and whether both have the same
//! length. Only five of the eight combinations can happen.

use std::fmt;

#[cfg(feature = "serde")]
use serde::Serialize;

use varloc_core::errors::VariantError;

pub const SEQUENCE_ONTOLOGY_TERM_URL: &str =
    "http://sequenceontology.org/browser/current_release/term/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlleleType {
    Snv,
    Deletion,
    Insertion,
    Indel,
    Substitution,
    BiologicalRegion,
}

impl AlleleType {
    pub fn name(&self) -> &'static str {
        match self {
            AlleleType::Snv => "SNV",
            AlleleType::Deletion => "deletion",
            AlleleType::Insertion => "insertion",
            AlleleType::Indel => "indel",
            AlleleType::Substitution => "substitution",
            AlleleType::BiologicalRegion => "biological_region",
        }
    }

    pub fn so_term(&self) -> &'static str {
        match self {
            AlleleType::Snv => "SO:0001483",
            AlleleType::Deletion => "SO:0000159",
            AlleleType::Insertion => "SO:0000667",
            AlleleType::Indel => "SO:1000032",
            AlleleType::Substitution => "SO:1000002",
            AlleleType::BiologicalRegion => "SO:0001411",
        }
    }

    pub fn term(&self) -> OntologyTerm {
        OntologyTerm {
            accession_id: self.name().to_string(),
            value: self.name().to_string(),
            url: format!("{}{}", SEQUENCE_ONTOLOGY_TERM_URL, self.so_term()),
            source: OntologySource::sequence_ontology(),
        }
    }
}

impl fmt::Display for AlleleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct OntologySource {
    pub name: String,
    pub url: String,
    pub description: String,
}

impl OntologySource {
    pub fn sequence_ontology() -> OntologySource {
        OntologySource {
            name: "Sequence Ontology".to_string(),
            url: "www.sequenceontology.org".to_string(),
            description: "The Sequence Ontology is a set of terms and relationships used to describe the features and attributes of biological sequence".to_string(),
        }
    }
}

/// An allele type as presented to consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct OntologyTerm {
    pub accession_id: String,
    pub value: String,
    pub url: String,
    pub source: OntologySource,
}

///
/// Classify from the three length facts.
///
/// `(true, false, true)`, `(false, true, true)` and `(true, true, false)` cannot come
/// from well formed alleles and fail with `ClassificationInvariantViolated`.
///
pub fn classify(
    is_single_base_alt: bool,
    is_single_base_ref: bool,
    equal_length: bool,
) -> Result<AlleleType, (bool, bool, bool)> {
    match (is_single_base_alt, is_single_base_ref, equal_length) {
        (true, true, true) => Ok(AlleleType::Snv),
        (true, false, false) => Ok(AlleleType::Deletion),
        (false, true, false) => Ok(AlleleType::Insertion),
        (false, false, false) => Ok(AlleleType::Indel),
        (false, false, true) => Ok(AlleleType::Substitution),
        combination @ ((true, false, true) | (false, true, true) | (true, true, false)) => {
            Err(combination)
        }
    }
}

///
/// Classify one allele against its reference.
///
/// # Arguments
/// - reference: the REF column
/// - allele: one ALT entry, or the reference itself
pub fn classify_allele(reference: &str, allele: &str) -> Result<AlleleType, VariantError> {
    if allele == reference {
        return Ok(AlleleType::BiologicalRegion);
    }

    classify(
        allele.len() < 2,
        reference.len() < 2,
        allele.len() == reference.len(),
    )
    .map_err(|_| VariantError::ClassificationInvariantViolated {
        reference: reference.to_string(),
        allele: allele.to_string(),
    })
}

///
/// Classify a whole record: the longest alternate decides, first one on ties.
///
/// A record without alternates classifies like its reference.
pub fn classify_alleles<S: AsRef<str>>(
    reference: &str,
    alternates: &[S],
) -> Result<AlleleType, VariantError> {
    let longest = alternates
        .iter()
        .map(AsRef::as_ref)
        .fold(None::<&str>, |longest, alt| match longest {
            Some(current) if current.len() >= alt.len() => Some(current),
            _ => Some(alt),
        })
        .unwrap_or(reference);

    classify_allele(reference, longest)
}
