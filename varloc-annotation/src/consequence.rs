//! Per-allele facts derived from the packed VEP annotation entries of a record.

use std::collections::HashMap;

use tracing::debug;

use crate::columns::{
    ALLELE, AnnotationIndexMap, CADD, CONSEQUENCE, CONSERVATION, FEATURE, FEATURE_TYPE, PHENOTYPES,
    POLYPHEN, SIFT, SPDI,
};
use crate::models::{
    AnalysisMethod, PhenotypeAssertion, PredictedMolecularConsequence, PredictionResult,
};

pub const SIFT_TOOL: &str = "SIFT";
pub const POLYPHEN_TOOL: &str = "PolyPhen";
pub const CADD_TOOL: &str = "CADD";
pub const GERP_TOOL: &str = "GERP";

/// Labels SIFT and PolyPhen may report.
pub const PREDICTION_LABELS: [&str; 8] = [
    "probably damaging",
    "possibly damaging",
    "benign",
    "unknown",
    "tolerated",
    "deleterious",
    "tolerated - low confidence",
    "deleterious - low confidence",
];

// Ensembl stable ids, a phenotype pointing back at the feature itself
const SELF_REFERENCE_PREFIX: &str = "ENS";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlleleAnnotation {
    pub phenotype_assertions: Vec<PhenotypeAssertion>,
    pub predicted_molecular_consequences: Vec<PredictedMolecularConsequence>,
    pub prediction_results: Vec<PredictionResult>,
}

impl AlleleAnnotation {
    pub fn has_tool(&self, tool: &str) -> bool {
        self.prediction_results
            .iter()
            .any(|r| r.analysis_method.tool == tool)
    }

    /// Record an allele-level tool score unless that tool already has one.
    fn push_tool_score(&mut self, tool: &str, raw: &str) {
        if self.has_tool(tool) {
            debug!("Dropping repeated {} score {} for allele group", tool, raw);
            return;
        }

        self.prediction_results.push(PredictionResult {
            result: raw.to_string(),
            score: raw.parse::<f64>().ok(),
            analysis_method: AnalysisMethod::tool(tool),
        });
    }

    fn push_phenotype(&mut self, assertion: PhenotypeAssertion) {
        let seen = self.phenotype_assertions.iter().any(|a| {
            a.phenotype == assertion.phenotype
                && a.source == assertion.source
                && a.feature == assertion.feature
        });
        if !seen {
            self.phenotype_assertions.push(assertion);
        }
    }
}

/// Annotations keyed by the `Allele` token of the entries they came from.
pub type AnnotationsByAllele = HashMap<String, AlleleAnnotation>;

///
/// Parse a SIFT or PolyPhen value such as `tolerated(0.45)`.
///
/// Anything that is not a known label followed by a numeric score in parentheses
/// gives `None`.
///
pub fn parse_prediction(value: &str) -> Option<(String, f64)> {
    let (label, rest) = value.split_once('(')?;
    let score = rest.split_once(')')?.0.trim().parse::<f64>().ok()?;

    if !PREDICTION_LABELS.contains(&label) {
        return None;
    }

    Some((label.to_string(), score))
}

fn prediction_result(tool: &str, value: &str) -> Option<PredictionResult> {
    let (label, score) = parse_prediction(value)?;
    Some(PredictionResult {
        result: label,
        score: Some(score),
        analysis_method: AnalysisMethod::tool(tool),
    })
}

///
/// Split a `PHENOTYPES` value into `(name, source, feature)` triples.
///
/// Triples are `&`-separated, segments `+`-separated. Tokens with fewer than three
/// segments and tokens whose feature is an Ensembl stable id are skipped. Underscores
/// in names stand for spaces.
///
pub fn parse_phenotypes(value: &str) -> Vec<(String, String, String)> {
    value
        .split('&')
        .filter_map(|token| {
            let mut segments = token.rsplitn(3, '+');
            let feature = segments.next()?;
            let source = segments.next()?;
            let name = segments.next()?;

            if name.is_empty() || feature.starts_with(SELF_REFERENCE_PREFIX) {
                return None;
            }

            Some((
                name.replace('_', " "),
                source.to_string(),
                feature.to_string(),
            ))
        })
        .collect()
}

///
/// Group annotation entries by allele and derive phenotypes, consequences and scores.
///
/// # Arguments
/// - entries: each packed entry with the column map of the header it was declared under
///
pub fn annotate<'a, I>(entries: I) -> AnnotationsByAllele
where
    I: IntoIterator<Item = (&'a AnnotationIndexMap, &'a str)>,
{
    let mut annotations = AnnotationsByAllele::new();

    for (columns, entry) in entries {
        let fields: Vec<&str> = entry.split('|').collect();

        let Some(allele) = columns.field(&fields, ALLELE) else {
            debug!("Skipping annotation entry without an allele: {}", entry);
            continue;
        };

        let group = annotations.entry(allele.to_string()).or_default();
        let feature_type = columns.field(&fields, FEATURE_TYPE);

        if let Some(phenotypes) = columns.field(&fields, PHENOTYPES) {
            for (phenotype, source, feature) in parse_phenotypes(phenotypes) {
                group.push_phenotype(PhenotypeAssertion {
                    phenotype,
                    source,
                    feature,
                    feature_type: feature_type.map(str::to_string),
                });
            }
        }

        let prediction_results = [
            (SIFT_TOOL, columns.field(&fields, SIFT)),
            (POLYPHEN_TOOL, columns.field(&fields, POLYPHEN)),
        ]
        .into_iter()
        .filter_map(|(tool, value)| value.and_then(|v| prediction_result(tool, v)))
        .collect();

        group
            .predicted_molecular_consequences
            .push(PredictedMolecularConsequence {
                allele_name: columns.field(&fields, SPDI).map(str::to_string),
                feature_stable_id: columns.field(&fields, FEATURE).map(str::to_string),
                feature_type: feature_type.map(str::to_string),
                consequences: columns
                    .field(&fields, CONSEQUENCE)
                    .map(|c| c.split('&').map(str::to_string).collect())
                    .unwrap_or_default(),
                prediction_results,
            });

        if let Some(cadd) = columns.field(&fields, CADD) {
            group.push_tool_score(CADD_TOOL, cadd);
        }
        if let Some(gerp) = columns.field(&fields, CONSERVATION) {
            group.push_tool_score(GERP_TOOL, gerp);
        }
    }

    annotations
}
