//! Fully derived, owned snapshots of resolved entities, for rendering.

use std::collections::BTreeMap;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::Serialize;

use varloc_core::errors::VariantError;
use varloc_core::models::InfoValue;

use crate::classifier::OntologyTerm;
use crate::models::{
    ExternalReference, PhenotypeAssertion, PopulationFrequency, PredictedMolecularConsequence,
    PredictionResult, Slice,
};
use crate::structural::StructuralVariant;
use crate::variant::{VARIANT_ALLELE_TYPE, Variant, VariantAllele};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct VariantAlleleView {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    pub allele_sequence: String,
    pub reference_sequence: String,
    pub is_reference: bool,
    pub allele_type: OntologyTerm,
    pub slice: Slice,
    pub alternative_names: Vec<String>,
    pub phenotype_assertions: Vec<PhenotypeAssertion>,
    pub predicted_molecular_consequences: Vec<PredictedMolecularConsequence>,
    pub prediction_results: Vec<PredictionResult>,
    pub population_frequencies: Vec<PopulationFrequency>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct VariantView {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    pub allele_type: OntologyTerm,
    pub slice: Slice,
    pub alternative_names: Vec<String>,
    pub primary_source: ExternalReference,
    pub most_severe_consequence: Option<PredictionResult>,
    pub prediction_results: Vec<PredictionResult>,
    pub alleles: Vec<VariantAlleleView>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct StructuralVariantView {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    pub kind: String,
    pub chromosome: String,
    pub position: u64,
    pub vep_version: Option<String>,
    pub source_file: Option<PathBuf>,
    pub info: BTreeMap<String, InfoValue>,
}

impl TryFrom<&VariantAllele<'_>> for VariantAlleleView {
    type Error = VariantError;

    fn try_from(allele: &VariantAllele<'_>) -> Result<Self, Self::Error> {
        Ok(VariantAlleleView {
            name: allele.name(),
            kind: VARIANT_ALLELE_TYPE.to_string(),
            allele_sequence: allele.allele_sequence().to_string(),
            reference_sequence: allele.reference_sequence().to_string(),
            is_reference: allele.is_reference(),
            allele_type: allele.allele_type()?.term(),
            slice: allele.slice()?,
            alternative_names: allele.alternative_names().to_vec(),
            phenotype_assertions: allele.phenotype_assertions().to_vec(),
            predicted_molecular_consequences: allele.predicted_molecular_consequences().to_vec(),
            prediction_results: allele.prediction_results().to_vec(),
            population_frequencies: allele.population_frequencies().to_vec(),
        })
    }
}

impl TryFrom<&Variant> for VariantView {
    type Error = VariantError;

    ///
    /// Derive every presentation field. Classification and ranking failures propagate.
    ///
    fn try_from(variant: &Variant) -> Result<Self, Self::Error> {
        let most_severe_consequence = variant.most_severe_consequence()?;

        Ok(VariantView {
            name: variant.name.clone(),
            kind: variant.variant_type().to_string(),
            allele_type: variant.allele_type()?.term(),
            slice: variant.slice()?,
            alternative_names: variant.alternative_names.clone(),
            primary_source: variant.primary_source(),
            prediction_results: most_severe_consequence.clone().into_iter().collect(),
            most_severe_consequence,
            alleles: variant
                .alleles()
                .iter()
                .map(VariantAlleleView::try_from)
                .collect::<Result<Vec<_>, _>>()?,
        })
    }
}

impl From<&StructuralVariant> for StructuralVariantView {
    fn from(variant: &StructuralVariant) -> Self {
        StructuralVariantView {
            name: variant.name.clone(),
            kind: variant.variant_type().to_string(),
            chromosome: variant.chromosome.clone(),
            position: variant.position,
            vep_version: variant.vep_version(),
            source_file: variant.source_file().map(|p| p.to_path_buf()),
            info: variant.info.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use varloc_core::models::{RawRecord, VcfHeader};

    fn variant() -> Variant {
        let header = VcfHeader::from_lines([
            "##source=dbSNP_156",
            "##INFO=<ID=CSQ,Number=.,Type=String,Description=\"Format: Allele|Consequence\">",
        ])
        .unwrap();
        let record = RawRecord::from_line(
            "1\t10007\trs1639538116\tT\tC\t.\t.\tCSQ=C|upstream_gene_variant;FREQ=GnomAD:0.99,0.01",
            Arc::new(header),
        )
        .unwrap();
        Variant::from_record(record, "rs1639538116")
    }

    #[test]
    fn test_variant_view() {
        let view = VariantView::try_from(&variant()).unwrap();

        assert_eq!(view.kind, "Variant");
        assert_eq!(view.allele_type.value, "SNV");
        assert_eq!(view.alleles.len(), 2);
        assert_eq!(view.alleles[0].allele_type.value, "biological_region");
        assert_eq!(view.alleles[1].kind, "VariantAllele");
        assert_eq!(view.alleles[1].predicted_molecular_consequences.len(), 1);
        assert_eq!(view.alleles[1].population_frequencies[0].allele_frequency, 0.01);
        assert_eq!(
            view.most_severe_consequence.map(|r| r.result).as_deref(),
            Some("upstream_gene_variant")
        );
        assert_eq!(view.prediction_results.len(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_variant_view_json() {
        let view = VariantView::try_from(&variant()).unwrap();
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["name"], "rs1639538116");
        assert_eq!(json["type"], "Variant");
        assert_eq!(json["slice"]["location"]["start"], 10007);
        assert_eq!(json["primary_source"]["assignment_method"]["type"], "DIRECT");
    }
}
