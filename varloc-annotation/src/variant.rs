//! The resolved small variant and its alleles.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use varloc_core::consts::{CSQ_KEY, FREQ_KEY};
use varloc_core::errors::VariantError;
use varloc_core::models::{InfoValue, RawRecord, VcfHeader, minimise_allele};

use crate::classifier::{AlleleType, classify_allele, classify_alleles};
use crate::columns::{AnnotationIndexMap, CONSEQUENCE};
use crate::consequence::{AlleleAnnotation, AnnotationsByAllele, annotate};
use crate::frequency::{DEFAULT_REFERENCE_POPULATION, resolve_frequencies};
use crate::models::{
    AnalysisMethod, AssignmentMethod, ExternalReference, PhenotypeAssertion,
    PredictedMolecularConsequence, PredictionResult, PopulationFrequency, Slice, Source,
};
use crate::ranker::most_severe;
use crate::slice::slice_of;

pub const VARIANT_TYPE: &str = "Variant";
pub const VARIANT_ALLELE_TYPE: &str = "VariantAllele";

pub const VEP_TOOL: &str = "Ensembl VEP";
pub const MOST_SEVERE_QUALIFIER: &str = "most severe consequence";

const DBSNP_URL: &str = "https://www.ncbi.nlm.nih.gov/snp/";
const CLINVAR_URL: &str = "https://www.ncbi.nlm.nih.gov/clinvar/variation/";

/// One packed annotation entry and the header (by index) it was declared under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationEntry {
    pub source: usize,
    pub entry: String,
}

///
/// A variant built from one base record and any number of annotation records.
///
/// Identity, coordinates and alleles come from the base record only. Merged records
/// contribute annotation entries, frequency fields and INFO keys the base lacks.
///
#[derive(Debug, Clone)]
pub struct Variant {
    pub name: String,
    pub chromosome: String,
    pub position: u64,
    pub reference: String,
    pub alternates: Vec<String>,
    pub alternative_names: Vec<String>,
    pub info: BTreeMap<String, InfoValue>,
    annotations: Vec<AnnotationEntry>,
    frequencies: Vec<String>,
    headers: Vec<Arc<VcfHeader>>,
    columns: Vec<AnnotationIndexMap>,
    reference_population: String,
    consequences: OnceLock<AnnotationsByAllele>,
    population_frequencies: OnceLock<Vec<Vec<PopulationFrequency>>>,
}

impl Variant {
    ///
    /// Build a variant from its base record.
    ///
    /// # Arguments
    /// - record: the base record
    /// - name: the identifier the record was looked up by
    pub fn from_record(record: RawRecord, name: &str) -> Variant {
        let alternative_names = record.ids.iter().filter(|id| *id != name).cloned().collect();

        let mut variant = Variant {
            name: name.to_string(),
            chromosome: record.chromosome.clone(),
            position: record.position,
            reference: record.reference.clone(),
            alternates: record.alternates.clone(),
            alternative_names,
            info: BTreeMap::new(),
            annotations: Vec::new(),
            frequencies: Vec::new(),
            headers: Vec::new(),
            columns: Vec::new(),
            reference_population: DEFAULT_REFERENCE_POPULATION.to_string(),
            consequences: OnceLock::new(),
            population_frequencies: OnceLock::new(),
        };
        variant.absorb(record);
        variant
    }

    pub fn with_reference_population(mut self, population: &str) -> Self {
        self.reference_population = population.to_string();
        self.population_frequencies = OnceLock::new();
        self
    }

    ///
    /// Merge an annotation record into the variant.
    ///
    /// Derived fields computed before the merge are discarded.
    pub fn merge(&mut self, record: RawRecord) {
        self.absorb(record);
        self.consequences = OnceLock::new();
        self.population_frequencies = OnceLock::new();
    }

    fn absorb(&mut self, record: RawRecord) {
        let source = self.headers.len();
        let columns = record
            .header
            .annotation_format(CSQ_KEY)
            .map(AnnotationIndexMap::build)
            .unwrap_or_default();

        self.annotations
            .extend(record.info_list(CSQ_KEY).into_iter().map(|entry| AnnotationEntry {
                source,
                entry: entry.to_string(),
            }));

        if let Some(freq) = record.info_value(FREQ_KEY) {
            self.frequencies.push(freq.to_string());
        }

        for (key, value) in record.info {
            if key != CSQ_KEY && key != FREQ_KEY {
                self.info.entry(key).or_insert(value);
            }
        }

        self.headers.push(record.header);
        self.columns.push(columns);
    }

    pub fn variant_type(&self) -> &'static str {
        VARIANT_TYPE
    }

    /// Header of the base record.
    pub fn header(&self) -> Option<&VcfHeader> {
        self.headers.first().map(Arc::as_ref)
    }

    pub fn headers(&self) -> &[Arc<VcfHeader>] {
        &self.headers
    }

    pub fn annotation_entries(&self) -> impl Iterator<Item = (&AnnotationIndexMap, &str)> {
        self.annotations
            .iter()
            .filter_map(|a| self.columns.get(a.source).map(|c| (c, a.entry.as_str())))
    }

    pub fn allele_type(&self) -> Result<AlleleType, VariantError> {
        classify_alleles(&self.reference, &self.alternates)
    }

    pub fn slice(&self) -> Result<Slice, VariantError> {
        Ok(slice_of(
            &self.chromosome,
            self.position,
            &self.reference,
            self.allele_type()?,
        ))
    }

    /// All alleles, the reference first.
    pub fn alleles(&self) -> Vec<VariantAllele<'_>> {
        (0..=self.alternates.len())
            .map(|index| VariantAllele {
                variant: self,
                index,
            })
            .collect()
    }

    /// Annotations grouped by allele, computed on first use.
    pub fn consequences(&self) -> &AnnotationsByAllele {
        self.consequences
            .get_or_init(|| annotate(self.annotation_entries()))
    }

    ///
    /// Annotation group of an allele: its minimised form first, then the allele as written.
    ///
    pub fn annotation_for(&self, allele: &str) -> Option<&AlleleAnnotation> {
        let consequences = self.consequences();
        consequences
            .get(&minimise_allele(&self.reference, allele))
            .or_else(|| consequences.get(allele))
    }

    pub fn population_frequencies(&self, allele_index: usize) -> &[PopulationFrequency] {
        self.population_frequencies
            .get_or_init(|| {
                resolve_frequencies(
                    self.frequencies.iter().map(String::as_str),
                    &self.reference_population,
                    self.alternates.len() + 1,
                )
            })
            .get(allele_index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn vep_version(&self) -> Option<String> {
        self.header().and_then(VcfHeader::vep_version)
    }

    ///
    /// The most severe consequence over every annotation entry of every merged source.
    ///
    pub fn most_severe_consequence(&self) -> Result<Option<PredictionResult>, VariantError> {
        let consequences: Vec<&str> = self
            .annotation_entries()
            .filter_map(|(columns, entry)| {
                let fields: Vec<&str> = entry.split('|').collect();
                columns.field(&fields, CONSEQUENCE)
            })
            .collect();

        Ok(most_severe(consequences)?.map(|term| PredictionResult {
            result: term.to_string(),
            score: None,
            analysis_method: AnalysisMethod {
                tool: VEP_TOOL.to_string(),
                qualifier: MOST_SEVERE_QUALIFIER.to_string(),
                version: self.vep_version(),
            },
        }))
    }

    pub fn prediction_results(&self) -> Result<Vec<PredictionResult>, VariantError> {
        Ok(self.most_severe_consequence()?.into_iter().collect())
    }

    ///
    /// Reference to the record in the database named by the base header's `source` line.
    ///
    pub fn primary_source(&self) -> ExternalReference {
        let raw = self.header().and_then(VcfHeader::source).unwrap_or_default();
        let source = source_of(raw);
        let url = if source.url.is_empty() {
            String::new()
        } else {
            format!("{}{}", source.url, self.name)
        };

        ExternalReference {
            accession_id: self.name.clone(),
            name: self.name.clone(),
            description: String::new(),
            assignment_method: AssignmentMethod {
                kind: "DIRECT".to_string(),
                description: "A reference made by an external resource of annotation to an Ensembl feature that Ensembl imports without modification".to_string(),
            },
            url,
            source,
        }
    }
}

fn source_of(raw: &str) -> Source {
    let digits = raw.len() - raw.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let release = (digits > 0).then(|| raw[raw.len() - digits..].to_string());

    let (id, description, url) = if raw.starts_with("dbSNP") {
        ("dbSNP", "NCBI db of human variants", DBSNP_URL)
    } else if raw.starts_with("ClinVar") {
        ("ClinVar", "ClinVar db of human variants", CLINVAR_URL)
    } else {
        (raw, "", "")
    };

    Source {
        id: id.to_string(),
        name: id.to_string(),
        description: description.to_string(),
        url: url.to_string(),
        release,
    }
}

///
/// One allele of a variant, index 0 being the reference.
///
#[derive(Debug, Clone, Copy)]
pub struct VariantAllele<'a> {
    variant: &'a Variant,
    index: usize,
}

impl<'a> VariantAllele<'a> {
    pub fn variant(&self) -> &'a Variant {
        self.variant
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_reference(&self) -> bool {
        self.index == 0
    }

    pub fn allele_sequence(&self) -> &'a str {
        match self.index {
            0 => &self.variant.reference,
            i => &self.variant.alternates[i - 1],
        }
    }

    pub fn reference_sequence(&self) -> &'a str {
        &self.variant.reference
    }

    /// `chromosome:position:reference:allele`
    pub fn name(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.variant.chromosome,
            self.variant.position,
            self.variant.reference,
            self.allele_sequence()
        )
    }

    pub fn allele_type(&self) -> Result<AlleleType, VariantError> {
        classify_allele(&self.variant.reference, self.allele_sequence())
    }

    pub fn slice(&self) -> Result<Slice, VariantError> {
        Ok(slice_of(
            &self.variant.chromosome,
            self.variant.position,
            &self.variant.reference,
            self.allele_type()?,
        ))
    }

    pub fn alternative_names(&self) -> &'a [String] {
        &self.variant.alternative_names
    }

    fn annotation(&self) -> Option<&'a AlleleAnnotation> {
        self.variant.annotation_for(self.allele_sequence())
    }

    pub fn phenotype_assertions(&self) -> &'a [PhenotypeAssertion] {
        self.annotation()
            .map(|a| a.phenotype_assertions.as_slice())
            .unwrap_or(&[])
    }

    pub fn predicted_molecular_consequences(&self) -> &'a [PredictedMolecularConsequence] {
        self.annotation()
            .map(|a| a.predicted_molecular_consequences.as_slice())
            .unwrap_or(&[])
    }

    pub fn prediction_results(&self) -> &'a [PredictionResult] {
        self.annotation()
            .map(|a| a.prediction_results.as_slice())
            .unwrap_or(&[])
    }

    pub fn population_frequencies(&self) -> &'a [PopulationFrequency] {
        self.variant.population_frequencies(self.index)
    }
}
