//! Population allele frequencies from the packed `FREQ` INFO field.
//!
//! The field reads `Pop1:f0,f1,...|Pop2:f0,f1,...` where index 0 is the reference
//! allele and the following indices are the alternates in ALT order.

use tracing::debug;

use crate::models::PopulationFrequency;

pub const DEFAULT_REFERENCE_POPULATION: &str = "GnomAD";

const MISSING_FREQUENCIES: [&str; 2] = ["None", "."];

///
/// Split a packed frequency field into `(population, per-allele values)`.
///
/// Values are kept as written. Malformed population blocks are skipped.
pub fn parse_frequency_field(raw: &str) -> Vec<(&str, Vec<&str>)> {
    raw.split('|')
        .filter_map(|block| {
            let (population, values) = block.split_once(':')?;
            Some((population.trim(), values.split(',').map(str::trim).collect()))
        })
        .collect()
}

/// A frequency value, or `None` for the missing sentinels and anything non-numeric.
pub fn parse_frequency(value: &str) -> Option<f64> {
    if MISSING_FREQUENCIES.contains(&value) {
        return None;
    }
    value.parse::<f64>().ok().filter(|f| f.is_finite())
}

///
/// Frequencies of every allele of a variant in the reference population.
///
/// # Arguments
/// - fields: the packed frequency fields of the merged records, in merge order; the
///   first block naming the reference population is used
/// - reference_population: the one population surfaced
/// - allele_count: number of alleles including the reference
///
/// Returns one list per allele index, with the minor allele flagged.
pub fn resolve_frequencies<'a, I>(
    fields: I,
    reference_population: &str,
    allele_count: usize,
) -> Vec<Vec<PopulationFrequency>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut per_allele: Vec<Vec<PopulationFrequency>> = vec![Vec::new(); allele_count];

    let values = fields.into_iter().find_map(|raw| {
        parse_frequency_field(raw)
            .into_iter()
            .find(|(population, _)| *population == reference_population)
            .map(|(_, values)| values)
    });

    let Some(values) = values else {
        return per_allele;
    };

    if values.len() != allele_count {
        debug!(
            "{} frequencies listed for {} alleles in {}",
            values.len(),
            allele_count,
            reference_population
        );
    }

    for (index, value) in values.into_iter().enumerate().take(allele_count) {
        if let Some(allele_frequency) = parse_frequency(value) {
            per_allele[index].push(PopulationFrequency {
                population: reference_population.to_string(),
                allele_frequency,
                is_minor_allele: false,
                is_hpmaf: false,
            });
        }
    }

    flag_minor_allele(&mut per_allele, reference_population);
    per_allele
}

///
/// Flag the allele with the highest frequency strictly below the maximum.
///
/// The first such allele wins a tie. Nothing is flagged without at least two distinct
/// frequencies.
pub fn flag_minor_allele(per_allele: &mut [Vec<PopulationFrequency>], population: &str) {
    let observed: Vec<(usize, f64)> = per_allele
        .iter()
        .enumerate()
        .filter_map(|(index, frequencies)| {
            frequencies
                .iter()
                .find(|f| f.population == population)
                .map(|f| (index, f.allele_frequency))
        })
        .collect();

    let max = observed
        .iter()
        .map(|(_, f)| *f)
        .fold(f64::NEG_INFINITY, f64::max);

    let mut minor: Option<(usize, f64)> = None;
    for &(index, frequency) in &observed {
        if frequency < max && minor.is_none_or(|(_, best)| frequency > best) {
            minor = Some((index, frequency));
        }
    }

    let Some((index, _)) = minor else {
        return;
    };

    if let Some(entry) = per_allele[index]
        .iter_mut()
        .find(|f| f.population == population)
    {
        entry.is_minor_allele = true;
        entry.is_hpmaf = true;
    }
}
