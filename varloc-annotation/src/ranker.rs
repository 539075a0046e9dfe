use std::collections::HashMap;
use std::sync::LazyLock;

use varloc_core::errors::VariantError;

/// Sequence Ontology consequence terms, most severe first.
pub const CONSEQUENCE_SEVERITY: [&str; 41] = [
    "transcript_ablation",
    "splice_acceptor_variant",
    "splice_donor_variant",
    "stop_gained",
    "frameshift_variant",
    "stop_lost",
    "start_lost",
    "transcript_amplification",
    "feature_elongation",
    "feature_truncation",
    "inframe_insertion",
    "inframe_deletion",
    "missense_variant",
    "protein_altering_variant",
    "splice_donor_5th_base_variant",
    "splice_region_variant",
    "splice_donor_region_variant",
    "splice_polypyrimidine_tract_variant",
    "incomplete_terminal_codon_variant",
    "start_retained_variant",
    "stop_retained_variant",
    "synonymous_variant",
    "coding_sequence_variant",
    "mature_miRNA_variant",
    "5_prime_UTR_variant",
    "3_prime_UTR_variant",
    "non_coding_transcript_exon_variant",
    "intron_variant",
    "NMD_transcript_variant",
    "non_coding_transcript_variant",
    "coding_transcript_variant",
    "upstream_gene_variant",
    "downstream_gene_variant",
    "TFBS_ablation",
    "TFBS_amplification",
    "TF_binding_site_variant",
    "regulatory_region_ablation",
    "regulatory_region_amplification",
    "regulatory_region_variant",
    "intergenic_variant",
    "sequence_variant",
];

static RANKS: LazyLock<HashMap<&'static str, u32>> = LazyLock::new(|| {
    CONSEQUENCE_SEVERITY
        .iter()
        .zip(1..)
        .map(|(term, rank)| (*term, rank))
        .collect()
});

/// Rank of a consequence term, 1 being the most severe.
pub fn rank(term: &str) -> Result<u32, VariantError> {
    RANKS
        .get(term)
        .copied()
        .ok_or_else(|| VariantError::UnknownConsequenceTerm(term.to_string()))
}

///
/// The most severe of the `&`-delimited consequence terms in `consequences`.
///
/// The first term seen keeps a shared rank. Every term must be known: an unknown one
/// fails the whole ranking.
///
pub fn most_severe<'a, I>(consequences: I) -> Result<Option<&'a str>, VariantError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(u32, &str)> = None;

    for term in consequences
        .into_iter()
        .flat_map(|c| c.split('&'))
        .filter(|t| !t.is_empty())
    {
        let term_rank = rank(term)?;
        if best.is_none_or(|(best_rank, _)| term_rank < best_rank) {
            best = Some((term_rank, term));
        }
    }

    Ok(best.map(|(_, term)| term))
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("transcript_ablation", 1)]
    #[case("missense_variant", 13)]
    #[case("5_prime_UTR_variant", 25)]
    #[case("NMD_transcript_variant", 29)]
    #[case("intergenic_variant", 40)]
    #[case("sequence_variant", 41)]
    fn test_rank(#[case] term: &str, #[case] expected: u32) {
        assert_eq!(rank(term).unwrap(), expected);
    }

    #[rstest]
    fn test_most_severe_across_entries() {
        let consequences = [
            "upstream_gene_variant",
            "intron_variant&NMD_transcript_variant",
            "missense_variant&splice_region_variant",
        ];
        assert_eq!(most_severe(consequences).unwrap(), Some("missense_variant"));
    }

    #[rstest]
    fn test_most_severe_empty() {
        assert_eq!(most_severe([]).unwrap(), None);
        assert_eq!(most_severe([""]).unwrap(), None);
    }

    #[rstest]
    fn test_unknown_term_fails() {
        let result = most_severe(["missense_variant&made_up_variant"]);
        match result {
            Err(VariantError::UnknownConsequenceTerm(term)) => assert_eq!(term, "made_up_variant"),
            other => panic!("expected UnknownConsequenceTerm, got {:?}", other),
        }
    }
}
