//! Allele minimisation.
//!
//! Annotation columns written by VEP carry alleles without the VCF anchoring base
//! (`-` for an emptied side). Every comparison between a VCF allele and an
//! annotation allele goes through [`MinimisedAllele::of`].

#[cfg(feature = "serde")]
use serde::Serialize;

pub const EMPTY_ALLELE: &str = "-";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct MinimisedAllele {
    pub reference: String,
    pub allele: String,
}

impl MinimisedAllele {
    ///
    /// Strip the VCF anchoring base from a (reference, allele) pair.
    ///
    /// Only the first base is removed, and only when both sides start with it, which
    /// is how VEP writes the `Allele` column: `AT>ATT` becomes `T>TT`. An allele equal
    /// to its reference is left untouched. A side emptied by the stripping becomes `-`,
    /// and `-` is never stripped itself, so a pair with an emptied side is a fixed point.
    pub fn of(reference: &str, allele: &str) -> MinimisedAllele {
        let anchored = reference != allele
            && match (reference.chars().next(), allele.chars().next()) {
                (Some(r), Some(a)) => r == a && r != '-',
                _ => false,
            };

        if !anchored {
            return MinimisedAllele {
                reference: reference.to_string(),
                allele: allele.to_string(),
            };
        }

        // the shared first char has the same width on both sides
        let width = reference.chars().next().map_or(0, char::len_utf8);
        MinimisedAllele {
            reference: or_empty(&reference[width..]),
            allele: or_empty(&allele[width..]),
        }
    }
}

fn or_empty(sequence: &str) -> String {
    if sequence.is_empty() {
        EMPTY_ALLELE.to_string()
    } else {
        sequence.to_string()
    }
}

/// The minimised form of `allele` against `reference`.
pub fn minimise_allele(reference: &str, allele: &str) -> String {
    MinimisedAllele::of(reference, allele).allele
}
