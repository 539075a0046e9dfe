use crate::classifier::AlleleType;
use crate::models::{Location, Region, Slice, Strand};

pub const CHROMOSOME_REGION_CODE: &str = "chromosome";
pub const CHROMOSOME_SO_TERM: &str = "SO:0001217";

///
/// Genomic slice covered by a variant or allele.
///
/// The reference bases are covered from `position` on. An insertion covers no bases and
/// is placed between `position` and the base after it.
pub fn slice_of(chromosome: &str, position: u64, reference: &str, allele_type: AlleleType) -> Slice {
    let (length, end) = match allele_type {
        AlleleType::Insertion => (0, position + 1),
        _ => {
            let length = reference.len() as u64;
            (length, (position + length).saturating_sub(1))
        }
    };

    Slice {
        location: Location {
            start: position,
            end,
            length,
        },
        region: Region {
            name: chromosome.to_string(),
            code: CHROMOSOME_REGION_CODE.to_string(),
            topology: "linear".to_string(),
            so_term: CHROMOSOME_SO_TERM.to_string(),
        },
        strand: Strand {
            code: "forward".to_string(),
            value: 1,
        },
    }
}
