use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use varloc_core::models::{InfoValue, RawRecord, VcfHeader};

pub const STRUCTURAL_VARIANT_TYPE: &str = "StructuralVariant";

///
/// A structural variant record. No allele expansion is done for these.
///
#[derive(Debug, Clone)]
pub struct StructuralVariant {
    pub name: String,
    pub genome_uuid: String,
    pub chromosome: String,
    pub position: u64,
    pub info: BTreeMap<String, InfoValue>,
    header: Arc<VcfHeader>,
}

impl StructuralVariant {
    pub fn from_record(record: RawRecord, genome_uuid: &str) -> StructuralVariant {
        StructuralVariant {
            name: record.ids.first().cloned().unwrap_or_default(),
            genome_uuid: genome_uuid.to_string(),
            chromosome: record.chromosome,
            position: record.position,
            info: record.info,
            header: record.header,
        }
    }

    pub fn variant_type(&self) -> &'static str {
        STRUCTURAL_VARIANT_TYPE
    }

    pub fn header(&self) -> &VcfHeader {
        &self.header
    }

    /// VEP release from the file header, e.g. `v110`.
    pub fn vep_version(&self) -> Option<String> {
        self.header.vep_version()
    }

    /// The file the record was read from, when known.
    pub fn source_file(&self) -> Option<&Path> {
        self.header.source_file.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_record() {
        let header = VcfHeader::from_lines([
            "##fileformat=VCFv4.2",
            "##VEP=\"v111\" cache=\"homo_sapiens/111_GRCh38\"",
        ])
        .unwrap()
        .with_source_file("/data/sv/variation_dgva.vcf.gz");

        let record = RawRecord::from_line(
            "1\t10001\tesv3585363\tN\t<DEL>\t.\t.\tSVTYPE=DEL;END=10500",
            Arc::new(header),
        )
        .unwrap();
        let variant = StructuralVariant::from_record(record, "a7335667-93e7-11ec-a39d-005056b38ce3");

        assert_eq!(variant.name, "esv3585363");
        assert_eq!(variant.position, 10001);
        assert_eq!(variant.variant_type(), "StructuralVariant");
        assert_eq!(variant.vep_version().as_deref(), Some("v111"));
        assert_eq!(
            variant.source_file(),
            Some(Path::new("/data/sv/variation_dgva.vcf.gz"))
        );
        assert_eq!(
            variant.info.get("SVTYPE"),
            Some(&InfoValue::Value("DEL".to_string()))
        );
    }
}
