use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::VariantError;

static VEP_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v\d+").expect("static regex is valid"));

///
/// One `##INFO=<...>` declaration.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoDefinition {
    pub id: String,
    pub number: String,
    pub kind: String,
    pub description: String,
}

///
/// The provenance part of a VCF header: meta lines, INFO declarations and sample names.
///
/// Only what the resolvers need is kept. Structured lines other than INFO are stored
/// with their raw `<...>` value.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VcfHeader {
    pub fileformat: Option<String>,
    pub meta: Vec<(String, String)>,
    pub infos: Vec<InfoDefinition>,
    pub samples: Vec<String>,
    pub source_file: Option<PathBuf>,
}

impl VcfHeader {
    ///
    /// Build a header from its text lines (`##...` meta lines and the `#CHROM` line).
    ///
    /// Lines that do not start with `#` are ignored so a caller may pass a whole
    /// VCF text and stop early.
    pub fn from_lines<I, S>(lines: I) -> Result<VcfHeader, VariantError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut header = VcfHeader::default();

        for line in lines {
            let line = line.as_ref().trim_end_matches(['\n', '\r']);

            if let Some(meta) = line.strip_prefix("##") {
                let (key, value) = meta.split_once('=').ok_or_else(|| {
                    VariantError::MalformedRecord(format!("Invalid header line: {}", line))
                })?;

                match key {
                    "fileformat" => header.fileformat = Some(value.to_string()),
                    "INFO" => header.infos.push(parse_info_definition(value)?),
                    _ => header.meta.push((key.to_string(), value.to_string())),
                }
            } else if let Some(columns) = line.strip_prefix('#') {
                header.samples = columns
                    .split('\t')
                    .skip(9)
                    .map(|s| s.to_string())
                    .collect();
            }
        }

        Ok(header)
    }

    pub fn with_source_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.source_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// All values recorded for a meta key, in file order.
    pub fn get<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.meta
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `##source=` value naming the data provider.
    pub fn source(&self) -> Option<&str> {
        self.get("source").next()
    }

    ///
    /// The VEP release the records were annotated with, e.g. `v110`.
    ///
    pub fn vep_version(&self) -> Option<String> {
        let line = self.get("VEP").next()?;
        VEP_VERSION.find(line).map(|m| m.as_str().to_string())
    }

    pub fn info(&self, id: &str) -> Option<&InfoDefinition> {
        self.infos.iter().find(|info| info.id == id)
    }

    /// Description of the packed annotation INFO field, carrying its `Format: ` declaration.
    pub fn annotation_format(&self, key: &str) -> Option<&str> {
        self.info(key).map(|info| info.description.as_str())
    }
}

fn parse_info_definition(value: &str) -> Result<InfoDefinition, VariantError> {
    let fields = parse_structured_value(value).ok_or_else(|| {
        VariantError::MalformedRecord(format!("Invalid INFO declaration: {}", value))
    })?;

    let lookup = |name: &str| {
        fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
            .unwrap_or_default()
    };

    let id = lookup("ID");
    if id.is_empty() {
        return Err(VariantError::MalformedRecord(format!(
            "INFO declaration without ID: {}",
            value
        )));
    }

    Ok(InfoDefinition {
        id,
        number: lookup("Number"),
        kind: lookup("Type"),
        description: lookup("Description"),
    })
}

///
/// Split a structured header value `<K=V,K="quoted, value",...>` into its pairs.
///
fn parse_structured_value(value: &str) -> Option<Vec<(String, String)>> {
    let inner = value.strip_prefix('<')?.strip_suffix('>')?;

    let mut fields = Vec::new();
    let mut key = String::new();
    let mut current = String::new();
    let mut in_value = false;
    let mut in_quotes = false;
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '"' => in_quotes = !in_quotes,
            '=' if !in_value && !in_quotes => {
                key = std::mem::take(&mut current);
                in_value = true;
            }
            ',' if !in_quotes => {
                fields.push((std::mem::take(&mut key), std::mem::take(&mut current)));
                in_value = false;
            }
            _ => current.push(c),
        }
    }

    if in_value {
        fields.push((key, current));
    }

    Some(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[fixture]
    fn header_lines() -> Vec<&'static str> {
        vec![
            "##fileformat=VCFv4.2",
            "##source=dbSNP_156",
            "##VEP=\"v110\" time=\"2023-10-02 10:00:00\" cache=\"homo_sapiens/110_GRCh38\"",
            "##INFO=<ID=CSQ,Number=.,Type=String,Description=\"Consequence annotations from Ensembl VEP. Format: Allele|Consequence|Feature\">",
            "##INFO=<ID=FREQ,Number=.,Type=String,Description=\"Allele frequencies, \\\"pop:freqs\\\" separated by |\">",
            "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO",
        ]
    }

    #[rstest]
    fn test_header_provenance(header_lines: Vec<&'static str>) {
        let header = VcfHeader::from_lines(header_lines).unwrap();

        assert_eq!(header.fileformat.as_deref(), Some("VCFv4.2"));
        assert_eq!(header.source(), Some("dbSNP_156"));
        assert_eq!(header.vep_version().as_deref(), Some("v110"));
        assert_eq!(
            header.annotation_format("CSQ"),
            Some("Consequence annotations from Ensembl VEP. Format: Allele|Consequence|Feature")
        );
        assert!(header.samples.is_empty());
    }

    #[rstest]
    fn test_quoted_description_keeps_commas(header_lines: Vec<&'static str>) {
        let header = VcfHeader::from_lines(header_lines).unwrap();
        let freq = header.info("FREQ").unwrap();

        assert_eq!(freq.number, ".");
        assert_eq!(freq.kind, "String");
        assert_eq!(
            freq.description,
            "Allele frequencies, \"pop:freqs\" separated by |"
        );
    }

    #[rstest]
    fn test_missing_vep_line() {
        let header = VcfHeader::from_lines(["##fileformat=VCFv4.1"]).unwrap();
        assert_eq!(header.vep_version(), None);
        assert_eq!(header.source(), None);
    }

    #[rstest]
    fn test_invalid_meta_line() {
        let result = VcfHeader::from_lines(["##nonsense"]);
        assert!(matches!(result, Err(VariantError::MalformedRecord(_))));
    }
}
