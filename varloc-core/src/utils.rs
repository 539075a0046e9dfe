use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use flate2::read::MultiGzDecoder;

use crate::consts::{STRUCTURAL_VARIATION_PREFIX, VCF_GZ_EXT};
use crate::errors::VariantError;
use crate::models::{RawRecord, VcfHeader};

fn is_gzipped(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz" || ext == "bgz")
}

///
/// Get a reader for either a gzip'd (bgzf included) or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>, VariantError> {
    let file = File::open(path).map_err(|e| VariantError::SourceUnavailable {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let file: Box<dyn Read> = match is_gzipped(path) {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

///
/// Read the header of a VCF file, stopping at the first data line.
///
/// # Arguments
///
/// - path: path to a `.vcf`, `.vcf.gz` or bgzipped VCF
///
pub fn read_vcf_header(path: &Path) -> Result<VcfHeader, VariantError> {
    let mut reader = get_dynamic_reader(path)?;
    let mut lines = Vec::new();
    let mut line = String::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 || !line.starts_with('#') {
            break;
        }
        lines.push(line.clone());
    }

    Ok(VcfHeader::from_lines(lines)?.with_source_file(path))
}

///
/// Parse a complete VCF text (header and data lines), as printed by an external tool.
///
pub fn parse_vcf_text(text: &str) -> Result<(Arc<VcfHeader>, Vec<RawRecord>), VariantError> {
    let header = Arc::new(VcfHeader::from_lines(
        text.lines().take_while(|l| l.starts_with('#')),
    )?);

    let records = text
        .lines()
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(|l| RawRecord::from_line(l, Arc::clone(&header)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((header, records))
}

///
/// Walk every data line of a VCF file and return the first record accepted by `predicate`.
///
/// Used when a file has no index to seek with.
pub fn scan_vcf<F>(path: &Path, mut predicate: F) -> Result<Option<RawRecord>, VariantError>
where
    F: FnMut(&RawRecord) -> bool,
{
    let header = Arc::new(read_vcf_header(path)?);
    let reader = get_dynamic_reader(path)?;

    for line in reader.lines() {
        let line = line?;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let record = RawRecord::from_line(&line, Arc::clone(&header))?;
        if predicate(&record) {
            return Ok(Some(record));
        }
    }

    Ok(None)
}

///
/// Source name of a per-source structural-variant file, `variation_<source>.vcf.gz` -> `<source>`.
///
pub fn source_name_from_path(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    file_name
        .strip_prefix(STRUCTURAL_VARIATION_PREFIX)?
        .strip_suffix(VCF_GZ_EXT)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;
    use std::path::PathBuf;

    use flate2::Compression;
    use flate2::write::GzEncoder;
    use pretty_assertions::assert_eq;
    use rstest::*;

    const VCF: &str = "##fileformat=VCFv4.2\n##source=dbSNP_156\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n1\t100\trs1\tA\tG\t.\t.\t.\n1\t200\trs2\tC\tT\t.\t.\t.\n";

    fn write_gz(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(text.as_bytes()).unwrap();
        encoder.finish().unwrap();
        path
    }

    #[rstest]
    fn test_read_header_and_scan_gz() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = write_gz(tempdir.path(), "variation.vcf.gz", VCF);

        let header = read_vcf_header(&path).unwrap();
        assert_eq!(header.source(), Some("dbSNP_156"));
        assert_eq!(header.source_file.as_deref(), Some(path.as_path()));

        let found = scan_vcf(&path, |r| r.has_id("rs2")).unwrap().unwrap();
        assert_eq!(found.position, 200);
        assert!(scan_vcf(&path, |r| r.has_id("rs3")).unwrap().is_none());
    }

    #[rstest]
    fn test_missing_file_is_source_unavailable() {
        let result = read_vcf_header(Path::new("/definitely/not/here.vcf.gz"));
        assert!(matches!(result, Err(VariantError::SourceUnavailable { .. })));
    }

    #[rstest]
    fn test_parse_vcf_text() {
        let (header, records) = parse_vcf_text(VCF).unwrap();
        assert_eq!(header.fileformat.as_deref(), Some("VCFv4.2"));
        assert_eq!(records.len(), 2);
        assert!(records[1].matches("1", 200, "rs2"));
    }

    #[rstest]
    #[case("/data/sv/variation_dgva.vcf.gz", Some("dgva"))]
    #[case("variation_1000_genomes.vcf.gz", Some("1000_genomes"))]
    #[case("variation_.vcf.gz", None)]
    #[case("variants.db", None)]
    fn test_source_name_from_path(#[case] path: &str, #[case] expected: Option<&str>) {
        assert_eq!(source_name_from_path(Path::new(path)).as_deref(), expected);
    }
}
