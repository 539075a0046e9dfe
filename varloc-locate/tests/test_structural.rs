//! Structural variant lookups: index, named source, identifier query fallback, and the
//! bcftools paths driven by a fake executable.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rstest::*;
use rusqlite::{Connection, params};
use tempfile::TempDir;

use varloc_core::errors::VariantError;
use varloc_locate::{ResolverConfig, SourceLayout, VariantResolver};

const GENOME: &str = "a7335667-93e7-11ec-a39d-005056b38ce3";
const NO_BCFTOOLS: &str = "/nonexistent/bcftools";

fn fixture_layout() -> SourceLayout {
    SourceLayout::for_genome("../tests/data/genome", GENOME)
}

/// Copy the fixture structural-variation directory so an index can be written next to it.
fn copy_structural_variation(tempdir: &TempDir) -> SourceLayout {
    let layout = SourceLayout::for_genome(tempdir.path(), GENOME);
    let target = layout.structural_variation_dir();
    fs::create_dir_all(&target).unwrap();

    for entry in fs::read_dir(fixture_layout().structural_variation_dir()).unwrap() {
        let path = entry.unwrap().path();
        fs::copy(&path, target.join(path.file_name().unwrap())).unwrap();
    }
    layout
}

fn write_index(layout: &SourceLayout, rows: &[(&str, &str, i64, &str)]) {
    let connection = Connection::open(layout.structural_variant_index()).unwrap();
    connection
        .execute(
            "CREATE TABLE variants (id TEXT, chrom TEXT, pos INTEGER, filename TEXT)",
            [],
        )
        .unwrap();
    for (id, chrom, pos, filename) in rows {
        connection
            .execute(
                "INSERT INTO variants (id, chrom, pos, filename) VALUES (?1, ?2, ?3, ?4)",
                params![id, chrom, pos, filename],
            )
            .unwrap();
    }
}

fn resolver(data_root: &Path, bcftools: &Path) -> VariantResolver {
    VariantResolver::new(
        ResolverConfig::default()
            .with_data_root(data_root)
            .with_bcftools(bcftools),
    )
}

#[rstest]
fn test_index_match_read_in_process() {
    let tempdir = tempfile::tempdir().unwrap();
    let layout = copy_structural_variation(&tempdir);
    write_index(
        &layout,
        &[
            ("esv3647175", "2", 10000, "variation_dbvar.vcf.gz"),
            ("esv3647175", "1", 10000, "variation_dgva.vcf.gz"),
        ],
    );

    let resolver = resolver(tempdir.path(), Path::new(NO_BCFTOOLS));
    let variant = resolver
        .resolve_structural_variant(GENOME, "1:10000:esv3647175", None)
        .unwrap()
        .expect("second index row matches");

    assert_eq!(variant.name, "esv3647175");
    assert_eq!(variant.genome_uuid, GENOME);
    assert_eq!(variant.chromosome, "1");
    assert_eq!(variant.position, 10000);
    assert_eq!(variant.variant_type(), "StructuralVariant");
    assert_eq!(variant.info.get("SVTYPE").and_then(|v| v.as_str()), Some("DEL"));
    assert_eq!(variant.vep_version().as_deref(), Some("v110"));
    assert_eq!(
        variant.source_file().and_then(|p| p.file_name()),
        Some(OsStr::new("variation_dgva.vcf.gz"))
    );
}

#[rstest]
fn test_index_coordinate_mismatch() {
    let tempdir = tempfile::tempdir().unwrap();
    let layout = copy_structural_variation(&tempdir);
    write_index(&layout, &[("esv3647175", "1", 10001, "variation_dgva.vcf.gz")]);

    let resolver = resolver(tempdir.path(), Path::new(NO_BCFTOOLS));
    assert!(resolver
        .resolve_structural_variant(GENOME, "1:10000:esv3647175", None)
        .unwrap()
        .is_none());
}

#[rstest]
fn test_index_row_pointing_at_wrong_file() {
    let tempdir = tempfile::tempdir().unwrap();
    let layout = copy_structural_variation(&tempdir);
    write_index(&layout, &[("esv3647175", "1", 10000, "variation_dbvar.vcf.gz")]);

    let resolver = resolver(tempdir.path(), Path::new(NO_BCFTOOLS));
    assert!(resolver
        .resolve_structural_variant(GENOME, "1:10000:esv3647175", None)
        .unwrap()
        .is_none());
}

#[rstest]
#[case("dbvar", "1:10000:nsv1000001", true)]
#[case("dbvar", "X:200000:nsv1000002", true)]
#[case("dgva", "1:10000:nsv1000001", false)]
fn test_named_source_in_process(#[case] source: &str, #[case] id: &str, #[case] found: bool) {
    let resolver = resolver(Path::new("../tests/data/genome"), Path::new(NO_BCFTOOLS));

    let variant = resolver
        .resolve_structural_variant(GENOME, id, Some(source))
        .unwrap();
    assert_eq!(variant.is_some(), found);
}

#[rstest]
fn test_named_source_missing() {
    let resolver = resolver(Path::new("../tests/data/genome"), Path::new(NO_BCFTOOLS));

    assert!(matches!(
        resolver.resolve_structural_variant(GENOME, "1:10000:esv3647175", Some("decipher")),
        Err(VariantError::SourceUnavailable { .. })
    ));
}

#[rstest]
#[case("../structural-variation/variation_dbvar")]
#[case("dbvar/..")]
fn test_source_name_cannot_leave_its_directory(#[case] source: &str) {
    let resolver = resolver(Path::new("../tests/data/genome"), Path::new(NO_BCFTOOLS));

    assert!(matches!(
        resolver.resolve_structural_variant(GENOME, "1:10000:nsv1000001", Some(source)),
        Err(VariantError::SourceUnavailable { .. })
    ));
}

#[rstest]
fn test_missing_index() {
    // the fixture directory has no variants.db
    let resolver = resolver(Path::new("../tests/data/genome"), Path::new(NO_BCFTOOLS));

    assert!(resolver
        .resolve_structural_variant(GENOME, "X:200000:nsv1000002", None)
        .unwrap()
        .is_none());
}

#[rstest]
fn test_missing_index_scanned_when_enabled() {
    let mut config = ResolverConfig::default()
        .with_data_root("../tests/data/genome")
        .with_bcftools(NO_BCFTOOLS);
    config.scan_without_index = true;
    let resolver = VariantResolver::new(config);

    let variant = resolver
        .resolve_structural_variant(GENOME, "X:200000:nsv1000002", None)
        .unwrap()
        .unwrap();
    assert_eq!(variant.name, "nsv1000002");
    assert_eq!(variant.info.get("SVTYPE").and_then(|v| v.as_str()), Some("DUP"));

    assert!(resolver
        .resolve_structural_variant(GENOME, "X:200001:nsv1000002", None)
        .unwrap()
        .is_none());
}

#[rstest]
fn test_malformed_identifier() {
    let resolver = resolver(Path::new("../tests/data/genome"), Path::new(NO_BCFTOOLS));

    assert!(matches!(
        resolver.resolve_structural_variant(GENOME, "X:pos:nsv1000002", None),
        Err(VariantError::MalformedIdentifier(_))
    ));
}

#[cfg(unix)]
mod fake_bcftools {
    use super::*;

    use pretty_assertions::assert_eq;

    use std::os::unix::fs::PermissionsExt;
    use std::time::Duration;

    use varloc_locate::{ExternalTool, HeaderCache, StructuralVariantLocator};
    use varloc_core::models::VariantIdentifier;

    const VIEW_OUTPUT: &str = "##fileformat=VCFv4.2\\n##source=fake\\n#CHROM\\tPOS\\tID\\tREF\\tALT\\tQUAL\\tFILTER\\tINFO\\n1\\t10000\\tesv3647175\\tN\\t<DEL>\\t.\\t.\\tEND=20000;SVTYPE=DEL\\n";

    /// A bcftools stand-in that logs its arguments and answers `view` and `query`.
    fn fake_tool(dir: &Path, view: &str, query: &str) -> PathBuf {
        let path = dir.join("bcftools");
        let log = dir.join("calls.log");
        let script = format!(
            "#!/bin/sh\nprintf '%s\\n' \"$*\" >> '{}'\ncase \"$1\" in\n  view) {} ;;\n  query) {} ;;\nesac\n",
            log.display(),
            view,
            query
        );
        fs::write(&path, script).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn calls(dir: &Path) -> Vec<String> {
        fs::read_to_string(dir.join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[rstest]
    fn test_view_output_parsed() {
        let tools = tempfile::tempdir().unwrap();
        let bcftools = fake_tool(tools.path(), &format!("printf '{}'", VIEW_OUTPUT), "true");
        let resolver = resolver(Path::new("../tests/data/genome"), &bcftools);

        let variant = resolver
            .resolve_structural_variant(GENOME, "1:10000:esv3647175", Some("dgva"))
            .unwrap()
            .unwrap();

        assert_eq!(variant.name, "esv3647175");
        assert_eq!(variant.header().source(), Some("fake"));
        assert_eq!(
            variant.source_file().and_then(|p| p.file_name()),
            Some(OsStr::new("variation_dgva.vcf.gz"))
        );

        let calls = calls(tools.path());
        assert_eq!(calls.len(), 1);
        assert!(calls[0].starts_with("view -r 1:10000-10000 "));
    }

    #[rstest]
    fn test_view_failure_is_not_found() {
        let tools = tempfile::tempdir().unwrap();
        let bcftools = fake_tool(tools.path(), "echo 'index missing' >&2; exit 1", "true");
        let resolver = resolver(Path::new("../tests/data/genome"), &bcftools);

        assert!(resolver
            .resolve_structural_variant(GENOME, "1:10000:esv3647175", Some("dgva"))
            .unwrap()
            .is_none());
    }

    #[rstest]
    fn test_view_timeout_is_not_found() {
        let tools = tempfile::tempdir().unwrap();
        let bcftools = fake_tool(tools.path(), "exec sleep 5", "true");
        let tool = ExternalTool::new(&bcftools);
        let cache = HeaderCache::new();

        let locator = StructuralVariantLocator::new(fixture_layout(), &tool, &cache)
            .with_timeouts(Duration::from_millis(200), Duration::from_millis(200));

        let identifier = VariantIdentifier::new("1", 10000, "esv3647175");
        assert!(locator.locate(&identifier, Some("dgva")).unwrap().is_none());
    }

    #[rstest]
    fn test_identifier_query_fallback() {
        let tools = tempfile::tempdir().unwrap();
        let bcftools = fake_tool(
            tools.path(),
            &format!("printf '{}'", VIEW_OUTPUT),
            "printf '1\\t10000\\tesv3647175\\tvariation_dgva.vcf.gz\\n'",
        );
        let tool = ExternalTool::new(&bcftools);
        let cache = HeaderCache::new();

        let locator =
            StructuralVariantLocator::new(fixture_layout(), &tool, &cache).scan_without_index(true);

        let identifier = VariantIdentifier::new("1", 10000, "esv3647175");
        let variant = locator.locate(&identifier, None).unwrap().unwrap();
        assert_eq!(variant.name, "esv3647175");

        let calls = calls(tools.path());
        assert_eq!(calls.len(), 2);
        assert!(calls[0].starts_with("query -i ID=\"esv3647175\" -f "));
        assert!(calls[0].ends_with("variation_dgva.vcf.gz"));
        assert!(calls[1].starts_with("view -r 1:10000-10000 "));
    }

    #[rstest]
    fn test_unsafe_identifier_never_queried() {
        let tools = tempfile::tempdir().unwrap();
        let bcftools = fake_tool(tools.path(), "true", "true");
        let tool = ExternalTool::new(&bcftools);
        let cache = HeaderCache::new();

        let locator =
            StructuralVariantLocator::new(fixture_layout(), &tool, &cache).scan_without_index(true);

        let identifier = VariantIdentifier::new("1", 10000, "esv\"3647175");
        assert!(locator.locate(&identifier, None).unwrap().is_none());
        assert!(calls(tools.path()).is_empty());
    }
}
