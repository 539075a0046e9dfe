use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::debug;

use varloc_core::consts::{
    ANNOTATION_SOURCES_DIR, STRUCTURAL_VARIATION_DIR, STRUCTURAL_VARIATION_INDEX,
    STRUCTURAL_VARIATION_PREFIX, VARIATION_FILE, VCF_GZ_EXT,
};
use varloc_core::errors::VariantError;
use varloc_core::utils::source_name_from_path;

///
/// Where the files of one genome live under the data root.
///
/// ```text
/// <data_root>/<genome_uuid>/variation.vcf.gz
/// <data_root>/<genome_uuid>/<track_name>/variation.vcf.gz
/// <data_root>/<genome_uuid>/annotation/frequencies/*.vcf.gz
/// <data_root>/<genome_uuid>/structural-variation/variation_<source>.vcf.gz
/// <data_root>/<genome_uuid>/structural-variation/variants.db
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLayout {
    pub genome_uuid: String,
    pub genome_dir: PathBuf,
}

impl SourceLayout {
    pub fn for_genome<P: AsRef<Path>>(data_root: P, genome_uuid: &str) -> SourceLayout {
        SourceLayout {
            genome_uuid: genome_uuid.to_string(),
            genome_dir: data_root.as_ref().join(genome_uuid),
        }
    }

    /// The base small-variant file, or the one of a named track.
    pub fn base_file(&self, track_name: Option<&str>) -> PathBuf {
        match track_name {
            Some(track) => self.genome_dir.join(track).join(VARIATION_FILE),
            None => self.genome_dir.join(VARIATION_FILE),
        }
    }

    pub fn annotation_dir(&self) -> PathBuf {
        self.genome_dir.join(ANNOTATION_SOURCES_DIR)
    }

    ///
    /// Every `*.vcf.gz` of the annotation directory, sorted by file name.
    ///
    /// A missing directory has no sources.
    pub fn annotation_sources(&self) -> Vec<PathBuf> {
        list_files(&self.annotation_dir(), |name| name.ends_with(VCF_GZ_EXT))
    }

    pub fn structural_variation_dir(&self) -> PathBuf {
        self.genome_dir.join(STRUCTURAL_VARIATION_DIR)
    }

    pub fn structural_variant_file(&self, source_name: &str) -> PathBuf {
        self.structural_variation_dir().join(format!(
            "{}{}{}",
            STRUCTURAL_VARIATION_PREFIX, source_name, VCF_GZ_EXT
        ))
    }

    /// Every per-source structural-variant file, sorted by file name.
    pub fn structural_variant_files(&self) -> Vec<PathBuf> {
        list_files(&self.structural_variation_dir(), |name| {
            source_name_from_path(Path::new(name)).is_some()
        })
    }

    pub fn structural_variant_index(&self) -> PathBuf {
        self.structural_variation_dir().join(STRUCTURAL_VARIATION_INDEX)
    }
}

///
/// Check that a genome, track or source name names one entry of its directory.
///
/// # Errors
/// `SourceUnavailable` for an empty name, one with a path separator, or `.`/`..`.
pub fn check_name(kind: &str, name: &str) -> Result<(), VariantError> {
    let mut components = Path::new(name).components();
    let plain = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\']);

    if plain {
        Ok(())
    } else {
        Err(VariantError::SourceUnavailable {
            path: PathBuf::from(name),
            reason: format!("{} name must be a single path component", kind),
        })
    }
}

fn list_files<F>(dir: &Path, keep: F) -> Vec<PathBuf>
where
    F: Fn(&str) -> bool,
{
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("No sources in {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(&keep)
        })
        .collect();

    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::File;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_paths() {
        let layout = SourceLayout::for_genome("/data", "uuid-1");

        assert_eq!(layout.base_file(None), PathBuf::from("/data/uuid-1/variation.vcf.gz"));
        assert_eq!(
            layout.base_file(Some("eva")),
            PathBuf::from("/data/uuid-1/eva/variation.vcf.gz")
        );
        assert_eq!(
            layout.structural_variant_file("dgva"),
            PathBuf::from("/data/uuid-1/structural-variation/variation_dgva.vcf.gz")
        );
        assert_eq!(
            layout.structural_variant_index(),
            PathBuf::from("/data/uuid-1/structural-variation/variants.db")
        );
    }

    #[rstest]
    #[case("a7335667-93e7-11ec-a39d-005056b38ce3", true)]
    #[case("eva", true)]
    #[case("dbvar", true)]
    #[case("", false)]
    #[case(".", false)]
    #[case("..", false)]
    #[case("../../etc", false)]
    #[case("eva/../..", false)]
    #[case("/tmp", false)]
    #[case("a\\b", false)]
    fn test_check_name(#[case] name: &str, #[case] accepted: bool) {
        assert_eq!(check_name("track", name).is_ok(), accepted);
    }

    #[rstest]
    fn test_discovery_is_sorted_and_filtered() {
        let tempdir = tempfile::tempdir().unwrap();
        let layout = SourceLayout::for_genome(tempdir.path(), "uuid-1");

        // nothing on disk yet
        assert!(layout.annotation_sources().is_empty());
        assert!(layout.structural_variant_files().is_empty());

        fs::create_dir_all(layout.annotation_dir()).unwrap();
        fs::create_dir_all(layout.structural_variation_dir()).unwrap();
        for name in ["topmed.vcf.gz", "gnomad.vcf.gz", "gnomad.vcf.gz.tbi", "notes.txt"] {
            File::create(layout.annotation_dir().join(name)).unwrap();
        }
        for name in ["variation_dgva.vcf.gz", "variation_dbvar.vcf.gz", "variants.db", "other.vcf.gz"] {
            File::create(layout.structural_variation_dir().join(name)).unwrap();
        }

        let names = |paths: Vec<PathBuf>| -> Vec<String> {
            paths
                .iter()
                .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
                .collect()
        };

        assert_eq!(
            names(layout.annotation_sources()),
            vec!["gnomad.vcf.gz", "topmed.vcf.gz"]
        );
        assert_eq!(
            names(layout.structural_variant_files()),
            vec!["variation_dbvar.vcf.gz", "variation_dgva.vcf.gz"]
        );
    }
}
