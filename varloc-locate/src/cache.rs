use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use varloc_core::errors::VariantError;
use varloc_core::models::VcfHeader;
use varloc_core::utils::read_vcf_header;

///
/// Parsed headers by file path, shared by every lookup that holds a reference to it.
///
/// Source files are read-only, so an entry never goes stale for the life of the cache.
///
#[derive(Debug, Default)]
pub struct HeaderCache {
    headers: Mutex<HashMap<PathBuf, Arc<VcfHeader>>>,
}

impl HeaderCache {
    pub fn new() -> HeaderCache {
        HeaderCache::default()
    }

    pub fn get_or_read(&self, path: &Path) -> Result<Arc<VcfHeader>, VariantError> {
        if let Some(header) = self.lock().get(path) {
            return Ok(Arc::clone(header));
        }

        // read outside the lock; a concurrent reader of the same file just wins the insert
        let header = Arc::new(read_vcf_header(path)?);
        Ok(Arc::clone(
            self.lock()
                .entry(path.to_path_buf())
                .or_insert(header),
        ))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, Arc<VcfHeader>>> {
        // the map stays consistent even if a holder panicked
        self.headers.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    use pretty_assertions::assert_eq;

    #[test]
    fn test_header_read_once() {
        let tempdir = tempfile::tempdir().unwrap();
        let path = tempdir.path().join("source.vcf");
        fs::write(&path, "##fileformat=VCFv4.2\n##source=dbSNP_156\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n").unwrap();

        let cache = HeaderCache::new();
        let first = cache.get_or_read(&path).unwrap();
        let second = cache.get_or_read(&path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(first.source(), Some("dbSNP_156"));
    }

    #[test]
    fn test_missing_file_not_cached() {
        let cache = HeaderCache::new();
        assert!(cache.get_or_read(Path::new("/no/such/file.vcf.gz")).is_err());
        assert!(cache.is_empty());
    }
}
