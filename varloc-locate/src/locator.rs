//! Coordinate and identifier lookup in indexed VCF files, and the merge of a base
//! source with its annotation sources.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use noodles::core::{Position, Region};
use noodles::vcf;
use rayon::prelude::*;
use tracing::{debug, warn};

use varloc_annotation::frequency::DEFAULT_REFERENCE_POPULATION;
use varloc_annotation::variant::Variant;
use varloc_core::errors::VariantError;
use varloc_core::models::{RawRecord, VariantIdentifier, VcfHeader};
use varloc_core::utils::scan_vcf;

use crate::cache::HeaderCache;

///
/// Find the first record at `contig:position` whose ID column contains `id`.
///
/// # Arguments
/// - file: a bgzipped VCF, tabix or CSI indexed
/// - contig, position: 1-based coordinate of the record
/// - id: identifier to match against every id of the record
/// - cache: headers already read
///
/// Absence is `Ok(None)`. A file that cannot be opened is `SourceUnavailable`.
pub fn locate(
    file: &Path,
    contig: &str,
    position: u64,
    id: &str,
    cache: &HeaderCache,
) -> Result<Option<RawRecord>, VariantError> {
    find_record(file, contig, position, cache, |record| record.has_id(id))
}

///
/// Find the first record overlapping `contig:position` accepted by `accept`.
///
/// Seeks with the file's index. Without an index the file is read from the start and
/// only records starting exactly at `position` are considered.
pub fn find_record<F>(
    file: &Path,
    contig: &str,
    position: u64,
    cache: &HeaderCache,
    accept: F,
) -> Result<Option<RawRecord>, VariantError>
where
    F: Fn(&RawRecord) -> bool,
{
    if !file.is_file() {
        return Err(VariantError::SourceUnavailable {
            path: file.to_path_buf(),
            reason: "no such file".to_string(),
        });
    }

    let header = cache.get_or_read(file)?;

    let mut reader = match vcf::io::indexed_reader::Builder::default().build_from_path(file) {
        Ok(reader) => reader,
        Err(e) => {
            debug!("No usable index for {} ({}), scanning", file.display(), e);
            return scan_vcf(file, |record| {
                record.chromosome == contig && record.position == position && accept(record)
            });
        }
    };

    let vcf_header = reader
        .read_header()
        .map_err(|e| VariantError::SourceUnavailable {
            path: file.to_path_buf(),
            reason: format!("unreadable header: {}", e),
        })?;

    let start = usize::try_from(position)
        .ok()
        .and_then(Position::new)
        .ok_or_else(|| VariantError::MalformedIdentifier(format!("{}:{}", contig, position)))?;
    let region = Region::new(contig, start..=start);

    let query = match reader.query(&vcf_header, &region) {
        Ok(query) => query,
        // contig absent from the index
        Err(e) if e.kind() == io::ErrorKind::InvalidInput => {
            debug!("{} not indexed in {}: {}", contig, file.display(), e);
            return Ok(None);
        }
        Err(e) => return Err(VariantError::Io(e)),
    };

    for result in query {
        let record = to_raw_record(&result?, Arc::clone(&header))?;
        if accept(&record) {
            debug!("Found {:?} at {}:{} in {}", record.ids, contig, position, file.display());
            return Ok(Some(record));
        }
        debug!("Skipping {:?} at {}:{}", record.ids, record.chromosome, record.position);
    }

    Ok(None)
}

fn to_raw_record(record: &vcf::Record, header: Arc<VcfHeader>) -> Result<RawRecord, VariantError> {
    let position = match record.variant_start() {
        Some(position) => usize::from(position?).to_string(),
        None => {
            return Err(VariantError::MalformedRecord(format!(
                "Record without a position on {}",
                record.reference_sequence_name()
            )));
        }
    };

    let ids = record.ids();
    let reference_bases = record.reference_bases();
    let alternate_bases = record.alternate_bases();
    let info = record.info();

    RawRecord::from_fields(
        record.reference_sequence_name(),
        &position,
        ids.as_ref(),
        reference_bases.as_ref(),
        alternate_bases.as_ref(),
        info.as_ref(),
        header,
    )
}

///
/// Resolves a small variant from a base source merged with any annotation sources.
///
/// One base file with no annotation sources is the single-file case. Each annotation
/// source is looked up independently; a source missing the variant or the file is
/// skipped.
///
#[derive(Debug)]
pub struct RecordLocator<'a> {
    base: PathBuf,
    annotation_sources: Vec<PathBuf>,
    parallel: bool,
    reference_population: String,
    cache: &'a HeaderCache,
}

impl<'a> RecordLocator<'a> {
    pub fn new<P: AsRef<Path>>(base: P, cache: &'a HeaderCache) -> RecordLocator<'a> {
        RecordLocator {
            base: base.as_ref().to_path_buf(),
            annotation_sources: Vec::new(),
            parallel: true,
            reference_population: DEFAULT_REFERENCE_POPULATION.to_string(),
            cache,
        }
    }

    pub fn with_annotation_sources(mut self, sources: Vec<PathBuf>) -> Self {
        self.annotation_sources = sources;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_reference_population(mut self, population: &str) -> Self {
        self.reference_population = population.to_string();
        self
    }

    pub fn annotation_sources(&self) -> &[PathBuf] {
        &self.annotation_sources
    }

    ///
    /// Locate the base record, then merge every annotation source that has it.
    ///
    /// The base lookup decides the outcome: its absence is `Ok(None)` and its errors are
    /// returned. Annotation records are merged in source order.
    pub fn resolve(&self, identifier: &VariantIdentifier) -> Result<Option<Variant>, VariantError> {
        let Some(base) = locate(
            &self.base,
            &identifier.contig,
            identifier.position,
            &identifier.symbolic_id,
            self.cache,
        )?
        else {
            debug!("{} not in {}", identifier, self.base.display());
            return Ok(None);
        };

        let mut variant = Variant::from_record(base, &identifier.symbolic_id)
            .with_reference_population(&self.reference_population);

        let found: Vec<Option<RawRecord>> = if self.parallel {
            self.annotation_sources
                .par_iter()
                .map(|source| self.locate_annotation(source, identifier))
                .collect::<Result<_, _>>()?
        } else {
            self.annotation_sources
                .iter()
                .map(|source| self.locate_annotation(source, identifier))
                .collect::<Result<_, _>>()?
        };

        for record in found.into_iter().flatten() {
            variant.merge(record);
        }

        Ok(Some(variant))
    }

    fn locate_annotation(
        &self,
        source: &Path,
        identifier: &VariantIdentifier,
    ) -> Result<Option<RawRecord>, VariantError> {
        match locate(
            source,
            &identifier.contig,
            identifier.position,
            &identifier.symbolic_id,
            self.cache,
        ) {
            Ok(None) => {
                debug!("{} has no annotation for {}", source.display(), identifier);
                Ok(None)
            }
            Err(VariantError::SourceUnavailable { path, reason }) => {
                warn!("Skipping annotation source {}: {}", path.display(), reason);
                Ok(None)
            }
            other => other,
        }
    }
}
