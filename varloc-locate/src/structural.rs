//! Structural variant search across per-source files.
//!
//! A named source is searched directly. Without one, the `variants.db` index maps the
//! identifier to its owning file; when the index is missing an identifier query over
//! every file can stand in for it. A miss anywhere is `Ok(None)`.

use std::ffi::OsString;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rusqlite::types::Value;
use rusqlite::{Connection, OpenFlags, params};
use tracing::{debug, info, warn};

use varloc_annotation::structural::StructuralVariant;
use varloc_core::errors::VariantError;
use varloc_core::models::{RawRecord, VariantIdentifier};
use varloc_core::utils::{parse_vcf_text, scan_vcf};

use crate::cache::HeaderCache;
use crate::consts::{
    BCFTOOLS_QUERY, BCFTOOLS_QUERY_FORMAT, BCFTOOLS_VIEW, DEFAULT_QUERY_TIMEOUT_SECS,
    DEFAULT_VIEW_TIMEOUT_SECS, INDEX_LOOKUP_SQL,
};
use crate::layout::{SourceLayout, check_name};
use crate::locator::find_record;
use crate::tool::ExternalTool;

///
/// Reads the full record of an exact (contig, position, first id) match from one file.
///
pub trait RecordFetcher {
    fn fetch(
        &self,
        file: &Path,
        contig: &str,
        position: u64,
        id: &str,
    ) -> Result<Option<RawRecord>, VariantError>;

    fn name(&self) -> &'static str;
}

/// Region view through bcftools.
pub struct BcftoolsFetcher<'a> {
    tool: &'a ExternalTool,
    timeout: Duration,
}

impl<'a> BcftoolsFetcher<'a> {
    pub fn new(tool: &'a ExternalTool, timeout: Duration) -> BcftoolsFetcher<'a> {
        BcftoolsFetcher { tool, timeout }
    }
}

impl RecordFetcher for BcftoolsFetcher<'_> {
    fn fetch(
        &self,
        file: &Path,
        contig: &str,
        position: u64,
        id: &str,
    ) -> Result<Option<RawRecord>, VariantError> {
        let region = format!("{}:{}-{}", contig, position, position);
        let args: [OsString; 4] = [
            BCFTOOLS_VIEW.into(),
            "-r".into(),
            region.into(),
            file.as_os_str().to_owned(),
        ];
        let output = self.tool.run(args, self.timeout)?;
        let (_, records) = parse_vcf_text(&output)?;

        Ok(records
            .into_iter()
            .find(|record| record.matches(contig, position, id))
            .map(|record| with_file_header(record, file)))
    }

    fn name(&self) -> &'static str {
        "bcftools"
    }
}

// Records parsed from tool output carry a header with no file behind it.
fn with_file_header(mut record: RawRecord, file: &Path) -> RawRecord {
    if record.header.source_file.is_none() {
        let header = (*record.header).clone().with_source_file(file);
        record.header = Arc::new(header);
    }
    record
}

/// Indexed read with noodles, or a linear scan when the file has no index.
pub struct InProcessFetcher<'a> {
    cache: &'a HeaderCache,
}

impl<'a> InProcessFetcher<'a> {
    pub fn new(cache: &'a HeaderCache) -> InProcessFetcher<'a> {
        InProcessFetcher { cache }
    }
}

impl RecordFetcher for InProcessFetcher<'_> {
    fn fetch(
        &self,
        file: &Path,
        contig: &str,
        position: u64,
        id: &str,
    ) -> Result<Option<RawRecord>, VariantError> {
        find_record(file, contig, position, self.cache, |record| {
            record.matches(contig, position, id)
        })
    }

    fn name(&self) -> &'static str {
        "in-process"
    }
}

#[derive(Debug)]
enum SearchState {
    SingleSource(String),
    IndexedAllSources,
    Fallback,
    Found(RawRecord),
    NotFound,
}

/// One row of the `variants` table after type normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    pub chromosome: Option<String>,
    pub position: Option<u64>,
    pub filename: Option<String>,
}

impl IndexRow {
    fn is_at(&self, contig: &str, position: u64) -> bool {
        self.chromosome.as_deref() == Some(contig) && self.position == Some(position)
    }
}

///
/// Structural variant search over the layout of one genome.
///
#[derive(Debug)]
pub struct StructuralVariantLocator<'a> {
    layout: SourceLayout,
    tool: &'a ExternalTool,
    cache: &'a HeaderCache,
    view_timeout: Duration,
    query_timeout: Duration,
    scan_without_index: bool,
}

impl<'a> StructuralVariantLocator<'a> {
    pub fn new(
        layout: SourceLayout,
        tool: &'a ExternalTool,
        cache: &'a HeaderCache,
    ) -> StructuralVariantLocator<'a> {
        StructuralVariantLocator {
            layout,
            tool,
            cache,
            view_timeout: Duration::from_secs(DEFAULT_VIEW_TIMEOUT_SECS),
            query_timeout: Duration::from_secs(DEFAULT_QUERY_TIMEOUT_SECS),
            scan_without_index: false,
        }
    }

    pub fn with_timeouts(mut self, view: Duration, query: Duration) -> Self {
        self.view_timeout = view;
        self.query_timeout = query;
        self
    }

    pub fn scan_without_index(mut self, enabled: bool) -> Self {
        self.scan_without_index = enabled;
        self
    }

    ///
    /// Find a structural variant, in the named source only when one is given.
    ///
    /// # Errors
    /// Only a named source whose file does not exist fails the request. Tool failures,
    /// timeouts and index problems are logged and end the search as a miss.
    pub fn locate(
        &self,
        identifier: &VariantIdentifier,
        source_name: Option<&str>,
    ) -> Result<Option<StructuralVariant>, VariantError> {
        let mut state = match source_name {
            Some(name) => SearchState::SingleSource(name.to_string()),
            None => SearchState::IndexedAllSources,
        };

        loop {
            state = match state {
                SearchState::SingleSource(name) => self.search_source(&name, identifier)?,
                SearchState::IndexedAllSources => self.search_index(identifier),
                SearchState::Fallback => self.search_all_files(identifier),
                SearchState::Found(record) => {
                    info!(
                        "Resolved structural variant {} from {}",
                        identifier,
                        record
                            .header
                            .source_file
                            .as_deref()
                            .map(|p| p.display().to_string())
                            .unwrap_or_default()
                    );
                    return Ok(Some(StructuralVariant::from_record(
                        record,
                        &self.layout.genome_uuid,
                    )));
                }
                SearchState::NotFound => {
                    debug!("Structural variant {} not found", identifier);
                    return Ok(None);
                }
            };
        }
    }

    fn fetcher(&self) -> Box<dyn RecordFetcher + '_> {
        if self.tool.is_available() {
            Box::new(BcftoolsFetcher::new(self.tool, self.view_timeout))
        } else {
            debug!("{} not found, reading files in process", self.tool.name());
            Box::new(InProcessFetcher::new(self.cache))
        }
    }

    fn fetch(&self, file: &Path, identifier: &VariantIdentifier) -> SearchState {
        let fetcher = self.fetcher();
        match fetcher.fetch(
            file,
            &identifier.contig,
            identifier.position,
            &identifier.symbolic_id,
        ) {
            Ok(Some(record)) => SearchState::Found(record),
            Ok(None) => SearchState::NotFound,
            Err(e) => {
                warn!(
                    "{} lookup of {} in {} failed: {}",
                    fetcher.name(),
                    identifier,
                    file.display(),
                    e
                );
                SearchState::NotFound
            }
        }
    }

    fn search_source(
        &self,
        source_name: &str,
        identifier: &VariantIdentifier,
    ) -> Result<SearchState, VariantError> {
        check_name("source", source_name)?;
        let file = self.layout.structural_variant_file(source_name);
        if !file.is_file() {
            return Err(VariantError::SourceUnavailable {
                path: file,
                reason: format!("no structural variation file for source '{}'", source_name),
            });
        }

        Ok(self.fetch(&file, identifier))
    }

    fn search_index(&self, identifier: &VariantIdentifier) -> SearchState {
        let sv_dir = self.layout.structural_variation_dir();
        if !sv_dir.is_dir() {
            debug!("No structural variation directory {}", sv_dir.display());
            return SearchState::NotFound;
        }

        let index = self.layout.structural_variant_index();
        if !index.is_file() {
            if self.scan_without_index {
                debug!("No index {}, querying every source file", index.display());
                return SearchState::Fallback;
            }
            warn!("Structural variant index {} is missing", index.display());
            return SearchState::NotFound;
        }

        let rows = match index_rows(&index, &identifier.symbolic_id) {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Structural variant index {} unreadable: {}", index.display(), e);
                return SearchState::NotFound;
            }
        };
        debug!("{} index rows for {}", rows.len(), identifier.symbolic_id);

        for row in rows
            .iter()
            .filter(|row| row.is_at(&identifier.contig, identifier.position))
        {
            let Some(filename) = row.filename.as_deref() else {
                continue;
            };
            match self.fetch(&sv_dir.join(filename), identifier) {
                SearchState::NotFound => continue,
                found => return found,
            }
        }

        SearchState::NotFound
    }

    fn search_all_files(&self, identifier: &VariantIdentifier) -> SearchState {
        let id = &identifier.symbolic_id;
        if !is_safe_identifier(id) {
            warn!("Refusing to query for identifier {:?}", id);
            return SearchState::NotFound;
        }

        let files = self.layout.structural_variant_files();
        if files.is_empty() {
            return SearchState::NotFound;
        }

        if !self.tool.is_available() {
            for file in &files {
                match scan_vcf(file, |record| {
                    record.matches(&identifier.contig, identifier.position, id)
                }) {
                    Ok(Some(record)) => return SearchState::Found(record),
                    Ok(None) => continue,
                    Err(e) => warn!("Could not scan {}: {}", file.display(), e),
                }
            }
            return SearchState::NotFound;
        }

        let mut args: Vec<OsString> = vec![
            BCFTOOLS_QUERY.into(),
            "-i".into(),
            format!("ID=\"{}\"", id).into(),
            "-f".into(),
            BCFTOOLS_QUERY_FORMAT.into(),
        ];
        args.extend(files.iter().map(|file| file.as_os_str().to_owned()));

        let output = match self.tool.run(args, self.query_timeout) {
            Ok(output) => output,
            Err(e) => {
                warn!("Identifier query for {} failed: {}", id, e);
                return SearchState::NotFound;
            }
        };

        let sv_dir = self.layout.structural_variation_dir();
        let owner = output.lines().find_map(|line| {
            let mut columns = line.split('\t');
            let (contig, position, row_id, filename) = (
                columns.next()?,
                columns.next()?,
                columns.next()?,
                columns.next()?,
            );
            let matched = contig == identifier.contig
                && position.parse::<u64>().ok() == Some(identifier.position)
                && row_id == id;
            matched.then(|| sv_dir.join(filename.trim()))
        });

        match owner {
            Some(file) => self.fetch(&file, identifier),
            None => SearchState::NotFound,
        }
    }
}

///
/// Every index row carrying `id`. Identifiers are not unique across sources.
///
pub fn index_rows(index: &Path, id: &str) -> Result<Vec<IndexRow>, VariantError> {
    let connection = Connection::open_with_flags(
        index,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|e| VariantError::Index(e.to_string()))?;

    let mut statement = connection
        .prepare(INDEX_LOOKUP_SQL)
        .map_err(|e| VariantError::Index(e.to_string()))?;

    let rows = statement
        .query_map(params![id], |row| {
            Ok(IndexRow {
                chromosome: value_as_text(row.get(0)?),
                position: value_as_position(row.get(1)?),
                filename: value_as_text(row.get(2)?),
            })
        })
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .map_err(|e| VariantError::Index(e.to_string()));
    rows
}

fn value_as_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) if f.fract() == 0.0 => Some(format!("{}", f as i64)),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(s) => Some(s),
        Value::Blob(b) => Some(String::from_utf8_lossy(&b).into_owned()),
    }
}

fn value_as_position(value: Value) -> Option<u64> {
    match value {
        Value::Integer(i) => u64::try_from(i).ok(),
        Value::Real(f) if f >= 0.0 && f.fract() == 0.0 => Some(f as u64),
        Value::Text(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Identifiers that can be placed inside a double-quoted filter expression as is.
pub fn is_safe_identifier(id: &str) -> bool {
    !id.is_empty()
        && !id
            .chars()
            .any(|c| c == '"' || c == '\\' || c.is_whitespace() || c.is_control())
}
