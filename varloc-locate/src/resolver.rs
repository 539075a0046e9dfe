use std::path::Path;

use tracing::debug;

use varloc_annotation::structural::StructuralVariant;
use varloc_annotation::variant::Variant;
use varloc_core::errors::VariantError;
use varloc_core::models::VariantIdentifier;

use crate::cache::HeaderCache;
use crate::config::ResolverConfig;
use crate::layout::{SourceLayout, check_name};
use crate::locator::RecordLocator;
use crate::structural::StructuralVariantLocator;
use crate::tool::ExternalTool;

///
/// Entry point for variant lookups by genome.
///
/// Holds the header cache for the life of the process; every request is otherwise
/// independent, so one resolver may be shared between threads.
///
#[derive(Debug)]
pub struct VariantResolver {
    config: ResolverConfig,
    cache: HeaderCache,
    bcftools: ExternalTool,
}

impl VariantResolver {
    pub fn new(config: ResolverConfig) -> VariantResolver {
        let bcftools = ExternalTool::new(&config.bcftools);
        VariantResolver {
            config,
            cache: HeaderCache::new(),
            bcftools,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn layout(&self, genome_uuid: &str) -> SourceLayout {
        SourceLayout::for_genome(&self.config.data_root, genome_uuid)
    }

    ///
    /// Resolve a small variant from `contig:position:identifier`.
    ///
    /// # Arguments
    /// - genome_uuid: directory of the genome under the data root
    /// - variant_id: the coordinate identifier
    /// - track_name: read the base records of this track instead of the genome's own
    ///
    /// # Errors
    /// `MalformedIdentifier` for a bad identifier, `SourceUnavailable` when the base file
    /// is missing or a genome or track name is not a plain directory name.
    pub fn resolve_variant(
        &self,
        genome_uuid: &str,
        variant_id: &str,
        track_name: Option<&str>,
    ) -> Result<Option<Variant>, VariantError> {
        let identifier = VariantIdentifier::parse(variant_id)?;
        check_name("genome", genome_uuid)?;
        if let Some(track) = track_name {
            check_name("track", track)?;
        }
        let layout = self.layout(genome_uuid);
        let sources = layout.annotation_sources();
        debug!(
            "Resolving {} in {} with {} annotation sources",
            identifier,
            genome_uuid,
            sources.len()
        );

        RecordLocator::new(layout.base_file(track_name), &self.cache)
            .with_annotation_sources(sources)
            .parallel(self.config.parallel_annotation)
            .with_reference_population(&self.config.reference_population)
            .resolve(&identifier)
    }

    ///
    /// Resolve a structural variant, from one source or from any through the index.
    ///
    pub fn resolve_structural_variant(
        &self,
        genome_uuid: &str,
        variant_id: &str,
        source_name: Option<&str>,
    ) -> Result<Option<StructuralVariant>, VariantError> {
        let identifier = VariantIdentifier::parse(variant_id)?;
        check_name("genome", genome_uuid)?;

        StructuralVariantLocator::new(self.layout(genome_uuid), &self.bcftools, &self.cache)
            .with_timeouts(self.config.view_timeout(), self.config.query_timeout())
            .scan_without_index(self.config.scan_without_index)
            .locate(&identifier, source_name)
    }

    /// Headers read so far.
    pub fn cached_headers(&self) -> usize {
        self.cache.len()
    }
}

impl Default for VariantResolver {
    fn default() -> Self {
        VariantResolver::new(ResolverConfig::default())
    }
}

impl TryFrom<&Path> for VariantResolver {
    type Error = crate::config::ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        Ok(VariantResolver::new(ResolverConfig::try_from(path)?))
    }
}
