use std::env;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use varloc_annotation::frequency::DEFAULT_REFERENCE_POPULATION;

use crate::consts::{
    DEFAULT_BCFTOOLS, DEFAULT_DATA_ROOT, DEFAULT_QUERY_TIMEOUT_SECS, DEFAULT_VIEW_TIMEOUT_SECS,
    VARLOC_BCFTOOLS_ENV, VARLOC_DATA_ROOT_ENV,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

///
/// Settings of the resolvers. Every key is optional in a TOML file.
///
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ResolverConfig {
    pub data_root: PathBuf,
    pub bcftools: PathBuf,
    pub view_timeout_secs: u64,
    pub query_timeout_secs: u64,
    pub reference_population: String,
    pub scan_without_index: bool,
    pub parallel_annotation: bool,
}

/// Data root from the environment, if not set then `./data`
pub fn get_default_data_root() -> PathBuf {
    env::var(VARLOC_DATA_ROOT_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_ROOT))
}

/// bcftools binary from the environment, if not set then looked up on `PATH`
pub fn get_default_bcftools() -> PathBuf {
    env::var(VARLOC_BCFTOOLS_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_BCFTOOLS))
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            data_root: get_default_data_root(),
            bcftools: get_default_bcftools(),
            view_timeout_secs: DEFAULT_VIEW_TIMEOUT_SECS,
            query_timeout_secs: DEFAULT_QUERY_TIMEOUT_SECS,
            reference_population: DEFAULT_REFERENCE_POPULATION.to_string(),
            scan_without_index: false,
            parallel_annotation: true,
        }
    }
}

impl ResolverConfig {
    pub fn with_data_root<P: AsRef<Path>>(mut self, data_root: P) -> Self {
        self.data_root = data_root.as_ref().to_path_buf();
        self
    }

    pub fn with_bcftools<P: AsRef<Path>>(mut self, bcftools: P) -> Self {
        self.bcftools = bcftools.as_ref().to_path_buf();
        self
    }

    pub fn view_timeout(&self) -> Duration {
        Duration::from_secs(self.view_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

impl TryFrom<&Path> for ResolverConfig {
    type Error = ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config = toml::from_str(&toml_str)?;
        Ok(config)
    }
}
