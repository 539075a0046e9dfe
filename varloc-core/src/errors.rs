use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VariantError {
    #[error("Malformed variant identifier '{0}'. Expected contig:position:identifier")]
    MalformedIdentifier(String),

    #[error("Source unavailable: {path}: {reason}")]
    SourceUnavailable { path: PathBuf, reason: String },

    #[error("Allele classification invariant violated for reference '{reference}' and allele '{allele}'")]
    ClassificationInvariantViolated { reference: String, allele: String },

    #[error("Unknown consequence term: {0}")]
    UnknownConsequenceTerm(String),

    #[error("External tool not available: {0}")]
    ToolUnavailable(String),

    #[error("External tool {tool} timed out after {seconds}s")]
    ToolInvocationTimeout { tool: String, seconds: u64 },

    #[error("External tool {tool} exited with status {status}: {stderr}")]
    ToolFailed {
        tool: String,
        status: i32,
        stderr: String,
    },

    #[error("Malformed VCF record: {0}")]
    MalformedRecord(String),

    #[error("Structural variant index error: {0}")]
    Index(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl VariantError {
    /// Errors that a search may degrade into a miss instead of failing the request.
    pub fn is_recoverable_miss(&self) -> bool {
        matches!(
            self,
            VariantError::SourceUnavailable { .. }
                | VariantError::ToolUnavailable(_)
                | VariantError::ToolInvocationTimeout { .. }
                | VariantError::ToolFailed { .. }
                | VariantError::Index(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, VariantError>;
