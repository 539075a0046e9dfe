use std::fmt::{self, Display};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::errors::VariantError;

///
/// A parsed `contig:position:identifier` string. Positions are 1-based.
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct VariantIdentifier {
    pub contig: String,
    pub position: u64,
    pub symbolic_id: String,
}

impl VariantIdentifier {
    pub fn new(contig: &str, position: u64, symbolic_id: &str) -> Self {
        VariantIdentifier {
            contig: contig.to_string(),
            position,
            symbolic_id: symbolic_id.to_string(),
        }
    }

    ///
    /// Parse a variant identifier string.
    ///
    /// The identifier part may itself contain `:`, only the first two
    /// separators are significant.
    ///
    /// # Arguments
    /// - raw: string in the form `contig:position:identifier`
    pub fn parse(raw: &str) -> Result<Self, VariantError> {
        let malformed = || VariantError::MalformedIdentifier(raw.to_string());

        let mut parts = raw.splitn(3, ':');
        let contig = parts.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;
        let position = parts
            .next()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|p| *p >= 1)
            .ok_or_else(malformed)?;
        let symbolic_id = parts.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;

        Ok(VariantIdentifier::new(contig, position, symbolic_id))
    }
}

impl FromStr for VariantIdentifier {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VariantIdentifier::parse(s)
    }
}

impl Display for VariantIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.contig, self.position, self.symbolic_id)
    }
}
