use std::collections::BTreeMap;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::errors::VariantError;
use crate::models::header::VcfHeader;

const MISSING: &str = ".";

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize), serde(untagged))]
pub enum InfoValue {
    Flag,
    Value(String),
}

impl InfoValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            InfoValue::Flag => None,
            InfoValue::Value(v) => Some(v.as_str()),
        }
    }
}

///
/// A VCF data line as parsed, sites only, with the header it was read under.
///
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub chromosome: String,
    pub position: u64,
    pub ids: Vec<String>,
    pub reference: String,
    pub alternates: Vec<String>,
    pub info: BTreeMap<String, InfoValue>,
    pub header: Arc<VcfHeader>,
}

impl RawRecord {
    ///
    /// Build a record from the raw text of its first eight columns.
    ///
    /// # Arguments
    /// - chromosome, position, ids, reference, alternates, info: column text as found in the file
    /// - header: the header of the file the record comes from
    pub fn from_fields(
        chromosome: &str,
        position: &str,
        ids: &str,
        reference: &str,
        alternates: &str,
        info: &str,
        header: Arc<VcfHeader>,
    ) -> Result<RawRecord, VariantError> {
        let position = position.parse::<u64>().map_err(|_| {
            VariantError::MalformedRecord(format!(
                "Invalid POS '{}' on {}",
                position, chromosome
            ))
        })?;

        Ok(RawRecord {
            chromosome: chromosome.to_string(),
            position,
            ids: split_missing(ids, ';'),
            reference: reference.to_string(),
            alternates: split_missing(alternates, ','),
            info: parse_info(info),
            header,
        })
    }

    ///
    /// Parse one tab-delimited VCF data line.
    ///
    pub fn from_line(line: &str, header: Arc<VcfHeader>) -> Result<RawRecord, VariantError> {
        let line = line.trim_end_matches(['\n', '\r']);
        let fields: Vec<&str> = line.splitn(9, '\t').collect();
        if fields.len() < 8 {
            return Err(VariantError::MalformedRecord(format!(
                "Expected at least 8 columns, found {}: {}",
                fields.len(),
                line
            )));
        }

        RawRecord::from_fields(
            fields[0], fields[1], fields[2], fields[3], fields[4], fields[7], header,
        )
    }

    pub fn has_id(&self, id: &str) -> bool {
        self.ids.iter().any(|i| i == id)
    }

    /// Exact (contig, position, first identifier) match.
    pub fn matches(&self, contig: &str, position: u64, id: &str) -> bool {
        self.chromosome == contig
            && self.position == position
            && self.ids.first().is_some_and(|first| first == id)
    }

    pub fn info_value(&self, key: &str) -> Option<&str> {
        self.info.get(key).and_then(InfoValue::as_str)
    }

    /// Comma-separated INFO value split into its entries.
    pub fn info_list(&self, key: &str) -> Vec<&str> {
        self.info_value(key)
            .map(|v| v.split(',').filter(|s| !s.is_empty()).collect())
            .unwrap_or_default()
    }
}

fn split_missing(value: &str, separator: char) -> Vec<String> {
    if value.is_empty() || value == MISSING {
        return Vec::new();
    }
    value.split(separator).map(|s| s.to_string()).collect()
}

fn parse_info(info: &str) -> BTreeMap<String, InfoValue> {
    let mut map = BTreeMap::new();
    if info.is_empty() || info == MISSING {
        return map;
    }

    for field in info.split(';').filter(|f| !f.is_empty()) {
        match field.split_once('=') {
            Some((key, value)) => map.insert(key.to_string(), InfoValue::Value(value.to_string())),
            None => map.insert(field.to_string(), InfoValue::Flag),
        };
    }

    map
}
