//! # Credential Metadata Documents
//!
//! Credentials carry an open-ended key/value bag supplied by the issuer:
//! event identifiers, grades, competition placements, and so on. The value
//! space is deliberately small — strings, integers, booleans, and nested
//! documents — so that every record serializes to plain JSON and survives
//! a round-trip through any external consumer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A metadata document: string keys mapped to [`MetadataValue`]s.
///
/// `BTreeMap` keeps serialization order deterministic, which matters for
/// anything that hashes or diffs the emitted JSON.
pub type Metadata = BTreeMap<String, MetadataValue>;

/// A single metadata value. Serializes untagged, so documents read and
/// write as ordinary JSON objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// A boolean flag.
    Bool(bool),
    /// A signed integer. Counters and identifiers fit here; fractional
    /// values are not part of the model.
    Number(i64),
    /// A UTF-8 string.
    String(String),
    /// A nested document.
    Document(Metadata),
}

impl From<bool> for MetadataValue {
    fn from(v: bool) -> Self {
        MetadataValue::Bool(v)
    }
}

impl From<i64> for MetadataValue {
    fn from(v: i64) -> Self {
        MetadataValue::Number(v)
    }
}

impl From<u64> for MetadataValue {
    fn from(v: u64) -> Self {
        MetadataValue::Number(v as i64)
    }
}

impl From<&str> for MetadataValue {
    fn from(v: &str) -> Self {
        MetadataValue::String(v.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(v: String) -> Self {
        MetadataValue::String(v)
    }
}
