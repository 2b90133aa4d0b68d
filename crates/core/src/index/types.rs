//! Index data types for vault documents.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::frontmatter::Frontmatter;

/// One indexed document. `path` is the primary key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Display name (file base name).
    pub title: String,
    /// Vault-relative path, unique across the live index.
    pub path: String,
    /// Full text body.
    pub content: String,
    /// Creation time, milliseconds since the Unix epoch.
    pub created: i64,
    /// Modification time, milliseconds since the Unix epoch.
    pub modified: i64,
    /// `#`-prefixed tags, frontmatter tags first.
    pub tags: Vec<String>,
    /// Frontmatter as parsed from the document.
    pub frontmatter: Option<Frontmatter>,
}

/// Timestamp fields a record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimestampField {
    Created,
    Modified,
}

impl TimestampField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Modified => "modified",
        }
    }
}

impl DocumentRecord {
    /// Raw millisecond value of a timestamp field.
    pub fn timestamp(&self, field: TimestampField) -> i64 {
        match field {
            TimestampField::Created => self.created,
            TimestampField::Modified => self.modified,
        }
    }

    /// ISO-8601 rendering of a timestamp field, `None` when out of range.
    pub fn iso_timestamp(&self, field: TimestampField) -> Option<String> {
        iso8601(self.timestamp(field))
    }
}

/// Format epoch milliseconds as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn iso8601(millis: i64) -> Option<String> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// A search hit: a record and its distance score (lower is better).
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub record: DocumentRecord,
    pub score: f64,
}

/// Lifecycle of the search index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexState {
    /// No build has been requested yet.
    #[default]
    Uninitialized,
    /// A full rebuild is reading documents.
    Building,
    /// At least one build has completed.
    Ready,
}

impl IndexState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Building => "building",
            Self::Ready => "ready",
        }
    }
}

/// Statistics from a full rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// Number of documents the host listed.
    pub documents_found: usize,
    /// Number of documents indexed.
    pub documents_indexed: usize,
    /// Number of documents skipped due to errors.
    pub documents_skipped: usize,
    /// Rebuild duration in milliseconds.
    pub duration_ms: u64,
}
