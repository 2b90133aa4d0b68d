//! In-memory search index over vault documents.
//!
//! This module provides:
//! - Normalization of host documents into [`DocumentRecord`]s
//! - The extended query language ([`SearchQuery`]) and fuzzy scoring
//! - [`SearchIndex`], shared between readers and one writer via [`SharedIndex`]
//! - Event-driven maintenance through [`IndexMaintainer`]
//!
//! # Example
//!
//! ```
//! use oql_core::index::{DocumentRecord, SearchQuery, SharedIndex};
//!
//! let index = SharedIndex::default();
//! index.write().unwrap().build_index(vec![DocumentRecord {
//!     title: "Groceries".into(),
//!     path: "Groceries.md".into(),
//!     content: "milk, eggs".into(),
//!     created: 0,
//!     modified: 0,
//!     tags: vec![],
//!     frontmatter: None,
//! }]);
//!
//! let hits = index.read().unwrap().search(&SearchQuery::parse("'eggs")).unwrap();
//! assert_eq!(hits[0].record.title, "Groceries");
//! ```

pub mod maintenance;
pub mod normalize;
pub mod query;
pub mod search;
pub mod shared;
pub mod types;

use thiserror::Error;

use crate::vault::HostError;

pub use maintenance::{IndexEvent, IndexMaintainer};
pub use normalize::normalize;
pub use query::{QueryParseError, SearchField, SearchQuery, SearchableDocument};
pub use search::{SearchIndex, SearchSettings};
pub use shared::SharedIndex;
pub use types::{BuildStats, DocumentRecord, IndexState, SearchResult, TimestampField, iso8601};

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("the search index is not ready yet ({})", .0.as_str())]
    NotReady(IndexState),

    #[error("the search index lock was poisoned")]
    Poisoned,

    #[error(transparent)]
    Host(#[from] HostError),
}
