//! In-memory search index over document records.
//!
//! The index keeps records in insertion order together with their searchable
//! projection. `path` is the key: adding a record whose path is already
//! present replaces the old entry, so no two live entries share a path.
//!
//! Updating a document is `remove_file(old_path)` followed by
//! `add_file(record)`. The pair is not atomic: a reader scheduled between the
//! two calls sees neither version. Edits come from a single user one at a
//! time, so this is accepted rather than guarded against.

use std::collections::HashMap;

use super::query::{SearchQuery, SearchableDocument};
use super::types::{DocumentRecord, IndexState, SearchResult};
use super::IndexError;

/// Search tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSettings {
    /// Maximum fuzzy distance accepted for a term.
    pub threshold: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { threshold: 0.4 }
    }
}

#[derive(Debug, Clone)]
struct IndexedEntry {
    record: DocumentRecord,
    searchable: SearchableDocument,
}

impl IndexedEntry {
    fn new(record: DocumentRecord) -> Self {
        let searchable = SearchableDocument::from_record(&record);
        Self { record, searchable }
    }
}

/// The searchable structure over the current set of records.
#[derive(Debug, Default)]
pub struct SearchIndex {
    entries: Vec<IndexedEntry>,
    state: IndexState,
    /// Number of completed full builds.
    builds: u64,
    settings: SearchSettings,
}

impl SearchIndex {
    /// Create an empty, uninitialized index.
    pub fn new(settings: SearchSettings) -> Self {
        Self { settings, ..Default::default() }
    }

    pub fn state(&self) -> IndexState {
        self.state
    }

    /// Whether at least one build has completed.
    pub fn is_ready(&self) -> bool {
        self.builds > 0
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record that a full rebuild has started reading documents.
    ///
    /// Readers keep seeing the previous snapshot until [`build_index`]
    /// installs the new one.
    ///
    /// [`build_index`]: Self::build_index
    pub fn begin_build(&mut self) {
        self.state = IndexState::Building;
    }

    /// Give up on a rebuild that could not list its documents.
    pub fn abort_build(&mut self) {
        self.state = if self.is_ready() { IndexState::Ready } else { IndexState::Uninitialized };
    }

    /// Replace the whole index with `records` and mark it ready.
    ///
    /// When the input repeats a path, the last occurrence wins.
    pub fn build_index(&mut self, records: Vec<DocumentRecord>) {
        tracing::info!("Indexing {} documents", records.len());
        let last: HashMap<&str, usize> =
            records.iter().enumerate().map(|(i, r)| (r.path.as_str(), i)).collect();
        let keep: Vec<bool> =
            records.iter().enumerate().map(|(i, r)| last.get(r.path.as_str()) == Some(&i)).collect();

        self.entries = records
            .into_iter()
            .zip(keep)
            .filter_map(|(record, kept)| kept.then(|| IndexedEntry::new(record)))
            .collect();
        self.builds += 1;
        self.state = IndexState::Ready;
    }

    /// Insert one record, replacing any record with the same path.
    pub fn add_file(&mut self, record: DocumentRecord) {
        tracing::debug!("Adding {} to the index", record.path);
        self.insert(record);
    }

    /// Remove the record stored under `path`.
    ///
    /// Returns whether a record was removed; an absent path is not an error.
    pub fn remove_file(&mut self, path: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.record.path != path);
        let removed = self.entries.len() != before;
        tracing::debug!("Removing {} from the index (present: {})", path, removed);
        removed
    }

    /// Look up a record by path.
    pub fn get(&self, path: &str) -> Option<&DocumentRecord> {
        self.entries.iter().find(|e| e.record.path == path).map(|e| &e.record)
    }

    /// Iterate over records in insertion order.
    pub fn records(&self) -> impl Iterator<Item = &DocumentRecord> {
        self.entries.iter().map(|e| &e.record)
    }

    /// Run a query, best matches first.
    ///
    /// Ties keep insertion order. Fails with [`IndexError::NotReady`] until
    /// the first build completes.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, IndexError> {
        if !self.is_ready() {
            return Err(IndexError::NotReady(self.state));
        }

        let mut results: Vec<SearchResult> = self
            .entries
            .iter()
            .filter_map(|entry| {
                query
                    .score(&entry.searchable, self.settings.threshold)
                    .map(|score| SearchResult { record: entry.record.clone(), score })
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        results.sort_by(|a, b| a.score.total_cmp(&b.score));

        tracing::debug!("Query matched {} of {} documents", results.len(), self.entries.len());
        Ok(results)
    }

    fn insert(&mut self, record: DocumentRecord) {
        self.entries.retain(|e| e.record.path != record.path);
        self.entries.push(IndexedEntry::new(record));
    }
}
