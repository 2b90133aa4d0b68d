//! Event-driven index maintenance.
//!
//! Document lifecycle notifications become [`IndexEvent`]s in a queue that a
//! single worker drains in arrival order. For one document a removal always
//! lands before the matching insertion; events for different documents are
//! independent because each touches only its own path.

use std::collections::VecDeque;
use std::time::Instant;

use super::IndexError;
use super::normalize::normalize;
use super::shared::SharedIndex;
use super::types::{BuildStats, DocumentRecord};
use crate::vault::{DocumentHandle, DocumentHost, HostError};

/// A change to the document collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexEvent {
    /// The host finished loading its document set.
    Ready,
    /// The user asked for a full rebuild.
    Rebuild,
    Created(DocumentHandle),
    Modified(DocumentHandle),
    Renamed { handle: DocumentHandle, old_path: String },
    Deleted { path: String },
}

/// Applies document events to a shared index.
pub struct IndexMaintainer<H> {
    host: H,
    index: SharedIndex,
    queue: VecDeque<IndexEvent>,
}

impl<H: DocumentHost> IndexMaintainer<H> {
    pub fn new(host: H, index: SharedIndex) -> Self {
        Self { host, index, queue: VecDeque::new() }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn index(&self) -> &SharedIndex {
        &self.index
    }

    pub fn enqueue(&mut self, event: IndexEvent) {
        self.queue.push_back(event);
    }

    /// Number of queued events.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Drain the queue in arrival order.
    ///
    /// Failures that concern a single event are logged and skipped. Only a
    /// poisoned index lock stops processing; the failing event is dropped and
    /// the rest stay queued.
    pub fn process_pending(&mut self) -> Result<usize, IndexError> {
        let mut processed = 0;
        while let Some(event) = self.queue.pop_front() {
            match self.apply(&event) {
                Ok(()) => {}
                Err(IndexError::Poisoned) => return Err(IndexError::Poisoned),
                Err(e) => tracing::warn!("Failed to apply {:?}: {}", event, e),
            }
            processed += 1;
        }
        Ok(processed)
    }

    /// Rebuild the index from every document the host lists.
    ///
    /// Documents that cannot be read are skipped; they never abort the build.
    pub fn rebuild(&self) -> Result<BuildStats, IndexError> {
        let start = Instant::now();
        let mut stats = BuildStats::default();

        self.index.write()?.begin_build();

        let handles = match self.host.list_documents() {
            Ok(handles) => handles,
            Err(e) => {
                self.index.write()?.abort_build();
                return Err(e.into());
            }
        };
        stats.documents_found = handles.len();

        let mut records = Vec::with_capacity(handles.len());
        for handle in &handles {
            match self.load(handle) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Failed to index {}: {}", handle.path, e);
                    stats.documents_skipped += 1;
                }
            }
        }
        stats.documents_indexed = records.len();

        self.index.write()?.build_index(records);

        stats.duration_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Index ready: {} indexed, {} skipped in {}ms",
            stats.documents_indexed,
            stats.documents_skipped,
            stats.duration_ms
        );
        Ok(stats)
    }

    fn apply(&self, event: &IndexEvent) -> Result<(), IndexError> {
        tracing::debug!("Applying {:?}", event);
        match event {
            IndexEvent::Ready | IndexEvent::Rebuild => self.rebuild().map(|_| ()),
            IndexEvent::Created(handle) | IndexEvent::Modified(handle) => {
                self.replace(&handle.path, handle)
            }
            IndexEvent::Renamed { handle, old_path } => self.replace(old_path, handle),
            IndexEvent::Deleted { path } => {
                self.index.write()?.remove_file(path);
                Ok(())
            }
        }
    }

    /// Remove the record at `stale_path`, then index `handle` afresh.
    fn replace(&self, stale_path: &str, handle: &DocumentHandle) -> Result<(), IndexError> {
        // Read before taking the lock so readers are not blocked on I/O
        let loaded = self.load(handle);

        let mut index = self.index.write()?;
        index.remove_file(stale_path);
        match loaded {
            Ok(record) => {
                index.add_file(record);
                Ok(())
            }
            Err(e) => {
                // The stale version stays out of the index
                index.remove_file(&handle.path);
                Err(e.into())
            }
        }
    }

    fn load(&self, handle: &DocumentHandle) -> Result<DocumentRecord, HostError> {
        let (metadata, content) = self.host.read_document(handle)?;
        Ok(normalize(handle, &metadata, content))
    }
}
