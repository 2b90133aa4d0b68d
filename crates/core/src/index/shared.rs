//! Shared ownership of the search index.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::IndexError;
use super::search::{SearchIndex, SearchSettings};

/// A cloneable handle to one search index.
///
/// Index maintenance is the only writer; every rendered block is a reader.
/// The lock lets a write finish before the next read observes the index.
#[derive(Debug, Clone)]
pub struct SharedIndex {
    inner: Arc<RwLock<SearchIndex>>,
}

impl SharedIndex {
    pub fn new(settings: SearchSettings) -> Self {
        Self::from_index(SearchIndex::new(settings))
    }

    pub fn from_index(index: SearchIndex) -> Self {
        Self { inner: Arc::new(RwLock::new(index)) }
    }

    pub fn read(&self) -> Result<RwLockReadGuard<'_, SearchIndex>, IndexError> {
        self.inner.read().map_err(|_| IndexError::Poisoned)
    }

    pub fn write(&self) -> Result<RwLockWriteGuard<'_, SearchIndex>, IndexError> {
        self.inner.write().map_err(|_| IndexError::Poisoned)
    }
}

impl Default for SharedIndex {
    fn default() -> Self {
        Self::new(SearchSettings::default())
    }
}
