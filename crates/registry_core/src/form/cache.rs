//! Uniqueness cache populated from the store at screen mount.

use std::collections::HashSet;

/// Load state of a `KnownValues` cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    /// Initial listing has not completed; submissions are disabled.
    Pending,
    /// Initial listing succeeded.
    Ready,
    /// Initial listing failed; storage constraints remain the only guard.
    Unavailable,
}

/// Set of values already registered, as last seen by this screen.
#[derive(Debug, Clone)]
pub struct KnownValues {
    state: CacheState,
    values: HashSet<String>,
}

impl Default for KnownValues {
    fn default() -> Self {
        Self::pending()
    }
}

impl KnownValues {
    pub fn pending() -> Self {
        Self {
            state: CacheState::Pending,
            values: HashSet::new(),
        }
    }

    /// Replaces the contents with a fresh listing and marks the cache ready.
    pub fn load(&mut self, values: impl IntoIterator<Item = String>) {
        self.values = values.into_iter().collect();
        self.state = CacheState::Ready;
    }

    pub fn mark_unavailable(&mut self) {
        self.values.clear();
        self.state = CacheState::Unavailable;
    }

    /// Records a value that was just persisted.
    pub fn insert(&mut self, value: impl Into<String>) {
        self.values.insert(value.into());
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value)
    }

    pub fn state(&self) -> CacheState {
        self.state
    }

    /// Whether the initial listing has completed, successfully or not.
    pub fn is_settled(&self) -> bool {
        self.state != CacheState::Pending
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
