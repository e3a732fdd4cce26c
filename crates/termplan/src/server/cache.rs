//! Per-term caching of computed conflict reports.
//!
//! A conflict report is a pure function of a term's committed set, so the
//! server keeps the last computed report per term and drops the entry on
//! every plan mutation. The core itself stays cache-free.

use dashmap::DashMap;
use std::sync::Arc;

use crate::schedule::ConflictReport;

/// Thread-safe cache of conflict reports keyed by term id.
///
/// Uses DashMap for concurrent access without external locking.
pub struct ConflictCache {
    entries: DashMap<i64, Arc<ConflictReport>>,
}

impl ConflictCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Gets the cached report for a term, if any.
    pub fn get(&self, term_id: i64) -> Option<Arc<ConflictReport>> {
        self.entries.get(&term_id).map(|entry| Arc::clone(&entry))
    }

    /// Stores the report for a term.
    pub fn insert(&self, term_id: i64, report: Arc<ConflictReport>) {
        self.entries.insert(term_id, report);
    }

    /// Invalidates (removes) a term's cached report. Called by every
    /// mutation endpoint so the next read recomputes.
    pub fn invalidate(&self, term_id: i64) {
        self.entries.remove(&term_id);
    }

    /// Clears all entries from the cache.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Returns the number of cached reports.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ConflictCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidation_drops_the_entry() {
        let cache = ConflictCache::new();
        assert!(cache.is_empty());

        cache.insert(1, Arc::new(ConflictReport::default()));
        cache.insert(2, Arc::new(ConflictReport::default()));
        assert_eq!(cache.len(), 2);
        assert!(cache.get(1).is_some());

        cache.invalidate(1);
        assert!(cache.get(1).is_none());
        assert!(cache.get(2).is_some());

        cache.clear();
        assert!(cache.is_empty());
    }
}
