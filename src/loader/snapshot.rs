//! Consumer-facing state snapshot.

use crate::domain::PageToken;
use crate::source::SourceError;

/// Read-only view of a loader's state, intended for direct binding to a
/// list-rendering view.
///
/// Snapshots are plain values: a view holds one, renders from it, and
/// receives a fresh one through the loader's subscription after every
/// state change.
#[derive(Debug, Clone)]
pub struct ListSnapshot<R> {
    /// Loaded records, in first-seen order.
    pub items: Vec<R>,
    /// Whether a fetch is currently in flight.
    pub loading: bool,
    /// Whether the collection has unfetched pages left.
    pub has_more: bool,
    /// Token for the next unfetched page; `None` before the first fetch.
    pub cursor: Option<PageToken>,
    /// Most recent fetch failure, cleared by a later success or a reset.
    pub error: Option<SourceError>,
}

impl<R> ListSnapshot<R> {
    /// Snapshot of a loader that has not fetched anything yet.
    pub(crate) fn initial() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            has_more: true,
            cursor: None,
            error: None,
        }
    }

    /// Number of loaded records.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns whether nothing has been loaded.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_snapshot() {
        let snapshot: ListSnapshot<u32> = ListSnapshot::initial();
        assert!(snapshot.is_empty());
        assert!(!snapshot.loading);
        assert!(snapshot.has_more);
        assert!(snapshot.cursor.is_none());
        assert!(snapshot.error.is_none());
    }
}
