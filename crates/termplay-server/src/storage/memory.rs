use std::sync::{Arc, Mutex, PoisonError};

use super::{MatchRecord, ResultSink, StorageError};

/// In-memory result sink for tests, demos and simulation.
///
/// Records are kept in arrival order. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct MemoryResultSink {
    records: Arc<Mutex<Vec<MatchRecord>>>,
}

impl MemoryResultSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record saved so far, oldest first.
    pub fn records(&self) -> Vec<MatchRecord> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Number of records saved.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether nothing has been saved yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record for `match_id`, if one was saved.
    pub fn find(&self, match_id: &str) -> Option<MatchRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|r| r.match_id == match_id)
            .cloned()
    }
}

impl ResultSink for MemoryResultSink {
    fn save_match_result(&self, record: &MatchRecord) -> Result<(), StorageError> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).push(record.clone());
        Ok(())
    }
}
