//! Redb-backed durable result sink.
//!
//! Each record is stored as CBOR under its match id, in one ACID write
//! transaction per record. Records survive server restarts.

use std::{path::Path, sync::Arc};

use redb::{Database, ReadableTable, TableDefinition};

use super::{MatchRecord, ResultSink, StorageError};

/// Table: match_results
/// Key: match id
/// Value: CBOR-encoded MatchRecord
const MATCH_RESULTS: TableDefinition<&str, &[u8]> = TableDefinition::new("match_results");

/// Durable result sink backed by Redb.
///
/// Thread-safe through Redb's internal locking. Clone is cheap (Arc).
#[derive(Clone)]
pub struct RedbResultSink {
    db: Arc<Database>,
}

impl RedbResultSink {
    /// Open or create a Redb database at the given path.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the database cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Database::create(path.as_ref()).map_err(|e| StorageError::Io(e.to_string()))?;

        let txn = db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;
        {
            let _ = txn.open_table(MATCH_RESULTS).map_err(|e| StorageError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Load the record for `match_id`. `None` if never saved.
    pub fn load(&self, match_id: &str) -> Result<Option<MatchRecord>, StorageError> {
        let txn = self.db.begin_read().map_err(|e| StorageError::Io(e.to_string()))?;
        let table = txn.open_table(MATCH_RESULTS).map_err(|e| StorageError::Io(e.to_string()))?;

        match table.get(match_id).map_err(|e| StorageError::Io(e.to_string()))? {
            Some(bytes) => decode_record(bytes.value()).map(Some),
            None => Ok(None),
        }
    }

    /// Every stored record, ordered by match id.
    pub fn list(&self) -> Result<Vec<MatchRecord>, StorageError> {
        let txn = self.db.begin_read().map_err(|e| StorageError::Io(e.to_string()))?;
        let table = txn.open_table(MATCH_RESULTS).map_err(|e| StorageError::Io(e.to_string()))?;

        let mut records = Vec::new();
        for entry in table.iter().map_err(|e| StorageError::Io(e.to_string()))? {
            let (_, value) = entry.map_err(|e| StorageError::Io(e.to_string()))?;
            records.push(decode_record(value.value())?);
        }
        Ok(records)
    }
}

impl ResultSink for RedbResultSink {
    fn save_match_result(&self, record: &MatchRecord) -> Result<(), StorageError> {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(record, &mut bytes)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        let txn = self.db.begin_write().map_err(|e| StorageError::Io(e.to_string()))?;
        {
            let mut table =
                txn.open_table(MATCH_RESULTS).map_err(|e| StorageError::Io(e.to_string()))?;
            table
                .insert(record.match_id.as_str(), bytes.as_slice())
                .map_err(|e| StorageError::Io(e.to_string()))?;
        }
        txn.commit().map_err(|e| StorageError::Io(e.to_string()))?;

        Ok(())
    }
}

fn decode_record(bytes: &[u8]) -> Result<MatchRecord, StorageError> {
    ciborium::de::from_reader(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn record(id: &str, winner: u8) -> MatchRecord {
        MatchRecord {
            match_id: id.to_string(),
            game_id: "pong".to_string(),
            code: "ABC123".to_string(),
            player1: "alice".to_string(),
            player2: "bob".to_string(),
            reason: "completed".to_string(),
            winner,
            score1: 5,
            score2: 2,
            ticks: 600,
            duration_ms: 10_000,
        }
    }

    #[test]
    fn records_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("results.redb");

        {
            let sink = RedbResultSink::open(&path).unwrap();
            sink.save_match_result(&record("match-B", 2)).unwrap();
            sink.save_match_result(&record("match-A", 1)).unwrap();
        }

        let sink = RedbResultSink::open(&path).unwrap();
        assert_eq!(sink.load("match-A").unwrap(), Some(record("match-A", 1)));
        assert_eq!(sink.load("match-C").unwrap(), None);

        let ids: Vec<String> = sink.list().unwrap().into_iter().map(|r| r.match_id).collect();
        assert_eq!(ids, vec!["match-A".to_string(), "match-B".to_string()]);
    }

    #[test]
    fn saving_twice_overwrites() {
        let dir = TempDir::new().unwrap();
        let sink = RedbResultSink::open(dir.path().join("results.redb")).unwrap();

        sink.save_match_result(&record("m", 1)).unwrap();
        sink.save_match_result(&record("m", 2)).unwrap();

        assert_eq!(sink.list().unwrap().len(), 1);
        assert_eq!(sink.load("m").unwrap().map(|r| r.winner), Some(2));
    }
}
