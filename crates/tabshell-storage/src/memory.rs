//! Process-local record store

use parking_lot::RwLock;
use std::sync::Arc;

use crate::record::{Record, RecordStore};
use crate::Result;

/// Keeps records in memory, newest first. Clones share the same data.
#[derive(Default)]
pub struct MemoryStore {
    records: Arc<RwLock<Vec<Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryStore {
    fn append(&self, record: Record) -> Result<Record> {
        let mut records = self.records.write();
        records.retain(|r| r.id != record.id);
        records.insert(0, record.clone());
        Ok(record)
    }

    fn remove_by_id(&self, id: &str) -> Result<()> {
        self.records.write().retain(|r| r.id != id);
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<Record>> {
        let mut records = self.records.read().clone();
        // Stable sort keeps insertion order for equal timestamps
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    fn clear_all(&self) -> Result<()> {
        self.records.write().clear();
        Ok(())
    }
}

impl Clone for MemoryStore {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}
