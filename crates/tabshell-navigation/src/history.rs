//! Browsing history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use tabshell_storage::{Record, RecordStore};

use crate::Result;

/// Most recent visits kept
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub title: String,
    pub url: String,
    pub visited_at: DateTime<Utc>,
}

impl From<Record> for HistoryEntry {
    fn from(record: Record) -> Self {
        Self {
            id: record.id,
            title: record.title,
            url: record.url,
            visited_at: record.timestamp,
        }
    }
}

/// History collection with a retention cap.
///
/// The store itself keeps everything it is given; trimming to the
/// newest `limit` entries happens here after each visit.
pub struct HistoryManager {
    store: Arc<dyn RecordStore>,
    limit: usize,
}

impl HistoryManager {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_limit(store, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(store: Arc<dyn RecordStore>, limit: usize) -> Self {
        Self { store, limit }
    }

    /// Record a visit to a URL
    pub fn record_visit(&self, title: &str, url: &str) -> Result<HistoryEntry> {
        let record = self.store.append(Record::new(title, url))?;
        self.enforce_limit()?;

        tracing::debug!(url = %url, "Recorded history visit");

        Ok(record.into())
    }

    /// Visits, most recent first
    pub fn entries(&self) -> Result<Vec<HistoryEntry>> {
        Ok(self
            .store
            .list_all()?
            .into_iter()
            .take(self.limit)
            .map(HistoryEntry::from)
            .collect())
    }

    /// Delete a history entry
    pub fn remove(&self, id: &str) -> Result<()> {
        Ok(self.store.remove_by_id(id)?)
    }

    /// Clear all history
    pub fn clear_all(&self) -> Result<()> {
        self.store.clear_all()?;
        tracing::info!("Cleared browsing history");
        Ok(())
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn enforce_limit(&self) -> Result<()> {
        let records = self.store.list_all()?;
        for stale in records.iter().skip(self.limit) {
            self.store.remove_by_id(&stale.id)?;
        }
        Ok(())
    }
}

impl Clone for HistoryManager {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            limit: self.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabshell_storage::{Database, MemoryStore, SqliteStore};

    #[test]
    fn test_history_manager() {
        let db = Database::open_in_memory().unwrap();
        let manager = HistoryManager::new(Arc::new(SqliteStore::new(db, "history")));

        manager
            .record_visit("Example", "https://example.com")
            .unwrap();
        let rust = manager
            .record_visit("Rust", "https://rust-lang.org")
            .unwrap();

        let entries = manager.entries().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].url, "https://rust-lang.org");

        manager.remove(&rust.id).unwrap();
        assert_eq!(manager.entries().unwrap().len(), 1);

        manager.clear_all().unwrap();
        assert!(manager.entries().unwrap().is_empty());
    }

    #[test]
    fn test_retention_keeps_most_recent() {
        let store = MemoryStore::new();
        let manager = HistoryManager::with_limit(Arc::new(store.clone()), 3);

        for i in 0..5 {
            manager
                .record_visit(&format!("Page {i}"), &format!("https://site.test/{i}"))
                .unwrap();
        }

        let entries = manager.entries().unwrap();
        let urls: Vec<&str> = entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://site.test/4",
                "https://site.test/3",
                "https://site.test/2"
            ]
        );

        // Trimmed entries are gone from the store too
        assert_eq!(store.list_all().unwrap().len(), 3);
    }

    #[test]
    fn test_default_limit() {
        let manager = HistoryManager::new(Arc::new(MemoryStore::new()));
        assert_eq!(manager.limit(), DEFAULT_HISTORY_LIMIT);

        for i in 0..(DEFAULT_HISTORY_LIMIT + 5) {
            manager
                .record_visit("Page", &format!("https://site.test/{i}"))
                .unwrap();
        }

        assert_eq!(manager.entries().unwrap().len(), DEFAULT_HISTORY_LIMIT);
    }
}
