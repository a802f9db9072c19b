//! Record type and the store contract shared by bookmarks and history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::Result;

/// A single stored entry.
///
/// Bookmarks read `timestamp` as their creation time, history entries as
/// their visit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    pub title: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
}

impl Record {
    /// Build a record stamped with a fresh id and the current time
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            url: url.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Persistence contract for record collections.
///
/// Durability is best-effort: callers may only rely on a successful
/// `append` being visible on the next `list_all`.
pub trait RecordStore: Send + Sync {
    /// Store a record and return it as persisted
    fn append(&self, record: Record) -> Result<Record>;

    /// Remove the record with `id`. Unknown ids are not an error.
    fn remove_by_id(&self, id: &str) -> Result<()>;

    /// All records, most recent first
    fn list_all(&self) -> Result<Vec<Record>>;

    /// Remove every record in the collection
    fn clear_all(&self) -> Result<()>;
}
