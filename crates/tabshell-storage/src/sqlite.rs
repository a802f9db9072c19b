//! SQLite-backed record store

use chrono::{DateTime, SecondsFormat, Utc};

use crate::database::Database;
use crate::record::{Record, RecordStore};
use crate::Result;

/// One named collection inside the shared `records` table.
pub struct SqliteStore {
    db: Database,
    collection: String,
}

impl SqliteStore {
    pub fn new(db: Database, collection: impl Into<String>) -> Self {
        Self {
            db,
            collection: collection.into(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl RecordStore for SqliteStore {
    fn append(&self, record: Record) -> Result<Record> {
        self.db.with_connection(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO records (collection, id, title, url, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    self.collection,
                    record.id,
                    record.title,
                    record.url,
                    record
                        .timestamp
                        .to_rfc3339_opts(SecondsFormat::Micros, true),
                ],
            )?;
            Ok(())
        })?;

        tracing::debug!(collection = %self.collection, id = %record.id, "Appended record");

        Ok(record)
    }

    fn remove_by_id(&self, id: &str) -> Result<()> {
        self.db.with_connection(|conn| {
            conn.execute(
                "DELETE FROM records WHERE collection = ?1 AND id = ?2",
                rusqlite::params![self.collection, id],
            )?;
            Ok(())
        })
    }

    fn list_all(&self) -> Result<Vec<Record>> {
        self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, url, timestamp FROM records
                 WHERE collection = ?1
                 ORDER BY timestamp DESC, seq DESC",
            )?;

            let records: Vec<Record> = stmt
                .query_map([&self.collection], |row| {
                    let timestamp_str: String = row.get(3)?;
                    let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now());

                    Ok(Record {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        url: row.get(2)?,
                        timestamp,
                    })
                })?
                .filter_map(|r| r.ok())
                .collect();

            Ok(records)
        })
    }

    fn clear_all(&self) -> Result<()> {
        self.db.with_connection(|conn| {
            conn.execute(
                "DELETE FROM records WHERE collection = ?1",
                [&self.collection],
            )?;
            Ok(())
        })
    }
}

impl Clone for SqliteStore {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            collection: self.collection.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_sqlite_store_roundtrip() {
        let db = Database::open_in_memory().unwrap();
        let store = SqliteStore::new(db, "bookmarks");

        let older = Record {
            timestamp: Utc::now() - Duration::minutes(5),
            ..Record::new("Rust", "https://rust-lang.org")
        };
        let newer = Record::new("Example", "https://example.com");

        store.append(older.clone()).unwrap();
        store.append(newer.clone()).unwrap();

        let all = store.list_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, newer.id);
        assert_eq!(all[1].id, older.id);

        store.remove_by_id(&older.id).unwrap();
        assert_eq!(store.list_all().unwrap().len(), 1);

        // Unknown ids are ignored
        store.remove_by_id("missing").unwrap();

        store.clear_all().unwrap();
        assert!(store.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_collections_are_isolated() {
        let db = Database::open_in_memory().unwrap();
        let bookmarks = SqliteStore::new(db.clone(), "bookmarks");
        let history = SqliteStore::new(db, "history");

        bookmarks
            .append(Record::new("Example", "https://example.com"))
            .unwrap();
        history
            .append(Record::new("Example", "https://example.com"))
            .unwrap();

        history.clear_all().unwrap();

        assert_eq!(bookmarks.list_all().unwrap().len(), 1);
        assert!(history.list_all().unwrap().is_empty());
    }
}
