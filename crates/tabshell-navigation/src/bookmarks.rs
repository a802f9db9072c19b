//! Bookmarks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use tabshell_storage::{Record, RecordStore};

use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub title: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl From<Record> for Bookmark {
    fn from(record: Record) -> Self {
        Self {
            id: record.id,
            title: record.title,
            url: record.url,
            created_at: record.timestamp,
        }
    }
}

pub struct BookmarkManager {
    store: Arc<dyn RecordStore>,
}

impl BookmarkManager {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn add(&self, title: &str, url: &str) -> Result<Bookmark> {
        let title = if title.trim().is_empty() { url } else { title };
        let bookmark: Bookmark = self.store.append(Record::new(title, url))?.into();

        tracing::info!(url = %bookmark.url, "Added bookmark");

        Ok(bookmark)
    }

    pub fn remove(&self, id: &str) -> Result<()> {
        Ok(self.store.remove_by_id(id)?)
    }

    /// Bookmarks, newest first
    pub fn all(&self) -> Result<Vec<Bookmark>> {
        Ok(self
            .store
            .list_all()?
            .into_iter()
            .map(Bookmark::from)
            .collect())
    }

    pub fn find_by_url(&self, url: &str) -> Result<Option<Bookmark>> {
        Ok(self.all()?.into_iter().find(|b| b.url == url))
    }

    pub fn is_bookmarked(&self, url: &str) -> Result<bool> {
        Ok(self.find_by_url(url)?.is_some())
    }

    /// Bookmark `url`, or remove its bookmark if one exists.
    ///
    /// Returns whether the URL is bookmarked afterwards.
    pub fn toggle(&self, title: &str, url: &str) -> Result<bool> {
        match self.find_by_url(url)? {
            Some(existing) => {
                self.remove(&existing.id)?;
                tracing::info!(url = %url, "Removed bookmark");
                Ok(false)
            }
            None => {
                self.add(title, url)?;
                Ok(true)
            }
        }
    }
}

impl Clone for BookmarkManager {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}
