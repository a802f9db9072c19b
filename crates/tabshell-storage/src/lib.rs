//! TabShell Storage Layer
//!
//! Record persistence for bookmarks and browsing history.
//! Every store speaks the same four operations (append, remove, list,
//! clear); retention policies belong to the callers.

mod database;
mod error;
mod fallback;
mod memory;
mod migrations;
mod record;
mod sqlite;

pub use database::Database;
pub use error::StorageError;
pub use fallback::FallbackStore;
pub use memory::MemoryStore;
pub use record::{Record, RecordStore};
pub use sqlite::SqliteStore;

pub type Result<T> = std::result::Result<T, StorageError>;
