//! TabShell Navigation
//!
//! Address bar input resolution:
//!   1. `about:newtab` → the new-tab page
//!   2. http(s) URL, or something domain-like → navigate
//!   3. Anything else → search
//!
//! Plus the browsing-history and bookmark collections, both kept in a
//! [`RecordStore`](tabshell_storage::RecordStore).

mod bookmarks;
mod error;
mod history;
mod input;

pub use bookmarks::{Bookmark, BookmarkManager};
pub use error::NavigationError;
pub use history::{HistoryEntry, HistoryManager, DEFAULT_HISTORY_LIMIT};
pub use input::{InputResolution, InputResolver, DEFAULT_SEARCH_ENGINE};

pub type Result<T> = std::result::Result<T, NavigationError>;
