//! TabShell Core
//!
//! Coordination layer: the tab registry, the content relay, history and
//! bookmarks behind a single [`Shell`]. All state is owned here; callers
//! render snapshots and subscribe to change events.

mod config;
mod error;
mod shell;
mod view;

pub use config::{Config, DEFAULT_BIND_ADDR};
pub use error::CoreError;
pub use shell::Shell;
pub use view::{PageView, FAILED_TITLE};

// Re-export core components
pub use tabshell_navigation::{
    Bookmark, BookmarkManager, HistoryEntry, HistoryManager, InputResolution, InputResolver,
    NavigationError,
};
pub use tabshell_relay::{
    ContentKind, ContentRelay, Fetcher, HttpFetcher, RelayError, RelayResponse, RelayServer,
};
pub use tabshell_storage::{Database, StorageError};
pub use tabshell_tabs::{Location, LoadTicket, Observer, Tab, TabEvent, TabId, TabRegistry};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
