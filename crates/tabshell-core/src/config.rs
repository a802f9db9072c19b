//! Shell configuration

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tabshell_navigation::{DEFAULT_HISTORY_LIMIT, DEFAULT_SEARCH_ENGINE};
use tabshell_relay::{RelayOptions, DEFAULT_USER_AGENT};
use tabshell_tabs::NEW_TAB_URL;

use crate::error::CoreError;
use crate::Result;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file
    pub database_path: PathBuf,
    /// Address the relay server listens on
    pub bind_addr: SocketAddr,
    /// Outbound fetch budget in seconds
    pub fetch_timeout_secs: u64,
    pub max_body_bytes: usize,
    pub user_agent: String,
    /// Search engine URL template (%s replaced with query)
    pub search_engine: String,
    /// Location opened by "home"
    pub home: String,
    /// Number of history entries kept
    pub history_limit: usize,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        let defaults = RelayOptions::default();

        Self {
            database_path: data_dir.join("tabshell.db"),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
            fetch_timeout_secs: defaults.timeout.as_secs(),
            max_body_bytes: defaults.max_body_bytes,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            search_engine: DEFAULT_SEARCH_ENGINE.to_string(),
            home: NEW_TAB_URL.to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("TabShell"))
            .unwrap_or_else(|| PathBuf::from(".tabshell"))
    }

    /// Defaults with `TABSHELL_*` environment overrides applied
    pub fn from_env() -> Result<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up by environment variable name
    pub fn with_overrides<L>(mut self, lookup: L) -> Result<Self>
    where
        L: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("TABSHELL_DB") {
            self.database_path = PathBuf::from(path);
        }
        if let Some(addr) = lookup("TABSHELL_BIND") {
            self.bind_addr = parse_var("TABSHELL_BIND", &addr)?;
        }
        if let Some(secs) = lookup("TABSHELL_FETCH_TIMEOUT_SECS") {
            self.fetch_timeout_secs = parse_var("TABSHELL_FETCH_TIMEOUT_SECS", &secs)?;
        }
        if let Some(bytes) = lookup("TABSHELL_MAX_BODY_BYTES") {
            self.max_body_bytes = parse_var("TABSHELL_MAX_BODY_BYTES", &bytes)?;
        }
        if let Some(template) = lookup("TABSHELL_SEARCH_ENGINE") {
            self.search_engine = template;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fetch_timeout_secs == 0 {
            return Err(CoreError::Config(
                "Fetch timeout must be at least one second".to_string(),
            ));
        }
        if self.max_body_bytes == 0 {
            return Err(CoreError::Config("Body limit must be non-zero".to_string()));
        }
        if !self.search_engine.contains("%s") {
            return Err(CoreError::Config(format!(
                "Search engine template `{}` has no %s placeholder",
                self.search_engine
            )));
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn relay_options(&self) -> RelayOptions {
        RelayOptions {
            timeout: self.fetch_timeout(),
            max_body_bytes: self.max_body_bytes,
            user_agent: self.user_agent.clone(),
            ..RelayOptions::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

fn parse_var<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| CoreError::Config(format!("{key}={value}: {e}")))
}

// Platform data directory lookup
mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}
