//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] tabshell_storage::StorageError),

    #[error("Navigation error: {0}")]
    Navigation(#[from] tabshell_navigation::NavigationError),

    #[error("Relay error: {0}")]
    Relay(#[from] tabshell_relay::RelayError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
