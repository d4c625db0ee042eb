//! Storage error types.

use std::time::Duration;
use thiserror::Error;

use crate::session::entities::SessionId;

/// Repository errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Session state could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No session under this identifier
    #[error("no session found with id {0}")]
    SessionNotFound(SessionId),

    /// No player under this name or identifier
    #[error("no player found: {0}")]
    PlayerNotFound(String),

    /// Case-insensitive name collision
    #[error("a player named {0} already exists")]
    NameTaken(String),

    /// Optimistic version check failed; another writer got there first
    #[error("conflicting write: {detail}")]
    Conflict { detail: String },

    /// Query exceeded its deadline
    #[error("query timed out after {0:?}")]
    Timeout(Duration),
}

/// Result type for repository operations
pub type StoreResult<T> = Result<T, StoreError>;
