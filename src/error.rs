//! Error types for media-dl
//!
//! This module provides the error hierarchy for the library:
//! - [`Error`] is the top-level error returned by public operations
//! - [`DatabaseError`] covers the SQLite task store
//! - [`TaskError`] covers task lifecycle violations (unknown id, duplicate enqueue)
//!
//! Every error exposes a stable machine-readable code via [`Error::error_code`],
//! which is also what the process runner persists in a failed task's `error_code`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for media-dl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for media-dl
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "max_parallel")
        key: Option<String>,
    },

    /// Database operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Task lifecycle error
    #[error("task error: {0}")]
    Task(#[from] TaskError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The external downloader could not be started or its output could not be read
    #[error("failed to run {binary}: {reason}")]
    Process {
        /// Binary that was being executed
        binary: PathBuf,
        /// What went wrong
        reason: String,
    },

    /// Network error talking to the sidecar service
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Sidecar service answered with a non-success status
    #[error("sidecar returned HTTP {status}: {body}")]
    Sidecar {
        /// HTTP status code returned by the sidecar
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Submitted URL is not an absolute http(s) URL
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Shutdown in progress - not accepting new tasks
    #[error("shutdown in progress: not accepting new tasks")]
    ShuttingDown,

    /// Other error
    #[error("{0}")]
    Other(String),
}

/// Database-related errors
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to connect to database
    #[error("failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to run migrations
    #[error("failed to run migrations: {0}")]
    MigrationFailed(String),

    /// Query failed
    #[error("query failed: {0}")]
    QueryFailed(String),
}

/// Task lifecycle errors
#[derive(Debug, Error)]
pub enum TaskError {
    /// Task not found in the store
    #[error("task {id} not found")]
    NotFound {
        /// The task ID that was not found
        id: i64,
    },

    /// Task is already queued or running and cannot be enqueued again
    #[error("task {id} is already {state}")]
    AlreadyActive {
        /// The task ID
        id: i64,
        /// Current state ("queued" or "running")
        state: String,
    },

    /// The stored record is in a state that forbids the operation
    #[error("cannot {operation} task {id} in state {current_state}")]
    InvalidState {
        /// The task ID
        id: i64,
        /// The operation that was attempted
        operation: String,
        /// The state that prevents it
        current_state: String,
    },
}

impl Error {
    /// Stable machine-readable code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Database(_) => "database_error",
            Error::Task(TaskError::NotFound { .. }) => "not_found",
            Error::Task(TaskError::AlreadyActive { .. }) => "already_active",
            Error::Task(TaskError::InvalidState { .. }) => "invalid_state",
            Error::Io(_) => "io_error",
            Error::Process { .. } => "process_error",
            Error::Network(_) => "network_error",
            Error::Sidecar { .. } => "sidecar_error",
            Error::Serialization(_) => "serialization_error",
            Error::InvalidUrl { .. } => "invalid_url",
            Error::ShuttingDown => "shutting_down",
            Error::Other(_) => "internal_error",
        }
    }
}
