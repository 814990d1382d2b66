//! Database layer for media-dl
//!
//! Handles SQLite persistence for download tasks.
//!
//! ## Submodules
//!
//! Methods on [`Database`] are organized by domain:
//! - [`migrations`] - Database lifecycle, schema migrations
//! - [`tasks`] - Task CRUD and paged listing

use crate::types::{Status, TaskId};
use serde::Serialize;
use sqlx::{FromRow, sqlite::SqlitePool};

mod migrations;
mod tasks;

/// New task to be inserted into the database
///
/// Inserted rows always start as `Queued` with progress 0.
#[derive(Debug, Clone)]
pub struct NewTask {
    /// Source URL handed to the downloader
    pub url: String,
    /// Owner of the task
    pub user_id: Option<i64>,
}

/// Download task record from database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct DownloadTask {
    /// Unique database ID
    pub id: TaskId,
    /// Source URL, immutable after creation
    pub url: String,
    /// Current lifecycle state
    pub status: Status,
    /// Progress percentage (0.0-100.0)
    pub progress_percent: Option<f64>,
    /// Transfer rate as printed by the downloader (e.g. "1.3 MiB/s")
    pub speed: Option<String>,
    /// Estimated time remaining as printed by the downloader (e.g. "00:01:10")
    pub eta: Option<String>,
    /// Output file path relative to the download root (reserved)
    pub file_path: Option<String>,
    /// Output file size in bytes (reserved)
    pub file_size: Option<i64>,
    /// Output file extension (reserved)
    pub ext: Option<String>,
    /// Machine-readable failure code, set only on Failed
    pub error_code: Option<String>,
    /// Human-readable failure message, set only on Failed
    pub error_msg: Option<String>,
    /// Owner of the task
    pub user_id: Option<i64>,
    /// Unix timestamp when the task was created
    pub create_time: i64,
    /// Unix timestamp of the last write to this row
    pub update_time: i64,
}

/// Partial update applied by [`Database::update_task_fields`]
///
/// `None` leaves a column untouched. For nullable text columns the inner
/// `Option` is the value to write, so `Some(None)` clears the column.
/// `update_time` is always refreshed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    /// New status
    pub status: Option<Status>,
    /// New progress percentage
    pub progress_percent: Option<f64>,
    /// New transfer rate text
    pub speed: Option<Option<String>>,
    /// New ETA text
    pub eta: Option<Option<String>>,
    /// New failure code
    pub error_code: Option<Option<String>>,
    /// New failure message
    pub error_msg: Option<Option<String>>,
}

impl TaskPatch {
    /// Patch for the Queued → Running transition
    pub fn running() -> Self {
        Self {
            status: Some(Status::Running),
            progress_percent: Some(0.0),
            ..Default::default()
        }
    }

    /// Patch for a parsed progress line
    pub fn progress(percent: f64, eta: String, speed: String) -> Self {
        Self {
            progress_percent: Some(percent),
            eta: Some(Some(eta)),
            speed: Some(Some(speed)),
            ..Default::default()
        }
    }

    /// Terminal patch for a zero exit code
    pub fn succeeded() -> Self {
        Self {
            status: Some(Status::Success),
            progress_percent: Some(100.0),
            ..Default::default()
        }
    }

    /// Terminal patch for any failure
    pub fn failed(code: &str, message: impl Into<String>) -> Self {
        Self {
            status: Some(Status::Failed),
            error_code: Some(Some(code.to_string())),
            error_msg: Some(Some(message.into())),
            ..Default::default()
        }
    }

    /// Patch that restarts the lifecycle for an explicit re-enqueue
    pub fn requeued() -> Self {
        Self {
            status: Some(Status::Queued),
            progress_percent: Some(0.0),
            speed: Some(None),
            eta: Some(None),
            error_code: Some(None),
            error_msg: Some(None),
        }
    }
}

/// One page of tasks plus the total number of matching rows
#[derive(Debug, Clone, Serialize)]
pub struct TaskPage {
    /// Number of rows matching the filter, across all pages
    pub total: i64,
    /// Tasks on this page, newest first
    pub items: Vec<DownloadTask>,
}

/// Largest page size accepted by [`Database::list_tasks_page`]
pub const MAX_PAGE_SIZE: u32 = 100;

/// Database handle for media-dl
pub struct Database {
    pool: SqlitePool,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
