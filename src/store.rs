//! Task store contract consumed by the downloader
//!
//! The store is the sole authority for a task's durable fields. The queue only
//! carries [`TaskId`]s, so the runner always re-reads the record before acting.

use async_trait::async_trait;

use crate::Result;
use crate::db::{Database, DownloadTask, NewTask, TaskPage, TaskPatch};
use crate::types::{Status, TaskId};

/// Durable storage for download tasks
///
/// [`Database`] is the production implementation. Tests wrap it to observe
/// every write the runner makes.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Insert a new task in the Queued state and return its id
    async fn insert(&self, task: &NewTask) -> Result<TaskId>;

    /// Apply a partial update, returning the number of affected rows
    async fn update_fields(&self, id: TaskId, patch: &TaskPatch) -> Result<u64>;

    /// Fetch a task by id
    async fn get_by_id(&self, id: TaskId) -> Result<Option<DownloadTask>>;

    /// One page of tasks ordered by creation time, newest first
    async fn list_page(&self, page: u32, size: u32, user_id: Option<i64>) -> Result<TaskPage>;

    /// All tasks currently in `status`, oldest first
    async fn list_by_status(&self, status: Status) -> Result<Vec<DownloadTask>>;
}

#[async_trait]
impl TaskStore for Database {
    async fn insert(&self, task: &NewTask) -> Result<TaskId> {
        self.insert_task(task).await
    }

    async fn update_fields(&self, id: TaskId, patch: &TaskPatch) -> Result<u64> {
        self.update_task_fields(id, patch).await
    }

    async fn get_by_id(&self, id: TaskId) -> Result<Option<DownloadTask>> {
        self.get_task(id).await
    }

    async fn list_page(&self, page: u32, size: u32, user_id: Option<i64>) -> Result<TaskPage> {
        self.list_tasks_page(page, size, user_id).await
    }

    async fn list_by_status(&self, status: Status) -> Result<Vec<DownloadTask>> {
        self.list_tasks_by_status(status).await
    }
}
