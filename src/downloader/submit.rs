//! Task submission, lookup and explicit re-enqueue.

use std::sync::atomic::Ordering;

use crate::db::{DownloadTask, NewTask, TaskPage, TaskPatch};
use crate::error::{Error, Result, TaskError};
use crate::types::{Event, Status, TaskId};

use super::MediaDownloader;

/// Reject anything that is not an absolute http(s) URL
pub(crate) fn validate_url(raw: &str) -> Result<()> {
    let parsed = url::Url::parse(raw.trim()).map_err(|e| Error::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match parsed.scheme() {
        "http" | "https" if parsed.host_str().is_some() => Ok(()),
        "http" | "https" => Err(Error::InvalidUrl {
            url: raw.to_string(),
            reason: "missing host".to_string(),
        }),
        scheme => Err(Error::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", scheme),
        }),
    }
}

impl MediaDownloader {
    /// Create a task for `url` and queue it
    ///
    /// The record is inserted as `Queued` with progress 0 and the call returns
    /// as soon as the id is queued; execution happens in the background.
    ///
    /// # Errors
    ///
    /// - [`Error::ShuttingDown`] after [`shutdown`](Self::shutdown) was called
    /// - [`Error::InvalidUrl`] for anything but an absolute http(s) URL
    /// - store errors from the insert
    pub async fn create_task(&self, url: &str, user_id: Option<i64>) -> Result<TaskId> {
        self.ensure_accepting()?;
        validate_url(url)?;

        let url = url.trim().to_string();
        let id = self
            .store
            .insert(&NewTask {
                url: url.clone(),
                user_id,
            })
            .await?;

        tracing::info!(task_id = id.0, url = %url, "Task created");

        {
            let mut active = self.queue_state.active.lock().await;
            active.insert(id, Status::Queued);
        }
        self.push_to_queue(id, url).await;

        Ok(id)
    }

    /// Fetch a task by id
    pub async fn get_task(&self, id: TaskId) -> Result<Option<DownloadTask>> {
        self.store.get_by_id(id).await
    }

    /// One page of tasks, newest first
    ///
    /// `page` is 1-based (0 is treated as 1) and `size` is clamped to 1..=100.
    pub async fn list_tasks(&self, page: u32, size: u32, user_id: Option<i64>) -> Result<TaskPage> {
        self.store.list_page(page, size, user_id).await
    }

    /// Queue an existing task again
    ///
    /// Restarts the whole lifecycle: the record goes back to `Queued` with
    /// progress 0 and cleared eta, speed and error fields.
    ///
    /// # Errors
    ///
    /// - [`TaskError::AlreadyActive`] if the task is already queued or running
    /// - [`TaskError::NotFound`] if no such task exists
    /// - [`TaskError::InvalidState`] if the store reports the task Running but
    ///   no execution in this process holds it
    /// - [`Error::ShuttingDown`] after [`shutdown`](Self::shutdown) was called
    pub async fn enqueue(&self, id: TaskId) -> Result<()> {
        self.ensure_accepting()?;

        // Claim the id first so two concurrent calls cannot both queue it
        {
            let mut active = self.queue_state.active.lock().await;
            if let Some(state) = active.get(&id) {
                return Err(TaskError::AlreadyActive {
                    id: id.0,
                    state: state.as_str().to_lowercase(),
                }
                .into());
            }
            active.insert(id, Status::Queued);
        }

        let url = match self.reset_to_queued(id).await {
            Ok(url) => url,
            Err(e) => {
                self.release_active(id).await;
                return Err(e);
            }
        };

        tracing::info!(task_id = id.0, "Task re-enqueued");
        self.push_to_queue(id, url).await;
        Ok(())
    }

    async fn reset_to_queued(&self, id: TaskId) -> Result<String> {
        let task = self
            .store
            .get_by_id(id)
            .await?
            .ok_or(TaskError::NotFound { id: id.0 })?;

        // Not in the active map, yet marked Running: another process owns it
        if task.status == Status::Running {
            return Err(TaskError::InvalidState {
                id: id.0,
                operation: "enqueue".to_string(),
                current_state: task.status.to_string(),
            }
            .into());
        }

        self.store.update_fields(id, &TaskPatch::requeued()).await?;
        Ok(task.url)
    }

    /// Append an already-claimed id to the queue, announce it and wake a dispatcher
    pub(crate) async fn push_to_queue(&self, id: TaskId, url: String) {
        self.queue_state.queue.enqueue(id).await;
        self.emit_event(Event::Queued { id, url });
        self.dispatch();
    }

    fn ensure_accepting(&self) -> Result<()> {
        if self.queue_state.accepting_new.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::ShuttingDown)
        }
    }
}
