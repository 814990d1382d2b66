//! Startup and shutdown coordination.

use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::db::TaskPatch;
use crate::error::Result;
use crate::types::{Event, Status};

use super::MediaDownloader;
use super::runner::failure_code;

/// How long shutdown waits for running yt-dlp processes
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Message written to tasks that were Running when the previous process ended
pub(crate) const INTERRUPTED_MESSAGE: &str = "interrupted before completion";

impl MediaDownloader {
    /// Restore tasks left unfinished by a previous run
    ///
    /// Called automatically during initialization:
    /// 1. Tasks still marked Running lost their process and are finalized as Failed
    /// 2. Tasks still marked Queued are queued again, oldest first
    ///    (only when `restore_on_startup` is enabled)
    pub(crate) async fn restore_tasks(&self) -> Result<()> {
        let interrupted = self.store.list_by_status(Status::Running).await?;
        for task in &interrupted {
            self.store
                .update_fields(
                    task.id,
                    &TaskPatch::failed(failure_code::INTERRUPTED, INTERRUPTED_MESSAGE),
                )
                .await?;
            tracing::warn!(task_id = task.id.0, "Marked interrupted task as Failed");
        }

        if !self.config.download.restore_on_startup {
            return Ok(());
        }

        let pending = self.store.list_by_status(Status::Queued).await?;
        if pending.is_empty() {
            return Ok(());
        }

        {
            let mut active = self.queue_state.active.lock().await;
            for task in &pending {
                active.insert(task.id, Status::Queued);
            }
        }
        for task in &pending {
            self.queue_state.queue.enqueue(task.id).await;
            self.emit_event(Event::Queued {
                id: task.id,
                url: task.url.clone(),
            });
        }
        self.dispatch();

        tracing::info!(
            restored = pending.len(),
            interrupted = interrupted.len(),
            "Restored unfinished tasks"
        );

        Ok(())
    }

    /// Gracefully shut down the downloader
    ///
    /// This method performs a graceful shutdown sequence:
    /// 1. Stops accepting new tasks
    /// 2. Closes the limiter; dispatchers waiting for a permit put their id back
    /// 3. Waits for running executions to finish, up to 30 seconds
    /// 4. Emits [`Event::Shutdown`]
    ///
    /// Running yt-dlp processes are not interrupted. Tasks still queued stay
    /// Queued in the store and are picked up again on the next start.
    pub async fn shutdown(&self) -> Result<()> {
        tracing::info!("Initiating graceful shutdown");

        self.queue_state
            .accepting_new
            .store(false, Ordering::SeqCst);
        self.queue_state.limiter.close();
        self.tracker.close();
        tracing::info!("Stopped accepting new tasks");

        match tokio::time::timeout(SHUTDOWN_TIMEOUT, self.tracker.wait()).await {
            Ok(()) => {
                tracing::info!("All running tasks completed");
            }
            Err(_) => {
                tracing::warn!(
                    running = self.tracker.len(),
                    "Timeout waiting for running tasks, proceeding with shutdown"
                );
            }
        }

        self.emit_event(Event::Shutdown);

        tracing::info!(
            queued = self.queue_state.queue.len().await,
            "Graceful shutdown complete"
        );
        Ok(())
    }
}
