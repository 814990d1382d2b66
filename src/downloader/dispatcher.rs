//! Dispatcher: drains the queue into supervised runner executions.

use super::MediaDownloader;

impl MediaDownloader {
    /// Start a dispatcher on the task tracker
    ///
    /// Called after every enqueue. The caller never waits on dispatch or on the
    /// executions it launches; shutdown waits for both.
    pub(crate) fn dispatch(&self) {
        let downloader = self.clone();
        self.tracker.spawn(async move {
            downloader.drain_queue().await;
        });
    }

    /// Dequeue ids until the queue is empty, launching one runner per id
    ///
    /// The loop only suspends on permit acquisition. If the limiter is closed,
    /// including while this loop was waiting for a permit, the dequeued id goes
    /// back to the head of the queue and the loop ends.
    pub(crate) async fn drain_queue(&self) {
        while let Some(id) = self.queue_state.queue.try_dequeue().await {
            let permit = match self.queue_state.limiter.acquire().await {
                Ok(permit) if !self.queue_state.limiter.is_closed() => permit,
                _ => {
                    self.queue_state.queue.push_front(id).await;
                    tracing::debug!(task_id = id.0, "Limiter closed, task left in queue");
                    break;
                }
            };

            tracing::debug!(task_id = id.0, "Permit acquired, launching runner");

            let downloader = self.clone();
            self.tracker.spawn(async move {
                let _permit = permit;
                downloader.run_task(id).await;
            });
        }
    }
}
