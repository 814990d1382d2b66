//! Waiting helpers and custom assertions for integration tests

use media_dl::{DownloadTask, Event, MediaDownloader, Status, TaskId};
use std::time::Duration;
use tokio::sync::broadcast::Receiver;

/// Result of waiting for a task to finish
#[derive(Debug, PartialEq)]
pub enum WaitResult {
    /// The task succeeded
    Succeeded,
    /// The task failed with the given message
    Failed(String),
    /// Timeout waiting for a terminal event
    Timeout,
    /// Channel closed or lagged
    ChannelClosed,
}

/// Wait on an existing subscription for `id` to reach a terminal event
///
/// Subscribe before submitting, otherwise fast tasks finish unobserved.
pub async fn wait_for_terminal(
    events: &mut Receiver<Event>,
    id: TaskId,
    timeout: Duration,
) -> WaitResult {
    let result = tokio::time::timeout(timeout, async {
        loop {
            match events.recv().await {
                Ok(Event::Succeeded { id: event_id }) if event_id == id => {
                    return WaitResult::Succeeded;
                }
                Ok(Event::Failed {
                    id: event_id,
                    error,
                }) if event_id == id => {
                    return WaitResult::Failed(error);
                }
                Ok(_) => continue,
                Err(_) => return WaitResult::ChannelClosed,
            }
        }
    })
    .await;

    result.unwrap_or(WaitResult::Timeout)
}

/// Fetch a task that must exist
pub async fn fetch(downloader: &MediaDownloader, id: TaskId) -> DownloadTask {
    downloader
        .get_task(id)
        .await
        .unwrap()
        .unwrap_or_else(|| panic!("task {id} not found"))
}

/// Assert the persisted status of a task
pub async fn assert_status(downloader: &MediaDownloader, id: TaskId, expected: Status) {
    let task = fetch(downloader, id).await;
    assert_eq!(
        task.status, expected,
        "task {id} has status {} but expected {}",
        task.status, expected
    );
}
