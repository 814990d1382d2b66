//! FIFO of pending task ids.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::types::TaskId;

/// Unbounded FIFO holding the ids of tasks waiting to be dispatched
///
/// Only identifiers are stored; consumers re-read the task from the store
/// before acting on it. The queue performs no deduplication. Clones share the
/// same underlying queue.
#[derive(Clone, Debug, Default)]
pub struct TaskQueue {
    inner: Arc<tokio::sync::Mutex<VecDeque<TaskId>>>,
}

impl TaskQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an id to the tail
    pub async fn enqueue(&self, id: TaskId) {
        self.inner.lock().await.push_back(id);
    }

    /// Remove and return the head, or `None` when the queue is empty
    pub async fn try_dequeue(&self) -> Option<TaskId> {
        self.inner.lock().await.pop_front()
    }

    /// Put an id back at the head
    ///
    /// Used by a dispatcher that dequeued an id but could not obtain a permit.
    pub async fn push_front(&self, id: TaskId) {
        self.inner.lock().await.push_front(id);
    }

    /// Number of ids in the queue
    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }

    /// Whether the queue is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.is_empty()
    }
}
