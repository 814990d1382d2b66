//! Core downloader implementation split into focused submodules.
//!
//! The `MediaDownloader` struct and its methods are organized by domain:
//! - [`queue`] - FIFO of pending task ids
//! - [`limiter`] - Bounded permit pool gating concurrent executions
//! - [`dispatcher`] - Drains the queue while permits are available
//! - [`runner`] - Drives one yt-dlp process through the task state machine
//! - [`ytdlp`] - Binary discovery and command-line construction
//! - [`submit`] - Task creation, lookup and explicit re-enqueue
//! - [`lifecycle`] - Startup restore and shutdown coordination

mod dispatcher;
mod lifecycle;
mod limiter;
mod queue;
mod runner;
mod submit;
mod ytdlp;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(all(test, unix))]
pub(crate) mod test_helpers;

pub use limiter::ConcurrencyLimiter;
pub use queue::TaskQueue;
pub use ytdlp::YtDlp;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use tokio_util::task::TaskTracker;

use crate::config::Config;
use crate::db::Database;
use crate::error::Result;
use crate::store::TaskStore;
use crate::types::{Event, Status, TaskId};

/// Queue and execution state shared by every clone of the downloader
#[derive(Clone)]
pub(crate) struct QueueState {
    /// Pending task ids in submission order
    pub(crate) queue: TaskQueue,
    /// Permit pool sized by `max_parallel`
    pub(crate) limiter: ConcurrencyLimiter,
    /// Ids that are currently Queued or Running in this process (duplicate guard)
    pub(crate) active: Arc<tokio::sync::Mutex<HashMap<TaskId, Status>>>,
    /// Flag to indicate whether new tasks are accepted (set to false during shutdown)
    pub(crate) accepting_new: Arc<AtomicBool>,
}

/// Main downloader instance (cloneable - all fields are Arc-wrapped)
#[derive(Clone)]
pub struct MediaDownloader {
    /// Task store (public so callers and tests can inspect persisted state)
    pub store: Arc<dyn TaskStore>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Resolved yt-dlp invocation
    pub(crate) ytdlp: Arc<YtDlp>,
    /// Queue, limiter and duplicate guard
    pub(crate) queue_state: QueueState,
    /// Supervises every runner execution so shutdown can wait for them
    pub(crate) tracker: TaskTracker,
}

impl MediaDownloader {
    /// Create a new MediaDownloader backed by the configured SQLite database
    ///
    /// This initializes all core components:
    /// - Validates the configuration
    /// - Creates the download root (failure is logged, not fatal)
    /// - Opens/creates the SQLite database and runs migrations
    /// - Resolves the yt-dlp binary
    /// - Restores tasks left unfinished by a previous run
    pub async fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let db = Database::new(&config.persistence.database_path).await?;
        Self::with_store(config, Arc::new(db)).await
    }

    /// Create a MediaDownloader on top of a caller-provided store
    pub async fn with_store(config: Config, store: Arc<dyn TaskStore>) -> Result<Self> {
        config.validate()?;

        if let Err(e) = tokio::fs::create_dir_all(config.download_root()).await {
            tracing::warn!(
                path = %config.download_root().display(),
                error = %e,
                "Failed to create download root, downloads will fail until it is writable"
            );
        }

        let limiter = ConcurrencyLimiter::new(config.download.max_parallel)?;
        let ytdlp = YtDlp::from_config(&config);
        tracing::info!(
            binary = %ytdlp.binary().display(),
            max_parallel = limiter.capacity(),
            "Media downloader initialized"
        );

        // Create broadcast channel with buffer size of 1000 events
        let (event_tx, _rx) = tokio::sync::broadcast::channel(1000);

        let queue_state = QueueState {
            queue: TaskQueue::new(),
            limiter,
            active: Arc::new(tokio::sync::Mutex::new(HashMap::new())),
            accepting_new: Arc::new(AtomicBool::new(true)),
        };

        let downloader = Self {
            store,
            event_tx,
            config: Arc::new(config),
            ytdlp: Arc::new(ytdlp),
            queue_state,
            tracker: TaskTracker::new(),
        };

        downloader.restore_tasks().await?;

        Ok(downloader)
    }

    /// Subscribe to task events
    ///
    /// Each subscriber receives all events independently. A subscriber that
    /// falls behind by more than 1000 events receives `RecvError::Lagged`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use media_dl::{Config, MediaDownloader};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let downloader = MediaDownloader::new(Config::default()).await?;
    ///
    ///     let mut events = downloader.subscribe();
    ///     tokio::spawn(async move {
    ///         while let Ok(event) = events.recv().await {
    ///             println!("{:?}", event);
    ///         }
    ///     });
    ///
    ///     downloader.create_task("https://example.com/v", None).await?;
    ///     Ok(())
    /// }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration
    pub fn get_config(&self) -> Arc<Config> {
        Arc::clone(&self.config)
    }

    /// Maximum number of simultaneous yt-dlp processes
    pub fn capacity(&self) -> usize {
        self.queue_state.limiter.capacity()
    }

    /// Number of tasks currently Running in this process
    pub async fn running_count(&self) -> usize {
        self.count_active(Status::Running).await
    }

    /// Number of tasks waiting for a permit
    pub async fn queued_count(&self) -> usize {
        self.count_active(Status::Queued).await
    }

    async fn count_active(&self, status: Status) -> usize {
        let active = self.queue_state.active.lock().await;
        active.values().filter(|s| **s == status).count()
    }

    /// Emit an event to all subscribers
    ///
    /// With no subscribers the event is dropped.
    pub(crate) fn emit_event(&self, event: Event) {
        self.event_tx.send(event).ok();
    }
}
