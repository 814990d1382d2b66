//! Process runner: drives one yt-dlp execution through the task state machine.
//!
//! `Queued → Running → {Success, Failed}`. The Running write happens before any
//! process output is consumed, and every execution ends with exactly one
//! terminal write, whatever went wrong along the way.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

use crate::db::{DownloadTask, TaskPatch};
use crate::error::{Error, Result};
use crate::progress::parse_progress_line;
use crate::types::{Event, Status, TaskId};

use super::MediaDownloader;

/// Message persisted when yt-dlp fails without writing to stderr
pub(crate) const FALLBACK_ERROR_MESSAGE: &str = "download failed";

/// `error_code` values written by the runner
pub(crate) mod failure_code {
    /// yt-dlp exited with a non-zero code or was killed by a signal
    pub const NON_ZERO_EXIT: &str = "non_zero_exit";
    /// The process could not be started
    pub const PROCESS_SPAWN: &str = "process_spawn";
    /// Reading the process output or waiting for it failed
    pub const PROCESS_IO: &str = "process_io";
    /// The task was Running when the previous process ended
    pub const INTERRUPTED: &str = "interrupted";
}

/// Terminal result of one execution
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Outcome {
    Success,
    Failed { code: String, message: String },
}

impl Outcome {
    fn failed(code: &str, message: impl Into<String>) -> Self {
        Outcome::Failed {
            code: code.to_string(),
            message: message.into(),
        }
    }

    /// Outcome for a non-zero exit, using stderr as the message when present
    pub(crate) fn from_exit(success: bool, stderr: &[u8]) -> Self {
        if success {
            return Outcome::Success;
        }

        let stderr = String::from_utf8_lossy(stderr);
        let message = stderr.trim();
        if message.is_empty() {
            Outcome::failed(failure_code::NON_ZERO_EXIT, FALLBACK_ERROR_MESSAGE)
        } else {
            Outcome::failed(failure_code::NON_ZERO_EXIT, message)
        }
    }
}

impl From<Error> for Outcome {
    fn from(e: Error) -> Self {
        Outcome::failed(e.error_code(), e.to_string())
    }
}

/// Keeps the reported percentage from moving backwards
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ProgressTracker {
    percent: f64,
}

impl ProgressTracker {
    /// Fold a parsed percentage into the running value and return the value to report
    ///
    /// `None` (unparseable or out of range) and lower values keep the previous one.
    pub(crate) fn observe(&mut self, parsed: Option<f64>) -> f64 {
        if let Some(p) = parsed
            && p > self.percent
        {
            self.percent = p;
        }
        self.percent
    }
}

impl MediaDownloader {
    /// Run one task to a terminal state
    ///
    /// Never returns an error: every failure becomes a persisted Failed state.
    /// Tasks that are missing or no longer Queued are skipped.
    pub(crate) async fn run_task(&self, id: TaskId) {
        let task = match self.store.get_by_id(id).await {
            Ok(Some(task)) => task,
            Ok(None) => {
                tracing::warn!(task_id = id.0, "Dispatched task no longer exists, skipping");
                self.release_active(id).await;
                return;
            }
            Err(e) => {
                tracing::error!(task_id = id.0, error = %e, "Failed to load dispatched task");
                self.finish(id, Outcome::from(e)).await;
                return;
            }
        };

        if !task.status.can_transition_to(Status::Running) {
            tracing::warn!(
                task_id = id.0,
                status = %task.status,
                "Dispatched task is not Queued, skipping"
            );
            self.release_active(id).await;
            return;
        }

        {
            let mut active = self.queue_state.active.lock().await;
            active.insert(id, Status::Running);
        }

        let outcome = match self.execute(&task).await {
            Ok(outcome) => outcome,
            Err(e) => Outcome::from(e),
        };

        self.finish(id, outcome).await;
    }

    /// Mark Running, run yt-dlp and map its exit to an [`Outcome`]
    async fn execute(&self, task: &DownloadTask) -> Result<Outcome> {
        let id = task.id;

        self.store.update_fields(id, &TaskPatch::running()).await?;
        self.emit_event(Event::Started { id });
        tracing::info!(task_id = id.0, url = %task.url, "Task started");

        let mut child = match self.ytdlp.command(&task.url).spawn() {
            Ok(child) => child,
            Err(e) => {
                let e = Error::Process {
                    binary: self.ytdlp.binary().to_path_buf(),
                    reason: e.to_string(),
                };
                return Ok(Outcome::failed(failure_code::PROCESS_SPAWN, e.to_string()));
            }
        };

        let (Some(stdout), Some(mut stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Ok(Outcome::failed(
                failure_code::PROCESS_IO,
                "yt-dlp output pipes were not captured",
            ));
        };

        // stderr is drained alongside stdout so a full pipe cannot stall the child
        let collect_stderr = async {
            let mut buf = Vec::new();
            stderr.read_to_end(&mut buf).await.map(|_| buf)
        };
        let (stdout_result, stderr_result) =
            tokio::join!(self.follow_progress(id, stdout), collect_stderr);

        if let Err(e) = stdout_result {
            return Ok(match e {
                Error::Io(io) => Outcome::failed(
                    failure_code::PROCESS_IO,
                    format!("failed to read yt-dlp output: {}", io),
                ),
                other => Outcome::from(other),
            });
        }

        let stderr = match stderr_result {
            Ok(buf) => buf,
            Err(e) => {
                tracing::warn!(task_id = id.0, error = %e, "Failed to read yt-dlp stderr");
                Vec::new()
            }
        };

        let status = match child.wait().await {
            Ok(status) => status,
            Err(e) => {
                return Ok(Outcome::failed(
                    failure_code::PROCESS_IO,
                    format!("failed to wait for yt-dlp: {}", e),
                ));
            }
        };

        tracing::debug!(task_id = id.0, exit_status = %status, "yt-dlp exited");
        Ok(Outcome::from_exit(status.success(), &stderr))
    }

    /// Feed stdout lines to the progress parser until EOF
    ///
    /// Matched lines update the store and emit [`Event::Progress`]; other lines
    /// are ignored.
    async fn follow_progress<R>(&self, id: TaskId, stdout: R) -> Result<()>
    where
        R: AsyncRead + Unpin,
    {
        let mut lines = BufReader::new(stdout).split(b'\n');
        let mut tracker = ProgressTracker::default();

        while let Some(raw) = lines.next_segment().await? {
            let line = String::from_utf8_lossy(&raw);
            let Some(parsed) = parse_progress_line(line.trim_end()) else {
                continue;
            };

            let percent = tracker.observe(parsed.percent);
            self.store
                .update_fields(
                    id,
                    &TaskPatch::progress(percent, parsed.eta.clone(), parsed.speed.clone()),
                )
                .await?;
            self.emit_event(Event::Progress {
                id,
                percent,
                eta: parsed.eta,
                speed: parsed.speed,
            });
        }

        Ok(())
    }

    /// Commit the terminal state, release the duplicate guard and announce it
    async fn finish(&self, id: TaskId, outcome: Outcome) {
        let (patch, event) = match outcome {
            Outcome::Success => {
                tracing::info!(task_id = id.0, "Task succeeded");
                (TaskPatch::succeeded(), Event::Succeeded { id })
            }
            Outcome::Failed { code, message } => {
                tracing::warn!(task_id = id.0, error_code = %code, error = %message, "Task failed");
                let event = Event::Failed {
                    id,
                    error: message.clone(),
                };
                (TaskPatch::failed(&code, message), event)
            }
        };

        if let Err(e) = self.store.update_fields(id, &patch).await {
            tracing::error!(task_id = id.0, error = %e, "Failed to persist terminal task state");
        }

        self.release_active(id).await;
        self.emit_event(event);
    }

    pub(crate) async fn release_active(&self, id: TaskId) {
        let mut active = self.queue_state.active.lock().await;
        active.remove(&id);
    }
}
