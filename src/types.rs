//! Core types for media-dl

use serde::{Deserialize, Serialize};

/// Unique identifier for a download task
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl TaskId {
    /// Create a new TaskId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for TaskId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<TaskId> for i64 {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

impl PartialEq<i64> for TaskId {
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TaskId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

// Implement sqlx Type, Encode, and Decode for database operations
impl sqlx::Type<sqlx::Sqlite> for TaskId {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <i64 as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <i64 as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for TaskId {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::Encode::<sqlx::Sqlite>::encode_by_ref(&self.0, buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for TaskId {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let id = <i64 as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(Self(id))
    }
}

/// Task status
///
/// Transitions are forward-only: `Queued → Running → {Success, Failed}`.
/// The only way back to `Queued` is an explicit re-enqueue, which restarts
/// the whole lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// Waiting in the queue for a permit
    Queued,
    /// The downloader process is running
    Running,
    /// The downloader exited with code 0
    Success,
    /// The downloader failed or could not be run
    Failed,
}

impl Status {
    /// Token stored in the `status` column
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Queued => "Queued",
            Status::Running => "Running",
            Status::Success => "Success",
            Status::Failed => "Failed",
        }
    }

    /// Whether this is a terminal state (Success or Failed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Status::Success | Status::Failed)
    }

    /// Whether the lifecycle allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: Status) -> bool {
        matches!(
            (self, next),
            (Status::Queued, Status::Running)
                | (Status::Queued, Status::Failed)
                | (Status::Running, Status::Success)
                | (Status::Running, Status::Failed)
        )
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Queued" => Ok(Status::Queued),
            "Running" => Ok(Status::Running),
            "Success" => Ok(Status::Success),
            "Failed" => Ok(Status::Failed),
            other => Err(format!("unknown task status '{}'", other)),
        }
    }
}

impl sqlx::Type<sqlx::Sqlite> for Status {
    fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
        <&str as sqlx::Type<sqlx::Sqlite>>::type_info()
    }

    fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
        <&str as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for Status {
    fn encode_by_ref(
        &self,
        buf: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
    ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync>> {
        sqlx::Encode::<sqlx::Sqlite>::encode_by_ref(&self.as_str(), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for Status {
    fn decode(value: sqlx::sqlite::SqliteValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let text = <&str as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
        Ok(text.parse::<Status>()?)
    }
}

/// Event emitted during a task's lifecycle
///
/// Subscribe with [`MediaDownloader::subscribe`](crate::MediaDownloader::subscribe).
/// Every execution that reaches `Started` is followed by exactly one
/// `Succeeded` or `Failed` for the same id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Task accepted into the queue
    Queued {
        /// Task ID
        id: TaskId,
        /// Source URL
        url: String,
    },

    /// A permit was acquired and the task moved to Running
    Started {
        /// Task ID
        id: TaskId,
    },

    /// A progress line was parsed
    Progress {
        /// Task ID
        id: TaskId,
        /// Progress percentage (0.0 to 100.0), never lower than the previous event
        percent: f64,
        /// Estimated time remaining, as printed by the downloader
        eta: String,
        /// Transfer rate, as printed by the downloader
        speed: String,
    },

    /// The downloader exited with code 0
    Succeeded {
        /// Task ID
        id: TaskId,
    },

    /// The task reached the Failed state
    Failed {
        /// Task ID
        id: TaskId,
        /// Persisted error message
        error: String,
    },

    /// The downloader is shutting down
    Shutdown,
}

impl Event {
    /// Task the event refers to, if any
    pub fn task_id(&self) -> Option<TaskId> {
        match self {
            Event::Queued { id, .. }
            | Event::Started { id }
            | Event::Progress { id, .. }
            | Event::Succeeded { id }
            | Event::Failed { id, .. } => Some(*id),
            Event::Shutdown => None,
        }
    }

    /// Whether this event reports a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::Succeeded { .. } | Event::Failed { .. })
    }
}
