//! Download task CRUD operations.

use crate::error::DatabaseError;
use crate::types::{Status, TaskId};
use crate::{Error, Result};
use sqlx::{QueryBuilder, Sqlite};

use super::{Database, DownloadTask, MAX_PAGE_SIZE, NewTask, TaskPage, TaskPatch};

const TASK_COLUMNS: &str = r#"
    id, url, status, progress_percent, speed, eta,
    file_path, file_size, ext, error_code, error_msg,
    user_id, create_time, update_time
"#;

impl Database {
    /// Insert a new task in the Queued state
    pub async fn insert_task(&self, task: &NewTask) -> Result<TaskId> {
        let now = chrono::Utc::now().timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO download_video_task (
                url, status, progress_percent, user_id, create_time, update_time
            ) VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&task.url)
        .bind(Status::Queued)
        .bind(0.0f64)
        .bind(task.user_id)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to insert task: {}",
                e
            )))
        })?;

        Ok(TaskId(result.last_insert_rowid()))
    }

    /// Get a task by ID
    pub async fn get_task(&self, id: TaskId) -> Result<Option<DownloadTask>> {
        let sql = format!("SELECT {} FROM download_video_task WHERE id = ?", TASK_COLUMNS);
        let row = sqlx::query_as::<_, DownloadTask>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to get task: {}",
                    e
                )))
            })?;

        Ok(row)
    }

    /// Apply a partial update and refresh `update_time`
    ///
    /// Returns the number of affected rows (0 when the task does not exist).
    pub async fn update_task_fields(&self, id: TaskId, patch: &TaskPatch) -> Result<u64> {
        let now = chrono::Utc::now().timestamp();

        let mut builder: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("UPDATE download_video_task SET update_time = ");
        builder.push_bind(now);

        if let Some(status) = patch.status {
            builder.push(", status = ").push_bind(status);
        }
        if let Some(percent) = patch.progress_percent {
            builder.push(", progress_percent = ").push_bind(percent);
        }
        if let Some(speed) = &patch.speed {
            builder.push(", speed = ").push_bind(speed.clone());
        }
        if let Some(eta) = &patch.eta {
            builder.push(", eta = ").push_bind(eta.clone());
        }
        if let Some(code) = &patch.error_code {
            builder.push(", error_code = ").push_bind(code.clone());
        }
        if let Some(msg) = &patch.error_msg {
            builder.push(", error_msg = ").push_bind(msg.clone());
        }

        builder.push(" WHERE id = ").push_bind(id);

        let result = builder.build().execute(&self.pool).await.map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to update task {}: {}",
                id, e
            )))
        })?;

        Ok(result.rows_affected())
    }

    /// List one page of tasks, newest first
    ///
    /// `page` is 1-based (0 is treated as 1) and `size` is clamped to
    /// `1..=MAX_PAGE_SIZE`. When `user_id` is set only that owner's tasks are
    /// counted and returned.
    pub async fn list_tasks_page(
        &self,
        page: u32,
        size: u32,
        user_id: Option<i64>,
    ) -> Result<TaskPage> {
        let page = page.max(1);
        let size = size.clamp(1, MAX_PAGE_SIZE);
        let offset = i64::from(page - 1) * i64::from(size);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM download_video_task WHERE (? IS NULL OR user_id = ?)",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            Error::Database(DatabaseError::QueryFailed(format!(
                "Failed to count tasks: {}",
                e
            )))
        })?;

        let sql = format!(
            r#"
            SELECT {}
            FROM download_video_task
            WHERE (? IS NULL OR user_id = ?)
            ORDER BY create_time DESC, id DESC
            LIMIT ? OFFSET ?
            "#,
            TASK_COLUMNS
        );
        let items = sqlx::query_as::<_, DownloadTask>(&sql)
            .bind(user_id)
            .bind(user_id)
            .bind(i64::from(size))
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to list tasks: {}",
                    e
                )))
            })?;

        Ok(TaskPage { total, items })
    }

    /// List tasks with a specific status, oldest first
    pub async fn list_tasks_by_status(&self, status: Status) -> Result<Vec<DownloadTask>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM download_video_task
            WHERE status = ?
            ORDER BY create_time ASC, id ASC
            "#,
            TASK_COLUMNS
        );
        let rows = sqlx::query_as::<_, DownloadTask>(&sql)
            .bind(status)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                Error::Database(DatabaseError::QueryFailed(format!(
                    "Failed to list tasks by status: {}",
                    e
                )))
            })?;

        Ok(rows)
    }
}
