use crate::db::*;
use crate::types::{Status, TaskId};
use tempfile::NamedTempFile;

fn new_task(url: &str, user_id: Option<i64>) -> NewTask {
    NewTask {
        url: url.to_string(),
        user_id,
    }
}

#[tokio::test]
async fn test_insert_and_get_task() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let id = db
        .insert_task(&new_task("https://example.com/v", Some(7)))
        .await
        .unwrap();
    assert!(id.0 > 0);

    let task = db.get_task(id).await.unwrap().unwrap();
    assert_eq!(task.url, "https://example.com/v");
    assert_eq!(task.status, Status::Queued);
    assert_eq!(task.progress_percent, Some(0.0));
    assert_eq!(task.user_id, Some(7));
    assert_eq!(task.speed, None);
    assert_eq!(task.eta, None);
    assert_eq!(task.file_path, None);
    assert_eq!(task.error_msg, None);
    assert_eq!(task.create_time, task.update_time);

    db.close().await;
}

#[tokio::test]
async fn test_get_missing_task_returns_none() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    assert!(db.get_task(TaskId(404)).await.unwrap().is_none());

    db.close().await;
}

#[tokio::test]
async fn test_update_fields_applies_only_set_columns() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();
    let id = db
        .insert_task(&new_task("https://example.com/v", None))
        .await
        .unwrap();

    let affected = db
        .update_task_fields(id, &TaskPatch::running())
        .await
        .unwrap();
    assert_eq!(affected, 1);

    db.update_task_fields(
        id,
        &TaskPatch::progress(45.2, "00:01:10".to_string(), "1.3 MiB/s".to_string()),
    )
    .await
    .unwrap();

    let task = db.get_task(id).await.unwrap().unwrap();
    assert_eq!(task.status, Status::Running);
    assert_eq!(task.progress_percent, Some(45.2));
    assert_eq!(task.eta.as_deref(), Some("00:01:10"));
    assert_eq!(task.speed.as_deref(), Some("1.3 MiB/s"));
    assert_eq!(task.error_msg, None);

    db.close().await;
}

#[tokio::test]
async fn test_update_missing_task_affects_no_rows() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let affected = db
        .update_task_fields(TaskId(99), &TaskPatch::succeeded())
        .await
        .unwrap();
    assert_eq!(affected, 0);

    db.close().await;
}

#[tokio::test]
async fn test_failed_then_requeued_clears_error_fields() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();
    let id = db
        .insert_task(&new_task("https://example.com/v", None))
        .await
        .unwrap();

    db.update_task_fields(id, &TaskPatch::running()).await.unwrap();
    db.update_task_fields(
        id,
        &TaskPatch::progress(12.0, "00:00:30".to_string(), "900 KiB/s".to_string()),
    )
    .await
    .unwrap();
    db.update_task_fields(id, &TaskPatch::failed("non_zero_exit", "network unreachable"))
        .await
        .unwrap();

    let failed = db.get_task(id).await.unwrap().unwrap();
    assert_eq!(failed.status, Status::Failed);
    assert_eq!(failed.error_code.as_deref(), Some("non_zero_exit"));
    assert_eq!(failed.error_msg.as_deref(), Some("network unreachable"));
    // Progress is left where the downloader stopped
    assert_eq!(failed.progress_percent, Some(12.0));

    db.update_task_fields(id, &TaskPatch::requeued()).await.unwrap();

    let requeued = db.get_task(id).await.unwrap().unwrap();
    assert_eq!(requeued.status, Status::Queued);
    assert_eq!(requeued.progress_percent, Some(0.0));
    assert_eq!(requeued.error_code, None);
    assert_eq!(requeued.error_msg, None);
    assert_eq!(requeued.speed, None);
    assert_eq!(requeued.eta, None);
    assert_eq!(requeued.url, "https://example.com/v");

    db.close().await;
}

#[tokio::test]
async fn test_list_page_orders_newest_first_and_counts_all() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let mut ids = Vec::new();
    for i in 0..12 {
        let id = db
            .insert_task(&new_task(&format!("https://example.com/{}", i), None))
            .await
            .unwrap();
        ids.push(id);
    }

    let page = db.list_tasks_page(1, 10, None).await.unwrap();
    assert_eq!(page.total, 12);
    assert_eq!(page.items.len(), 10);
    // Same-second inserts fall back to id DESC
    assert_eq!(page.items[0].id, ids[11]);
    assert_eq!(page.items[9].id, ids[2]);
    for pair in page.items.windows(2) {
        assert!(
            (pair[0].create_time, pair[0].id) > (pair[1].create_time, pair[1].id),
            "items must be ordered by create_time DESC"
        );
    }

    let second = db.list_tasks_page(2, 10, None).await.unwrap();
    assert_eq!(second.total, 12);
    assert_eq!(
        second.items.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![ids[1], ids[0]]
    );

    db.close().await;
}

#[tokio::test]
async fn test_list_page_filters_by_owner() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    for i in 0..5 {
        let owner = if i % 2 == 0 { Some(1) } else { Some(2) };
        db.insert_task(&new_task(&format!("https://example.com/{}", i), owner))
            .await
            .unwrap();
    }
    db.insert_task(&new_task("https://example.com/anon", None))
        .await
        .unwrap();

    let owner_one = db.list_tasks_page(1, 10, Some(1)).await.unwrap();
    assert_eq!(owner_one.total, 3);
    assert!(owner_one.items.iter().all(|t| t.user_id == Some(1)));

    let owner_two = db.list_tasks_page(1, 1, Some(2)).await.unwrap();
    assert_eq!(owner_two.total, 2, "total ignores the page size");
    assert_eq!(owner_two.items.len(), 1);

    let everyone = db.list_tasks_page(1, 10, None).await.unwrap();
    assert_eq!(everyone.total, 6);

    db.close().await;
}

#[tokio::test]
async fn test_list_page_normalizes_page_and_size() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    for i in 0..3 {
        db.insert_task(&new_task(&format!("https://example.com/{}", i), None))
            .await
            .unwrap();
    }

    let page_zero = db.list_tasks_page(0, 0, None).await.unwrap();
    assert_eq!(page_zero.items.len(), 1, "size 0 is clamped to 1");

    let past_end = db.list_tasks_page(5, 10, None).await.unwrap();
    assert_eq!(past_end.total, 3);
    assert!(past_end.items.is_empty());

    db.close().await;
}

#[tokio::test]
async fn test_list_by_status_returns_oldest_first() {
    let temp_file = NamedTempFile::new().unwrap();
    let db = Database::new(temp_file.path()).await.unwrap();

    let first = db
        .insert_task(&new_task("https://example.com/a", None))
        .await
        .unwrap();
    let running = db
        .insert_task(&new_task("https://example.com/b", None))
        .await
        .unwrap();
    let last = db
        .insert_task(&new_task("https://example.com/c", None))
        .await
        .unwrap();
    db.update_task_fields(running, &TaskPatch::running())
        .await
        .unwrap();

    let queued = db.list_tasks_by_status(Status::Queued).await.unwrap();
    assert_eq!(
        queued.iter().map(|t| t.id).collect::<Vec<_>>(),
        vec![first, last]
    );

    let active = db.list_tasks_by_status(Status::Running).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, running);

    db.close().await;
}
