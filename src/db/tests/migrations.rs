use crate::db::*;
use tempfile::NamedTempFile;

#[tokio::test]
async fn test_database_creation() {
    let temp_file = NamedTempFile::new().unwrap();
    let db_path = temp_file.path();

    let db = Database::new(db_path).await.unwrap();

    let mut conn = db.pool.acquire().await.unwrap();

    let tables: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .fetch_all(&mut *conn)
            .await
            .unwrap();

    assert!(tables.contains(&"download_video_task".to_string()));
    assert!(tables.contains(&"schema_version".to_string()));

    drop(conn);
    db.close().await;
}

#[tokio::test]
async fn test_reopening_does_not_reapply_migrations() {
    let temp_dir = tempfile::tempdir().unwrap();
    let db_path = temp_dir.path().join("nested").join("tasks.db");

    let db = Database::new(&db_path).await.unwrap();
    let id = db
        .insert_task(&NewTask {
            url: "https://example.com/v".to_string(),
            user_id: None,
        })
        .await
        .unwrap();
    db.close().await;

    // Second open must see schema_version = 1 and keep existing rows
    let db = Database::new(&db_path).await.unwrap();
    let versions: Vec<i64> = sqlx::query_scalar("SELECT version FROM schema_version")
        .fetch_all(db.pool())
        .await
        .unwrap();
    assert_eq!(versions, vec![1]);
    assert!(db.get_task(id).await.unwrap().is_some());

    db.close().await;
}
