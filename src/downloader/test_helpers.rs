//! Shared test helpers for creating MediaDownloader instances in tests.

use crate::config::Config;
use crate::db::Database;
use crate::downloader::MediaDownloader;
use crate::store::TaskStore;
use crate::types::{Event, TaskId};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::{TempDir, tempdir};

/// Fake yt-dlp: behavior is chosen by a keyword in the URL (the last argument).
/// Arguments of the latest invocation are written next to the script.
pub(crate) const FAKE_YTDLP: &str = r#"#!/bin/sh
echo "$@" > "$(dirname "$0")/args.txt"
for last; do :; done
case "$last" in
  *unreachable*)
    echo "network unreachable" >&2
    exit 1
    ;;
  *silent*)
    exit 1
    ;;
  *regress*)
    echo "50.0% ... ETA 00:00:10 ... 1.0 MiB/s"
    echo "20.0% ... ETA 00:00:20 ... 0.5 MiB/s"
    echo "150% ... ETA 00:00:05 ... 2.0 MiB/s"
    echo "[download] Destination: video.mp4"
    echo "75.5% ... ETA 00:00:03 ... 3.0 MiB/s"
    exit 0
    ;;
  *slow*)
    sleep 0.3
    echo "100% ... ETA 00:00:00 ... 4.0 MiB/s"
    exit 0
    ;;
  *)
    echo "[youtube] Extracting URL: $last"
    echo "45.2% ... ETA 00:01:10 ... 1.3 MiB/s"
    echo "[download] Destination: video.mp4"
    exit 0
    ;;
esac
"#;

/// Write the fake yt-dlp script into `dir` and make it executable.
pub(crate) fn write_fake_ytdlp(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("yt-dlp");
    std::fs::write(&path, FAKE_YTDLP).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Config pointing every path into `dir`, using the fake yt-dlp script.
pub(crate) fn test_config(dir: &Path, max_parallel: usize) -> Config {
    let mut config = Config::default();
    config.persistence.database_path = dir.join("test.db");
    config.download.download_root = dir.join("downloads");
    config.download.max_parallel = max_parallel;
    config.tools.ytdlp_path = Some(write_fake_ytdlp(dir));
    config
}

/// Helper to create a test MediaDownloader with a persistent database.
/// Returns the downloader and the tempdir (which must be kept alive).
pub(crate) async fn create_test_downloader(max_parallel: usize) -> (MediaDownloader, TempDir) {
    let temp_dir = tempdir().unwrap();
    let config = test_config(temp_dir.path(), max_parallel);
    let downloader = MediaDownloader::new(config).await.unwrap();
    (downloader, temp_dir)
}

/// Same as [`create_test_downloader`] but on top of a caller-provided store.
pub(crate) async fn create_test_downloader_with_store(
    max_parallel: usize,
    store: impl FnOnce(Database) -> Arc<dyn TaskStore>,
) -> (MediaDownloader, TempDir) {
    let temp_dir = tempdir().unwrap();
    let config = test_config(temp_dir.path(), max_parallel);
    let db = Database::new(&config.persistence.database_path)
        .await
        .unwrap();
    let downloader = MediaDownloader::with_store(config, store(db))
        .await
        .unwrap();
    (downloader, temp_dir)
}

/// Receive events until `id` reaches a terminal event, returning everything seen for it.
pub(crate) async fn events_until_terminal(
    rx: &mut tokio::sync::broadcast::Receiver<Event>,
    id: TaskId,
) -> Vec<Event> {
    let mut seen = Vec::new();
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let event = rx.recv().await.unwrap();
            if event.task_id() == Some(id) {
                let terminal = event.is_terminal();
                seen.push(event);
                if terminal {
                    break;
                }
            }
        }
    })
    .await
    .expect("timed out waiting for terminal event");
    seen
}
