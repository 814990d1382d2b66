//! Test fixtures: a scriptable stand-in for yt-dlp and downloader setup

use media_dl::{Config, MediaDownloader};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Fake yt-dlp that picks its behavior from a keyword in the URL (last argument)
///
/// - `unreachable`: writes "network unreachable" to stderr, exits 1
/// - `silent`: exits 1 without output
/// - `slow`: sleeps 300ms, then succeeds
/// - anything else: prints one progress line among noise, exits 0
pub const FAKE_YTDLP: &str = r#"#!/bin/sh
for last; do :; done
case "$last" in
  *unreachable*)
    echo "network unreachable" >&2
    exit 1
    ;;
  *silent*)
    exit 1
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

/// Write the fake yt-dlp into `dir` and make it executable
pub fn install_fake_ytdlp(dir: &Path) -> PathBuf {
    let path = dir.join("yt-dlp");
    std::fs::write(&path, FAKE_YTDLP).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Config rooted in `dir`, pointing at the fake yt-dlp
pub fn fake_config(dir: &Path, max_parallel: usize) -> Config {
    let mut config = Config::default();
    config.persistence.database_path = dir.join("media.db");
    config.download.download_root = dir.join("downloads");
    config.download.max_parallel = max_parallel;
    config.tools.ytdlp_path = Some(install_fake_ytdlp(dir));
    config
}

/// Downloader backed by a fresh database and the fake yt-dlp
///
/// The returned TempDir must be kept alive for the duration of the test.
pub async fn create_fake_downloader(max_parallel: usize) -> (MediaDownloader, TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = fake_config(temp_dir.path(), max_parallel);
    let downloader = MediaDownloader::new(config).await.unwrap();
    (downloader, temp_dir)
}
