//! Configuration types for media-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

/// Download behavior configuration (output location, parallelism)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Root directory downloaded files are written to (default: "Downloads")
    #[serde(default = "default_download_root")]
    pub download_root: PathBuf,

    /// Maximum number of downloader processes running at once (default: 1)
    ///
    /// Fixed for the lifetime of a [`MediaDownloader`](crate::MediaDownloader).
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    /// yt-dlp output template, joined onto `download_root` (default: "%(title)s.%(ext)s")
    #[serde(default = "default_output_template")]
    pub output_template: String,

    /// Re-enqueue tasks left Queued by a previous run (default: true)
    #[serde(default = "default_true")]
    pub restore_on_startup: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            download_root: default_download_root(),
            max_parallel: default_max_parallel(),
            output_template: default_output_template(),
            restore_on_startup: true,
        }
    }
}

/// External tool configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the yt-dlp executable (auto-detected if None)
    #[serde(default)]
    pub ytdlp_path: Option<PathBuf>,

    /// Whether to search PATH for yt-dlp if no explicit path is set (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: None,
            search_path: true,
        }
    }
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Database path (default: "media-dl.db")
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

/// Sidecar download service configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SidecarConfig {
    /// Base URL of the sidecar HTTP API (e.g. "http://127.0.0.1:8000")
    #[serde(default)]
    pub api_base: Option<String>,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_sidecar_timeout", with = "duration_serde")]
    pub timeout: Duration,
}

impl Default for SidecarConfig {
    fn default() -> Self {
        Self {
            api_base: None,
            timeout: default_sidecar_timeout(),
        }
    }
}

/// Main configuration for MediaDownloader
///
/// Fields are organized into sub-configs:
/// - [`download`](DownloadConfig) - output root, parallelism, restore behavior
/// - [`tools`](ToolsConfig) - yt-dlp discovery
/// - [`persistence`](PersistenceConfig) - task database
/// - [`sidecar`](SidecarConfig) - optional external download service
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Download behavior settings
    #[serde(default)]
    pub download: DownloadConfig,

    /// External tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Data storage
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// Sidecar service
    #[serde(default)]
    pub sidecar: SidecarConfig,
}

impl Config {
    /// Download root directory
    pub fn download_root(&self) -> &PathBuf {
        &self.download.download_root
    }

    /// Check settings that cannot be corrected at runtime
    pub fn validate(&self) -> Result<()> {
        if self.download.max_parallel == 0 {
            return Err(Error::Config {
                message: "max_parallel must be at least 1".to_string(),
                key: Some("max_parallel".to_string()),
            });
        }
        if self.download.output_template.trim().is_empty() {
            return Err(Error::Config {
                message: "output_template must not be empty".to_string(),
                key: Some("output_template".to_string()),
            });
        }
        Ok(())
    }
}

// Default value functions
fn default_download_root() -> PathBuf {
    PathBuf::from("Downloads")
}

fn default_max_parallel() -> usize {
    1
}

fn default_output_template() -> String {
    "%(title)s.%(ext)s".to_string()
}

fn default_database_path() -> PathBuf {
    PathBuf::from("media-dl.db")
}

fn default_sidecar_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_true() -> bool {
    true
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
