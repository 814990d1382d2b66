//! Wire types exchanged with the sidecar service (camelCase JSON).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Download request accepted by `POST /download`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadRequest {
    /// Source URL
    pub url: String,
    /// Key the sidecar uses to collapse duplicate submissions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub idempotency_key: Option<String>,
    /// Explicit yt-dlp format id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_id: Option<String>,
    /// Quality preset: low, medium, high or auto
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    /// Download the audio track only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_only: Option<bool>,
    /// Output filename template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename_template: Option<String>,
    /// Proxy URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    /// Rate limit in yt-dlp syntax (e.g. "2M")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<String>,
    /// Playlist item selection (e.g. "1-3,7")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist_items: Option<String>,
    /// Referer header value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referer: Option<String>,
    /// Extra HTTP headers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    /// Extractor arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extractor_args: Option<String>,
    /// Inline cookies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies: Option<String>,
    /// Path of a cookies file on the sidecar host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookies_file: Option<String>,
}

impl DownloadRequest {
    /// Request for `url` with every option left to the sidecar's defaults
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }
}

/// Reply to `POST /download`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    /// Sidecar-side task id
    pub task_id: String,
    /// Initial status reported by the sidecar
    #[serde(default)]
    pub status: Option<String>,
}

/// Reply to `GET /status/{taskId}`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    /// Sidecar-side task id
    pub task_id: String,
    /// Source URL
    #[serde(default)]
    pub url: String,
    /// Unix timestamp of submission
    #[serde(default)]
    pub created_at: i64,
    /// Sidecar status string
    pub status: String,
    /// Progress payload, shape defined by the sidecar
    #[serde(default)]
    pub progress: Option<serde_json::Value>,
    /// Output payload, shape defined by the sidecar
    #[serde(default)]
    pub output: Option<serde_json::Value>,
    /// Error payload, shape defined by the sidecar
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

/// Reply to `GET /probe`
///
/// When the sidecar cannot resolve a direct URL, `ok` is false and
/// `fallback_url` carries the original URL.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeResult {
    /// Whether a direct URL was resolved
    pub ok: bool,
    /// Direct media URL (muxed stream)
    #[serde(default)]
    pub direct_url: Option<String>,
    /// Whether video and audio are served separately
    #[serde(default)]
    pub separate_streams: Option<bool>,
    /// Direct video stream URL
    #[serde(default)]
    pub direct_video_url: Option<String>,
    /// Direct audio stream URL
    #[serde(default)]
    pub direct_audio_url: Option<String>,
    /// Resolver that produced the result
    #[serde(default)]
    pub resolver: Option<String>,
    /// URL to use instead when probing failed
    #[serde(default)]
    pub fallback_url: Option<String>,
    /// Why probing failed
    #[serde(default)]
    pub reason: Option<String>,
}

impl ProbeResult {
    /// Negative result pointing back at the original URL
    pub fn fallback(url: &str, reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            fallback_url: Some(url.to_string()),
            reason: Some(reason.into()),
            ..Default::default()
        }
    }
}
