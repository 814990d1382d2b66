//! HTTP client for the yt-dlp sidecar service
//!
//! The sidecar is a separately deployed service that runs downloads on its own
//! workers. It is an alternative execution path and is not used by
//! [`MediaDownloader`](crate::MediaDownloader).
//!
//! | Method | Endpoint |
//! |--------|----------|
//! | [`health`](SidecarClient::health) | `GET /health` |
//! | [`submit`](SidecarClient::submit) | `POST /download` |
//! | [`status`](SidecarClient::status) | `GET /status/{taskId}` |
//! | [`cancel`](SidecarClient::cancel) | `POST /cancel/{taskId}` |
//! | [`formats`](SidecarClient::formats) | `GET /formats?url=` |
//! | [`probe`](SidecarClient::probe) | `GET /probe?url=` |

mod types;


pub use types::{DownloadRequest, DownloadResponse, ProbeResult, StatusResponse};

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::config::SidecarConfig;
use crate::error::{Error, Result};

/// Typed client for the sidecar HTTP API
#[derive(Clone, Debug)]
pub struct SidecarClient {
    http: reqwest::Client,
    base: String,
}

impl SidecarClient {
    /// Create a client for the service at `api_base`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `api_base` is not an absolute http(s) URL.
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self> {
        let parsed = url::Url::parse(api_base).map_err(|e| Error::Config {
            message: format!("invalid sidecar api_base '{}': {}", api_base, e),
            key: Some("sidecar.api_base".to_string()),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!("sidecar api_base must be http(s), got '{}'", api_base),
                key: Some("sidecar.api_base".to_string()),
            });
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::Network)?;

        Ok(Self {
            http,
            base: api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when `api_base` is not set or invalid.
    pub fn from_config(config: &SidecarConfig) -> Result<Self> {
        let api_base = config.api_base.as_deref().ok_or_else(|| Error::Config {
            message: "sidecar api_base is not configured".to_string(),
            key: Some("sidecar.api_base".to_string()),
        })?;
        Self::new(api_base, config.timeout)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Raw health check body
    pub async fn health(&self) -> Result<String> {
        let response = self.http.get(self.endpoint("/health")).send().await?;
        Self::text(response).await
    }

    /// Submit a download to the sidecar
    pub async fn submit(&self, request: &DownloadRequest) -> Result<DownloadResponse> {
        tracing::debug!(url = %request.url, "Submitting download to sidecar");
        let response = self
            .http
            .post(self.endpoint("/download"))
            .json(request)
            .send()
            .await?;
        Self::json(response).await
    }

    /// Status of a sidecar task
    pub async fn status(&self, task_id: &str) -> Result<StatusResponse> {
        let path = format!("/status/{}", urlencoding::encode(task_id));
        let response = self.http.get(self.endpoint(&path)).send().await?;
        Self::json(response).await
    }

    /// Ask the sidecar to cancel one of its tasks, returning the raw reply body
    pub async fn cancel(&self, task_id: &str) -> Result<String> {
        let path = format!("/cancel/{}", urlencoding::encode(task_id));
        let response = self.http.post(self.endpoint(&path)).send().await?;
        Self::text(response).await
    }

    /// Formats available for `url`, as returned by the sidecar
    pub async fn formats(&self, url: &str) -> Result<serde_json::Value> {
        let response = self
            .http
            .get(self.endpoint("/formats"))
            .query(&[("url", url)])
            .send()
            .await?;
        Self::json(response).await
    }

    /// Resolve direct media URLs for `url`
    ///
    /// HTTP failures and negative answers are not errors: they come back as a
    /// [`ProbeResult`] with `ok == false` and `fallback_url` set to `url`.
    /// Transport errors are still returned as [`Error::Network`].
    pub async fn probe(&self, url: &str) -> Result<ProbeResult> {
        let response = self
            .http
            .get(self.endpoint("/probe"))
            .query(&[("url", url)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url, status = status.as_u16(), "Sidecar probe failed");
            return Ok(ProbeResult::fallback(
                url,
                format!("HTTP {}", status.as_u16()),
            ));
        }

        match response.json::<ProbeResult>().await {
            Ok(result) if result.ok => Ok(result),
            _ => Ok(ProbeResult::fallback(url, "ProbeFailed")),
        }
    }

    async fn json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Sidecar {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn text(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Sidecar {
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }
}
