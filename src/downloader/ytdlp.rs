//! yt-dlp discovery and invocation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::config::Config;

/// Name looked up on PATH and used as-is when discovery fails
const YTDLP_BINARY: &str = "yt-dlp";

/// How yt-dlp is invoked for every task
#[derive(Clone, Debug)]
pub struct YtDlp {
    binary: PathBuf,
    output: PathBuf,
}

impl YtDlp {
    /// Create an invocation with an explicit binary and output location
    ///
    /// `output` is passed to `-o` and is usually `<download_root>/<template>`.
    pub fn new(binary: PathBuf, output: PathBuf) -> Self {
        Self { binary, output }
    }

    /// Build the invocation from configuration
    ///
    /// The binary is the configured `ytdlp_path`, else the PATH match for
    /// `yt-dlp` (when `search_path` is enabled), else the bare name. A binary
    /// that cannot be found only fails the tasks that try to run it.
    pub fn from_config(config: &Config) -> Self {
        let binary = if let Some(ref path) = config.tools.ytdlp_path {
            path.clone()
        } else if config.tools.search_path {
            which::which(YTDLP_BINARY).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "yt-dlp not found in PATH, tasks will fail until it is installed");
                PathBuf::from(YTDLP_BINARY)
            })
        } else {
            PathBuf::from(YTDLP_BINARY)
        };

        let output = config
            .download_root()
            .join(&config.download.output_template);

        Self::new(binary, output)
    }

    /// Binary that will be executed
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Arguments for downloading `url`, in order
    pub fn args(&self, url: &str) -> Vec<OsString> {
        vec![
            "--newline".into(),
            "--progress".into(),
            "--print-json".into(),
            "-o".into(),
            self.output.clone().into_os_string(),
            url.into(),
        ]
    }

    /// Ready-to-spawn command with stdout/stderr piped and stdin closed
    ///
    /// The child is killed if the handle is dropped before it exits.
    pub fn command(&self, url: &str) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(self.args(url))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}
