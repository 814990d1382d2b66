//! Parser for yt-dlp progress output
//!
//! yt-dlp is started with `--newline`, so every progress update arrives as its
//! own line on stdout. [`parse_progress_line`] is a pure function: lines that
//! do not carry progress information yield `None` and are ignored by the caller.

use regex::Regex;
use std::sync::LazyLock;

/// `45.2% ... ETA 00:01:10 ... 1.3 MiB/s`
static ETA_THEN_RATE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r"(?P<percent>\d{1,3}(?:\.\d+)?)%.*?ETA\s+(?P<eta>[\d:]+).*?(?P<speed>\d+(?:\.\d+)?\s?[A-Za-z]+/s)")
});

/// `[download]  45.2% of 10.00MiB at 1.30MiB/s ETA 00:07`
static RATE_THEN_ETA: LazyLock<Option<Regex>> = LazyLock::new(|| {
    compile(r"(?P<percent>\d{1,3}(?:\.\d+)?)%.*?(?P<speed>\d+(?:\.\d+)?\s?[A-Za-z]+/s).*?ETA\s+(?P<eta>[\d:]+)")
});

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern)
        .map_err(|e| tracing::error!(pattern, error = %e, "Invalid progress pattern"))
        .ok()
}

/// Progress information extracted from one output line
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressLine {
    /// Percentage in `0.0..=100.0`, or `None` when the printed value is out of range
    pub percent: Option<f64>,
    /// ETA token exactly as printed (e.g. "00:01:10")
    pub eta: String,
    /// Rate token exactly as printed (e.g. "1.3 MiB/s")
    pub speed: String,
}

/// Extract percent, ETA and rate from a downloader output line
///
/// The layout with ETA before the rate is tried first, then the layout yt-dlp
/// prints natively (rate before ETA). Returns `None` for any other line.
///
/// # Examples
///
/// ```
/// use media_dl::progress::parse_progress_line;
///
/// let parsed = parse_progress_line("45.2% ... ETA 00:01:10 ... 1.3 MiB/s").unwrap();
/// assert_eq!(parsed.percent, Some(45.2));
/// assert_eq!(parsed.eta, "00:01:10");
/// assert_eq!(parsed.speed, "1.3 MiB/s");
///
/// assert!(parse_progress_line("[youtube] Extracting URL").is_none());
/// ```
pub fn parse_progress_line(line: &str) -> Option<ProgressLine> {
    [&ETA_THEN_RATE, &RATE_THEN_ETA]
        .into_iter()
        .filter_map(|pattern| pattern.as_ref())
        .find_map(|pattern| pattern.captures(line))
        .map(|caps| ProgressLine {
            percent: caps
                .name("percent")
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .filter(|p| (0.0..=100.0).contains(p)),
            eta: caps
                .name("eta")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            speed: caps
                .name("speed")
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
        })
}
