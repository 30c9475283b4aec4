use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("no fresh cache entry under {}", path.display())]
    CacheMiss { path: PathBuf },

    #[error("fetch {url} timed out after {}s", after.as_secs())]
    Timeout { url: String, after: Duration },

    #[error("fetch {url} failed with status {status}")]
    FetchFailed { url: String, status: u16 },

    #[error("invalid date: {0}")]
    InvalidDate(String),

    #[error("batch {batch} failed at job {index}: {source}")]
    BatchFailed {
        batch: usize,
        index: usize,
        #[source]
        source: Box<TrackerError>,
    },

    #[error("batch job did not complete: {0}")]
    Join(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TrackerError {
    pub fn is_cache_miss(&self) -> bool {
        matches!(self, TrackerError::CacheMiss { .. })
    }
}

pub type Result<T> = std::result::Result<T, TrackerError>;
