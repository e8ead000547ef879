//! Telemetry acquisition
//!
//! Loads `[timestamp_ms, value]` series from local JSON documents or from
//! the logger's HTTP endpoints. All I/O happens here, before any analysis;
//! the processing core never touches a file or socket.

mod http_source;
mod json_source;

pub use http_source::HttpSource;
pub use json_source::{encode_document, parse_document, read_file, sanitize, write_file};

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::types::Sample;

/// Acquisition errors
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("Malformed telemetry document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Telemetry document contains no series")]
    EmptyDocument,
}

/// Where a series comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Http(String),
}

impl FromStr for Source {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(Source::Http(s.to_string()))
        } else {
            Ok(Source::File(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Http(url) => write!(f, "{url}"),
        }
    }
}

/// Loads sources, sharing one HTTP client across fetches.
pub struct Loader {
    http: HttpSource,
}

impl Loader {
    pub fn new(timeout: Duration) -> Result<Self, AcquisitionError> {
        Ok(Self {
            http: HttpSource::new(timeout)?,
        })
    }

    pub async fn load(&self, source: &Source) -> Result<Vec<Sample>, AcquisitionError> {
        let samples = match source {
            Source::File(path) => read_file(path).await?,
            Source::Http(url) => self.http.fetch(url).await?,
        };
        tracing::info!(%source, samples = samples.len(), "series loaded");
        Ok(samples)
    }

    /// Load a source, reporting failure as a warning and an empty result.
    pub async fn load_or_empty(&self, source: &Source) -> Vec<Sample> {
        match self.load(source).await {
            Ok(samples) => samples,
            Err(e) => {
                tracing::warn!(%source, error = %e, "acquisition failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_from_str() {
        assert_eq!(
            "http://falcon/data/power-W/48".parse::<Source>().unwrap(),
            Source::Http("http://falcon/data/power-W/48".to_string())
        );
        assert!(matches!("HTTPS://x/y".parse::<Source>().unwrap(), Source::Http(_)));
        assert_eq!(
            "data/power.json".parse::<Source>().unwrap(),
            Source::File(PathBuf::from("data/power.json"))
        );
    }

    #[test]
    fn test_loader_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("temp.json");
        std::fs::write(&path, r#"[{"data": [[0, 120.5], [60000, 121.0]]}]"#).unwrap();

        let loader = Loader::new(Duration::from_secs(1)).unwrap();
        let samples = tokio_test::block_on(loader.load(&Source::File(path))).unwrap();
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn test_load_or_empty_swallows_failure() {
        let loader = Loader::new(Duration::from_secs(1)).unwrap();
        let samples = tokio_test::block_on(
            loader.load_or_empty(&Source::File(PathBuf::from("/nonexistent/x.json"))),
        );
        assert!(samples.is_empty());
    }
}
