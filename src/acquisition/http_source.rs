//! HTTP telemetry source
//!
//! Fetches the same JSON document shape served by the logger's
//! `/data/<sensor>/<hours>` endpoints.

use std::time::Duration;

use super::json_source::parse_document;
use super::AcquisitionError;
use crate::types::Sample;

/// HTTP client for logger endpoints with a bounded request timeout.
#[derive(Clone)]
pub struct HttpSource {
    http: reqwest::Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self, AcquisitionError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AcquisitionError::Client)?;
        Ok(Self { http })
    }

    /// GET `url` and decode the body.
    pub async fn fetch(&self, url: &str) -> Result<Vec<Sample>, AcquisitionError> {
        tracing::debug!(url, "fetching telemetry");

        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AcquisitionError::Status {
                url: url.to_string(),
                status,
            });
        }

        let bytes = resp.bytes().await?;
        parse_document(&bytes)
    }
}
