//! Telemetry document codec
//!
//! The logger exports each sensor as a single-element JSON array whose `data`
//! field holds `[timestamp_ms, value]` pairs:
//!
//! ```json
//! [{"data": [[1700000000000, 412.5], [1700000060000, 418.0]]}]
//! ```
//!
//! Timestamps may arrive as integers or floats; values may be `null` when a
//! reading was lost.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use super::AcquisitionError;
use crate::types::Sample;

#[derive(Debug, Deserialize)]
struct RawSeries {
    data: Vec<(serde_json::Number, Option<f64>)>,
}

#[derive(Debug, Serialize)]
struct OutSeries<'a> {
    data: Vec<(i64, f64)>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

/// Decode a telemetry document into time-ordered, finite samples.
pub fn parse_document(bytes: &[u8]) -> Result<Vec<Sample>, AcquisitionError> {
    let document: Vec<RawSeries> = serde_json::from_slice(bytes)?;
    let series = document
        .into_iter()
        .next()
        .ok_or(AcquisitionError::EmptyDocument)?;

    let raw: Vec<Sample> = series
        .data
        .into_iter()
        .filter_map(|(ts, value)| {
            let timestamp_ms = ts.as_i64().or_else(|| ts.as_f64().map(|f| f.round() as i64))?;
            Some(Sample::new(timestamp_ms, value.unwrap_or(f64::NAN)))
        })
        .collect();

    Ok(sanitize(raw))
}

/// Drop non-finite values and restore timestamp order (stable, so equal
/// timestamps keep their arrival order).
pub fn sanitize(mut samples: Vec<Sample>) -> Vec<Sample> {
    let before = samples.len();
    samples.retain(|s| s.value.is_finite());
    let dropped = before - samples.len();
    if dropped > 0 {
        warn!(dropped, "dropped non-finite samples");
    }

    if samples.windows(2).any(|w| w[1].timestamp_ms < w[0].timestamp_ms) {
        warn!(samples = samples.len(), "samples out of order, sorting by timestamp");
        samples.sort_by_key(|s| s.timestamp_ms);
    }

    samples
}

/// Encode samples in the logger's document shape.
pub fn encode_document(samples: &[Sample], name: Option<&str>) -> Result<Vec<u8>, AcquisitionError> {
    let series = OutSeries {
        data: samples.iter().map(|s| (s.timestamp_ms, s.value)).collect(),
        name,
    };
    Ok(serde_json::to_vec(&[series])?)
}

/// Read and decode a document from disk.
pub async fn read_file(path: &Path) -> Result<Vec<Sample>, AcquisitionError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| AcquisitionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_document(&bytes)
}

/// Encode and write a document to disk.
pub async fn write_file(path: &Path, samples: &[Sample], name: Option<&str>) -> Result<(), AcquisitionError> {
    let bytes = encode_document(samples, name)?;
    tokio::fs::write(path, bytes)
        .await
        .map_err(|source| AcquisitionError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_document() {
        let samples = parse_document(br#"[{"data": [[0, 10.0], [2000, 20]]}]"#).unwrap();
        assert_eq!(samples, vec![Sample::new(0, 10.0), Sample::new(2000, 20.0)]);
    }

    #[test]
    fn test_float_timestamps_and_nulls() {
        let samples =
            parse_document(br#"[{"data": [[1000.4, 1.0], [2000, null], [3000.6, 3.0]]}]"#).unwrap();
        assert_eq!(samples, vec![Sample::new(1000, 1.0), Sample::new(3001, 3.0)]);
    }

    #[test]
    fn test_out_of_order_is_sorted_stably() {
        let samples = parse_document(br#"[{"data": [[30, 3.0], [10, 1.0], [30, 4.0], [20, 2.0]]}]"#).unwrap();
        let order: Vec<f64> = samples.iter().map(|s| s.value).collect();
        assert_eq!(order, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_empty_document_is_error() {
        assert!(matches!(parse_document(b"[]"), Err(AcquisitionError::EmptyDocument)));
    }

    #[test]
    fn test_malformed_document_is_error() {
        assert!(matches!(
            parse_document(br#"{"data": []}"#),
            Err(AcquisitionError::Parse(_))
        ));
        assert!(matches!(
            parse_document(br#"[{"values": []}]"#),
            Err(AcquisitionError::Parse(_))
        ));
    }

    #[test]
    fn test_encode_matches_logger_shape() {
        let bytes = encode_document(&[Sample::new(5, 1.5)], None).unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), r#"[{"data":[[5,1.5]]}]"#);
        assert_eq!(parse_document(&bytes).unwrap(), vec![Sample::new(5, 1.5)]);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("power.json");
        let samples = vec![Sample::new(0, 400.0), Sample::new(60_000, 4_900.0)];

        tokio_test::block_on(write_file(&path, &samples, Some("power"))).unwrap();
        let read = tokio_test::block_on(read_file(&path)).unwrap();
        assert_eq!(read, samples);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = tokio_test::block_on(read_file(Path::new("/nonexistent/power.json"))).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/power.json"));
    }
}
