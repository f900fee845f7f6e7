//! Error types for vitals_attribution.
//!
//! The attribution math itself is infallible. Errors only surface at the
//! boundaries of the engine: malformed feed input, bad configuration, or a
//! second installation of the same engine.
//!
//! # Examples
//!
//! ```rust
//! use vitals_attribution::{Result, VitalsError, VitalsEngine};
//!
//! fn ingest(engine: &mut VitalsEngine, json: &str) -> Result<usize> {
//!     Ok(engine.ingest_event_json(json)?.len())
//! }
//!
//! let mut engine = VitalsEngine::default();
//! match ingest(&mut engine, "not json") {
//!     Err(VitalsError::Json(e)) => eprintln!("bad batch: {}", e),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

use thiserror::Error;

/// Result type alias for vitals_attribution operations.
///
/// This is a convenience alias for `std::result::Result<T, VitalsError>`.
pub type Result<T> = std::result::Result<T, VitalsError>;

/// Errors that can occur while feeding or configuring the engine.
///
/// # Variants
///
/// - [`VitalsError::InvalidEntry`]: A timing field was negative or not finite
/// - [`VitalsError::InvalidConfig`]: An [`EngineConfig`](crate::EngineConfig) failed validation
/// - [`VitalsError::Json`]: A JSON batch could not be decoded
/// - [`VitalsError::AlreadyInstalled`]: The engine was installed twice
/// - [`VitalsError::UnknownMetric`]: A metric name was not recognised
#[derive(Debug, Error)]
pub enum VitalsError {
    /// A timing entry carried a field the engine cannot reason about.
    ///
    /// Browsers only report finite, non-negative high-resolution timestamps.
    /// Anything else is dropped at the feed boundary before grouping.
    #[error("Invalid timing entry: {field}={value}")]
    InvalidEntry {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// Configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A JSON batch could not be decoded.
    ///
    /// Automatically converted from [`serde_json::Error`] via `From`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The engine already has its primary listener installed.
    ///
    /// Initialization code that runs twice on the same page must not
    /// register a second listener, otherwise every interaction is
    /// reported twice.
    #[error("Engine is already installed")]
    AlreadyInstalled,

    /// A metric name did not match any known Web Vital.
    #[error("Unknown metric: {0}")]
    UnknownMetric(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<Vec<u32>>("[1,").unwrap_err();
        let err: VitalsError = json_err.into();

        assert!(matches!(err, VitalsError::Json(_)));
        assert!(err.to_string().contains("JSON error"));
    }

    #[test]
    fn test_invalid_entry_error_message() {
        let err = VitalsError::InvalidEntry {
            field: "duration",
            value: -8.0,
        };
        let msg = err.to_string();

        assert!(msg.contains("duration"));
        assert!(msg.contains("-8"));
    }

    #[test]
    fn test_already_installed_error() {
        let err = VitalsError::AlreadyInstalled;
        assert!(err.to_string().contains("already installed"));
    }

    #[test]
    fn test_unknown_metric_error() {
        let err = VitalsError::UnknownMetric("tbt".to_string());
        let msg = err.to_string();

        assert!(msg.contains("Unknown metric"));
        assert!(msg.contains("tbt"));
    }
}
