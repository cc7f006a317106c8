//! Shared error and result types for dxgate.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, ReviewError>;

/// Error types surfaced by the review core
///
/// Validation failures are detected before any warehouse call. Warehouse
/// failures are propagated without retry. Every variant maps to exactly one
/// external status at the route layer without the core knowing about HTTP.
#[derive(Debug, Error)]
pub enum ReviewError {
    /// A filter input failed validation before query construction
    #[error("invalid filter value: {0}")]
    InvalidFilterValue(String),

    /// The backing warehouse rejected or failed a call
    #[error("backing service error: {0}")]
    BackingService(String),

    /// The listing query matched no rows
    #[error("no records matched the supplied criteria")]
    EmptyResult,

    /// An audit entry carried a timestamp that could not be parsed
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// I/O error (listener setup, shutdown)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReviewError {
    /// Stable machine-readable kind for error payloads
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidFilterValue(_) => "invalid_filter_value",
            Self::BackingService(_) => "backing_service_error",
            Self::EmptyResult => "empty_result",
            Self::InvalidTimestamp(_) => "invalid_timestamp",
            Self::Io(_) => "io_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_stable() {
        assert_eq!(
            ReviewError::InvalidFilterValue("x".into()).kind(),
            "invalid_filter_value"
        );
        assert_eq!(ReviewError::EmptyResult.kind(), "empty_result");
        assert_eq!(
            ReviewError::BackingService("down".into()).kind(),
            "backing_service_error"
        );
        assert_eq!(
            ReviewError::InvalidTimestamp("nope".into()).kind(),
            "invalid_timestamp"
        );
    }

    #[test]
    fn test_display_carries_detail() {
        let err = ReviewError::InvalidFilterValue("cycle 'abc' is not an integer".into());
        assert!(err.to_string().contains("abc"));
    }
}
