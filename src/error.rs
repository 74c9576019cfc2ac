use thiserror::Error;

pub type Result<T> = std::result::Result<T, FanoutError>;

/// Errors raised by the crate itself.
///
/// Failures of caller-supplied operations are never wrapped in this type; the
/// call patterns hand the caller's own error straight back.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FanoutError {
    #[error("invalid concurrency limit {0}: must be at least 1")]
    InvalidLimit(i64),
    #[error("{0}")]
    Other(String),
}

/* Conversions so `?` works smoothly */
impl From<std::num::ParseIntError> for FanoutError {
    fn from(e: std::num::ParseIntError) -> Self {
        FanoutError::Other(e.to_string())
    }
}
impl From<std::io::Error> for FanoutError {
    fn from(e: std::io::Error) -> Self {
        FanoutError::Other(e.to_string())
    }
}
impl From<serde_json::Error> for FanoutError {
    fn from(e: serde_json::Error) -> Self {
        FanoutError::Other(e.to_string())
    }
}
