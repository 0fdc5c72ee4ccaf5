//! The error taxonomy handlers return (§7). `manager::result_consumer` is the
//! sole place that turns a `ManagerError` into a retry-vs-terminal decision;
//! handlers never decide that themselves, they only classify.

use crate::retry::{classify_http_status, ErrorKind};
use crate::streaming::StreamingError;

#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("paused")]
    Paused,
    #[error("network error: {0}")]
    Network(String),
    #[error("rate limited: {0}")]
    RateLimited(String),
    #[error("authentication error: {0}")]
    Authentication(String),
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(String),
    #[error("decryption/integrity error: {0}")]
    Decryption(String),
    #[error("validation error: {0}")]
    Validation(String),
}

impl ManagerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ManagerError::Paused => ErrorKind::Paused,
            ManagerError::Network(_) => ErrorKind::Network,
            ManagerError::RateLimited(_) => ErrorKind::RateLimited,
            ManagerError::Authentication(_) => ErrorKind::Authentication,
            ManagerError::ResourceUnavailable(_) => ErrorKind::ResourceUnavailable,
            ManagerError::Decryption(_) => ErrorKind::Decryption,
            ManagerError::Validation(_) => ErrorKind::Validation,
        }
    }

    /// Classify an HTTP status from the catalog or streaming processor into
    /// the matching `ManagerError` variant, keeping the message alongside.
    pub fn from_http_status(code: u32, context: &str) -> Self {
        match classify_http_status(code) {
            ErrorKind::Authentication => ManagerError::Authentication(format!("{context}: HTTP {code}")),
            ErrorKind::RateLimited => ManagerError::RateLimited(format!("{context}: HTTP {code}")),
            ErrorKind::ResourceUnavailable => {
                ManagerError::ResourceUnavailable(format!("{context}: HTTP {code}"))
            }
            ErrorKind::Network => ManagerError::Network(format!("{context}: HTTP {code}")),
            _ => ManagerError::Validation(format!("{context}: HTTP {code}")),
        }
    }
}

impl From<StreamingError> for ManagerError {
    fn from(err: StreamingError) -> Self {
        match err {
            StreamingError::Cancelled => ManagerError::Paused,
            StreamingError::Http(code) => ManagerError::from_http_status(code, "stream"),
            StreamingError::Network(msg) => ManagerError::Network(msg),
            StreamingError::ShortRead { expected, received } => ManagerError::Network(format!(
                "short read: expected {expected} bytes, got {received}"
            )),
            StreamingError::Storage(msg) => ManagerError::Network(format!("storage: {msg}")),
        }
    }
}

/// Database errors from the queue store are treated as transient/retryable
/// network-class failures -- a lock contention or disk hiccup isn't a
/// terminal judgment about the item itself.
pub fn store_err(err: anyhow::Error) -> ManagerError {
    ManagerError::Network(format!("store error: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_maps_to_matching_kind() {
        assert_eq!(ManagerError::from_http_status(429, "x").kind(), ErrorKind::RateLimited);
        assert_eq!(ManagerError::from_http_status(401, "x").kind(), ErrorKind::Authentication);
        assert_eq!(ManagerError::from_http_status(404, "x").kind(), ErrorKind::ResourceUnavailable);
        assert_eq!(ManagerError::from_http_status(503, "x").kind(), ErrorKind::Network);
    }

    #[test]
    fn cancelled_stream_error_maps_to_paused() {
        let err: ManagerError = StreamingError::Cancelled.into();
        assert_eq!(err.kind(), ErrorKind::Paused);
    }

    #[test]
    fn short_read_is_network_classified_and_retryable() {
        let err: ManagerError = StreamingError::ShortRead {
            expected: 100,
            received: 50,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Network);
        assert!(err.kind().is_retryable());
    }
}
