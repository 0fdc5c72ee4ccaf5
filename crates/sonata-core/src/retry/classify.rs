//! Error taxonomy consumed by the retry policy (see the error handling design).

/// High-level classification of a handler error for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network/transport failure: retryable, increments `retry_count`.
    Network,
    /// Adapter asked us to slow down: retryable after its suggested wait.
    RateLimited,
    /// Credential expired; retryable after the adapter refreshes once per window.
    Authentication,
    /// Track not downloadable at any quality after fallback: terminal.
    ResourceUnavailable,
    /// Stream integrity/decryption failure: terminal, usually a key mismatch.
    Decryption,
    /// Bad input (empty id, invalid quality): terminal, not counted as a retry.
    Validation,
    /// Pause requested: not an error for accounting purposes.
    Paused,
}

impl ErrorKind {
    /// Whether this kind is ever retryable, independent of attempt count.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ErrorKind::Network | ErrorKind::RateLimited | ErrorKind::Authentication
        )
    }
}

/// Classify an HTTP status code returned by the streaming processor or the
/// catalog client into a retry-relevant [`ErrorKind`].
pub fn classify_http_status(code: u32) -> ErrorKind {
    match code {
        401 | 403 => ErrorKind::Authentication,
        429 => ErrorKind::RateLimited,
        404 | 410 => ErrorKind::ResourceUnavailable,
        500..=599 => ErrorKind::Network,
        _ => ErrorKind::Validation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_classification() {
        assert_eq!(classify_http_status(429), ErrorKind::RateLimited);
        assert_eq!(classify_http_status(401), ErrorKind::Authentication);
        assert_eq!(classify_http_status(404), ErrorKind::ResourceUnavailable);
        assert_eq!(classify_http_status(503), ErrorKind::Network);
    }

    #[test]
    fn retryability() {
        assert!(ErrorKind::Network.is_retryable());
        assert!(ErrorKind::RateLimited.is_retryable());
        assert!(ErrorKind::Authentication.is_retryable());
        assert!(!ErrorKind::ResourceUnavailable.is_retryable());
        assert!(!ErrorKind::Decryption.is_retryable());
        assert!(!ErrorKind::Validation.is_retryable());
        assert!(!ErrorKind::Paused.is_retryable());
    }
}
