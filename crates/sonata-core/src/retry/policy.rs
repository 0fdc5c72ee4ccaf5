use super::classify::ErrorKind;
use std::time::Duration;

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry; the item should be marked terminally failed.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// The backoff law used to turn a retry count into a delay. The default
/// matches the manager's retry policy (linear); exponential is kept
/// available and tested for callers that want steeper backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffLaw {
    /// `delay = retry_count * base_delay`.
    Linear,
    /// `delay = base_delay * 2^(retry_count - 1)`, capped at `max_delay`.
    Exponential,
}

/// Retry/backoff policy consulted by the result consumer.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of retries before an item is terminally failed.
    /// `retry_count <= max_retries` retries; `retry_count > max_retries` is terminal.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub law: BackoffLaw,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            law: BackoffLaw::Linear,
        }
    }
}

impl RetryPolicy {
    /// Decide whether to retry after `retry_count` failed attempts of kind `kind`.
    /// `retry_count` is the count *after* incrementing for this failure (1-based).
    pub fn decide(&self, retry_count: u32, kind: ErrorKind) -> RetryDecision {
        if !kind.is_retryable() {
            return RetryDecision::NoRetry;
        }
        if retry_count > self.max_retries {
            return RetryDecision::NoRetry;
        }

        let delay = match self.law {
            BackoffLaw::Linear => self.base_delay.saturating_mul(retry_count),
            BackoffLaw::Exponential => {
                let exp = 1u32 << retry_count.saturating_sub(1).min(16);
                self.base_delay.saturating_mul(exp)
            }
        };
        RetryDecision::RetryAfter(delay.min(self.max_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_retryable_kind_never_retries() {
        let p = RetryPolicy::default();
        assert_eq!(
            p.decide(1, ErrorKind::ResourceUnavailable),
            RetryDecision::NoRetry
        );
        assert_eq!(p.decide(1, ErrorKind::Validation), RetryDecision::NoRetry);
        assert_eq!(p.decide(1, ErrorKind::Decryption), RetryDecision::NoRetry);
    }

    #[test]
    fn linear_backoff_matches_retry_count_times_base_delay() {
        let p = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            law: BackoffLaw::Linear,
        };
        assert_eq!(
            p.decide(1, ErrorKind::Network),
            RetryDecision::RetryAfter(Duration::from_secs(2))
        );
        assert_eq!(
            p.decide(2, ErrorKind::Network),
            RetryDecision::RetryAfter(Duration::from_secs(4))
        );
    }

    #[test]
    fn exceeding_max_retries_is_terminal() {
        let p = RetryPolicy {
            max_retries: 3,
            ..RetryPolicy::default()
        };
        assert_eq!(p.decide(4, ErrorKind::Network), RetryDecision::NoRetry);
    }

    #[test]
    fn exponential_backoff_grows_and_caps() {
        let p = RetryPolicy {
            max_retries: 20,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(30),
            law: BackoffLaw::Exponential,
        };
        let d1 = match p.decide(1, ErrorKind::Network) {
            RetryDecision::RetryAfter(d) => d,
            _ => panic!("expected retry"),
        };
        let d2 = match p.decide(2, ErrorKind::Network) {
            RetryDecision::RetryAfter(d) => d,
            _ => panic!("expected retry"),
        };
        assert!(d2 > d1);
        let d_last = match p.decide(15, ErrorKind::Network) {
            RetryDecision::RetryAfter(d) => d,
            _ => panic!("expected retry"),
        };
        assert_eq!(d_last, p.max_delay);
    }
}
