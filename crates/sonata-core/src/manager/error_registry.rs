//! Bridges `ManagerError`'s classification across the `WorkerPool` boundary.
//!
//! `JobResult.error` is a plain string (the pool is generic over any
//! handler's error type and only ever stringifies it), so the handler
//! dispatcher records each job's `ErrorKind` here immediately before
//! returning, and `result_consumer` reads it back by job id rather than
//! re-parsing the error string.

use crate::retry::ErrorKind;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct ErrorRegistry {
    inner: Mutex<HashMap<String, ErrorKind>>,
}

impl ErrorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, job_id: &str, kind: ErrorKind) {
        self.inner.lock().unwrap().insert(job_id.to_string(), kind);
    }

    /// Take (remove) the recorded kind for `job_id`, if any.
    pub fn take(&self, job_id: &str) -> Option<ErrorKind> {
        self.inner.lock().unwrap().remove(job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_then_take_returns_and_clears() {
        let reg = ErrorRegistry::new();
        reg.record("track_1", ErrorKind::RateLimited);
        assert_eq!(reg.take("track_1"), Some(ErrorKind::RateLimited));
        assert_eq!(reg.take("track_1"), None);
    }

    #[test]
    fn take_on_unknown_job_is_none() {
        let reg = ErrorRegistry::new();
        assert_eq!(reg.take("nope"), None);
    }
}
