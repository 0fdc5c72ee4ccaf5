//! Per-item pause-flag registry (§4.2, §4.4.5), generalizing the teacher's
//! `control::JobControl` (which only tracked `register`/`unregister`/
//! `request_abort`) with an explicit pause/cancel distinction: cancellation
//! runs straight through the worker pool's per-job `CancellationToken`, while
//! pause needs durable state the scavenger consults *before* resubmitting an
//! item, independent of whether a worker currently holds it.

use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Default)]
pub struct JobControl {
    paused: Mutex<HashSet<String>>,
}

impl JobControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_pause(&self, id: &str) {
        self.paused.lock().unwrap().insert(id.to_string());
    }

    pub fn clear_pause(&self, id: &str) {
        self.paused.lock().unwrap().remove(id);
    }

    pub fn is_paused(&self, id: &str) -> bool {
        self.paused.lock().unwrap().contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pause_then_clear_roundtrip() {
        let control = JobControl::new();
        assert!(!control.is_paused("track_1"));
        control.request_pause("track_1");
        assert!(control.is_paused("track_1"));
        control.clear_pause("track_1");
        assert!(!control.is_paused("track_1"));
    }
}
