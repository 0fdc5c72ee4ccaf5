//! Throttles the streaming processor's raw, frequent progress callback down
//! to a bounded rate of durable/notifier-facing updates.
//!
//! Emits an update when any of:
//! (a) percent increased by >= 10 since the last emitted update,
//! (b) this is the first progress sample after start,
//! (c) percent reached 100,
//! (d) >= 2 seconds since the last emitted update and percent advanced at all.

const PERCENT_JUMP_THRESHOLD: u8 = 10;
const TIME_THRESHOLD_SECS: f64 = 2.0;

/// Per-item throttle state. `last_progress`/`last_update_secs` are owned by
/// the callback closure that wraps the streaming processor's raw callback,
/// so each in-flight item has its own, non-shared instance.
pub struct Throttled {
    last_progress: Option<u8>,
    last_update_secs: f64,
}

impl Throttled {
    pub fn new(now_secs: f64) -> Self {
        Self {
            last_progress: None,
            last_update_secs: now_secs,
        }
    }

    /// Returns true if an update should be emitted for `percent` at `now_secs`,
    /// and if so, updates internal state to treat this as the last emission.
    pub fn should_emit(&mut self, percent: u8, now_secs: f64) -> bool {
        let emit = match self.last_progress {
            None => true,
            Some(last) => {
                let advanced = percent > last;
                let jumped = percent.saturating_sub(last) >= PERCENT_JUMP_THRESHOLD;
                let reached_done = percent >= 100 && last < 100;
                let timed_out =
                    advanced && (now_secs - self.last_update_secs) >= TIME_THRESHOLD_SECS;
                jumped || reached_done || timed_out
            }
        };

        if emit {
            self.last_progress = Some(percent);
            self.last_update_secs = now_secs;
        }
        emit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_always_emits() {
        let mut t = Throttled::new(0.0);
        assert!(t.should_emit(1, 0.0));
    }

    #[test]
    fn small_jump_within_time_window_suppressed() {
        let mut t = Throttled::new(0.0);
        t.should_emit(10, 0.0);
        assert!(!t.should_emit(12, 0.5));
    }

    #[test]
    fn jump_of_ten_or_more_emits() {
        let mut t = Throttled::new(0.0);
        t.should_emit(10, 0.0);
        assert!(t.should_emit(20, 0.5));
    }

    #[test]
    fn reaching_100_always_emits() {
        let mut t = Throttled::new(0.0);
        t.should_emit(95, 0.0);
        assert!(t.should_emit(100, 0.1));
    }

    #[test]
    fn two_seconds_elapsed_with_any_advance_emits() {
        let mut t = Throttled::new(0.0);
        t.should_emit(10, 0.0);
        assert!(!t.should_emit(11, 1.0));
        assert!(t.should_emit(12, 2.1));
    }

    #[test]
    fn no_advance_never_emits_even_after_timeout() {
        let mut t = Throttled::new(0.0);
        t.should_emit(10, 0.0);
        assert!(!t.should_emit(10, 5.0));
    }
}
