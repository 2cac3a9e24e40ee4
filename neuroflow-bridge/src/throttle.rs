//! Per-source log rate limiting
//!
//! Some engine sources (binaural frequency updates, per-tick progress
//! detail) would flood the host with LOG messages. The throttle lets
//! one through per source per interval and silently drops the rest.

use std::collections::HashMap;

pub struct LogThrottle {
    interval_secs: f64,
    last_emit: HashMap<String, f64>,
}

impl LogThrottle {
    pub const DEFAULT_INTERVAL_SECS: f64 = 10.0;

    pub fn new() -> Self {
        Self::with_interval(Self::DEFAULT_INTERVAL_SECS)
    }

    pub fn with_interval(interval_secs: f64) -> Self {
        Self {
            interval_secs,
            last_emit: HashMap::new(),
        }
    }

    /// True when a message from `source` may go out now
    pub fn allow(&mut self, source: &str, now_secs: f64) -> bool {
        match self.last_emit.get(source) {
            Some(&last) if now_secs - last < self.interval_secs => false,
            _ => {
                self.last_emit.insert(source.to_string(), now_secs);
                true
            }
        }
    }
}

impl Default for LogThrottle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_message_passes() {
        let mut throttle = LogThrottle::new();
        assert!(throttle.allow("binaural", 0.0));
    }

    #[test]
    fn test_rapid_repeats_blocked_until_interval() {
        let mut throttle = LogThrottle::with_interval(10.0);
        assert!(throttle.allow("binaural", 0.0));
        assert!(!throttle.allow("binaural", 5.0));
        assert!(!throttle.allow("binaural", 9.99));
        assert!(throttle.allow("binaural", 10.0));
    }

    #[test]
    fn test_sources_are_independent() {
        let mut throttle = LogThrottle::new();
        assert!(throttle.allow("binaural", 0.0));
        assert!(throttle.allow("sequencer", 1.0));
        assert!(!throttle.allow("binaural", 2.0));
    }
}
