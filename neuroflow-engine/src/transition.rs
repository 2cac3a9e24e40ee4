//! ISO-principle transition math and bookkeeping
//!
//! The transition glides every control parameter from a start snapshot
//! (captured from the currently interpolated values, never from the
//! profile the session started with) to the target profile over a
//! multi-minute window. Progress derives from the wall clock captured
//! at transition start, so pausing or late ticks never distort the
//! duration accounting.

use rand::Rng;

use crate::state::ControlSnapshot;

/// Tick cadence of the transition driver
pub const TICK_SECS: f64 = 0.5;
/// Per-tick ramps overlap: 3 s ramps on a 0.5 s cadence
pub const RAMP_SECS: f32 = 3.0;
/// Maximum organic jitter, as a fraction of full progress
const JITTER_MAX: f64 = 0.015;

/// Quintic smootherstep: zero first and second derivative at both ends,
/// so the perceived change starts and finishes imperceptibly.
pub fn smootherstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Bell weight for jitter: exactly 0 at both endpoints, peaking at 1 in
/// the middle, so a transition always starts and lands precisely.
pub fn bell_weight(t: f64) -> f64 {
    4.0 * t * (1.0 - t)
}

/// Eased progress with organic jitter applied mid-flight
pub fn jittered<R: Rng>(eased: f64, t: f64, rng: &mut R) -> f64 {
    let jitter = rng.gen_range(-1.0..1.0) * JITTER_MAX * bell_weight(t);
    (eased + jitter).clamp(0.0, 1.0)
}

/// One in-flight transition. At most one exists; starting a new one
/// replaces it, so only the newest may ever complete.
#[derive(Debug, Clone)]
pub struct Transition {
    pub start: ControlSnapshot,
    pub target: ControlSnapshot,
    pub target_state_id: String,
    pub started_secs: f64,
    pub duration_secs: f64,
    pub next_tick_secs: f64,
}

impl Transition {
    /// Raw progress from wall-clock elapsed, clamped to [0, 1]
    pub fn progress(&self, now_secs: f64) -> f64 {
        if self.duration_secs <= 0.0 {
            return 1.0;
        }
        ((now_secs - self.started_secs) / self.duration_secs).clamp(0.0, 1.0)
    }

    pub fn due(&self, now_secs: f64) -> bool {
        now_secs >= self.next_tick_secs
    }

    pub fn arm_next_tick(&mut self) {
        self.next_tick_secs += TICK_SECS;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn test_smootherstep_endpoints() {
        assert_eq!(smootherstep(0.0), 0.0);
        assert_eq!(smootherstep(1.0), 1.0);
        // Near-zero derivative at the ends
        assert!(smootherstep(0.01) < 1e-4);
        assert!(1.0 - smootherstep(0.99) < 1e-4);
    }

    #[test]
    fn test_smootherstep_monotone() {
        let mut prev = 0.0;
        for i in 0..=100 {
            let v = smootherstep(i as f64 / 100.0);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn test_bell_weight_zero_at_endpoints() {
        assert_eq!(bell_weight(0.0), 0.0);
        assert_eq!(bell_weight(1.0), 0.0);
        assert_eq!(bell_weight(0.5), 1.0);
    }

    #[test]
    fn test_jitter_bounded_and_silent_at_endpoints() {
        let mut rng = StdRng::seed_from_u64(7);
        for i in 0..=100 {
            let t = i as f64 / 100.0;
            let eased = smootherstep(t);
            let j = jittered(eased, t, &mut rng);
            assert!((0.0..=1.0).contains(&j));
            assert!((j - eased).abs() <= JITTER_MAX + 1e-12);
        }
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(jittered(0.0, 0.0, &mut rng), 0.0);
        assert_eq!(jittered(1.0, 1.0, &mut rng), 1.0);
    }
}
