//! Linearly ramped parameter values
//!
//! Audible parameters never jump: every change is spread over a requested
//! duration at sample rate. Consecutive ramps simply retarget from the
//! current value, so overlapping per-tick ramps produce continuous motion.

/// A parameter that moves linearly toward its target, one sample at a time
#[derive(Debug, Clone, Copy)]
pub struct Ramped {
    current: f32,
    target: f32,
    step: f32,
}

impl Ramped {
    pub fn new(value: f32) -> Self {
        Self {
            current: value,
            target: value,
            step: 0.0,
        }
    }

    /// Jump immediately (initialization and non-audible resets only)
    pub fn set(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.step = 0.0;
    }

    /// Begin a linear ramp toward `target` lasting `secs`
    pub fn ramp_to(&mut self, target: f32, secs: f32, sample_rate: f32) {
        self.target = target;
        let samples = (secs * sample_rate).max(1.0);
        self.step = (target - self.current) / samples;
    }

    /// Advance by one sample and return the new value
    #[inline]
    pub fn next(&mut self) -> f32 {
        if self.step != 0.0 {
            self.current += self.step;
            // Stop exactly on target, never overshoot
            if (self.step > 0.0 && self.current >= self.target)
                || (self.step < 0.0 && self.current <= self.target)
            {
                self.current = self.target;
                self.step = 0.0;
            }
        }
        self.current
    }

    /// Current value without advancing
    pub fn value(&self) -> f32 {
        self.current
    }

    /// The value the ramp is heading toward
    pub fn target(&self) -> f32 {
        self.target
    }

    /// True once the ramp has settled on its target
    pub fn settled(&self) -> bool {
        self.step == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_reaches_target_exactly() {
        let mut r = Ramped::new(0.0);
        r.ramp_to(1.0, 0.001, 1000.0); // one sample
        assert_eq!(r.next(), 1.0);
        assert!(r.settled());
        assert_eq!(r.next(), 1.0);
    }

    #[test]
    fn test_ramp_is_monotonic() {
        let mut r = Ramped::new(0.2);
        r.ramp_to(0.8, 0.01, 1000.0); // 10 samples
        let mut prev = r.value();
        for _ in 0..20 {
            let v = r.next();
            assert!(v >= prev);
            prev = v;
        }
        assert_eq!(r.value(), 0.8);
    }

    #[test]
    fn test_retarget_mid_ramp_continues_from_current() {
        let mut r = Ramped::new(0.0);
        r.ramp_to(1.0, 0.01, 1000.0);
        for _ in 0..5 {
            r.next();
        }
        let mid = r.value();
        assert!(mid > 0.0 && mid < 1.0);
        r.ramp_to(0.0, 0.01, 1000.0);
        assert!(r.next() < mid);
    }
}
