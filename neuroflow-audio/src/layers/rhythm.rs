//! Percussive rhythm voice
//!
//! Short white-noise bursts with an exponential amplitude decay, shaped
//! by a bandpass biquad around 3 kHz. One-shot, retriggered by the
//! sequencer; a retrigger simply restarts the envelope.

use crate::effects::{Effect, Filter, FilterType};
use crate::noise::XorShift64;
use crate::ramp::Ramped;

pub struct RhythmLayer {
    sample_rate: f32,
    gain: Ramped,
    filter: Filter,
    rng: XorShift64,

    env: f32,
    decay: f32,
    velocity: f32,
    active: bool,
    scratch: Vec<f32>,
}

impl RhythmLayer {
    const CENTER_HZ: f32 = 3000.0;
    const BURST_SECS: f32 = 0.06;

    pub fn new(sample_rate: f32) -> Self {
        let mut filter = Filter::new(sample_rate, FilterType::BandPass, Self::CENTER_HZ);
        filter.set_resonance(2.0);
        Self {
            sample_rate,
            gain: Ramped::new(0.0),
            filter,
            rng: XorShift64::new(0x5EED_1234),
            env: 0.0,
            decay: (-1.0 / (Self::BURST_SECS * sample_rate)).exp(),
            velocity: 0.0,
            active: false,
            scratch: Vec::new(),
        }
    }

    pub fn ramp_gain(&mut self, gain: f32, secs: f32) {
        self.gain
            .ramp_to(gain.clamp(0.0, 1.0), secs, self.sample_rate);
    }

    /// Fire a hit at the given velocity (0-1)
    pub fn trigger(&mut self, velocity: f32) {
        self.velocity = velocity.clamp(0.0, 1.0);
        self.env = 1.0;
        self.active = true;
    }

    pub fn render(&mut self, out: &mut [f32]) {
        if !self.active {
            for _ in out.chunks_exact(2) {
                self.gain.next();
            }
            return;
        }

        if self.scratch.len() != out.len() {
            self.scratch.resize(out.len(), 0.0);
        }
        for frame in self.scratch.chunks_exact_mut(2) {
            let burst = self.rng.next_bipolar() * self.env;
            frame[0] = burst;
            frame[1] = burst;
            self.env *= self.decay;
        }
        self.filter.process(&mut self.scratch);

        for (o, s) in out.chunks_exact_mut(2).zip(self.scratch.chunks_exact(2)) {
            let g = self.gain.next() * self.velocity;
            o[0] += s[0] * g;
            o[1] += s[1] * g;
        }

        if self.env < 1e-4 {
            self.active = false;
        }
    }

    pub fn reset(&mut self) {
        self.active = false;
        self.env = 0.0;
        self.filter.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_decays_to_silence() {
        let mut layer = RhythmLayer::new(48000.0);
        layer.ramp_gain(1.0, 0.0);
        layer.trigger(0.8);

        let mut buf = vec![0.0f32; 2048];
        layer.render(&mut buf);
        let early_peak = buf.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(early_peak > 0.05, "early_peak = {early_peak}");

        // Half a second later the burst must be gone
        for _ in 0..12 {
            buf.fill(0.0);
            layer.render(&mut buf);
        }
        buf.fill(0.0);
        layer.render(&mut buf);
        let late_peak = buf.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(late_peak < 1e-3, "late_peak = {late_peak}");
    }

    #[test]
    fn test_silent_until_triggered() {
        let mut layer = RhythmLayer::new(48000.0);
        layer.ramp_gain(1.0, 0.0);
        let mut buf = vec![0.0f32; 512];
        layer.render(&mut buf);
        assert!(buf.iter().all(|s| s.abs() < 1e-9));
    }
}
