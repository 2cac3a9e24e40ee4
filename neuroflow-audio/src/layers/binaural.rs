//! Binaural beat generator
//!
//! Left ear gets a pure sine at the carrier frequency, right ear gets
//! carrier plus the beat frequency. The perceived beat only exists in
//! the listener's head, so both channels stay hard-panned and the layer
//! must sit underneath the musical material at low gain.

use crate::ramp::Ramped;
use std::f32::consts::TAU;

pub struct BinauralLayer {
    sample_rate: f32,
    carrier_hz: Ramped,
    beat_hz: Ramped,
    gain: Ramped,
    phase_l: f32,
    phase_r: f32,
}

impl BinauralLayer {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            carrier_hz: Ramped::new(200.0),
            beat_hz: Ramped::new(10.0),
            gain: Ramped::new(0.0),
            phase_l: 0.0,
            phase_r: 0.0,
        }
    }

    pub fn ramp_carrier(&mut self, hz: f32, secs: f32) {
        self.carrier_hz
            .ramp_to(hz.clamp(50.0, 500.0), secs, self.sample_rate);
    }

    pub fn ramp_beat(&mut self, hz: f32, secs: f32) {
        self.beat_hz
            .ramp_to(hz.clamp(0.5, 40.0), secs, self.sample_rate);
    }

    pub fn ramp_gain(&mut self, gain: f32, secs: f32) {
        self.gain
            .ramp_to(gain.clamp(0.0, 1.0), secs, self.sample_rate);
    }

    pub fn carrier_hz(&self) -> f32 {
        self.carrier_hz.value()
    }

    pub fn beat_hz(&self) -> f32 {
        self.beat_hz.value()
    }

    /// Render additively into a stereo interleaved buffer
    pub fn render(&mut self, out: &mut [f32]) {
        for frame in out.chunks_exact_mut(2) {
            let carrier = self.carrier_hz.next();
            let beat = self.beat_hz.next();
            let gain = self.gain.next();

            frame[0] += (self.phase_l * TAU).sin() * gain;
            frame[1] += (self.phase_r * TAU).sin() * gain;

            self.phase_l = (self.phase_l + carrier / self.sample_rate).fract();
            self.phase_r = (self.phase_r + (carrier + beat) / self.sample_rate).fract();
        }
    }

    pub fn reset(&mut self) {
        self.phase_l = 0.0;
        self.phase_r = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels_diverge_by_beat() {
        let mut layer = BinauralLayer::new(48000.0);
        layer.ramp_carrier(200.0, 0.0);
        layer.ramp_beat(10.0, 0.0);
        layer.ramp_gain(1.0, 0.0);

        // After one second the right phase should lead left by exactly
        // the beat frequency in cycles.
        let mut buf = vec![0.0f32; 48000 * 2];
        layer.render(&mut buf);
        let diff = (layer.phase_r - layer.phase_l).rem_euclid(1.0);
        // 10 whole cycles of lead wraps back to zero
        assert!(diff < 1e-2 || diff > 1.0 - 1e-2, "diff = {diff}");
    }

    #[test]
    fn test_silent_at_zero_gain() {
        let mut layer = BinauralLayer::new(48000.0);
        let mut buf = vec![0.0f32; 256];
        layer.render(&mut buf);
        assert!(buf.iter().all(|s| s.abs() < 1e-9));
    }
}
