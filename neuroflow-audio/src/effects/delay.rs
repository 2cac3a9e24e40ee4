//! Stereo delay/echo
//!
//! Interleaved stereo delay line with linear interpolation, a highpass in
//! the feedback path to prevent bass buildup, and smoothed delay time so
//! time changes pitch-bend gently instead of clicking.

use super::Effect;
use crate::ramp::Ramped;
use std::f32::consts::PI;

/// Maximum delay time in seconds
const MAX_DELAY_SECS: f32 = 2.0;

pub struct Delay {
    sample_rate: f32,
    /// Delay buffer (stereo interleaved: L,R,L,R,...)
    buffer: Vec<f32>,
    /// Buffer length in stereo frames
    buffer_frames: usize,
    /// Write position in frames
    write_pos: usize,
    /// Delay time in fractional samples (smoothed toward target)
    delay_samples: f32,
    target_delay: f32,
    /// Smoothing coefficient for delay-time glides
    delay_smooth: f32,
    feedback: f32,
    wet: Ramped,
    /// Highpass filter state for the feedback path
    hp_state_l: f32,
    hp_state_r: f32,
    hp_coeff: f32,
}

impl Delay {
    pub fn new(sample_rate: f32) -> Self {
        let buffer_frames = (sample_rate * MAX_DELAY_SECS) as usize;

        // Highpass at 80Hz keeps repeated lows from accumulating into mud
        let hp_coeff = (-2.0 * PI * 80.0 / sample_rate).exp();

        Self {
            sample_rate,
            buffer: vec![0.0; buffer_frames * 2],
            buffer_frames,
            write_pos: 0,
            delay_samples: sample_rate * 0.3,
            target_delay: sample_rate * 0.3,
            delay_smooth: 0.9995,
            feedback: 0.35,
            wet: Ramped::new(0.0),
            hp_state_l: 0.0,
            hp_state_r: 0.0,
            hp_coeff,
        }
    }

    /// Set delay time in seconds (glides smoothly)
    pub fn set_time_secs(&mut self, secs: f32) {
        let secs = secs.clamp(0.01, MAX_DELAY_SECS - 0.05);
        self.target_delay = secs * self.sample_rate;
    }

    pub fn time_secs(&self) -> f32 {
        self.target_delay / self.sample_rate
    }

    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = feedback.clamp(0.0, 0.95);
    }

    /// Ramp the wet mix over `secs`
    pub fn ramp_wet(&mut self, wet: f32, secs: f32) {
        self.wet
            .ramp_to(wet.clamp(0.0, 1.0), secs, self.sample_rate);
    }

    pub fn wet(&self) -> f32 {
        self.wet.value()
    }

    /// Read from the delay buffer with linear interpolation
    #[inline]
    fn read(&self, delay: f32, channel: usize) -> f32 {
        let max = self.buffer_frames as f32 - 2.0;
        let delay = delay.clamp(1.0, max);
        let read_pos = (self.write_pos as f32 - delay).rem_euclid(self.buffer_frames as f32);
        let i = read_pos as usize % self.buffer_frames;
        let frac = read_pos.fract();
        let a = self.buffer[i * 2 + channel];
        let b = self.buffer[((i + 1) % self.buffer_frames) * 2 + channel];
        a * (1.0 - frac) + b * frac
    }
}

impl Effect for Delay {
    fn process(&mut self, samples: &mut [f32]) {
        for frame in samples.chunks_exact_mut(2) {
            let wet = self.wet.next();

            // Glide delay time toward target
            self.delay_samples =
                self.delay_smooth * self.delay_samples + (1.0 - self.delay_smooth) * self.target_delay;

            let delayed_l = self.read(self.delay_samples, 0);
            let delayed_r = self.read(self.delay_samples, 1);

            // Highpass the feedback signal
            self.hp_state_l = self.hp_coeff * self.hp_state_l + (1.0 - self.hp_coeff) * delayed_l;
            self.hp_state_r = self.hp_coeff * self.hp_state_r + (1.0 - self.hp_coeff) * delayed_r;
            let fb_l = delayed_l - self.hp_state_l;
            let fb_r = delayed_r - self.hp_state_r;

            self.buffer[self.write_pos * 2] = frame[0] + fb_l * self.feedback;
            self.buffer[self.write_pos * 2 + 1] = frame[1] + fb_r * self.feedback;
            self.write_pos = (self.write_pos + 1) % self.buffer_frames;

            frame[0] = frame[0] * (1.0 - wet * 0.5) + delayed_l * wet;
            frame[1] = frame[1] * (1.0 - wet * 0.5) + delayed_r * wet;
        }
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
        self.hp_state_l = 0.0;
        self.hp_state_r = 0.0;
    }

    fn name(&self) -> &'static str {
        "Delay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_clamped() {
        let mut d = Delay::new(48000.0);
        d.set_time_secs(10.0);
        assert!(d.time_secs() < MAX_DELAY_SECS);
        d.set_time_secs(0.0);
        assert!((d.time_secs() - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_echo_appears_at_delay_time() {
        let sr = 1000.0;
        let mut d = Delay::new(sr);
        d.set_time_secs(0.1); // 100 frames
        d.ramp_wet(1.0, 0.0);
        // Let the time glide settle, then feed an impulse
        let mut warm = vec![0.0f32; 2000];
        d.process(&mut warm);
        let mut samples = vec![0.0f32; 600];
        samples[0] = 1.0;
        samples[1] = 1.0;
        d.process(&mut samples);
        // The echo lands around frame 100
        let window: f32 = samples[190..230].iter().map(|s| s.abs()).sum();
        assert!(window > 0.1, "no echo near expected delay time");
    }
}
