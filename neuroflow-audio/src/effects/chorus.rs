//! Chorus - LFO-modulated short delay for width and shimmer
//!
//! A longer-delay cousin of a flanger: ~12ms base delay swept by a slow
//! sine LFO, with quadrature phase between channels for stereo spread.

use super::Effect;
use crate::ramp::Ramped;
use std::f32::consts::PI;

pub struct Chorus {
    sample_rate: f32,

    /// LFO rate in Hz
    rate: f32,
    /// LFO phase (0-1)
    lfo_phase: f32,
    lfo_inc: f32,

    /// Modulation depth in samples
    depth_samples: f32,
    /// Base delay in samples
    base_delay_samples: f32,

    wet: Ramped,

    /// Delay buffer (stereo interleaved)
    buffer: Vec<f32>,
    buffer_frames: usize,
    write_pos: usize,
}

impl Chorus {
    /// Maximum modulated delay: 30ms
    const MAX_DELAY_SECS: f32 = 0.03;

    pub fn new(sample_rate: f32) -> Self {
        let buffer_frames = (sample_rate * Self::MAX_DELAY_SECS) as usize + 4;
        let rate = 1.5;
        Self {
            sample_rate,
            rate,
            lfo_phase: 0.0,
            lfo_inc: rate / sample_rate,
            depth_samples: sample_rate * 0.004,
            base_delay_samples: sample_rate * 0.012,
            wet: Ramped::new(0.0),
            buffer: vec![0.0; buffer_frames * 2],
            buffer_frames,
            write_pos: 0,
        }
    }

    /// Set LFO rate in Hz
    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate.clamp(0.05, 5.0);
        self.lfo_inc = self.rate / self.sample_rate;
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Ramp the wet mix over `secs`
    pub fn ramp_wet(&mut self, wet: f32, secs: f32) {
        self.wet
            .ramp_to(wet.clamp(0.0, 1.0), secs, self.sample_rate);
    }

    pub fn wet(&self) -> f32 {
        self.wet.value()
    }

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

impl Effect for Chorus {
    fn process(&mut self, samples: &mut [f32]) {
        for frame in samples.chunks_exact_mut(2) {
            let wet = self.wet.next();

            // Quadrature LFOs: right channel 90 degrees behind left
            let lfo_l = (self.lfo_phase * 2.0 * PI).sin();
            let lfo_r = ((self.lfo_phase + 0.25) * 2.0 * PI).sin();
            self.lfo_phase = (self.lfo_phase + self.lfo_inc).fract();

            let delay_l = self.base_delay_samples + lfo_l * self.depth_samples;
            let delay_r = self.base_delay_samples + lfo_r * self.depth_samples;

            self.buffer[self.write_pos * 2] = frame[0];
            self.buffer[self.write_pos * 2 + 1] = frame[1];
            self.write_pos = (self.write_pos + 1) % self.buffer_frames;

            let wet_l = self.read(delay_l, 0);
            let wet_r = self.read(delay_r, 1);

            frame[0] = frame[0] * (1.0 - wet * 0.5) + wet_l * wet;
            frame[1] = frame[1] * (1.0 - wet * 0.5) + wet_r * wet;
        }
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
        self.lfo_phase = 0.0;
    }

    fn name(&self) -> &'static str {
        "Chorus"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_clamped() {
        let mut c = Chorus::new(48000.0);
        c.set_rate(100.0);
        assert_eq!(c.rate(), 5.0);
        c.set_rate(0.0);
        assert_eq!(c.rate(), 0.05);
    }

    #[test]
    fn test_dry_passthrough_at_zero_wet() {
        let mut c = Chorus::new(48000.0);
        let mut samples = vec![0.5f32; 128];
        c.process(&mut samples);
        for s in &samples {
            assert!((s - 0.5).abs() < 1e-6);
        }
    }
}
