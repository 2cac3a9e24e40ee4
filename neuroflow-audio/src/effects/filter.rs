//! Biquad filter (lowpass / bandpass)
//!
//! Cutoff changes go through a ramp; coefficients are recomputed once per
//! processed block from the ramp's current value, which keeps sweeps smooth
//! without per-sample trig.

use super::Effect;
use crate::ramp::Ramped;
use std::f32::consts::PI;

/// Filter response type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    #[default]
    LowPass,
    BandPass,
}

/// Biquad filter with ramped cutoff
pub struct Filter {
    filter_type: FilterType,
    sample_rate: f32,
    cutoff: Ramped,
    resonance: f32, // Q factor

    // Biquad coefficients
    a0: f32,
    a1: f32,
    a2: f32,
    b1: f32,
    b2: f32,

    // State variables (stereo)
    x1_l: f32,
    x2_l: f32,
    y1_l: f32,
    y2_l: f32,
    x1_r: f32,
    x2_r: f32,
    y1_r: f32,
    y2_r: f32,
}

impl Filter {
    pub fn new(sample_rate: f32, filter_type: FilterType, cutoff_hz: f32) -> Self {
        let mut filter = Self {
            filter_type,
            sample_rate,
            cutoff: Ramped::new(cutoff_hz.clamp(20.0, 20000.0)),
            resonance: 0.707, // Butterworth Q
            a0: 1.0,
            a1: 0.0,
            a2: 0.0,
            b1: 0.0,
            b2: 0.0,
            x1_l: 0.0,
            x2_l: 0.0,
            y1_l: 0.0,
            y2_l: 0.0,
            x1_r: 0.0,
            x2_r: 0.0,
            y1_r: 0.0,
            y2_r: 0.0,
        };
        filter.calculate_coefficients(filter.cutoff.value());
        filter
    }

    /// Ramp the cutoff to a new frequency over `secs`
    pub fn ramp_cutoff(&mut self, cutoff_hz: f32, secs: f32) {
        self.cutoff
            .ramp_to(cutoff_hz.clamp(20.0, 20000.0), secs, self.sample_rate);
    }

    /// Current (ramped) cutoff frequency
    pub fn cutoff(&self) -> f32 {
        self.cutoff.value()
    }

    /// Set the cutoff immediately, bypassing the ramp. For callers that
    /// do their own block-rate smoothing (the ambient wobble).
    pub fn set_cutoff_direct(&mut self, cutoff_hz: f32) {
        self.cutoff.set(cutoff_hz.clamp(20.0, 20000.0));
        self.calculate_coefficients(self.cutoff.value());
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = resonance.clamp(0.1, 20.0);
        self.calculate_coefficients(self.cutoff.value());
    }

    fn calculate_coefficients(&mut self, cutoff: f32) {
        let omega = 2.0 * PI * cutoff / self.sample_rate;
        let sin_omega = omega.sin();
        let cos_omega = omega.cos();
        let alpha = sin_omega / (2.0 * self.resonance);
        let a0 = 1.0 + alpha;

        match self.filter_type {
            FilterType::LowPass => {
                let b0 = (1.0 - cos_omega) / 2.0;
                self.a0 = b0 / a0;
                self.a1 = (1.0 - cos_omega) / a0;
                self.a2 = b0 / a0;
            }
            FilterType::BandPass => {
                self.a0 = alpha / a0;
                self.a1 = 0.0;
                self.a2 = -alpha / a0;
            }
        }
        self.b1 = (-2.0 * cos_omega) / a0;
        self.b2 = (1.0 - alpha) / a0;
    }

    #[inline]
    fn process_sample(&mut self, input: f32, is_right: bool) -> f32 {
        let (x1, x2, y1, y2) = if is_right {
            (
                &mut self.x1_r,
                &mut self.x2_r,
                &mut self.y1_r,
                &mut self.y2_r,
            )
        } else {
            (
                &mut self.x1_l,
                &mut self.x2_l,
                &mut self.y1_l,
                &mut self.y2_l,
            )
        };

        let output =
            self.a0 * input + self.a1 * *x1 + self.a2 * *x2 - self.b1 * *y1 - self.b2 * *y2;

        *x2 = *x1;
        *x1 = input;
        *y2 = *y1;
        *y1 = output;

        output
    }
}

impl Effect for Filter {
    fn process(&mut self, samples: &mut [f32]) {
        // Advance the cutoff ramp at block rate: one coefficient update per
        // call keeps sweeps inaudible at typical buffer sizes.
        if !self.cutoff.settled() {
            for _ in 0..samples.len() / 2 {
                self.cutoff.next();
            }
            self.calculate_coefficients(self.cutoff.value());
        }

        for frame in samples.chunks_exact_mut(2) {
            frame[0] = self.process_sample(frame[0], false);
            frame[1] = self.process_sample(frame[1], true);
        }
    }

    fn reset(&mut self) {
        self.x1_l = 0.0;
        self.x2_l = 0.0;
        self.y1_l = 0.0;
        self.y2_l = 0.0;
        self.x1_r = 0.0;
        self.x2_r = 0.0;
        self.y1_r = 0.0;
        self.y2_r = 0.0;
    }

    fn name(&self) -> &'static str {
        match self.filter_type {
            FilterType::LowPass => "LP Filter",
            FilterType::BandPass => "BP Filter",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cutoff_clamped() {
        let mut f = Filter::new(48000.0, FilterType::LowPass, 1000.0);
        f.ramp_cutoff(30000.0, 0.0);
        for _ in 0..10 {
            f.process(&mut [0.0; 64]);
        }
        assert_eq!(f.cutoff(), 20000.0);
    }

    #[test]
    fn test_lowpass_attenuates_alternating_signal() {
        let mut f = Filter::new(48000.0, FilterType::LowPass, 200.0);
        // Nyquist-rate alternation is far above 200 Hz
        let mut samples: Vec<f32> = (0..4096)
            .map(|i| if i % 4 < 2 { 1.0 } else { -1.0 })
            .collect();
        f.process(&mut samples);
        let energy: f32 = samples[2048..].iter().map(|s| s * s).sum();
        assert!(energy < 100.0, "high-frequency energy not attenuated");
    }
}
