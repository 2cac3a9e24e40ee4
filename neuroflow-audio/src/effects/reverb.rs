//! Freeverb-style reverb
//!
//! Parallel lowpass-feedback comb filters into series allpasses. The public
//! surface is decay time plus wet mix: wet changes ramp, but decay maps onto
//! the comb feedback/damping coefficients and is set stepped per update -
//! a deliberate approximation, feedback coefficients cannot be ramped
//! without retuning every comb continuously.

use super::{soft_clip, Effect};
use crate::ramp::Ramped;

/// Comb filter delay times in samples at 44.1kHz (from Freeverb)
const COMB_TUNINGS: [usize; 8] = [1116, 1188, 1277, 1356, 1422, 1491, 1557, 1617];

/// Allpass filter delay times in samples at 44.1kHz
const ALLPASS_TUNINGS: [usize; 4] = [556, 441, 341, 225];

/// Stereo spread in samples
const STEREO_SPREAD: usize = 23;

/// Decay time mapped onto comb feedback saturates above this
const MAX_DECAY_SECS: f32 = 10.0;

/// Lowpass-feedback comb filter
struct CombFilter {
    buffer: Vec<f32>,
    index: usize,
    filter_store: f32,
}

impl CombFilter {
    fn new(size: usize) -> Self {
        Self {
            buffer: vec![0.0; size.max(1)],
            index: 0,
            filter_store: 0.0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32, feedback: f32, damping: f32) -> f32 {
        let output = self.buffer[self.index];
        self.filter_store = output * (1.0 - damping) + self.filter_store * damping;
        self.buffer[self.index] = input + self.filter_store * feedback;
        self.index = (self.index + 1) % self.buffer.len();
        output
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.filter_store = 0.0;
        self.index = 0;
    }
}

/// Schroeder allpass filter
struct AllpassFilter {
    buffer: Vec<f32>,
    index: usize,
}

impl AllpassFilter {
    fn new(size: usize) -> Self {
        Self {
            buffer: vec![0.0; size.max(1)],
            index: 0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let buffered = self.buffer[self.index];
        let output = -input + buffered;
        // Feedback coefficient of 0.5 (standard for allpass diffusion)
        self.buffer[self.index] = input + buffered * 0.5;
        self.index = (self.index + 1) % self.buffer.len();
        output
    }

    fn reset(&mut self) {
        self.buffer.fill(0.0);
        self.index = 0;
    }
}

/// Stereo reverb with decay-time parameterization
pub struct Reverb {
    sample_rate: f32,

    comb_l: [CombFilter; 8],
    allpass_l: [AllpassFilter; 4],
    comb_r: [CombFilter; 8],
    allpass_r: [AllpassFilter; 4],

    decay_secs: f32,
    feedback: f32,
    damping: f32,
    wet: Ramped,
}

impl Reverb {
    pub fn new(sample_rate: f32) -> Self {
        let scale = sample_rate / 44100.0;
        let spread = (STEREO_SPREAD as f32 * scale) as usize;

        let comb_l =
            std::array::from_fn(|i| CombFilter::new((COMB_TUNINGS[i] as f32 * scale) as usize));
        let allpass_l = std::array::from_fn(|i| {
            AllpassFilter::new((ALLPASS_TUNINGS[i] as f32 * scale) as usize)
        });
        let comb_r = std::array::from_fn(|i| {
            CombFilter::new((COMB_TUNINGS[i] as f32 * scale) as usize + spread)
        });
        let allpass_r = std::array::from_fn(|i| {
            AllpassFilter::new((ALLPASS_TUNINGS[i] as f32 * scale) as usize + spread)
        });

        let mut reverb = Self {
            sample_rate,
            comb_l,
            allpass_l,
            comb_r,
            allpass_r,
            decay_secs: 4.0,
            feedback: 0.0,
            damping: 0.0,
            wet: Ramped::new(0.3),
        };
        reverb.set_decay_secs(4.0);
        reverb
    }

    /// Set the reverb tail length.
    ///
    /// Stepped assignment: longer decay raises comb feedback and lowers
    /// damping so the tail both lasts longer and stays brighter.
    pub fn set_decay_secs(&mut self, decay: f32) {
        self.decay_secs = decay.clamp(0.1, MAX_DECAY_SECS);
        let norm = self.decay_secs / MAX_DECAY_SECS;
        self.feedback = 0.6 + 0.38 * norm;
        self.damping = 0.7 - 0.5 * norm;
    }

    pub fn decay_secs(&self) -> f32 {
        self.decay_secs
    }

    /// Ramp the wet mix over `secs`
    pub fn ramp_wet(&mut self, wet: f32, secs: f32) {
        self.wet
            .ramp_to(wet.clamp(0.0, 1.0), secs, self.sample_rate);
    }

    pub fn wet(&self) -> f32 {
        self.wet.value()
    }
}

impl Effect for Reverb {
    fn process(&mut self, samples: &mut [f32]) {
        for frame in samples.chunks_exact_mut(2) {
            let wet = self.wet.next();
            // Attenuate input to prevent buildup across 8 summed combs
            let input = (frame[0] + frame[1]) * 0.25;

            let mut out_l = 0.0;
            let mut out_r = 0.0;
            for comb in &mut self.comb_l {
                out_l += comb.process(input, self.feedback, self.damping);
            }
            for comb in &mut self.comb_r {
                out_r += comb.process(input, self.feedback, self.damping);
            }
            out_l *= 0.125;
            out_r *= 0.125;

            for allpass in &mut self.allpass_l {
                out_l = allpass.process(out_l);
            }
            for allpass in &mut self.allpass_r {
                out_r = allpass.process(out_r);
            }

            let dry = 1.0 - wet * 0.5;
            frame[0] = soft_clip(frame[0] * dry + out_l * wet);
            frame[1] = soft_clip(frame[1] * dry + out_r * wet);
        }
    }

    fn reset(&mut self) {
        for comb in self.comb_l.iter_mut().chain(&mut self.comb_r) {
            comb.reset();
        }
        for allpass in self.allpass_l.iter_mut().chain(&mut self.allpass_r) {
            allpass.reset();
        }
    }

    fn name(&self) -> &'static str {
        "Reverb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decay_clamped() {
        let mut r = Reverb::new(48000.0);
        r.set_decay_secs(50.0);
        assert_eq!(r.decay_secs(), MAX_DECAY_SECS);
        r.set_decay_secs(0.0);
        assert_eq!(r.decay_secs(), 0.1);
    }

    #[test]
    fn test_impulse_produces_tail() {
        let mut r = Reverb::new(44100.0);
        r.ramp_wet(0.5, 0.0);
        let mut samples = vec![0.0f32; 44100 * 2];
        samples[0] = 1.0;
        samples[1] = 1.0;
        r.process(&mut samples);
        // Energy should appear well after the impulse
        let late: f32 = samples[20000..40000].iter().map(|s| s.abs()).sum();
        assert!(late > 0.01, "no reverb tail after impulse");
    }
}
