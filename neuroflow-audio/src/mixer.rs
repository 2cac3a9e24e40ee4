//! Master output stage: smoothed volume and a soft clipper

use crate::ramp::Ramped;

/// Peaks below this pass through untouched
const CLIP_THRESHOLD: f32 = 0.75;
/// Asymptotic ceiling of the knee
const CLIP_CEILING: f32 = 0.89;

/// Mix-bus soft clipper
///
/// Transparent below the threshold, then an exponential knee that
/// approaches the ceiling asymptotically. Continuous and monotone over
/// the whole range, so summed peaks compress instead of folding over.
#[inline(always)]
fn soft_clip(x: f32) -> f32 {
    let abs_x = x.abs();
    if abs_x <= CLIP_THRESHOLD {
        return x;
    }
    let knee = CLIP_CEILING - CLIP_THRESHOLD;
    let ratio = (abs_x - CLIP_THRESHOLD) / knee;
    let compressed = CLIP_THRESHOLD + knee * (1.0 - (-ratio * 3.0).exp());
    x.signum() * compressed.min(CLIP_CEILING)
}

pub struct Mixer {
    sample_rate: f32,
    volume: Ramped,
}

impl Mixer {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            volume: Ramped::new(0.7),
        }
    }

    /// Ramp master volume. Out-of-range values clamp rather than error.
    pub fn set_volume(&mut self, volume: f32, secs: f32) {
        self.volume
            .ramp_to(volume.clamp(0.0, 1.0), secs, self.sample_rate);
    }

    pub fn volume(&self) -> f32 {
        self.volume.target()
    }

    pub fn process(&mut self, samples: &mut [f32]) {
        for frame in samples.chunks_exact_mut(2) {
            let v = self.volume.next();
            frame[0] = soft_clip(frame[0] * v);
            frame[1] = soft_clip(frame[1] * v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_clamps() {
        let mut mixer = Mixer::new(48000.0);
        mixer.set_volume(2.5, 0.0);
        assert_eq!(mixer.volume(), 1.0);
        mixer.set_volume(-1.0, 0.0);
        assert_eq!(mixer.volume(), 0.0);
    }

    #[test]
    fn test_output_bounded() {
        let mut mixer = Mixer::new(48000.0);
        mixer.set_volume(1.0, 0.0);
        let mut samples = vec![5.0f32; 64];
        mixer.process(&mut samples);
        assert!(samples.iter().all(|s| s.abs() <= CLIP_CEILING + 1e-6));
    }

    #[test]
    fn test_clip_monotone_across_knee() {
        let mut prev = f32::NEG_INFINITY;
        for i in 0..=400 {
            let x = i as f32 * 0.01;
            let y = soft_clip(x);
            assert!(y >= prev, "fold-over at input {x}: {y} < {prev}");
            assert!(y <= CLIP_CEILING + 1e-6);
            prev = y;
        }
        // Crossing full scale must stay smooth, not snap toward zero.
        let below = soft_clip(0.999);
        let above = soft_clip(1.001);
        assert!(above >= below);
        assert!((above - below).abs() < 0.01);
        assert!(above > 0.8);
    }

    #[test]
    fn test_clip_transparent_below_threshold() {
        assert_eq!(soft_clip(0.5), 0.5);
        assert_eq!(soft_clip(-0.5), -0.5);
        assert_eq!(soft_clip(CLIP_THRESHOLD), CLIP_THRESHOLD);
    }
}
