//! Per-layer effect chains

mod chorus;
mod delay;
mod filter;
mod reverb;

pub use chorus::Chorus;
pub use delay::Delay;
pub use filter::{Filter, FilterType};
pub use reverb::Reverb;

/// Trait for in-place audio effects (stereo interleaved)
pub trait Effect {
    /// Process samples in place
    fn process(&mut self, samples: &mut [f32]);

    /// Clear internal state (delay lines, filter history)
    fn reset(&mut self);

    /// Effect name for logging
    fn name(&self) -> &'static str;
}

/// Soft clipper to prevent harsh distortion on summed signals
#[inline]
pub(crate) fn soft_clip(x: f32) -> f32 {
    if x > 1.0 {
        1.0 - 1.0 / (1.0 + (x - 1.0) * 2.0)
    } else if x < -1.0 {
        -1.0 + 1.0 / (1.0 + (-x - 1.0) * 2.0)
    } else {
        x
    }
}
