//! Biometric sensor abstraction
//!
//! Deliberately a stub: no sensor integration ships today. A future
//! implementation would feed samples into `SetProfile` nudges.

/// One reading from a wearable or camera-based sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiometricSample {
    pub heart_rate_bpm: Option<f32>,
    pub hrv_ms: Option<f32>,
    pub timestamp_ms: u64,
}

pub trait BiometricSource {
    type Error;

    fn connect(&mut self) -> Result<(), Self::Error>;
    fn sample(&mut self) -> Result<BiometricSample, Self::Error>;
    fn disconnect(&mut self);
}
