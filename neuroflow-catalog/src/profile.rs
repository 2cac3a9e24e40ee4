//! Profile value types
//!
//! All types here are immutable value types: the catalog defines them once
//! and the engine clamps them into its own mutable control snapshot before
//! use, so out-of-range literals can never reach the audio graph.

use neuroflow_theory::{Mode, PitchClass};
use serde::{Deserialize, Serialize};

/// Root + mode pair identifying the scale material of a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaleSpec {
    pub root: PitchClass,
    pub mode: Mode,
}

/// Effect-send portion of a musical profile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectsProfile {
    /// Reverb tail length in seconds (> 0)
    pub reverb_decay_secs: f32,
    /// Reverb wet mix (0-1)
    pub reverb_wet: f32,
    /// Delay time in seconds
    pub delay_secs: f32,
    /// Delay wet mix (0-1)
    pub delay_wet: f32,
    /// Chorus LFO rate in Hz
    pub chorus_freq_hz: f32,
    /// Chorus wet mix (0-1)
    pub chorus_wet: f32,
}

/// The full musical character of a state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MusicalProfile {
    /// Tempo in beats per minute (> 0)
    pub tempo_bpm: f32,
    pub scale: ScaleSpec,
    /// 0 = dark/mellow, 1 = bright/harmonically rich
    pub timbre_brightness: f32,
    /// 0 = bare triads, 1 = dense voicings at full velocity
    pub harmonic_complexity: f32,
    /// Probability of a percussive hit per subdivision (0-1)
    pub rhythm_density: f32,
    /// Drives note probability and melodic excursion width (0-1)
    pub melodic_activity: f32,
    /// Velocity spread of generated notes (0-1)
    pub dynamic_range: f32,
    pub effects: EffectsProfile,
}

/// Brainwave-entrainment parameters of a state
///
/// Initial states carry the frequency "where the user is"; target states the
/// frequency "where they're going". Both live in the same field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrainwaveProfile {
    /// Band label, e.g. "ALPHA" or "BETA_HIGH". Host-supplied overrides
    /// arrive without a label and default to "CUSTOM".
    #[serde(skip_deserializing, default = "custom_range")]
    pub range: &'static str,
    /// Beat frequency in Hz (0.5-30)
    pub frequency_hz: f32,
    /// Carrier tone in Hz (100-300)
    pub carrier_hz: f32,
}

fn custom_range() -> &'static str {
    "CUSTOM"
}

impl MusicalProfile {
    /// True when every bounded field sits inside its documented range.
    /// Catalog data is validated against this in tests.
    pub fn in_range(&self) -> bool {
        let unit = |v: f32| (0.0..=1.0).contains(&v);
        self.tempo_bpm > 0.0
            && unit(self.timbre_brightness)
            && unit(self.harmonic_complexity)
            && unit(self.rhythm_density)
            && unit(self.melodic_activity)
            && unit(self.dynamic_range)
            && self.effects.reverb_decay_secs > 0.0
            && unit(self.effects.reverb_wet)
            && self.effects.delay_secs >= 0.0
            && unit(self.effects.delay_wet)
            && self.effects.chorus_freq_hz >= 0.0
            && unit(self.effects.chorus_wet)
    }
}

impl BrainwaveProfile {
    pub fn in_range(&self) -> bool {
        (0.5..=30.0).contains(&self.frequency_hz) && (100.0..=300.0).contains(&self.carrier_hz)
    }
}
