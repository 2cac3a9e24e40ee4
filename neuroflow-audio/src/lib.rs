//! Audio graph for NeuroFlow
//!
//! This crate renders the five-layer therapeutic soundscape:
//! - Binaural: detuned sine pair, hard-panned left/right
//! - Ambient: filtered pink noise with a slow wobble plus a low drone
//! - Rhythm: probabilistically triggered filtered noise bursts
//! - Pad: polyphonic slow-envelope chords through lowpass, reverb and chorus
//! - Melody: FM voice through reverb and delay
//!
//! Every audible parameter moves through a time-bounded linear ramp
//! ([`Ramped`]); the only stepped assignment is reverb decay, which cannot
//! be ramped continuously (comb feedback coefficients are recomputed whole).

mod effects;
mod layers;
mod mixer;
mod noise;
mod ramp;
mod stack;

pub use effects::{Chorus, Delay, Effect, Filter, FilterType, Reverb};
pub use layers::{
    AmbientLayer, BinauralLayer, MelodyLayer, PadLayer, RhythmLayer, Waveform,
};
pub use mixer::Mixer;
pub use noise::{PinkNoise, XorShift64};
pub use ramp::Ramped;
pub use stack::{ControlUpdate, LayerStack};
