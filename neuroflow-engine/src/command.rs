//! Command and event surface of the engine
//!
//! Commands arrive from the host bridge over a bounded channel; events
//! flow back the same way. Both sides are fire-and-forget: a full
//! channel drops the message rather than blocking the control loop.

use neuroflow_catalog::{BrainwaveProfile, MusicalProfile};
use neuroflow_theory::Note;

/// Everything the engine needs to know about one state: the musical
/// profile, the entrainment parameters, and the already-resolved scale
/// and chord material. The bridge resolves catalog ids into this before
/// the command reaches the engine, which keeps the engine free of any
/// catalog lookups.
#[derive(Debug, Clone)]
pub struct ProfilePayload {
    pub state_id: String,
    pub music: MusicalProfile,
    pub brainwave: BrainwaveProfile,
    pub scale: Vec<Note>,
    pub chords: Vec<Vec<Note>>,
    /// Scale steps per octave, for octave jumps in the melody walk
    pub steps_per_octave: usize,
}

#[derive(Debug)]
pub enum EngineCommand {
    /// Begin a session in the matching phase
    StartMusic(Box<ProfilePayload>),
    /// Glide toward a target state over the given window
    Transition {
        payload: Box<ProfilePayload>,
        duration_secs: f64,
    },
    Stop,
    Pause,
    Resume,
    /// Master volume, clamped to [0, 1] on receipt
    Volume(f32),
    /// Direct profile override without a phase change. Generic enough to
    /// carry future biometric-driven nudges.
    SetProfile(Box<ProfilePayload>),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    Ready,
    Log {
        message: String,
        timestamp_ms: u64,
    },
    TransitionProgress {
        progress: f64,
        timestamp_ms: u64,
    },
    TransitionComplete,
    Error(String),
}
