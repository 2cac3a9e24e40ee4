//! NeuroFlow session engine
//!
//! Owns the whole life of a therapeutic audio session: the state machine
//! (idle, matching, transitioning, arrived), the ISO-principle transition
//! that glides every control parameter from the user's current emotional
//! state to the chosen target, and the procedural sequencer that decides
//! what actually gets played each tick.
//!
//! The engine is driven from a single control thread via `handle_command`
//! and `tick`; both take the current time as a parameter so tests can run
//! a synthetic clock.

mod biometric;
mod command;
mod error;
mod feedback;
mod sequencer;
mod session;
mod state;
mod transition;

pub use biometric::{BiometricSample, BiometricSource};
pub use command::{EngineCommand, EngineEvent, ProfilePayload};
pub use error::EngineError;
pub use feedback::{FeedbackEntry, FeedbackResponse, FeedbackSuggestion, FeedbackSystem};
pub use sequencer::{SeqAction, Sequencer};
pub use session::{SessionEngine, SessionSummary};
pub use state::{ControlSnapshot, EngineState, Phase, ScaleMaterial};
pub use transition::{bell_weight, smootherstep, Transition};
