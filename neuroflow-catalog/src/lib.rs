//! Static profile catalog for NeuroFlow
//!
//! Maps self-reported emotional states and desired target states to full
//! musical profiles (tempo, scale, timbre, density, dynamics, effect sends)
//! plus brainwave-entrainment parameters. Entries are loaded once at process
//! start and never mutated; the engine only reads or interpolates them.

mod profile;
mod states;
mod tasks;

pub use profile::{BrainwaveProfile, EffectsProfile, MusicalProfile, ScaleSpec};
pub use states::{emotional_state, emotional_states, target_state, target_states, StateProfile};
pub use tasks::{task, task_for_target, tasks, Task};
