//! Music theory for NeuroFlow - scales, modes, and chord material
//!
//! Pure pitch math used by the catalog and the procedural sequencer:
//! - Note: pitch class + octave with MIDI/frequency conversion
//! - scale_notes: mode interval tables expanded over an octave range
//! - chords_from_scale: I/IV/V triads derived by scale-degree sampling
//! - Progression: hand-voiced preset progressions per emotional character

mod note;
mod progression;
mod scale;

pub use note::{Note, PitchClass};
pub use progression::{progression_chords, progression_for_state, Progression};
pub use scale::{chords_from_scale, scale_notes, Mode};
