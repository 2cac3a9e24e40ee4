//! Sound generation layers
//!
//! Five independent generators, each rendering additively into a stereo
//! interleaved buffer. The stack owns one of each and drives them from
//! the control loop.

mod ambient;
mod binaural;
mod melody;
mod pad;
mod rhythm;

pub use ambient::AmbientLayer;
pub use binaural::BinauralLayer;
pub use melody::MelodyLayer;
pub use pad::{PadLayer, Waveform};
pub use rhythm::RhythmLayer;
