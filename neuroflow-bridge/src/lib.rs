//! Host protocol bridge
//!
//! The host (a mobile shell or a test harness) talks to the engine over
//! an opaque bidirectional channel of JSON lines. This crate owns the
//! wire format: decoding inbound messages, resolving catalog state ids
//! into fully-populated engine commands, and encoding outbound events.
//! Malformed input is warned about and dropped, never fatal.

mod protocol;
mod resolve;
mod throttle;

pub use protocol::{decode, encode, HostMessage};
pub use resolve::resolve;
pub use throttle::LogThrottle;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// Malformed JSON or an unrecognized message type
    #[error("undecodable host message: {0}")]
    Decode(#[from] serde_json::Error),
    /// A message referenced a state id the catalog does not know
    #[error("unknown state id: {0}")]
    UnknownState(String),
    /// SET_PROFILE arrived with neither a state id nor a full
    /// music + brainwave pair
    #[error("SET_PROFILE needs a stateId or a music+brainwave pair")]
    IncompleteOverride,
}
