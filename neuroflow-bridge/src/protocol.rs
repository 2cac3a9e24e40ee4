//! Wire format of the host protocol
//!
//! Inbound and outbound messages are externally tagged on a `type`
//! field, with camelCase payload keys to match the host side.

use serde::{Deserialize, Serialize};
use tracing::warn;

use neuroflow_catalog::{BrainwaveProfile, MusicalProfile};
use neuroflow_engine::EngineEvent;

use crate::BridgeError;

/// Messages the host sends to the engine
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum HostMessage {
    #[serde(rename = "START_MUSIC")]
    StartMusic {
        #[serde(rename = "initialStateId")]
        initial_state_id: String,
    },
    #[serde(rename = "TRANSITION")]
    Transition {
        #[serde(rename = "targetStateId")]
        target_state_id: String,
        #[serde(rename = "durationSeconds")]
        duration_seconds: f64,
    },
    #[serde(rename = "STOP")]
    Stop,
    #[serde(rename = "PAUSE")]
    Pause,
    #[serde(rename = "RESUME")]
    Resume,
    #[serde(rename = "VOLUME")]
    Volume { volume: f32 },
    /// Direct override: either a catalog state id, or an inline
    /// profile pair (the entry point future biometric nudges use)
    #[serde(rename = "SET_PROFILE")]
    SetProfile {
        #[serde(rename = "stateId", default)]
        state_id: Option<String>,
        #[serde(default)]
        music: Option<MusicalProfile>,
        #[serde(default)]
        brainwave: Option<BrainwaveProfile>,
    },
}

/// Messages the engine sends back to the host
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum WireEvent<'a> {
    #[serde(rename = "ENGINE_READY")]
    Ready,
    #[serde(rename = "LOG")]
    Log {
        message: &'a str,
        #[serde(rename = "timestampMs")]
        timestamp_ms: u64,
    },
    #[serde(rename = "TRANSITION_PROGRESS")]
    TransitionProgress {
        progress: f64,
        #[serde(rename = "timestampMs")]
        timestamp_ms: u64,
    },
    #[serde(rename = "TRANSITION_COMPLETE")]
    TransitionComplete,
    #[serde(rename = "ERROR")]
    Error { message: &'a str },
}

/// Decode one line from the host. The caller drops errors after the
/// warning here, the stream itself stays alive.
pub fn decode(line: &str) -> Result<HostMessage, BridgeError> {
    match serde_json::from_str(line) {
        Ok(message) => Ok(message),
        Err(err) => {
            warn!(%err, line, "dropping undecodable host message");
            Err(err.into())
        }
    }
}

/// Encode one engine event as a JSON line (without trailing newline)
pub fn encode(event: &EngineEvent) -> String {
    let wire = match event {
        EngineEvent::Ready => WireEvent::Ready,
        EngineEvent::Log {
            message,
            timestamp_ms,
        } => WireEvent::Log {
            message,
            timestamp_ms: *timestamp_ms,
        },
        EngineEvent::TransitionProgress {
            progress,
            timestamp_ms,
        } => WireEvent::TransitionProgress {
            progress: *progress,
            timestamp_ms: *timestamp_ms,
        },
        EngineEvent::TransitionComplete => WireEvent::TransitionComplete,
        EngineEvent::Error(message) => WireEvent::Error { message },
    };
    // Serialization of these shapes cannot fail
    serde_json::to_string(&wire).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_start_music() {
        let msg = decode(r#"{"type":"START_MUSIC","initialStateId":"RAIVA"}"#).unwrap();
        assert_eq!(
            msg,
            HostMessage::StartMusic {
                initial_state_id: "RAIVA".into()
            }
        );
    }

    #[test]
    fn test_decode_transition() {
        let msg =
            decode(r#"{"type":"TRANSITION","targetStateId":"FOCO","durationSeconds":300}"#)
                .unwrap();
        assert_eq!(
            msg,
            HostMessage::Transition {
                target_state_id: "FOCO".into(),
                duration_seconds: 300.0
            }
        );
    }

    #[test]
    fn test_decode_set_profile_by_id() {
        let msg = decode(r#"{"type":"SET_PROFILE","stateId":"RELAXAMENTO"}"#).unwrap();
        assert_eq!(
            msg,
            HostMessage::SetProfile {
                state_id: Some("RELAXAMENTO".into()),
                music: None,
                brainwave: None,
            }
        );
    }

    #[test]
    fn test_decode_set_profile_inline() {
        let line = r#"{
            "type": "SET_PROFILE",
            "music": {
                "tempo_bpm": 70.0,
                "scale": {"root": "A", "mode": "dorian"},
                "timbre_brightness": 0.4,
                "harmonic_complexity": 0.3,
                "rhythm_density": 0.2,
                "melodic_activity": 0.3,
                "dynamic_range": 0.4,
                "effects": {
                    "reverb_decay_secs": 3.0,
                    "reverb_wet": 0.4,
                    "delay_secs": 0.3,
                    "delay_wet": 0.2,
                    "chorus_freq_hz": 0.6,
                    "chorus_wet": 0.3
                }
            },
            "brainwave": {"frequency_hz": 10.0, "carrier_hz": 200.0}
        }"#;
        let HostMessage::SetProfile {
            state_id,
            music,
            brainwave,
        } = decode(line).unwrap()
        else {
            panic!("wrong message");
        };
        assert!(state_id.is_none());
        assert_eq!(music.unwrap().tempo_bpm, 70.0);
        let brainwave = brainwave.unwrap();
        assert_eq!(brainwave.frequency_hz, 10.0);
        // Inline overrides have no band label
        assert_eq!(brainwave.range, "CUSTOM");
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        assert!(decode(r#"{"type":"DANCE"}"#).is_err());
        assert!(decode("not json at all").is_err());
    }

    #[test]
    fn test_encode_progress() {
        let line = encode(&EngineEvent::TransitionProgress {
            progress: 0.5,
            timestamp_ms: 1234,
        });
        assert_eq!(
            line,
            r#"{"type":"TRANSITION_PROGRESS","progress":0.5,"timestampMs":1234}"#
        );
    }

    #[test]
    fn test_encode_ready_and_complete() {
        assert_eq!(encode(&EngineEvent::Ready), r#"{"type":"ENGINE_READY"}"#);
        assert_eq!(
            encode(&EngineEvent::TransitionComplete),
            r#"{"type":"TRANSITION_COMPLETE"}"#
        );
    }
}
