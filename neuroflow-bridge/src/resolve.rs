//! Resolution of host messages into engine commands
//!
//! The host only speaks catalog ids; the engine only takes resolved
//! material. This is where ids become profiles, scales and chords.
//! Preset progressions, when a state has one, take precedence over
//! chords derived from the scale.

use tracing::warn;

use neuroflow_catalog::{
    emotional_state, target_state, BrainwaveProfile, MusicalProfile, StateProfile,
};
use neuroflow_engine::{EngineCommand, ProfilePayload};
use neuroflow_theory::{
    chords_from_scale, progression_chords, progression_for_state, scale_notes,
};

use crate::protocol::HostMessage;
use crate::BridgeError;

/// Octave range of melodic material
const OCTAVE_LOW: i8 = 3;
const OCTAVE_HIGH: i8 = 5;
/// Octave chords are voiced in
const CHORD_OCTAVE: i8 = 4;

pub fn resolve(message: HostMessage) -> Result<EngineCommand, BridgeError> {
    match message {
        HostMessage::StartMusic { initial_state_id } => {
            let profile = lookup_initial(&initial_state_id)?;
            Ok(EngineCommand::StartMusic(payload(profile)))
        }
        HostMessage::Transition {
            target_state_id,
            duration_seconds,
        } => {
            let profile = lookup_target(&target_state_id)?;
            Ok(EngineCommand::Transition {
                payload: payload(profile),
                duration_secs: duration_seconds.max(0.0),
            })
        }
        HostMessage::Stop => Ok(EngineCommand::Stop),
        HostMessage::Pause => Ok(EngineCommand::Pause),
        HostMessage::Resume => Ok(EngineCommand::Resume),
        HostMessage::Volume { volume } => Ok(EngineCommand::Volume(volume.clamp(0.0, 1.0))),
        HostMessage::SetProfile {
            state_id,
            music,
            brainwave,
        } => match (state_id, music, brainwave) {
            (Some(id), _, _) => {
                let profile = lookup_any(&id)?;
                Ok(EngineCommand::SetProfile(payload(profile)))
            }
            (None, Some(music), Some(brainwave)) => {
                Ok(EngineCommand::SetProfile(custom_payload(music, brainwave)))
            }
            _ => {
                warn!("SET_PROFILE needs a stateId or an inline music+brainwave pair");
                Err(BridgeError::IncompleteOverride)
            }
        },
    }
}

fn lookup_initial(id: &str) -> Result<&'static StateProfile, BridgeError> {
    emotional_state(id).ok_or_else(|| unknown(id))
}

fn lookup_target(id: &str) -> Result<&'static StateProfile, BridgeError> {
    target_state(id).ok_or_else(|| unknown(id))
}

fn lookup_any(id: &str) -> Result<&'static StateProfile, BridgeError> {
    target_state(id)
        .or_else(|| emotional_state(id))
        .ok_or_else(|| unknown(id))
}

fn unknown(id: &str) -> BridgeError {
    warn!(id, "unknown state id in host message");
    BridgeError::UnknownState(id.to_string())
}

fn payload(profile: &StateProfile) -> Box<ProfilePayload> {
    let root = profile.music.scale.root;
    let mode = profile.music.scale.mode;
    let scale = scale_notes(root, mode, OCTAVE_LOW, OCTAVE_HIGH);
    let chords = match progression_for_state(profile.id) {
        Some(progression) => progression_chords(progression),
        None => chords_from_scale(root, mode, CHORD_OCTAVE),
    };
    Box::new(ProfilePayload {
        state_id: profile.id.to_string(),
        music: profile.music,
        brainwave: profile.brainwave,
        scale,
        chords,
        steps_per_octave: mode.intervals().len(),
    })
}

/// Inline overrides carry no catalog id, so there is never a preset
/// progression to prefer over the derived chords.
fn custom_payload(music: MusicalProfile, brainwave: BrainwaveProfile) -> Box<ProfilePayload> {
    let root = music.scale.root;
    let mode = music.scale.mode;
    Box::new(ProfilePayload {
        state_id: "CUSTOM".to_string(),
        music,
        brainwave,
        scale: scale_notes(root, mode, OCTAVE_LOW, OCTAVE_HIGH),
        chords: chords_from_scale(root, mode, CHORD_OCTAVE),
        steps_per_octave: mode.intervals().len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_start_builds_material() {
        let cmd = resolve(HostMessage::StartMusic {
            initial_state_id: "RAIVA".into(),
        })
        .unwrap();
        let EngineCommand::StartMusic(payload) = cmd else {
            panic!("wrong command");
        };
        assert_eq!(payload.state_id, "RAIVA");
        assert_eq!(payload.music.tempo_bpm, 125.0);
        // Phrygian over three octaves
        assert_eq!(payload.scale.len(), 7 * 3);
        assert!(!payload.chords.is_empty());
    }

    #[test]
    fn test_preset_progression_takes_precedence() {
        let cmd = resolve(HostMessage::Transition {
            target_state_id: "FOCO".into(),
            duration_seconds: 60.0,
        })
        .unwrap();
        let EngineCommand::Transition { payload, .. } = cmd else {
            panic!("wrong command");
        };
        let preset = progression_chords(progression_for_state("FOCO").unwrap());
        assert_eq!(payload.chords, preset);
    }

    #[test]
    fn test_unknown_state_id() {
        let err = resolve(HostMessage::StartMusic {
            initial_state_id: "EUPHORIA".into(),
        })
        .unwrap_err();
        assert!(matches!(err, BridgeError::UnknownState(id) if id == "EUPHORIA"));
    }

    #[test]
    fn test_target_id_not_valid_as_initial() {
        // FOCO is a target state only
        assert!(resolve(HostMessage::StartMusic {
            initial_state_id: "FOCO".into(),
        })
        .is_err());
    }

    #[test]
    fn test_volume_clamped() {
        let EngineCommand::Volume(v) = resolve(HostMessage::Volume { volume: 1.5 }).unwrap()
        else {
            panic!("wrong command");
        };
        assert_eq!(v, 1.0);
        let EngineCommand::Volume(v) = resolve(HostMessage::Volume { volume: -0.2 }).unwrap()
        else {
            panic!("wrong command");
        };
        assert_eq!(v, 0.0);
    }

    #[test]
    fn test_set_profile_by_id_accepts_either_catalog() {
        // RAIVA is emotional-only, FOCO target-only; both resolve
        for id in ["RAIVA", "FOCO"] {
            let cmd = resolve(HostMessage::SetProfile {
                state_id: Some(id.into()),
                music: None,
                brainwave: None,
            })
            .unwrap();
            let EngineCommand::SetProfile(payload) = cmd else {
                panic!("wrong command");
            };
            assert_eq!(payload.state_id, id);
        }
    }

    #[test]
    fn test_inline_override_builds_custom_material() {
        let foco = target_state("FOCO").unwrap();
        let cmd = resolve(HostMessage::SetProfile {
            state_id: None,
            music: Some(foco.music),
            brainwave: Some(foco.brainwave),
        })
        .unwrap();
        let EngineCommand::SetProfile(payload) = cmd else {
            panic!("wrong command");
        };
        assert_eq!(payload.state_id, "CUSTOM");
        // No catalog id, so chords come from the scale, not a preset
        let derived = chords_from_scale(foco.music.scale.root, foco.music.scale.mode, CHORD_OCTAVE);
        assert_eq!(payload.chords, derived);
        assert_eq!(payload.scale.len(), 7 * 3);
    }

    #[test]
    fn test_partial_override_rejected() {
        let foco = target_state("FOCO").unwrap();
        let err = resolve(HostMessage::SetProfile {
            state_id: None,
            music: Some(foco.music),
            brainwave: None,
        })
        .unwrap_err();
        assert!(matches!(err, BridgeError::IncompleteOverride));
    }

    #[test]
    fn test_negative_duration_clamped() {
        let EngineCommand::Transition { duration_secs, .. } = resolve(HostMessage::Transition {
            target_state_id: "SONO".into(),
            duration_seconds: -5.0,
        })
        .unwrap()
        else {
            panic!("wrong command");
        };
        assert_eq!(duration_secs, 0.0);
    }
}
