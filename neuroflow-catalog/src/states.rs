//! Emotional and target state catalog
//!
//! Tempi and scale assignments follow the therapeutic mapping of the product:
//! matching states mirror the user's reported condition (anger gets a fast,
//! dissonant Eb phrygian; sadness a slow F aeolian), target states model the
//! destination (deep focus sits at 76 BPM in plain C ionian). Brainwave
//! frequencies follow the clinical band literature for each state.

use crate::profile::{BrainwaveProfile, EffectsProfile, MusicalProfile, ScaleSpec};
use neuroflow_theory::{Mode, PitchClass};

/// One catalog entry: either an initial (matching) or a target state
#[derive(Debug, Clone, Copy)]
pub struct StateProfile {
    pub id: &'static str,
    pub label: &'static str,
    pub brainwave: BrainwaveProfile,
    pub music: MusicalProfile,
}

const fn scale(root: PitchClass, mode: Mode) -> ScaleSpec {
    ScaleSpec { root, mode }
}

/// Initial states: where the user reports being right now.
/// `frequency_hz` is the base (matching) binaural beat frequency.
static EMOTIONAL_STATES: &[StateProfile] = &[
    StateProfile {
        id: "RAIVA",
        label: "Raiva/Agitação",
        brainwave: BrainwaveProfile {
            range: "BETA_HIGH",
            frequency_hz: 25.0,
            carrier_hz: 200.0,
        },
        music: MusicalProfile {
            tempo_bpm: 125.0,
            scale: scale(PitchClass::Ds, Mode::Phrygian),
            timbre_brightness: 0.75,
            harmonic_complexity: 0.30,
            rhythm_density: 0.65,
            melodic_activity: 0.60,
            dynamic_range: 0.70,
            effects: EffectsProfile {
                reverb_decay_secs: 2.0,
                reverb_wet: 0.15,
                delay_secs: 0.25,
                delay_wet: 0.10,
                chorus_freq_hz: 2.5,
                chorus_wet: 0.10,
            },
        },
    },
    StateProfile {
        id: "ANSIEDADE",
        label: "Ansiedade",
        brainwave: BrainwaveProfile {
            range: "BETA_MID",
            frequency_hz: 18.0,
            carrier_hz: 200.0,
        },
        music: MusicalProfile {
            tempo_bpm: 110.0,
            scale: scale(PitchClass::D, Mode::Aeolian),
            timbre_brightness: 0.60,
            harmonic_complexity: 0.35,
            rhythm_density: 0.50,
            melodic_activity: 0.55,
            dynamic_range: 0.55,
            effects: EffectsProfile {
                reverb_decay_secs: 2.5,
                reverb_wet: 0.20,
                delay_secs: 0.30,
                delay_wet: 0.12,
                chorus_freq_hz: 2.0,
                chorus_wet: 0.12,
            },
        },
    },
    StateProfile {
        id: "CANSACO",
        label: "Cansaço Mental",
        brainwave: BrainwaveProfile {
            range: "THETA_LOW",
            frequency_hz: 5.0,
            carrier_hz: 180.0,
        },
        music: MusicalProfile {
            tempo_bpm: 70.0,
            scale: scale(PitchClass::D, Mode::Dorian),
            timbre_brightness: 0.35,
            harmonic_complexity: 0.40,
            rhythm_density: 0.20,
            melodic_activity: 0.30,
            dynamic_range: 0.35,
            effects: EffectsProfile {
                reverb_decay_secs: 5.0,
                reverb_wet: 0.35,
                delay_secs: 0.40,
                delay_wet: 0.15,
                chorus_freq_hz: 1.0,
                chorus_wet: 0.18,
            },
        },
    },
    StateProfile {
        id: "TRISTEZA",
        label: "Tristeza/Apatia",
        brainwave: BrainwaveProfile {
            range: "DELTA_THETA",
            frequency_hz: 3.0,
            carrier_hz: 150.0,
        },
        music: MusicalProfile {
            tempo_bpm: 64.0,
            scale: scale(PitchClass::F, Mode::Aeolian),
            timbre_brightness: 0.30,
            harmonic_complexity: 0.45,
            rhythm_density: 0.15,
            melodic_activity: 0.25,
            dynamic_range: 0.40,
            effects: EffectsProfile {
                reverb_decay_secs: 6.0,
                reverb_wet: 0.40,
                delay_secs: 0.45,
                delay_wet: 0.18,
                chorus_freq_hz: 0.8,
                chorus_wet: 0.20,
            },
        },
    },
    StateProfile {
        id: "NEUTRO",
        label: "Neutro/Calmo",
        brainwave: BrainwaveProfile {
            range: "ALPHA",
            frequency_hz: 10.0,
            carrier_hz: 220.0,
        },
        music: MusicalProfile {
            tempo_bpm: 85.0,
            scale: scale(PitchClass::C, Mode::Ionian),
            timbre_brightness: 0.50,
            harmonic_complexity: 0.50,
            rhythm_density: 0.35,
            melodic_activity: 0.40,
            dynamic_range: 0.50,
            effects: EffectsProfile {
                reverb_decay_secs: 4.0,
                reverb_wet: 0.30,
                delay_secs: 0.35,
                delay_wet: 0.15,
                chorus_freq_hz: 1.5,
                chorus_wet: 0.15,
            },
        },
    },
];

/// Target states: where the session is taking the user.
/// `frequency_hz` is the target binaural beat frequency.
static TARGET_STATES: &[StateProfile] = &[
    StateProfile {
        id: "FOCO",
        label: "Foco Profundo",
        brainwave: BrainwaveProfile {
            range: "ALPHA_SMR",
            frequency_hz: 12.0,
            carrier_hz: 220.0,
        },
        music: MusicalProfile {
            tempo_bpm: 76.0,
            scale: scale(PitchClass::C, Mode::Ionian),
            timbre_brightness: 0.45,
            harmonic_complexity: 0.55,
            rhythm_density: 0.30,
            melodic_activity: 0.35,
            dynamic_range: 0.40,
            effects: EffectsProfile {
                reverb_decay_secs: 3.5,
                reverb_wet: 0.25,
                delay_secs: 0.30,
                delay_wet: 0.12,
                chorus_freq_hz: 1.2,
                chorus_wet: 0.12,
            },
        },
    },
    StateProfile {
        id: "CRIATIVIDADE",
        label: "Criatividade",
        brainwave: BrainwaveProfile {
            range: "THETA_ALPHA",
            frequency_hz: 7.0,
            carrier_hz: 200.0,
        },
        music: MusicalProfile {
            tempo_bpm: 88.0,
            scale: scale(PitchClass::A, Mode::Dorian),
            timbre_brightness: 0.55,
            harmonic_complexity: 0.60,
            rhythm_density: 0.40,
            melodic_activity: 0.65,
            dynamic_range: 0.55,
            effects: EffectsProfile {
                reverb_decay_secs: 4.0,
                reverb_wet: 0.30,
                delay_secs: 0.35,
                delay_wet: 0.20,
                chorus_freq_hz: 1.8,
                chorus_wet: 0.20,
            },
        },
    },
    StateProfile {
        id: "RELAXAMENTO",
        label: "Relaxamento",
        brainwave: BrainwaveProfile {
            range: "ALPHA_DELTA",
            frequency_hz: 10.0,
            carrier_hz: 210.0,
        },
        music: MusicalProfile {
            tempo_bpm: 66.0,
            scale: scale(PitchClass::F, Mode::Lydian),
            timbre_brightness: 0.40,
            harmonic_complexity: 0.50,
            rhythm_density: 0.20,
            melodic_activity: 0.30,
            dynamic_range: 0.45,
            effects: EffectsProfile {
                reverb_decay_secs: 6.0,
                reverb_wet: 0.40,
                delay_secs: 0.40,
                delay_wet: 0.18,
                chorus_freq_hz: 1.0,
                chorus_wet: 0.22,
            },
        },
    },
    StateProfile {
        id: "MEDITACAO",
        label: "Meditação",
        brainwave: BrainwaveProfile {
            range: "THETA",
            frequency_hz: 6.0,
            carrier_hz: 190.0,
        },
        music: MusicalProfile {
            tempo_bpm: 58.0,
            scale: scale(PitchClass::D, Mode::Dorian),
            timbre_brightness: 0.30,
            harmonic_complexity: 0.40,
            rhythm_density: 0.10,
            melodic_activity: 0.20,
            dynamic_range: 0.30,
            effects: EffectsProfile {
                reverb_decay_secs: 8.0,
                reverb_wet: 0.45,
                delay_secs: 0.50,
                delay_wet: 0.20,
                chorus_freq_hz: 0.6,
                chorus_wet: 0.25,
            },
        },
    },
    StateProfile {
        id: "SONO",
        label: "Sono",
        brainwave: BrainwaveProfile {
            range: "DELTA",
            frequency_hz: 2.0,
            carrier_hz: 150.0,
        },
        music: MusicalProfile {
            tempo_bpm: 50.0,
            scale: scale(PitchClass::F, Mode::Aeolian),
            timbre_brightness: 0.20,
            harmonic_complexity: 0.35,
            rhythm_density: 0.05,
            melodic_activity: 0.15,
            dynamic_range: 0.25,
            effects: EffectsProfile {
                reverb_decay_secs: 9.0,
                reverb_wet: 0.50,
                delay_secs: 0.60,
                delay_wet: 0.15,
                chorus_freq_hz: 0.4,
                chorus_wet: 0.25,
            },
        },
    },
    StateProfile {
        id: "ENERGIA",
        label: "Energia/Alerta",
        brainwave: BrainwaveProfile {
            range: "BETA_MID_HIGH",
            frequency_hz: 20.0,
            carrier_hz: 230.0,
        },
        music: MusicalProfile {
            tempo_bpm: 118.0,
            scale: scale(PitchClass::G, Mode::Mixolydian),
            timbre_brightness: 0.70,
            harmonic_complexity: 0.55,
            rhythm_density: 0.60,
            melodic_activity: 0.60,
            dynamic_range: 0.65,
            effects: EffectsProfile {
                reverb_decay_secs: 2.0,
                reverb_wet: 0.15,
                delay_secs: 0.20,
                delay_wet: 0.12,
                chorus_freq_hz: 2.8,
                chorus_wet: 0.12,
            },
        },
    },
];

/// All initial (matching) states
pub fn emotional_states() -> &'static [StateProfile] {
    EMOTIONAL_STATES
}

/// All target states
pub fn target_states() -> &'static [StateProfile] {
    TARGET_STATES
}

/// Look up an initial state by id
pub fn emotional_state(id: &str) -> Option<&'static StateProfile> {
    EMOTIONAL_STATES.iter().find(|s| s.id == id)
}

/// Look up a target state by id
pub fn target_state(id: &str) -> Option<&'static StateProfile> {
    TARGET_STATES.iter().find(|s| s.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_profiles_in_range() {
        for state in emotional_states().iter().chain(target_states()) {
            assert!(state.music.in_range(), "{} music out of range", state.id);
            assert!(
                state.brainwave.in_range(),
                "{} brainwave out of range",
                state.id
            );
        }
    }

    #[test]
    fn test_spec_anchor_profiles() {
        let raiva = emotional_state("RAIVA").unwrap();
        assert_eq!(raiva.music.tempo_bpm, 125.0);
        assert_eq!(raiva.music.scale.root, PitchClass::Ds);
        assert_eq!(raiva.music.scale.mode, Mode::Phrygian);

        let foco = target_state("FOCO").unwrap();
        assert_eq!(foco.music.tempo_bpm, 76.0);
        assert_eq!(foco.music.scale.root, PitchClass::C);
        assert_eq!(foco.music.scale.mode, Mode::Ionian);
    }

    #[test]
    fn test_lookup_misses() {
        assert!(emotional_state("FOCO").is_none());
        assert!(target_state("RAIVA").is_none());
        assert!(emotional_state("NOPE").is_none());
    }

    #[test]
    fn test_every_state_has_a_progression() {
        for state in emotional_states().iter().chain(target_states()) {
            assert!(
                neuroflow_theory::progression_for_state(state.id).is_some(),
                "{} missing progression",
                state.id
            );
        }
    }
}
