//! Procedural sequencer
//!
//! Four periodic generators on a musical grid derived from the current
//! interpolated tempo. Each firing samples the control snapshot at that
//! moment, so a transition audibly bends the music as it progresses.
//! All randomness comes from one injected seeded RNG, which makes whole
//! event streams reproducible in tests.

use rand::rngs::StdRng;
use rand::Rng;

use crate::state::EngineState;

/// One playable decision from a generator tick
#[derive(Debug, Clone, PartialEq)]
pub enum SeqAction {
    MelodyNote {
        freq_hz: f32,
        velocity: f32,
        duration_secs: f32,
    },
    RhythmHit {
        velocity: f32,
    },
    PadChord {
        freqs: Vec<f32>,
        velocity: f32,
    },
    AmbientNudge {
        delta_hz: f32,
    },
    PadGain {
        factor: f32,
    },
}

/// Stepwise-biased interval weights for -3..=+3 scale steps
const INTERVAL_WEIGHTS: [f32; 7] = [4.0, 13.0, 25.0, 15.0, 25.0, 13.0, 5.0];
/// Note lengths in beats and their weights at the slow and fast extremes
const DURATION_BEATS: [f32; 5] = [4.0, 2.0, 1.0, 0.5, 0.25];
const SLOW_WEIGHTS: [f32; 5] = [30.0, 35.0, 20.0, 10.0, 5.0];
const FAST_WEIGHTS: [f32; 5] = [2.0, 8.0, 20.0, 45.0, 25.0];

const BEATS_PER_MEASURE: f64 = 4.0;
const CHORD_MEASURES: f64 = 2.0;
const VARIATION_MEASURES: f64 = 4.0;

pub struct Sequencer {
    next_subdivision_secs: f64,
    next_chord_secs: f64,
    next_variation_secs: f64,
}

impl Sequencer {
    pub fn new() -> Self {
        Self {
            next_subdivision_secs: f64::INFINITY,
            next_chord_secs: f64::INFINITY,
            next_variation_secs: f64::INFINITY,
        }
    }

    /// Arm all generators relative to `now`. The chord task fires
    /// immediately so a fresh session opens on a chord.
    pub fn reset(&mut self, now_secs: f64) {
        self.next_subdivision_secs = now_secs;
        self.next_chord_secs = now_secs;
        self.next_variation_secs = now_secs + 1.0;
    }

    /// Re-arm after a pause so the backlog of missed grid points does
    /// not fire as a burst.
    pub fn resync(&mut self, now_secs: f64) {
        if self.next_subdivision_secs.is_finite() {
            self.reset(now_secs);
        }
    }

    pub fn disarm(&mut self) {
        self.next_subdivision_secs = f64::INFINITY;
        self.next_chord_secs = f64::INFINITY;
        self.next_variation_secs = f64::INFINITY;
    }

    /// Evaluate every generator whose grid point has passed
    pub fn tick(
        &mut self,
        now_secs: f64,
        state: &mut EngineState,
        rng: &mut StdRng,
    ) -> Vec<SeqAction> {
        let mut actions = Vec::new();
        let beat_secs = 60.0 / state.controls.tempo_bpm.max(20.0) as f64;
        let subdivision_secs = beat_secs / 2.0;

        while now_secs >= self.next_subdivision_secs {
            self.melody_task(state, rng, beat_secs, &mut actions);
            self.rhythm_task(state, rng, &mut actions);
            self.next_subdivision_secs += subdivision_secs;
        }
        while now_secs >= self.next_chord_secs {
            self.chord_task(state, rng, &mut actions);
            self.next_chord_secs += beat_secs * BEATS_PER_MEASURE * CHORD_MEASURES;
        }
        while now_secs >= self.next_variation_secs {
            self.variation_task(state, rng, &mut actions);
            self.next_variation_secs += beat_secs * BEATS_PER_MEASURE * VARIATION_MEASURES;
        }
        actions
    }

    fn melody_task(
        &mut self,
        state: &mut EngineState,
        rng: &mut StdRng,
        beat_secs: f64,
        actions: &mut Vec<SeqAction>,
    ) {
        let activity = state.controls.melodic_activity;
        if rng.gen::<f32>() >= 0.3 + 0.5 * activity {
            return;
        }

        let roll = rng.gen::<f64>();
        let material = state.pick_material(roll);
        let notes = &material.notes;
        if notes.is_empty() {
            return;
        }

        // Centered window, wider with higher activity
        let len = notes.len() as i32;
        let width = (3.0 + activity * (len as f32 - 3.0)).round() as i32;
        let width = width.clamp(1, len);
        let lo = (len - width) / 2;
        let hi = lo + width - 1;

        let step = weighted_index(rng, &INTERVAL_WEIGHTS) as i32 - 3;
        let cursor = (state.melody_cursor + step).clamp(lo, hi);
        let freq_hz = notes[cursor as usize].frequency_hz();
        state.melody_cursor = cursor;

        let mut weights = [0.0f32; 5];
        for i in 0..5 {
            weights[i] = SLOW_WEIGHTS[i] + (FAST_WEIGHTS[i] - SLOW_WEIGHTS[i]) * activity;
        }
        let beats = DURATION_BEATS[weighted_index(rng, &weights)];
        let duration_secs = beats * beat_secs as f32;

        let velocity = 0.45 + rng.gen::<f32>() * 0.4 * state.controls.dynamic_range;
        actions.push(SeqAction::MelodyNote {
            freq_hz,
            velocity,
            duration_secs,
        });
    }

    fn rhythm_task(&mut self, state: &EngineState, rng: &mut StdRng, actions: &mut Vec<SeqAction>) {
        if rng.gen::<f32>() < state.controls.rhythm_density {
            let velocity = 0.6 + rng.gen::<f32>() * 0.2;
            actions.push(SeqAction::RhythmHit { velocity });
        }
    }

    fn chord_task(&mut self, state: &mut EngineState, rng: &mut StdRng, actions: &mut Vec<SeqAction>) {
        let roll = rng.gen::<f64>();
        let material = state.pick_material(roll);
        if material.chords.is_empty() {
            return;
        }
        let chord = &material.chords[state.chord_cursor % material.chords.len()];
        let freqs: Vec<f32> = chord.iter().map(|n| n.frequency_hz()).collect();
        state.chord_cursor = state.chord_cursor.wrapping_add(1);

        let velocity = 0.3 + 0.5 * state.controls.complexity;
        actions.push(SeqAction::PadChord { freqs, velocity });
    }

    fn variation_task(
        &mut self,
        state: &mut EngineState,
        rng: &mut StdRng,
        actions: &mut Vec<SeqAction>,
    ) {
        actions.push(SeqAction::AmbientNudge {
            delta_hz: (rng.gen::<f32>() * 2.0 - 1.0) * 50.0,
        });
        actions.push(SeqAction::PadGain {
            factor: 0.95 + rng.gen::<f32>() * 0.1,
        });

        // Occasionally throw the melody walk up or down an octave
        if rng.gen::<f32>() < 0.15 {
            let steps = state.active.steps_per_octave as i32;
            let len = state.active.notes.len() as i32;
            let jump = if rng.gen::<bool>() { steps } else { -steps };
            state.melody_cursor = (state.melody_cursor + jump).clamp(0, (len - 1).max(0));
        }
    }
}

impl Default for Sequencer {
    fn default() -> Self {
        Self::new()
    }
}

/// Index into `weights` chosen proportionally to each weight
fn weighted_index(rng: &mut StdRng, weights: &[f32]) -> usize {
    let total: f32 = weights.iter().sum();
    let mut roll = rng.gen::<f32>() * total;
    for (i, w) in weights.iter().enumerate() {
        roll -= w;
        if roll <= 0.0 {
            return i;
        }
    }
    weights.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::ProfilePayload;
    use neuroflow_catalog::emotional_state;
    use rand::SeedableRng;

    fn seeded_state(id: &str) -> EngineState {
        let profile = emotional_state(id).unwrap();
        let scale =
            neuroflow_theory::scale_notes(profile.music.scale.root, profile.music.scale.mode, 3, 5);
        let chords = neuroflow_theory::chords_from_scale(
            profile.music.scale.root,
            profile.music.scale.mode,
            4,
        );
        EngineState::new(&ProfilePayload {
            state_id: id.to_string(),
            music: profile.music,
            brainwave: profile.brainwave,
            steps_per_octave: profile.music.scale.mode.intervals().len(),
            scale,
            chords,
        })
    }

    fn run(seed: u64, secs: f64) -> Vec<SeqAction> {
        let mut seq = Sequencer::new();
        let mut state = seeded_state("NEUTRO");
        let mut rng = StdRng::seed_from_u64(seed);
        seq.reset(0.0);
        let mut actions = Vec::new();
        let mut t = 0.0;
        while t < secs {
            actions.extend(seq.tick(t, &mut state, &mut rng));
            t += 0.05;
        }
        actions
    }

    #[test]
    fn test_same_seed_same_stream() {
        assert_eq!(run(42, 30.0), run(42, 30.0));
    }

    #[test]
    fn test_different_seeds_diverge() {
        assert_ne!(run(1, 30.0), run(2, 30.0));
    }

    #[test]
    fn test_disarmed_sequencer_stays_silent() {
        let mut seq = Sequencer::new();
        let mut state = seeded_state("NEUTRO");
        let mut rng = StdRng::seed_from_u64(0);
        assert!(seq.tick(1000.0, &mut state, &mut rng).is_empty());
    }

    #[test]
    fn test_melody_notes_stay_in_scale() {
        let state = seeded_state("NEUTRO");
        let scale_freqs: Vec<f32> = state.active.notes.iter().map(|n| n.frequency_hz()).collect();
        for action in run(7, 60.0) {
            if let SeqAction::MelodyNote { freq_hz, .. } = action {
                assert!(
                    scale_freqs.iter().any(|f| (f - freq_hz).abs() < 0.01),
                    "{freq_hz} not in scale"
                );
            }
        }
    }

    #[test]
    fn test_velocities_bounded() {
        for action in run(3, 60.0) {
            match action {
                SeqAction::MelodyNote { velocity, .. } => {
                    assert!((0.0..=1.0).contains(&velocity))
                }
                SeqAction::RhythmHit { velocity } => {
                    assert!((0.6..=0.8).contains(&velocity))
                }
                SeqAction::PadChord { velocity, .. } => {
                    assert!((0.3..=0.8).contains(&velocity))
                }
                _ => {}
            }
        }
    }
}
