//! Session state: phase machine, control snapshot, scale material

use neuroflow_audio::ControlUpdate;
use neuroflow_catalog::{BrainwaveProfile, MusicalProfile};
use neuroflow_theory::Note;

use crate::command::ProfilePayload;

/// Where the session is in its life cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Playing music that mirrors the reported emotional state
    Matching,
    /// ISO transition in flight
    Transitioning,
    /// Transition finished; holding the target state
    Arrived,
}

/// The full set of scalar controls the sequencer and audio graph read.
/// During a transition every field moves in lockstep through the same
/// eased progress value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSnapshot {
    pub tempo_bpm: f32,
    pub brightness: f32,
    pub complexity: f32,
    pub rhythm_density: f32,
    pub melodic_activity: f32,
    pub dynamic_range: f32,
    pub beat_hz: f32,
    pub carrier_hz: f32,
    pub reverb_decay_secs: f32,
    pub reverb_wet: f32,
    pub delay_secs: f32,
    pub delay_wet: f32,
    pub chorus_freq_hz: f32,
    pub chorus_wet: f32,
}

impl ControlSnapshot {
    /// Build from catalog data, clamping every bounded field so bad
    /// literals or host overrides can never reach the audio graph.
    pub fn from_profile(music: &MusicalProfile, brainwave: &BrainwaveProfile) -> Self {
        let unit = |v: f32| v.clamp(0.0, 1.0);
        Self {
            tempo_bpm: music.tempo_bpm.clamp(20.0, 220.0),
            brightness: unit(music.timbre_brightness),
            complexity: unit(music.harmonic_complexity),
            rhythm_density: unit(music.rhythm_density),
            melodic_activity: unit(music.melodic_activity),
            dynamic_range: unit(music.dynamic_range),
            beat_hz: brainwave.frequency_hz.clamp(0.5, 40.0),
            carrier_hz: brainwave.carrier_hz.clamp(50.0, 500.0),
            reverb_decay_secs: music.effects.reverb_decay_secs.clamp(0.1, 10.0),
            reverb_wet: unit(music.effects.reverb_wet),
            delay_secs: music.effects.delay_secs.clamp(0.0, 1.95),
            delay_wet: unit(music.effects.delay_wet),
            chorus_freq_hz: music.effects.chorus_freq_hz.clamp(0.05, 5.0),
            chorus_wet: unit(music.effects.chorus_wet),
        }
    }

    /// Linear interpolation of every field at once
    pub fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        let l = |x: f32, y: f32| x + (y - x) * t;
        Self {
            tempo_bpm: l(a.tempo_bpm, b.tempo_bpm),
            brightness: l(a.brightness, b.brightness),
            complexity: l(a.complexity, b.complexity),
            rhythm_density: l(a.rhythm_density, b.rhythm_density),
            melodic_activity: l(a.melodic_activity, b.melodic_activity),
            dynamic_range: l(a.dynamic_range, b.dynamic_range),
            beat_hz: l(a.beat_hz, b.beat_hz),
            carrier_hz: l(a.carrier_hz, b.carrier_hz),
            reverb_decay_secs: l(a.reverb_decay_secs, b.reverb_decay_secs),
            reverb_wet: l(a.reverb_wet, b.reverb_wet),
            delay_secs: l(a.delay_secs, b.delay_secs),
            delay_wet: l(a.delay_wet, b.delay_wet),
            chorus_freq_hz: l(a.chorus_freq_hz, b.chorus_freq_hz),
            chorus_wet: l(a.chorus_wet, b.chorus_wet),
        }
    }

    /// The audio-facing subset
    pub fn to_controls(&self) -> ControlUpdate {
        ControlUpdate {
            beat_hz: self.beat_hz,
            carrier_hz: self.carrier_hz,
            brightness: self.brightness,
            reverb_decay_secs: self.reverb_decay_secs,
            reverb_wet: self.reverb_wet,
            delay_secs: self.delay_secs,
            delay_wet: self.delay_wet,
            chorus_freq_hz: self.chorus_freq_hz,
            chorus_wet: self.chorus_wet,
        }
    }
}

/// Resolved pitch material of one state
#[derive(Debug, Clone)]
pub struct ScaleMaterial {
    pub notes: Vec<Note>,
    pub chords: Vec<Vec<Note>>,
    pub steps_per_octave: usize,
}

impl ScaleMaterial {
    pub fn from_payload(payload: &ProfilePayload) -> Self {
        Self {
            notes: payload.scale.clone(),
            chords: payload.chords.clone(),
            steps_per_octave: payload.steps_per_octave.max(1),
        }
    }
}

/// Mutable per-session state. Exactly one exists per session; `stop`
/// resets it wholesale so a following start sees a fresh engine.
#[derive(Debug, Clone)]
pub struct EngineState {
    pub phase: Phase,
    pub controls: ControlSnapshot,
    /// Material of the state being played (or left, mid-transition)
    pub active: ScaleMaterial,
    /// Target material while a transition is in flight
    pub incoming: Option<ScaleMaterial>,
    /// Scale/chord crossfade progress, 0 = all old, 1 = all target
    pub crossfade: f64,
    /// Melody random-walk position, an index into the scale window
    pub melody_cursor: i32,
    pub chord_cursor: usize,
}

impl EngineState {
    pub fn new(payload: &ProfilePayload) -> Self {
        let active = ScaleMaterial::from_payload(payload);
        let melody_cursor = active.notes.len() as i32 / 2;
        Self {
            phase: Phase::Matching,
            controls: ControlSnapshot::from_profile(&payload.music, &payload.brainwave),
            active,
            incoming: None,
            crossfade: 0.0,
            melody_cursor,
            chord_cursor: 0,
        }
    }

    /// Material to draw from for one event: old or target, chosen at
    /// random with probability equal to the crossfade progress.
    pub fn pick_material(&self, roll: f64) -> &ScaleMaterial {
        match &self.incoming {
            Some(target) if roll < self.crossfade => target,
            _ => &self.active,
        }
    }

    /// Adopt the transition target as the new resting state
    pub fn finalize_transition(&mut self, target: ControlSnapshot) {
        self.controls = target;
        if let Some(material) = self.incoming.take() {
            self.active = material;
            self.melody_cursor = self
                .melody_cursor
                .clamp(0, self.active.notes.len() as i32 - 1);
        }
        self.crossfade = 0.0;
        self.phase = Phase::Arrived;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neuroflow_catalog::emotional_state;

    fn payload(id: &str) -> ProfilePayload {
        let state = emotional_state(id).unwrap();
        let notes = neuroflow_theory::scale_notes(state.music.scale.root, state.music.scale.mode, 3, 5);
        let chords =
            neuroflow_theory::chords_from_scale(state.music.scale.root, state.music.scale.mode, 4);
        ProfilePayload {
            state_id: id.to_string(),
            music: state.music,
            brainwave: state.brainwave,
            steps_per_octave: state.music.scale.mode.intervals().len(),
            scale: notes,
            chords,
        }
    }

    #[test]
    fn test_snapshot_clamps_out_of_range() {
        let state = emotional_state("NEUTRO").unwrap();
        let mut music = state.music;
        music.timbre_brightness = 3.0;
        music.rhythm_density = -1.0;
        let snap = ControlSnapshot::from_profile(&music, &state.brainwave);
        assert_eq!(snap.brightness, 1.0);
        assert_eq!(snap.rhythm_density, 0.0);
    }

    #[test]
    fn test_lerp_midpoint() {
        let a = ControlSnapshot::from_profile(
            &emotional_state("RAIVA").unwrap().music,
            &emotional_state("RAIVA").unwrap().brainwave,
        );
        let target = neuroflow_catalog::target_state("FOCO").unwrap();
        let b = ControlSnapshot::from_profile(&target.music, &target.brainwave);
        let mid = ControlSnapshot::lerp(&a, &b, 0.5);
        assert!((mid.tempo_bpm - (125.0 + 76.0) / 2.0).abs() < 1e-3);
        assert!((mid.beat_hz - (25.0 + 12.0) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_pick_material_full_crossfade_takes_target() {
        let mut state = EngineState::new(&payload("RAIVA"));
        state.incoming = Some(state.active.clone());
        state.crossfade = 1.0;
        // With crossfade 1 every roll below 1.0 picks the target
        let picked = state.pick_material(0.999) as *const _;
        let target = state.incoming.as_ref().unwrap() as *const _;
        assert_eq!(picked, target);
    }

    #[test]
    fn test_finalize_adopts_target() {
        let mut state = EngineState::new(&payload("RAIVA"));
        let incoming = ScaleMaterial {
            notes: state.active.notes[..3].to_vec(),
            chords: vec![],
            steps_per_octave: 7,
        };
        state.incoming = Some(incoming);
        state.crossfade = 0.8;
        let target = state.controls;
        state.finalize_transition(target);
        assert_eq!(state.phase, Phase::Arrived);
        assert!(state.incoming.is_none());
        assert_eq!(state.crossfade, 0.0);
        assert_eq!(state.active.notes.len(), 3);
        assert!(state.melody_cursor < 3);
    }
}
