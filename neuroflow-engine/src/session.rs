//! The session engine: command handling and the tick driver
//!
//! One `SessionEngine` lives on the control thread. It owns the session
//! state, the sequencer and any in-flight transition, and shares the
//! `LayerStack` with the audio callback behind a `parking_lot` mutex.
//! Every entry point takes `now_secs` from the caller's monotonic clock,
//! which keeps the whole engine drivable from a synthetic clock in tests.

use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, error, info, warn};

use neuroflow_audio::LayerStack;

use crate::command::{EngineCommand, EngineEvent, ProfilePayload};
use crate::error::EngineError;
use crate::sequencer::{SeqAction, Sequencer};
use crate::state::{ControlSnapshot, EngineState, Phase, ScaleMaterial};
use crate::transition::{jittered, smootherstep, Transition, RAMP_SECS};

/// What a finished session looked like, for best-effort persistence
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub initial_state_id: String,
    pub target_state_id: Option<String>,
    pub duration_secs: u64,
    pub completed: bool,
}

pub struct SessionEngine {
    state: Option<EngineState>,
    sequencer: Sequencer,
    transition: Option<Transition>,
    stack: Arc<Mutex<LayerStack>>,
    events: Sender<EngineEvent>,
    rng: StdRng,

    paused: bool,
    initial_state_id: Option<String>,
    target_state_id: Option<String>,
    session_started_secs: f64,
    next_status_secs: f64,
}

impl SessionEngine {
    pub fn new(stack: Arc<Mutex<LayerStack>>, events: Sender<EngineEvent>, seed: u64) -> Self {
        let engine = Self {
            state: None,
            sequencer: Sequencer::new(),
            transition: None,
            stack,
            events,
            rng: StdRng::seed_from_u64(seed),
            paused: false,
            initial_state_id: None,
            target_state_id: None,
            session_started_secs: 0.0,
            next_status_secs: 0.0,
        };
        engine.emit(EngineEvent::Ready);
        engine
    }

    pub fn phase(&self) -> Phase {
        self.state.as_ref().map(|s| s.phase).unwrap_or(Phase::Idle)
    }

    pub fn controls(&self) -> Option<ControlSnapshot> {
        self.state.as_ref().map(|s| s.controls)
    }

    /// Returns a session summary when the command ended a session
    pub fn handle_command(
        &mut self,
        command: EngineCommand,
        now_secs: f64,
    ) -> Option<SessionSummary> {
        match command {
            EngineCommand::StartMusic(payload) => {
                self.start_music(*payload, now_secs);
                None
            }
            EngineCommand::Transition {
                payload,
                duration_secs,
            } => {
                self.start_transition(*payload, duration_secs, now_secs);
                None
            }
            EngineCommand::Stop | EngineCommand::Shutdown => self.stop(now_secs),
            EngineCommand::Pause => {
                if self.state.is_some() && !self.paused {
                    self.paused = true;
                    self.stack.lock().pause();
                    info!("session paused");
                }
                None
            }
            EngineCommand::Resume => {
                if self.paused {
                    self.paused = false;
                    self.stack.lock().resume();
                    self.sequencer.resync(now_secs);
                    info!("session resumed");
                }
                None
            }
            EngineCommand::Volume(volume) => {
                if !(0.0..=1.0).contains(&volume) {
                    warn!(volume, "volume out of range, clamping");
                }
                self.stack.lock().set_volume(volume.clamp(0.0, 1.0));
                None
            }
            EngineCommand::SetProfile(payload) => {
                self.set_profile(*payload);
                None
            }
        }
    }

    fn start_music(&mut self, payload: ProfilePayload, now_secs: f64) {
        if self.state.is_some() {
            debug!("start ignored: session already playing");
            return;
        }
        info!(state = %payload.state_id, "session starting");
        let state = EngineState::new(&payload);
        {
            let mut stack = self.stack.lock();
            stack.reset();
            stack.apply_controls(&state.controls.to_controls(), 0.5);
            stack.start();
        }
        self.sequencer.reset(now_secs);
        self.initial_state_id = Some(payload.state_id);
        self.target_state_id = None;
        self.session_started_secs = now_secs;
        self.state = Some(state);
    }

    fn start_transition(&mut self, payload: ProfilePayload, duration_secs: f64, now_secs: f64) {
        let Some(state) = &mut self.state else {
            let err = EngineError::NotPlaying;
            error!(%err, "transition rejected");
            self.emit(EngineEvent::Error(err.to_string()));
            return;
        };
        if self.transition.is_some() {
            debug!("replacing in-flight transition");
        }
        info!(
            target = %payload.state_id,
            duration_secs,
            "transition starting"
        );

        let target = ControlSnapshot::from_profile(&payload.music, &payload.brainwave);
        self.transition = Some(Transition {
            // Continuity: depart from the values currently sounding
            start: state.controls,
            target,
            target_state_id: payload.state_id.clone(),
            started_secs: now_secs,
            duration_secs: duration_secs.max(0.0),
            next_tick_secs: now_secs,
        });
        state.incoming = Some(ScaleMaterial::from_payload(&payload));
        state.crossfade = 0.0;
        state.phase = Phase::Transitioning;
        self.target_state_id = Some(payload.state_id);
    }

    fn set_profile(&mut self, payload: ProfilePayload) {
        let Some(state) = &mut self.state else {
            warn!("profile override ignored: no session");
            return;
        };
        state.controls = ControlSnapshot::from_profile(&payload.music, &payload.brainwave);
        if !payload.scale.is_empty() {
            state.active = ScaleMaterial::from_payload(&payload);
            state.melody_cursor = state
                .melody_cursor
                .clamp(0, state.active.notes.len() as i32 - 1);
        }
        self.stack
            .lock()
            .apply_controls(&state.controls.to_controls(), RAMP_SECS);
    }

    fn stop(&mut self, now_secs: f64) -> Option<SessionSummary> {
        let state = self.state.take()?;
        info!("session stopping");
        self.transition = None;
        self.sequencer.disarm();
        self.paused = false;
        {
            let mut stack = self.stack.lock();
            stack.stop();
        }
        Some(SessionSummary {
            initial_state_id: self.initial_state_id.take().unwrap_or_default(),
            target_state_id: self.target_state_id.take(),
            duration_secs: (now_secs - self.session_started_secs).max(0.0) as u64,
            completed: state.phase == Phase::Arrived,
        })
    }

    /// Drive the transition and the sequencer. Call at a cadence well
    /// under half a second; both subsystems keep their own grids.
    pub fn tick(&mut self, now_secs: f64) {
        if self.paused {
            return;
        }
        self.tick_transition(now_secs);
        self.tick_sequencer(now_secs);

        // Chatty status stream; the host-side throttle caps what the
        // host actually sees
        if let Some(state) = &self.state {
            if now_secs >= self.next_status_secs {
                self.next_status_secs = now_secs + 1.0;
                self.emit(EngineEvent::Log {
                    message: format!(
                        "binaural: carrier {:.1} Hz, beat {:.1} Hz",
                        state.controls.carrier_hz, state.controls.beat_hz
                    ),
                    timestamp_ms: (now_secs * 1000.0) as u64,
                });
            }
        }
    }

    fn tick_transition(&mut self, now_secs: f64) {
        // Progress derives from the wall clock captured at start, never
        // from how many ticks actually ran.
        let (t, start, target) = {
            let Some(transition) = self.transition.as_mut() else {
                return;
            };
            if !transition.due(now_secs) {
                return;
            }
            transition.arm_next_tick();
            (
                transition.progress(now_secs),
                transition.start,
                transition.target,
            )
        };
        let eased = jittered(smootherstep(t), t, &mut self.rng);

        let controls = {
            let Some(state) = &mut self.state else {
                self.transition = None;
                return;
            };
            state.controls = ControlSnapshot::lerp(&start, &target, eased as f32);
            state.crossfade = eased;
            state.controls
        };
        self.stack
            .lock()
            .apply_controls(&controls.to_controls(), RAMP_SECS);

        let timestamp_ms = (now_secs * 1000.0) as u64;
        self.emit(EngineEvent::TransitionProgress {
            progress: eased,
            timestamp_ms,
        });
        debug!(progress = eased, "transition tick");

        if t >= 1.0 {
            if let Some(finished) = self.transition.take() {
                if let Some(state) = &mut self.state {
                    state.finalize_transition(finished.target);
                }
                info!(target = %finished.target_state_id, "transition complete");
                self.emit(EngineEvent::TransitionComplete);
            }
        }
    }

    fn tick_sequencer(&mut self, now_secs: f64) {
        let Some(state) = &mut self.state else {
            return;
        };
        let actions = self.sequencer.tick(now_secs, state, &mut self.rng);
        if actions.is_empty() {
            return;
        }
        let mut stack = self.stack.lock();
        for action in actions {
            match action {
                SeqAction::MelodyNote {
                    freq_hz,
                    velocity,
                    duration_secs,
                } => stack.melody_note(freq_hz, velocity, duration_secs),
                SeqAction::RhythmHit { velocity } => stack.trigger_rhythm(velocity),
                SeqAction::PadChord { freqs, velocity } => stack.pad_chord(&freqs, velocity),
                SeqAction::AmbientNudge { delta_hz } => {
                    stack.nudge_ambient_cutoff(delta_hz, RAMP_SECS)
                }
                SeqAction::PadGain { factor } => stack.pad_variation_gain(factor, RAMP_SECS),
            }
        }
    }

    fn emit(&self, event: EngineEvent) {
        // Fire and forget: a saturated host channel must never stall the
        // control loop.
        let _ = self.events.try_send(event);
    }
}
