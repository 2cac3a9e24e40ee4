//! The full audio graph: five layers summed into the mixer
//!
//! The stack is the single object shared with the real-time callback.
//! Pad and melody carry their own effect chains (pad through lowpass,
//! reverb and chorus; melody through reverb then delay); the binaural
//! bed stays dry so nothing smears the interaural phase relationship it
//! depends on. Everything the control loop wants to change goes through
//! ramped setters, so a parameter jump never reaches the output as a
//! click.

use tracing::debug;

use crate::effects::{Chorus, Delay, Effect, Filter, FilterType, Reverb};
use crate::layers::{AmbientLayer, BinauralLayer, MelodyLayer, PadLayer, RhythmLayer};
use crate::mixer::Mixer;

/// Audio-facing controls. The control loop sends one of these whenever
/// the interpolated parameter set changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlUpdate {
    pub beat_hz: f32,
    pub carrier_hz: f32,
    pub brightness: f32,
    pub reverb_decay_secs: f32,
    pub reverb_wet: f32,
    pub delay_secs: f32,
    pub delay_wet: f32,
    pub chorus_freq_hz: f32,
    pub chorus_wet: f32,
}

/// Relative layer levels when the stack is sounding
mod level {
    pub const AMBIENT: f32 = 0.40;
    pub const BINAURAL: f32 = 0.20;
    pub const RHYTHM: f32 = 0.70;
    pub const PAD: f32 = 0.85;
    pub const MELODY: f32 = 0.75;
}

pub struct LayerStack {
    sample_rate: f32,

    binaural: BinauralLayer,
    ambient: AmbientLayer,
    rhythm: RhythmLayer,
    pad: PadLayer,
    melody: MelodyLayer,

    pad_filter: Filter,
    pad_reverb: Reverb,
    pad_chorus: Chorus,
    melody_reverb: Reverb,
    melody_delay: Delay,

    mixer: Mixer,

    pad_bus: Vec<f32>,
    melody_bus: Vec<f32>,
    running: bool,
}

impl LayerStack {
    /// Fade length for start, stop and resume
    pub const FADE_SECS: f32 = 3.0;
    /// Faster fade for pause so it feels responsive
    const PAUSE_FADE_SECS: f32 = 0.5;

    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            binaural: BinauralLayer::new(sample_rate),
            ambient: AmbientLayer::new(sample_rate),
            rhythm: RhythmLayer::new(sample_rate),
            pad: PadLayer::new(sample_rate),
            melody: MelodyLayer::new(sample_rate),
            pad_filter: Filter::new(sample_rate, FilterType::LowPass, 2000.0),
            pad_reverb: Reverb::new(sample_rate),
            pad_chorus: Chorus::new(sample_rate),
            melody_reverb: Reverb::new(sample_rate),
            melody_delay: Delay::new(sample_rate),
            mixer: Mixer::new(sample_rate),
            pad_bus: Vec::new(),
            melody_bus: Vec::new(),
            running: false,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Bring every layer up with overlapping fades
    pub fn start(&mut self) {
        debug!("layer stack starting");
        self.running = true;
        self.binaural.ramp_gain(level::BINAURAL, Self::FADE_SECS);
        self.ambient.ramp_gain(level::AMBIENT, Self::FADE_SECS);
        self.rhythm.ramp_gain(level::RHYTHM, Self::FADE_SECS);
        self.pad.ramp_gain(level::PAD, Self::FADE_SECS);
        self.melody.ramp_gain(level::MELODY, Self::FADE_SECS);
    }

    /// Fade everything out; generators keep rendering through the tail
    pub fn stop(&mut self) {
        debug!("layer stack stopping");
        self.running = false;
        self.fade_out(Self::FADE_SECS);
        self.pad.release();
    }

    pub fn pause(&mut self) {
        self.fade_out(Self::PAUSE_FADE_SECS);
    }

    pub fn resume(&mut self) {
        if self.running {
            self.start();
        }
    }

    fn fade_out(&mut self, secs: f32) {
        self.binaural.ramp_gain(0.0, secs);
        self.ambient.ramp_gain(0.0, secs);
        self.rhythm.ramp_gain(0.0, secs);
        self.pad.ramp_gain(0.0, secs);
        self.melody.ramp_gain(0.0, secs);
    }

    /// Hard reset of all generator and effect state, for a fresh session
    pub fn reset(&mut self) {
        self.binaural.reset();
        self.ambient.reset();
        self.rhythm.reset();
        self.pad.reset();
        self.melody.reset();
        self.pad_filter.reset();
        self.pad_reverb.reset();
        self.pad_chorus.reset();
        self.melody_reverb.reset();
        self.melody_delay.reset();
        self.running = false;
    }

    /// Apply an interpolated control frame, gliding over `ramp_secs`
    pub fn apply_controls(&mut self, update: &ControlUpdate, ramp_secs: f32) {
        self.binaural.ramp_beat(update.beat_hz, ramp_secs);
        self.binaural.ramp_carrier(update.carrier_hz, ramp_secs);
        self.ambient.ramp_brightness(update.brightness, ramp_secs);
        self.ambient.ramp_drone(update.carrier_hz / 4.0, ramp_secs);
        self.pad.set_brightness(update.brightness);
        self.pad_filter
            .ramp_cutoff(600.0 + update.brightness.clamp(0.0, 1.0) * 4400.0, ramp_secs);
        self.melody.set_brightness(update.brightness);
        self.pad_reverb.set_decay_secs(update.reverb_decay_secs);
        self.pad_reverb.ramp_wet(update.reverb_wet, ramp_secs);
        self.pad_chorus.set_rate(update.chorus_freq_hz);
        self.pad_chorus.ramp_wet(update.chorus_wet, ramp_secs);
        self.melody_reverb.set_decay_secs(update.reverb_decay_secs);
        self.melody_reverb.ramp_wet(update.reverb_wet, ramp_secs);
        self.melody_delay.set_time_secs(update.delay_secs);
        self.melody_delay.ramp_wet(update.delay_wet, ramp_secs);
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.mixer.set_volume(volume, 0.05);
    }

    pub fn volume(&self) -> f32 {
        self.mixer.volume()
    }

    pub fn trigger_rhythm(&mut self, velocity: f32) {
        self.rhythm.trigger(velocity);
    }

    pub fn melody_note(&mut self, freq_hz: f32, velocity: f32, duration_secs: f32) {
        self.melody.note_on(freq_hz, velocity, duration_secs);
    }

    pub fn pad_chord(&mut self, freqs: &[f32], velocity: f32) {
        self.pad.trigger_chord(freqs, velocity);
    }

    pub fn pad_release(&mut self) {
        self.pad.release();
    }

    pub fn nudge_ambient_cutoff(&mut self, delta_hz: f32, secs: f32) {
        self.ambient.nudge_cutoff(delta_hz, secs);
    }

    pub fn pad_variation_gain(&mut self, factor: f32, secs: f32) {
        self.pad.ramp_variation_gain(factor, secs);
    }

    /// Render one stereo interleaved block
    pub fn process(&mut self, out: &mut [f32]) {
        out.fill(0.0);

        if self.pad_bus.len() != out.len() {
            self.pad_bus.resize(out.len(), 0.0);
            self.melody_bus.resize(out.len(), 0.0);
        }

        // Pad chain
        self.pad_bus.fill(0.0);
        self.pad.render(&mut self.pad_bus);
        self.pad_filter.process(&mut self.pad_bus);
        self.pad_reverb.process(&mut self.pad_bus);
        self.pad_chorus.process(&mut self.pad_bus);

        // Melody chain
        self.melody_bus.fill(0.0);
        self.melody.render(&mut self.melody_bus);
        self.melody_reverb.process(&mut self.melody_bus);
        self.melody_delay.process(&mut self.melody_bus);

        for ((o, p), m) in out
            .iter_mut()
            .zip(self.pad_bus.iter())
            .zip(self.melody_bus.iter())
        {
            *o = p + m;
        }

        // Dry layers sum straight into the output
        self.ambient.render(out);
        self.rhythm.render(out);
        self.binaural.render(out);

        self.mixer.process(out);
    }
}
