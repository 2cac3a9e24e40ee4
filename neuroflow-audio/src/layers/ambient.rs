//! Ambient bed: pink noise through a wobbling lowpass, plus a low drone
//!
//! The filter cutoff tracks timbre brightness, gets a very slow LFO
//! wobble on top, and is nudged a little by the variation task so the
//! bed never sounds frozen. A sustained sine drone a couple of octaves
//! below the binaural carrier gives the noise some body.

use crate::effects::{Effect, Filter, FilterType};
use crate::noise::PinkNoise;
use crate::ramp::Ramped;
use std::f32::consts::TAU;

pub struct AmbientLayer {
    sample_rate: f32,
    noise_l: PinkNoise,
    noise_r: PinkNoise,
    filter: Filter,

    /// Ramped cutoff before the wobble is applied
    base_cutoff: Ramped,
    /// Brightness-derived cutoff, the anchor for variation nudges
    brightness_cutoff: f32,

    lfo_phase: f32,
    lfo_inc: f32,

    drone_hz: Ramped,
    drone_phase: f32,

    gain: Ramped,
    scratch: Vec<f32>,
}

impl AmbientLayer {
    /// Wobble period of about 12 seconds, +-8% of the base cutoff
    const LFO_HZ: f32 = 0.085;
    const LFO_DEPTH: f32 = 0.08;
    const DRONE_LEVEL: f32 = 0.30;

    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            noise_l: PinkNoise::new(0x00C0_FFEE),
            noise_r: PinkNoise::new(0x0BAD_5EED),
            filter: Filter::new(sample_rate, FilterType::LowPass, 800.0),
            base_cutoff: Ramped::new(800.0),
            brightness_cutoff: 800.0,
            lfo_phase: 0.0,
            lfo_inc: Self::LFO_HZ / sample_rate,
            drone_hz: Ramped::new(55.0),
            drone_phase: 0.0,
            gain: Ramped::new(0.0),
            scratch: Vec::new(),
        }
    }

    /// Map brightness (0-1) onto a 200-4000Hz cutoff sweep
    pub fn ramp_brightness(&mut self, brightness: f32, secs: f32) {
        let b = brightness.clamp(0.0, 1.0);
        self.brightness_cutoff = 200.0 + b * 3800.0;
        self.base_cutoff
            .ramp_to(self.brightness_cutoff, secs, self.sample_rate);
    }

    /// Variation nudge: temporary offset around the brightness anchor
    pub fn nudge_cutoff(&mut self, delta_hz: f32, secs: f32) {
        let target = (self.brightness_cutoff + delta_hz).clamp(150.0, 5000.0);
        self.base_cutoff.ramp_to(target, secs, self.sample_rate);
    }

    /// Drone pitch, usually well below the binaural carrier
    pub fn ramp_drone(&mut self, hz: f32, secs: f32) {
        self.drone_hz
            .ramp_to(hz.clamp(25.0, 150.0), secs, self.sample_rate);
    }

    pub fn ramp_gain(&mut self, gain: f32, secs: f32) {
        self.gain
            .ramp_to(gain.clamp(0.0, 1.0), secs, self.sample_rate);
    }

    pub fn render(&mut self, out: &mut [f32]) {
        if self.scratch.len() != out.len() {
            self.scratch.resize(out.len(), 0.0);
        }
        for frame in self.scratch.chunks_exact_mut(2) {
            frame[0] = self.noise_l.next();
            frame[1] = self.noise_r.next();
        }

        // Cutoff ramp and wobble both advance at block rate; with a
        // ~12 s wobble period the per-block step is inaudible.
        let frames = out.len() / 2;
        for _ in 0..frames {
            self.base_cutoff.next();
        }
        let wobble = (self.lfo_phase * TAU).sin() * Self::LFO_DEPTH;
        self.lfo_phase = (self.lfo_phase + self.lfo_inc * frames as f32).fract();
        let wobbled = (self.base_cutoff.value() * (1.0 + wobble)).clamp(150.0, 5000.0);
        self.filter.set_cutoff_direct(wobbled);
        self.filter.process(&mut self.scratch);

        for (o, s) in out.chunks_exact_mut(2).zip(self.scratch.chunks_exact(2)) {
            let gain = self.gain.next();
            let drone = (self.drone_phase * TAU).sin() * Self::DRONE_LEVEL;
            self.drone_phase =
                (self.drone_phase + self.drone_hz.next() / self.sample_rate).fract();
            o[0] += (s[0] + drone) * gain;
            o[1] += (s[1] + drone) * gain;
        }
    }

    pub fn reset(&mut self) {
        self.filter.reset();
        self.lfo_phase = 0.0;
        self.drone_phase = 0.0;
    }
}
