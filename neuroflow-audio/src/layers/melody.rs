//! Melodic lead voice
//!
//! Two-operator FM: a sine carrier modulated by a sine at a ratio of
//! the note frequency. Modulation index and ratio both follow timbre
//! brightness, so dark profiles get a near-pure tone and bright ones
//! get bell-like sidebands. Monophonic, one note at a time from the
//! sequencer.

use crate::ramp::Ramped;
use std::f32::consts::TAU;

pub struct MelodyLayer {
    sample_rate: f32,
    gain: Ramped,

    carrier_phase: f32,
    mod_phase: f32,
    freq_hz: f32,
    /// Peak modulation index, in radians of phase deviation
    mod_index: f32,
    /// Modulator-to-carrier frequency ratio
    mod_ratio: f32,

    env: f32,
    env_stage: Stage,
    attack_coeff: f32,
    decay_coeff: f32,
    remaining_samples: u64,
    velocity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Stage {
    Idle,
    Attack,
    Hold,
    Release,
}

impl MelodyLayer {
    const ATTACK_SECS: f32 = 0.02;
    const RELEASE_SECS: f32 = 0.4;

    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            gain: Ramped::new(0.0),
            carrier_phase: 0.0,
            mod_phase: 0.0,
            freq_hz: 440.0,
            mod_index: 0.5,
            mod_ratio: 1.5,
            env: 0.0,
            env_stage: Stage::Idle,
            attack_coeff: 1.0 / (Self::ATTACK_SECS * sample_rate),
            decay_coeff: 1.0 / (Self::RELEASE_SECS * sample_rate),
            remaining_samples: 0,
            velocity: 0.0,
        }
    }

    pub fn ramp_gain(&mut self, gain: f32, secs: f32) {
        self.gain
            .ramp_to(gain.clamp(0.0, 1.0), secs, self.sample_rate);
    }

    /// Brightness 0-1 maps onto a 0.2-4.0 modulation index and a
    /// 1.0-3.0 modulator ratio, so bright profiles get richer spectra
    pub fn set_brightness(&mut self, brightness: f32) {
        let b = brightness.clamp(0.0, 1.0);
        self.mod_index = 0.2 + b * 3.8;
        self.mod_ratio = 1.0 + b * 2.0;
    }

    pub fn note_on(&mut self, freq_hz: f32, velocity: f32, duration_secs: f32) {
        self.freq_hz = freq_hz;
        self.velocity = velocity.clamp(0.0, 1.0);
        self.remaining_samples = (duration_secs.max(0.05) * self.sample_rate) as u64;
        self.env_stage = Stage::Attack;
    }

    pub fn render(&mut self, out: &mut [f32]) {
        for frame in out.chunks_exact_mut(2) {
            let gain = self.gain.next();
            if self.env_stage == Stage::Idle {
                continue;
            }

            match self.env_stage {
                Stage::Attack => {
                    self.env += self.attack_coeff;
                    if self.env >= 1.0 {
                        self.env = 1.0;
                        self.env_stage = Stage::Hold;
                    }
                }
                Stage::Hold => {
                    if self.remaining_samples == 0 {
                        self.env_stage = Stage::Release;
                    } else {
                        self.remaining_samples -= 1;
                    }
                }
                Stage::Release => {
                    self.env -= self.decay_coeff;
                    if self.env <= 0.0 {
                        self.env = 0.0;
                        self.env_stage = Stage::Idle;
                        continue;
                    }
                }
                Stage::Idle => unreachable!(),
            }

            let modulator = (self.mod_phase * TAU).sin();
            let s = (self.carrier_phase * TAU + modulator * self.mod_index * self.env).sin()
                * self.env
                * self.velocity
                * gain
                * 0.35;

            self.carrier_phase = (self.carrier_phase + self.freq_hz / self.sample_rate).fract();
            self.mod_phase =
                (self.mod_phase + self.freq_hz * self.mod_ratio / self.sample_rate).fract();

            frame[0] += s * 0.9;
            frame[1] += s;
        }
    }

    pub fn reset(&mut self) {
        self.env = 0.0;
        self.env_stage = Stage::Idle;
        self.carrier_phase = 0.0;
        self.mod_phase = 0.0;
        self.remaining_samples = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_sounds_then_releases() {
        let mut layer = MelodyLayer::new(48000.0);
        layer.ramp_gain(1.0, 0.0);
        layer.note_on(440.0, 0.8, 0.1);

        let mut buf = vec![0.0f32; 48000 * 2];
        layer.render(&mut buf);
        let peak = buf.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(peak > 0.05);

        // One second covers the note plus release
        buf.fill(0.0);
        layer.render(&mut buf);
        let tail = buf.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(tail < 1e-6, "tail = {tail}");
    }

    #[test]
    fn test_brightness_sets_index() {
        let mut layer = MelodyLayer::new(48000.0);
        layer.set_brightness(0.0);
        assert!((layer.mod_index - 0.2).abs() < 1e-6);
        layer.set_brightness(1.0);
        assert!((layer.mod_index - 4.0).abs() < 1e-6);
    }
}
