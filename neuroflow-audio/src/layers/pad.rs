//! Sustained chord pad
//!
//! Eight voices with slow attack and release envelopes. The
//! oscillator waveform follows timbre brightness through three zones
//! with hysteresis so a brightness value hovering at a boundary does
//! not make the timbre flap back and forth.

use crate::ramp::Ramped;
use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    /// Two saws detuned against each other
    DetunedSaw,
}

impl Waveform {
    /// Zone boundaries at 0.33 and 0.66, with a 0.05 dead band around
    /// each before switching away from the current waveform.
    fn from_brightness(brightness: f32, current: Waveform) -> Waveform {
        const LOW: f32 = 0.33;
        const HIGH: f32 = 0.66;
        const BAND: f32 = 0.05;
        match current {
            Waveform::Sine if brightness > LOW + BAND => {
                if brightness > HIGH + BAND {
                    Waveform::DetunedSaw
                } else {
                    Waveform::Triangle
                }
            }
            Waveform::Triangle if brightness < LOW - BAND => Waveform::Sine,
            Waveform::Triangle if brightness > HIGH + BAND => Waveform::DetunedSaw,
            Waveform::DetunedSaw if brightness < HIGH - BAND => {
                if brightness < LOW - BAND {
                    Waveform::Sine
                } else {
                    Waveform::Triangle
                }
            }
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum EnvStage {
    Idle,
    Attack,
    Sustain,
    Release,
}

struct PadVoice {
    freq_hz: f32,
    phase: f32,
    phase_detuned: f32,
    env: f32,
    stage: EnvStage,
    pan: f32,
}

impl PadVoice {
    fn new(pan: f32) -> Self {
        Self {
            freq_hz: 0.0,
            phase: 0.0,
            phase_detuned: 0.0,
            env: 0.0,
            stage: EnvStage::Idle,
            pan,
        }
    }

    fn note_on(&mut self, freq_hz: f32) {
        self.freq_hz = freq_hz;
        self.stage = EnvStage::Attack;
    }

    fn note_off(&mut self) {
        if self.stage != EnvStage::Idle {
            self.stage = EnvStage::Release;
        }
    }

    #[inline]
    fn osc(&mut self, waveform: Waveform, sample_rate: f32) -> f32 {
        let inc = self.freq_hz / sample_rate;
        let out = match waveform {
            Waveform::Sine => (self.phase * TAU).sin(),
            Waveform::Triangle => {
                // Naive triangle from phase, gentle enough at pad pitches
                4.0 * (self.phase - (self.phase + 0.5).floor()).abs() - 1.0
            }
            Waveform::DetunedSaw => {
                let a = 2.0 * self.phase - 1.0;
                let b = 2.0 * self.phase_detuned - 1.0;
                (a + b) * 0.45
            }
        };
        self.phase = (self.phase + inc).fract();
        self.phase_detuned = (self.phase_detuned + inc * 1.005).fract();
        out
    }
}

pub struct PadLayer {
    sample_rate: f32,
    voices: Vec<PadVoice>,
    /// Round-robin allocation cursor, lets release tails of the old
    /// chord ring out under the new one
    next_voice: usize,
    waveform: Waveform,
    gain: Ramped,
    /// Sequencer variation multiplier on top of the base gain
    variation_gain: Ramped,
    attack_coeff: f32,
    release_coeff: f32,
    velocity: f32,
}

impl PadLayer {
    const VOICES: usize = 8;
    const ATTACK_SECS: f32 = 1.5;
    const RELEASE_SECS: f32 = 2.5;

    pub fn new(sample_rate: f32) -> Self {
        let pans = [-0.4, 0.4, -0.15, 0.15, -0.3, 0.3, 0.0, 0.0];
        Self {
            sample_rate,
            voices: pans.iter().map(|&p| PadVoice::new(p)).collect(),
            next_voice: 0,
            waveform: Waveform::Sine,
            gain: Ramped::new(0.0),
            variation_gain: Ramped::new(1.0),
            attack_coeff: 1.0 / (Self::ATTACK_SECS * sample_rate),
            release_coeff: 1.0 / (Self::RELEASE_SECS * sample_rate),
            velocity: 0.0,
        }
    }

    pub fn ramp_gain(&mut self, gain: f32, secs: f32) {
        self.gain
            .ramp_to(gain.clamp(0.0, 1.0), secs, self.sample_rate);
    }

    /// Variation task nudge, multiplies the base gain
    pub fn ramp_variation_gain(&mut self, factor: f32, secs: f32) {
        self.variation_gain
            .ramp_to(factor.clamp(0.5, 1.5), secs, self.sample_rate);
    }

    pub fn set_brightness(&mut self, brightness: f32) {
        self.waveform = Waveform::from_brightness(brightness.clamp(0.0, 1.0), self.waveform);
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Start a chord, releasing whatever was sounding
    pub fn trigger_chord(&mut self, freqs: &[f32], velocity: f32) {
        self.velocity = velocity.clamp(0.0, 1.0);
        for voice in &mut self.voices {
            voice.note_off();
        }
        for &f in freqs.iter().take(Self::VOICES) {
            let voice = &mut self.voices[self.next_voice];
            voice.note_on(f);
            self.next_voice = (self.next_voice + 1) % Self::VOICES;
        }
    }

    pub fn release(&mut self) {
        for voice in &mut self.voices {
            voice.note_off();
        }
    }

    pub fn render(&mut self, out: &mut [f32]) {
        for frame in out.chunks_exact_mut(2) {
            let gain = self.gain.next() * self.variation_gain.next();
            let mut l = 0.0;
            let mut r = 0.0;
            for voice in &mut self.voices {
                match voice.stage {
                    EnvStage::Idle => continue,
                    EnvStage::Attack => {
                        voice.env += self.attack_coeff;
                        if voice.env >= 1.0 {
                            voice.env = 1.0;
                            voice.stage = EnvStage::Sustain;
                        }
                    }
                    EnvStage::Sustain => {}
                    EnvStage::Release => {
                        voice.env -= self.release_coeff;
                        if voice.env <= 0.0 {
                            voice.env = 0.0;
                            voice.stage = EnvStage::Idle;
                            continue;
                        }
                    }
                }
                let s = voice.osc(self.waveform, self.sample_rate) * voice.env;
                let pan = voice.pan;
                l += s * (1.0 - pan.max(0.0));
                r += s * (1.0 + pan.min(0.0));
            }
            let v = self.velocity * gain * 0.25;
            frame[0] += l * v;
            frame[1] += r * v;
        }
    }

    pub fn reset(&mut self) {
        for voice in &mut self.voices {
            voice.env = 0.0;
            voice.stage = EnvStage::Idle;
            voice.phase = 0.0;
            voice.phase_detuned = 0.0;
        }
        self.next_voice = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waveform_zones() {
        assert_eq!(
            Waveform::from_brightness(0.1, Waveform::Sine),
            Waveform::Sine
        );
        assert_eq!(
            Waveform::from_brightness(0.5, Waveform::Sine),
            Waveform::Triangle
        );
        assert_eq!(
            Waveform::from_brightness(0.9, Waveform::Sine),
            Waveform::DetunedSaw
        );
    }

    #[test]
    fn test_hysteresis_holds_at_boundary() {
        // 0.34 is past the 0.33 boundary but inside the dead band, so a
        // sine pad stays sine; a triangle pad also stays triangle.
        assert_eq!(
            Waveform::from_brightness(0.34, Waveform::Sine),
            Waveform::Sine
        );
        assert_eq!(
            Waveform::from_brightness(0.34, Waveform::Triangle),
            Waveform::Triangle
        );
        assert_eq!(
            Waveform::from_brightness(0.30, Waveform::Triangle),
            Waveform::Triangle
        );
        assert_eq!(
            Waveform::from_brightness(0.27, Waveform::Triangle),
            Waveform::Sine
        );
    }

    #[test]
    fn test_chord_fades_in() {
        let mut pad = PadLayer::new(48000.0);
        pad.ramp_gain(1.0, 0.0);
        pad.trigger_chord(&[261.63, 329.63, 392.0], 0.8);

        let mut buf = vec![0.0f32; 1024];
        pad.render(&mut buf);
        let early = buf.iter().fold(0.0f32, |m, s| m.max(s.abs()));

        for _ in 0..100 {
            buf.fill(0.0);
            pad.render(&mut buf);
        }
        let later = buf.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!(later > early, "attack should grow: {early} -> {later}");
    }
}
