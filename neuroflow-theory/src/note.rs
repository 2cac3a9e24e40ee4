//! Pitch classes and notes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Reference frequency for A4 (440 Hz)
const A4_FREQ: f32 = 440.0;

/// MIDI number of A4
const A4_MIDI: i32 = 69;

/// The twelve chromatic pitch classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    Cs,
    D,
    Ds,
    E,
    F,
    Fs,
    G,
    Gs,
    A,
    As,
    B,
}

impl PitchClass {
    /// Semitone offset from C (0-11)
    pub fn semitone(self) -> i32 {
        match self {
            PitchClass::C => 0,
            PitchClass::Cs => 1,
            PitchClass::D => 2,
            PitchClass::Ds => 3,
            PitchClass::E => 4,
            PitchClass::F => 5,
            PitchClass::Fs => 6,
            PitchClass::G => 7,
            PitchClass::Gs => 8,
            PitchClass::A => 9,
            PitchClass::As => 10,
            PitchClass::B => 11,
        }
    }

    /// Pitch class from a semitone offset (wraps modulo 12)
    pub fn from_semitone(semitone: i32) -> Self {
        const CLASSES: [PitchClass; 12] = [
            PitchClass::C,
            PitchClass::Cs,
            PitchClass::D,
            PitchClass::Ds,
            PitchClass::E,
            PitchClass::F,
            PitchClass::Fs,
            PitchClass::G,
            PitchClass::Gs,
            PitchClass::A,
            PitchClass::As,
            PitchClass::B,
        ];
        CLASSES[semitone.rem_euclid(12) as usize]
    }

    /// Parse a root-note name, falling back to C on unknown input.
    ///
    /// Accepts sharps and flats ("Eb", "F#", "Cb"). Never errors: an
    /// unrecognized name logs a warning and resolves to C so the engine
    /// keeps producing sound.
    pub fn parse_or_c(name: &str) -> Self {
        match name.parse() {
            Ok(pc) => pc,
            Err(_) => {
                warn!(root = name, "unknown root note, falling back to C");
                PitchClass::C
            }
        }
    }
}

impl FromStr for PitchClass {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Normalize: letter uppercased, accidental kept as-is
        let s = s.trim();
        let pc = match s.to_ascii_uppercase().as_str() {
            "C" => PitchClass::C,
            "C#" | "DB" => PitchClass::Cs,
            "D" => PitchClass::D,
            "D#" | "EB" => PitchClass::Ds,
            "E" | "FB" => PitchClass::E,
            "F" | "E#" => PitchClass::F,
            "F#" | "GB" => PitchClass::Fs,
            "G" => PitchClass::G,
            "G#" | "AB" => PitchClass::Gs,
            "A" => PitchClass::A,
            "A#" | "BB" => PitchClass::As,
            "B" | "CB" => PitchClass::B,
            _ => return Err(()),
        };
        Ok(pc)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        };
        f.write_str(name)
    }
}

/// A concrete pitch: pitch class plus octave (C4 = middle C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Note {
    pub class: PitchClass,
    pub octave: i8,
}

impl Note {
    pub const fn new(class: PitchClass, octave: i8) -> Self {
        Self { class, octave }
    }

    /// MIDI note number (C4 = 60)
    pub fn midi(self) -> i32 {
        (self.octave as i32 + 1) * 12 + self.class.semitone()
    }

    /// Note from a MIDI number
    pub fn from_midi(midi: i32) -> Self {
        Self {
            class: PitchClass::from_semitone(midi.rem_euclid(12)),
            octave: (midi.div_euclid(12) - 1) as i8,
        }
    }

    /// Equal-tempered frequency in Hz
    pub fn frequency_hz(self) -> f32 {
        A4_FREQ * 2.0_f32.powf((self.midi() - A4_MIDI) as f32 / 12.0)
    }

    /// Same pitch class, shifted by whole octaves
    pub fn shift_octaves(self, octaves: i8) -> Self {
        Self {
            class: self.class,
            octave: self.octave + octaves,
        }
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.class, self.octave)
    }
}
