//! Scale and chord resolution
//!
//! Modes are fixed interval sets (semitone offsets from the root within one
//! octave), replicated across the requested octave range in ascending order.

use crate::note::{Note, PitchClass};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Musical modes supported by the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Ionian,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Aeolian,
    Locrian,
    PentatonicMinor,
    PentatonicMajor,
}

impl Mode {
    /// Semitone offsets from the root within one octave
    pub fn intervals(self) -> &'static [i32] {
        match self {
            Mode::Ionian => &[0, 2, 4, 5, 7, 9, 11],
            Mode::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            Mode::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            Mode::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            Mode::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            Mode::Aeolian => &[0, 2, 3, 5, 7, 8, 10],
            Mode::Locrian => &[0, 1, 3, 4, 6, 8, 10],
            Mode::PentatonicMinor => &[0, 3, 5, 7, 10],
            Mode::PentatonicMajor => &[0, 2, 4, 7, 9],
        }
    }

    /// All supported modes (for property tests and validation)
    pub fn all() -> &'static [Mode] {
        &[
            Mode::Ionian,
            Mode::Dorian,
            Mode::Phrygian,
            Mode::Lydian,
            Mode::Mixolydian,
            Mode::Aeolian,
            Mode::Locrian,
            Mode::PentatonicMinor,
            Mode::PentatonicMajor,
        ]
    }

    /// Parse a mode name, falling back to ionian on unknown input.
    ///
    /// Never errors: an unrecognized name logs a warning and resolves to
    /// ionian so the engine keeps producing sound.
    pub fn parse_or_ionian(name: &str) -> Self {
        match name.parse() {
            Ok(mode) => mode,
            Err(_) => {
                warn!(mode = name, "unknown mode, falling back to ionian");
                Mode::Ionian
            }
        }
    }
}

impl FromStr for Mode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = match s.trim().to_ascii_lowercase().as_str() {
            "ionian" => Mode::Ionian,
            "dorian" => Mode::Dorian,
            "phrygian" => Mode::Phrygian,
            "lydian" => Mode::Lydian,
            "mixolydian" => Mode::Mixolydian,
            "aeolian" => Mode::Aeolian,
            "locrian" => Mode::Locrian,
            "pentatonic_minor" => Mode::PentatonicMinor,
            "pentatonic_major" => Mode::PentatonicMajor,
            _ => return Err(()),
        };
        Ok(mode)
    }
}

/// Generate the notes of a scale across an octave range, ascending.
///
/// Intervals that cross the octave boundary carry into the next octave, so
/// the returned sequence is strictly ascending in pitch. Length is always
/// `intervals.len() * (octave_high - octave_low + 1)`.
pub fn scale_notes(root: PitchClass, mode: Mode, octave_low: i8, octave_high: i8) -> Vec<Note> {
    let intervals = mode.intervals();
    let (octave_low, octave_high) = if octave_low <= octave_high {
        (octave_low, octave_high)
    } else {
        (octave_high, octave_low)
    };

    let mut notes = Vec::with_capacity(intervals.len() * (octave_high - octave_low + 1) as usize);
    for octave in octave_low..=octave_high {
        let base_midi = Note::new(root, octave).midi();
        for &interval in intervals {
            notes.push(Note::from_midi(base_midi + interval));
        }
    }
    notes
}

/// Derive I/IV/V triads from a scale by sampling scale degrees.
///
/// Degree indices: I = (0,2,4), IV = (3, (3+2)%n, (3+4)%n),
/// V = (4, (4+2)%n, (4+4)%n), wrapping within the one-octave note list.
/// Falls back to chord I alone when the scale is too short for IV/V, or
/// empty when even a triad cannot be built.
pub fn chords_from_scale(root: PitchClass, mode: Mode, octave: i8) -> Vec<Vec<Note>> {
    let scale = scale_notes(root, mode, octave, octave);
    let n = scale.len();
    let mut chords = Vec::new();

    let triad = |degree: usize| -> Vec<Note> {
        vec![
            scale[degree],
            scale[(degree + 2) % n],
            scale[(degree + 4) % n],
        ]
    };

    // Tonic needs at least five degrees below it
    if n >= 5 {
        chords.push(triad(0));
    }

    // Subdominant and dominant need the full seven-degree scale
    if n >= 7 {
        chords.push(triad(3));
        chords.push(triad(4));
    }

    // Last resort: a bare tonic triad from whatever degrees exist
    if chords.is_empty() && n >= 3 {
        chords.push(vec![scale[0], scale[2 % n], scale[4 % n]]);
    }

    chords
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_length_matches_interval_count() {
        for &mode in Mode::all() {
            for semitone in 0..12 {
                let root = PitchClass::from_semitone(semitone);
                let notes = scale_notes(root, mode, 3, 4);
                assert_eq!(notes.len(), mode.intervals().len() * 2);
            }
        }
    }

    #[test]
    fn test_scale_strictly_ascending() {
        for &mode in Mode::all() {
            for semitone in 0..12 {
                let root = PitchClass::from_semitone(semitone);
                let notes = scale_notes(root, mode, 3, 5);
                for pair in notes.windows(2) {
                    assert!(
                        pair[1].midi() > pair[0].midi(),
                        "{} not ascending in {:?} {:?}",
                        pair[1],
                        root,
                        mode
                    );
                }
            }
        }
    }

    #[test]
    fn test_c_ionian_notes() {
        let notes = scale_notes(PitchClass::C, Mode::Ionian, 3, 3);
        let names: Vec<String> = notes.iter().map(|n| n.to_string()).collect();
        assert_eq!(names, ["C3", "D3", "E3", "F3", "G3", "A3", "B3"]);
    }

    #[test]
    fn test_invalid_root_matches_c() {
        let fallback = scale_notes(PitchClass::parse_or_c("Q"), Mode::Ionian, 3, 4);
        let c = scale_notes(PitchClass::C, Mode::Ionian, 3, 4);
        assert_eq!(fallback, c);
    }

    #[test]
    fn test_invalid_mode_matches_ionian() {
        let fallback = scale_notes(PitchClass::C, Mode::parse_or_ionian("superlocrian"), 3, 4);
        let ionian = scale_notes(PitchClass::C, Mode::Ionian, 3, 4);
        assert_eq!(fallback, ionian);
    }

    #[test]
    fn test_chords_never_empty_for_full_scales() {
        for &mode in Mode::all() {
            let chords = chords_from_scale(PitchClass::C, mode, 4);
            assert!(!chords.is_empty(), "no chords for {:?}", mode);
            for chord in &chords {
                assert_eq!(chord.len(), 3);
            }
        }
    }

    #[test]
    fn test_c_ionian_triads() {
        let chords = chords_from_scale(PitchClass::C, Mode::Ionian, 4);
        assert_eq!(chords.len(), 3);
        // I = C-E-G
        let tonic: Vec<String> = chords[0].iter().map(|n| n.to_string()).collect();
        assert_eq!(tonic, ["C4", "E4", "G4"]);
        // IV = F-A-C (C wraps back within the octave list)
        let sub: Vec<String> = chords[1].iter().map(|n| n.to_string()).collect();
        assert_eq!(sub, ["F4", "A4", "C4"]);
    }

    #[test]
    fn test_pentatonic_gets_tonic_only() {
        let chords = chords_from_scale(PitchClass::C, Mode::PentatonicMajor, 4);
        assert_eq!(chords.len(), 1);
    }
}
