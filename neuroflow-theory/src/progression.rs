//! Preset chord progressions per emotional character
//!
//! Hand-voiced progressions chosen for their therapeutic character. When a
//! state id maps to a preset it takes precedence over triads derived from
//! the scale; derivation remains the fallback for uncatalogued material.

use crate::note::{Note, PitchClass};

/// Named progression presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Progression {
    /// Calm, stable, luminous (I - IV - V - I)
    Serene,
    /// Minimal, sustained (I - vi - IV - I)
    Focus,
    /// Exploratory Dorian (i - IV - v - i)
    Creative,
    /// Lydian "floating" (I - II - I - V)
    Floating,
    /// Minimal drone (i - bVII - i)
    Meditative,
    /// Ultra-minimal (i - iv)
    Sleep,
    /// Upbeat Mixolydian (I - bVII - IV - I)
    Energetic,
    /// Controlled dissonance for anger matching (i - bII - v - i)
    Tense,
    /// Unstable, for anxiety matching (i - bVI - bIII - bVII)
    Anxious,
}

const fn n(class: PitchClass, octave: i8) -> Note {
    Note::new(class, octave)
}

/// The chord material for a preset progression
pub fn progression_chords(progression: Progression) -> Vec<Vec<Note>> {
    use PitchClass::*;
    match progression {
        Progression::Serene => vec![
            vec![n(C, 4), n(E, 4), n(G, 4)],
            vec![n(F, 4), n(A, 4), n(C, 5)],
            vec![n(G, 4), n(B, 4), n(D, 5)],
            vec![n(C, 4), n(E, 4), n(G, 4)],
        ],
        Progression::Focus => vec![
            vec![n(C, 4), n(E, 4), n(G, 4), n(B, 4)],
            vec![n(A, 3), n(C, 4), n(E, 4)],
            vec![n(F, 4), n(A, 4), n(C, 5)],
            vec![n(C, 4), n(E, 4), n(G, 4)],
        ],
        Progression::Creative => vec![
            vec![n(A, 3), n(C, 4), n(E, 4)],
            vec![n(D, 4), n(Fs, 4), n(A, 4)],
            vec![n(E, 4), n(G, 4), n(B, 4)],
            vec![n(A, 3), n(C, 4), n(E, 4), n(G, 4)],
        ],
        Progression::Floating => vec![
            vec![n(F, 4), n(A, 4), n(C, 5)],
            vec![n(G, 4), n(B, 4), n(D, 5)],
            vec![n(F, 4), n(A, 4), n(C, 5)],
            vec![n(C, 4), n(E, 4), n(G, 4)],
        ],
        Progression::Meditative => vec![
            vec![n(D, 4), n(F, 4), n(A, 4)],
            vec![n(C, 4), n(E, 4), n(G, 4)],
            vec![n(D, 4), n(F, 4), n(A, 4)],
        ],
        Progression::Sleep => vec![
            vec![n(F, 3), n(Gs, 3), n(C, 4)],
            vec![n(As, 3), n(Cs, 4), n(F, 4)],
        ],
        Progression::Energetic => vec![
            vec![n(G, 4), n(B, 4), n(D, 5)],
            vec![n(F, 4), n(A, 4), n(C, 5)],
            vec![n(C, 4), n(E, 4), n(G, 4)],
            vec![n(G, 4), n(B, 4), n(D, 5)],
        ],
        Progression::Tense => vec![
            vec![n(Ds, 4), n(Fs, 4), n(As, 4)],
            vec![n(E, 4), n(Gs, 4), n(B, 4)],
            vec![n(As, 3), n(Cs, 4), n(E, 4)],
            vec![n(Ds, 4), n(Fs, 4), n(As, 4)],
        ],
        Progression::Anxious => vec![
            vec![n(D, 4), n(F, 4), n(A, 4)],
            vec![n(As, 3), n(D, 4), n(F, 4)],
            vec![n(F, 4), n(A, 4), n(C, 5)],
            vec![n(C, 4), n(E, 4), n(G, 4)],
        ],
    }
}

/// Map a catalog state id to its preset progression, if one exists.
pub fn progression_for_state(state_id: &str) -> Option<Progression> {
    let p = match state_id {
        "RAIVA" => Progression::Tense,
        "ANSIEDADE" => Progression::Anxious,
        "CANSACO" => Progression::Meditative,
        "TRISTEZA" => Progression::Sleep,
        "NEUTRO" => Progression::Serene,
        "FOCO" => Progression::Focus,
        "CRIATIVIDADE" => Progression::Creative,
        "RELAXAMENTO" => Progression::Floating,
        "MEDITACAO" => Progression::Meditative,
        "SONO" => Progression::Sleep,
        "ENERGIA" => Progression::Energetic,
        _ => return None,
    };
    Some(p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_preset_has_chords() {
        let all = [
            Progression::Serene,
            Progression::Focus,
            Progression::Creative,
            Progression::Floating,
            Progression::Meditative,
            Progression::Sleep,
            Progression::Energetic,
            Progression::Tense,
            Progression::Anxious,
        ];
        for p in all {
            let chords = progression_chords(p);
            assert!(chords.len() >= 2);
            for chord in &chords {
                assert!(chord.len() >= 3);
            }
        }
    }

    #[test]
    fn test_state_mapping() {
        assert_eq!(progression_for_state("RAIVA"), Some(Progression::Tense));
        assert_eq!(progression_for_state("FOCO"), Some(Progression::Focus));
        assert_eq!(progression_for_state("UNKNOWN"), None);
    }
}
