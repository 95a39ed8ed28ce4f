// wheel-core/src/lib.rs

//! The core logic for the scale wheel.
//! This crate is responsible for the music theory (scales, spellings,
//! triads), the rotation state machine, and note playback. It is completely
//! headless and contains no GUI code.

pub mod audio;
pub mod config;
pub mod controller;
pub mod rotation;
pub mod synth;
pub mod theory;
pub mod tuning;

use theory::{PitchClass, SCALE_LENGTH, ScaleSpelling, Triad};
use tuning::FretPosition;

/// Everything derived from one wheel orientation.
#[derive(Debug, Clone, PartialEq)]
pub struct WheelSnapshot {
    /// Wheel rotation in degrees.
    pub rotation: f64,
    /// Root selected by the rotation.
    pub root: PitchClass,
    /// Major scale on the root.
    pub scale: [PitchClass; SCALE_LENGTH],
    /// One spelling for white-key roots, sharp then flat for black keys.
    pub spellings: Vec<ScaleSpelling>,
    /// Diatonic triads for each spelling, in the same order.
    pub triads: Vec<Vec<Triad>>,
    /// Scale notes on the guitar neck.
    pub fretboard: Vec<FretPosition>,
}

impl WheelSnapshot {
    /// Runs the theory engine for the root selected by `rotation`.
    pub fn at(rotation: f64) -> Self {
        let root = rotation::selected_root(rotation);
        let scale = theory::major_scale_notes(root);
        let spellings = theory::scale_spellings(root);
        let triads = spellings.iter().map(ScaleSpelling::triads).collect();
        let fretboard = tuning::fretboard_positions(root, &scale);

        Self {
            rotation,
            root,
            scale,
            spellings,
            triads,
            fretboard,
        }
    }

    /// Heading shown above the notes, e.g. "C# Major / Db Major".
    pub fn title(&self) -> String {
        self.spellings
            .iter()
            .map(|s| s.name.as_str())
            .collect::<Vec<_>>()
            .join(" / ")
    }

    pub fn is_in_scale(&self, pitch_class: PitchClass) -> bool {
        self.scale.contains(&pitch_class)
    }

    /// Triad on the 1-based `degree` of the spelling at index `spelling`.
    pub fn triad(&self, spelling: usize, degree: u8) -> Option<&Triad> {
        self.triads
            .get(spelling)?
            .iter()
            .find(|triad| triad.degree == degree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_for_c() {
        let snapshot = WheelSnapshot::at(0.0);
        assert_eq!(snapshot.root, PitchClass::C);
        assert_eq!(snapshot.title(), "C Major");
        assert_eq!(snapshot.spellings[0].notes_text(), "C, D, E, F, G, A, B");
        let names: Vec<&str> = snapshot.triads[0].iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["C", "Dm", "Em", "F", "G", "Am", "Bdim"]);
        assert!(snapshot.is_in_scale(PitchClass::new(11)));
        assert!(!snapshot.is_in_scale(PitchClass::new(1)));
    }

    #[test]
    fn snapshot_for_black_key_has_two_rows() {
        let snapshot = WheelSnapshot::at(31.0);
        assert_eq!(snapshot.root.index(), 1);
        assert_eq!(snapshot.title(), "C# Major / Db Major");
        assert_eq!(snapshot.triads.len(), 2);
        assert_eq!(snapshot.triad(1, 2).map(|t| t.name.as_str()), Some("Ebm"));
        assert_eq!(snapshot.triad(0, 2).map(|t| t.name.as_str()), Some("D#m"));
        assert!(snapshot.triad(2, 1).is_none());
        assert!(snapshot.triad(0, 8).is_none());
    }
}
