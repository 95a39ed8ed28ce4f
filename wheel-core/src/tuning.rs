//! # Tuning Module
//!
//! Fixed guitar tuning, fretboard mapping of a scale, and the equal
//! temperament frequencies used when notes and chords are played.
//!
//! ## Features
//! - Standard six-string tuning (high E on top)
//! - Scale positions for the open string and frets 1 to 12
//! - A4 = 440 Hz equal temperament lookup table
//! - Root-relative chord voicing so chords always sound ascending

use once_cell::sync::Lazy;

use crate::theory::PitchClass;

/// Open-string pitch classes from the top string drawn (high E) to the
/// bottom one (low E).
pub const GUITAR_TUNING: [u8; 6] = [4, 11, 7, 2, 9, 4];

/// Number of frets shown after the open string.
pub const FRET_COUNT: u8 = 12;

/// Octave of single notes played from the wheel.
pub const NOTE_OCTAVE: i32 = 4;

/// Lowest octave of the frequency table and the number of octaves in it.
const LOWEST_OCTAVE: i32 = 0;
const OCTAVE_SPAN: usize = 9;

/// A scale note found on the fretboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FretPosition {
    /// String index, 0 being the top string as drawn.
    pub string: usize,
    /// Fret number, 0 being the open string.
    pub fret: u8,
    pub pitch_class: PitchClass,
    pub is_root: bool,
}

/// Finds every open string and fret (up to [`FRET_COUNT`]) whose pitch
/// class belongs to `scale`.
///
/// # Arguments
/// * `root` - Root of the scale, flagged on the returned positions
/// * `scale` - Pitch classes to look for
///
/// # Returns
/// * Positions ordered by string, then by fret
pub fn fretboard_positions(root: PitchClass, scale: &[PitchClass]) -> Vec<FretPosition> {
    GUITAR_TUNING
        .iter()
        .enumerate()
        .flat_map(|(string, &open)| {
            (0..=FRET_COUNT).filter_map(move |fret| {
                let pitch_class = PitchClass::new(open as i32 + fret as i32);
                scale.contains(&pitch_class).then_some(FretPosition {
                    string,
                    fret,
                    pitch_class,
                    is_root: pitch_class == root,
                })
            })
        })
        .collect()
}

/// Equal temperament frequencies from C0 upwards, computed once.
///
/// Index `octave * 12 + pitch_class`, with A4 (index 57) at 440 Hz.
static FREQUENCIES: Lazy<Vec<f32>> = Lazy::new(|| {
    (0..OCTAVE_SPAN * 12)
        .map(|i| 440.0 * 2.0_f32.powf((i as f32 - 57.0) / 12.0))
        .collect()
});

/// Frequency in Hz of `pitch_class` in `octave`.
///
/// Octaves outside the table are clamped to its range.
pub fn note_frequency(pitch_class: PitchClass, octave: i32) -> f32 {
    let octave = (octave - LOWEST_OCTAVE).clamp(0, OCTAVE_SPAN as i32 - 1) as usize;
    FREQUENCIES[octave * 12 + pitch_class.index() as usize]
}

/// Frequency a single wheel note is played at.
pub fn note_voicing(pitch_class: PitchClass) -> f32 {
    note_frequency(pitch_class, NOTE_OCTAVE)
}

/// Voices a chord relative to its first note.
///
/// Pitch classes at or above the chord root go in octave 3, the ones that
/// wrap below it go in octave 4, so the chord is always stacked upwards.
pub fn chord_voicing(pitch_classes: &[PitchClass]) -> Vec<f32> {
    let Some(&root) = pitch_classes.first() else {
        return Vec::new();
    };
    pitch_classes
        .iter()
        .map(|&pc| {
            let octave = if pc >= root { 3 } else { 4 };
            note_frequency(pc, octave)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theory::major_scale_notes;

    #[test]
    fn a4_is_concert_pitch() {
        assert!((note_frequency(PitchClass::new(9), 4) - 440.0).abs() < 1e-3);
        assert!((note_frequency(PitchClass::new(9), 3) - 220.0).abs() < 1e-3);
        assert!((note_voicing(PitchClass::C) - 261.626).abs() < 1e-2);
    }

    #[test]
    fn out_of_range_octaves_clamp() {
        assert_eq!(
            note_frequency(PitchClass::C, -3),
            note_frequency(PitchClass::C, 0)
        );
        assert_eq!(
            note_frequency(PitchClass::C, 42),
            note_frequency(PitchClass::C, 8)
        );
    }

    #[test]
    fn chord_voicing_stacks_upwards() {
        // G major: G B D, the D wraps below G and moves up an octave.
        let chord = [PitchClass::new(7), PitchClass::new(11), PitchClass::new(2)];
        let freqs = chord_voicing(&chord);
        assert_eq!(freqs.len(), 3);
        assert!(freqs[0] < freqs[1] && freqs[1] < freqs[2]);
        assert_eq!(freqs[0], note_frequency(PitchClass::new(7), 3));
        assert_eq!(freqs[2], note_frequency(PitchClass::new(2), 4));
        assert!(chord_voicing(&[]).is_empty());
    }

    #[test]
    fn c_major_on_the_fretboard() {
        let scale = major_scale_notes(PitchClass::C);
        let positions = fretboard_positions(PitchClass::C, &scale);

        // Seven of every twelve frets, plus the open string, per string.
        for string in 0..GUITAR_TUNING.len() {
            let on_string: Vec<_> = positions.iter().filter(|p| p.string == string).collect();
            assert!(on_string.len() >= 7, "string {}", string);
            assert!(on_string.windows(2).all(|w| w[0].fret < w[1].fret));
        }

        // High E: open E, F on fret 1, no F# on fret 2.
        let top: Vec<u8> = positions
            .iter()
            .filter(|p| p.string == 0)
            .map(|p| p.fret)
            .collect();
        assert_eq!(top, [0, 1, 3, 5, 7, 8, 10, 12]);

        // B string, fret 1 is C, the root.
        let c_on_b = positions
            .iter()
            .find(|p| p.string == 1 && p.fret == 1)
            .copied();
        assert_eq!(
            c_on_b,
            Some(FretPosition {
                string: 1,
                fret: 1,
                pitch_class: PitchClass::C,
                is_root: true,
            })
        );
        assert!(positions.iter().all(|p| p.is_root == (p.pitch_class == PitchClass::C)));
    }
}
