//! # Music Theory Module
//!
//! Pure functions deriving major-scale membership, enharmonic spelling and
//! diatonic triads from a root pitch class. Nothing in here knows about the
//! wheel, the screen or the speakers.
//!
//! ## Features
//! - Major scale construction from the whole/half step pattern
//! - Diatonic spelling with one letter per degree (sharps, flats, doubles)
//! - Dual sharp/flat spellings for black-key roots
//! - Triad stacking with quality detection and roman numerals

use std::fmt;

/// Whole and half steps of the major scale, starting at the root.
pub const MAJOR_SCALE_INTERVALS: [i32; 7] = [2, 2, 1, 2, 2, 2, 1];

/// Number of notes in a diatonic scale.
pub const SCALE_LENGTH: usize = 7;

const SHARP_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];
const FLAT_NAMES: [&str; 12] = [
    "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
];
const WHEEL_LABELS: [&str; 12] = [
    "C", "C#/Db", "D", "D#/Eb", "E", "F", "F#/Gb", "G", "G#/Ab", "A", "A#/Bb", "B",
];

/// One of the 12 equal-tempered chromatic steps, independent of octave.
///
/// The wrapped value is always in `0..12` with 0 = C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PitchClass(u8);

impl PitchClass {
    pub const C: PitchClass = PitchClass(0);

    /// Builds a pitch class from any integer, reducing it modulo 12.
    pub fn new(value: i32) -> Self {
        Self(value.rem_euclid(12) as u8)
    }

    /// Iterates over all twelve pitch classes starting at C.
    pub fn all() -> impl Iterator<Item = PitchClass> {
        (0..12).map(PitchClass::new)
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Moves the pitch class by `semitones`, wrapping around the octave.
    pub fn transpose(self, semitones: i32) -> Self {
        Self::new(self.0 as i32 + semitones)
    }

    /// Ascending distance in semitones from `self` up to `other` (0..12).
    pub fn semitones_to(self, other: PitchClass) -> u8 {
        (other.0 + 12 - self.0) % 12
    }

    /// True for the white keys of a piano (C, D, E, F, G, A, B).
    pub fn is_natural(self) -> bool {
        matches!(self.0, 0 | 2 | 4 | 5 | 7 | 9 | 11)
    }

    pub fn sharp_name(self) -> &'static str {
        SHARP_NAMES[self.0 as usize]
    }

    pub fn flat_name(self) -> &'static str {
        FLAT_NAMES[self.0 as usize]
    }

    /// Label printed around the wheel, e.g. "C#/Db" for black keys.
    pub fn wheel_label(self) -> &'static str {
        WHEEL_LABELS[self.0 as usize]
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wheel_label())
    }
}

/// Which accidental names a black-key root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accidental {
    Sharp,
    Flat,
}

impl Accidental {
    /// Name of `root` under this preference ("C#" vs "Db").
    pub fn root_name(self, root: PitchClass) -> &'static str {
        match self {
            Accidental::Sharp => root.sharp_name(),
            Accidental::Flat => root.flat_name(),
        }
    }

    /// Letter the scale starts on when `root` is named with this preference.
    fn root_letter(self, root: PitchClass) -> Letter {
        use Letter::*;
        const SHARP_LETTERS: [Letter; 12] = [C, C, D, D, E, F, F, G, G, A, A, B];
        const FLAT_LETTERS: [Letter; 12] = [C, D, D, E, E, F, G, G, A, A, B, B];
        match self {
            Accidental::Sharp => SHARP_LETTERS[root.index() as usize],
            Accidental::Flat => FLAT_LETTERS[root.index() as usize],
        }
    }
}

/// A letter of the musical alphabet, ordered C-D-E-F-G-A-B.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

const LETTER_CYCLE: [Letter; 7] = [
    Letter::C,
    Letter::D,
    Letter::E,
    Letter::F,
    Letter::G,
    Letter::A,
    Letter::B,
];

impl Letter {
    /// Semitone of the natural (unaltered) letter.
    pub fn natural(self) -> u8 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    /// The letter `steps` positions further along the cycle.
    pub fn offset(self, steps: usize) -> Letter {
        LETTER_CYCLE[(self as usize + steps) % LETTER_CYCLE.len()]
    }

    pub fn as_char(self) -> char {
        match self {
            Letter::C => 'C',
            Letter::D => 'D',
            Letter::E => 'E',
            Letter::F => 'F',
            Letter::G => 'G',
            Letter::A => 'A',
            Letter::B => 'B',
        }
    }
}

/// A note name: a letter plus an alteration between a double flat (-2)
/// and a double sharp (+2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpelledNote {
    pub letter: Letter,
    pub alteration: i8,
}

impl SpelledNote {
    pub fn pitch_class(self) -> PitchClass {
        PitchClass::new(self.letter.natural() as i32 + self.alteration as i32)
    }
}

impl fmt::Display for SpelledNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let accidental = if self.alteration >= 0 { "#" } else { "b" };
        write!(
            f,
            "{}{}",
            self.letter.as_char(),
            accidental.repeat(self.alteration.unsigned_abs() as usize)
        )
    }
}

/// Builds the major scale on `root` by stacking the interval pattern.
///
/// The root is always the first element and the seventh step plus its
/// interval lands back on the root.
pub fn major_scale_notes(root: PitchClass) -> [PitchClass; SCALE_LENGTH] {
    let mut notes = [root; SCALE_LENGTH];
    for degree in 1..SCALE_LENGTH {
        notes[degree] = notes[degree - 1].transpose(MAJOR_SCALE_INTERVALS[degree - 1]);
    }
    notes
}

/// Spells the major scale on `root` so that each degree uses the next letter
/// of the alphabet, starting from the letter `accidental` gives the root.
///
/// # Arguments
/// * `root` - Root pitch class of the scale
/// * `accidental` - Whether a black-key root is read as a sharp or a flat
///
/// # Returns
/// * Seven spelled notes with distinct, cycle-ordered letters
pub fn spell_scale(root: PitchClass, accidental: Accidental) -> [SpelledNote; SCALE_LENGTH] {
    let start = accidental.root_letter(root);
    let scale = major_scale_notes(root);

    std::array::from_fn(|degree| {
        let letter = start.offset(degree);
        let alteration = match letter.pitch_distance(scale[degree]) {
            0 => 0,
            1 => 1,
            2 => 2,
            11 => -1,
            10 => -2,
            diff => unreachable!(
                "degree {} of {} major is {} semitones from {:?}",
                degree + 1,
                accidental.root_name(root),
                diff,
                letter
            ),
        };
        SpelledNote { letter, alteration }
    })
}

impl Letter {
    /// Semitones from the natural letter up to `pitch_class` (0..12).
    fn pitch_distance(self, pitch_class: PitchClass) -> u8 {
        PitchClass::new(self.natural() as i32).semitones_to(pitch_class)
    }
}

/// One way of naming a major scale.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleSpelling {
    /// Display name, e.g. "Db Major".
    pub name: String,
    /// Name of the root under this spelling, e.g. "Db".
    pub root_name: &'static str,
    pub accidental: Accidental,
    pub spelled_notes: [SpelledNote; SCALE_LENGTH],
    pub pitch_classes: [PitchClass; SCALE_LENGTH],
}

impl ScaleSpelling {
    fn new(root: PitchClass, accidental: Accidental) -> Self {
        let root_name = accidental.root_name(root);
        Self {
            name: format!("{} Major", root_name),
            root_name,
            accidental,
            spelled_notes: spell_scale(root, accidental),
            pitch_classes: major_scale_notes(root),
        }
    }

    /// Spelled notes joined with ", " as shown under the scale name.
    pub fn notes_text(&self) -> String {
        self.spelled_notes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn triads(&self) -> Vec<Triad> {
        build_triads_from_scale(&self.pitch_classes, &self.spelled_notes)
    }
}

/// Returns the spellings offered for the major scale on `root`.
///
/// White-key roots get a single sharp-preference spelling. Black-key roots
/// get two: the sharp spelling first, then the flat one. Both share the same
/// pitch classes.
pub fn scale_spellings(root: PitchClass) -> Vec<ScaleSpelling> {
    if root.is_natural() {
        vec![ScaleSpelling::new(root, Accidental::Sharp)]
    } else {
        vec![
            ScaleSpelling::new(root, Accidental::Sharp),
            ScaleSpelling::new(root, Accidental::Flat),
        ]
    }
}

/// Quality of a diatonic triad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriadQuality {
    Major,
    Minor,
    Diminished,
}

impl TriadQuality {
    /// Classifies a triad by the semitones from its root to its third and
    /// fifth. Only (4,7), (3,7) and (3,6) occur in a major scale; anything
    /// else keeps the plain major suffix.
    pub fn from_intervals(third: u8, fifth: u8) -> Self {
        match (third, fifth) {
            (3, 7) => TriadQuality::Minor,
            (3, 6) => TriadQuality::Diminished,
            _ => TriadQuality::Major,
        }
    }

    /// Suffix appended to the root name: "", "m" or "dim".
    pub fn suffix(self) -> &'static str {
        match self {
            TriadQuality::Major => "",
            TriadQuality::Minor => "m",
            TriadQuality::Diminished => "dim",
        }
    }
}

/// A three-note chord stacked on one degree of a scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Triad {
    pub root: PitchClass,
    pub third: PitchClass,
    pub fifth: PitchClass,
    pub quality: TriadQuality,
    /// 1-based scale degree.
    pub degree: u8,
    /// Spelled root plus quality suffix, e.g. "F#m".
    pub name: String,
    /// Spelled names of root, third and fifth.
    pub note_names: [SpelledNote; 3],
}

impl Triad {
    pub fn pitch_classes(&self) -> [PitchClass; 3] {
        [self.root, self.third, self.fifth]
    }

    /// Roman numeral for the degree: upper case for major, lower case for
    /// minor, lower case with a degree sign for diminished.
    pub fn roman_numeral(&self) -> String {
        const NUMERALS: [&str; SCALE_LENGTH] = ["I", "II", "III", "IV", "V", "VI", "VII"];
        let numeral = NUMERALS[usize::from(self.degree).saturating_sub(1) % SCALE_LENGTH];
        match self.quality {
            TriadQuality::Major => numeral.to_string(),
            TriadQuality::Minor => numeral.to_lowercase(),
            TriadQuality::Diminished => format!("{}°", numeral.to_lowercase()),
        }
    }

    /// Note names joined by spaces, as shown in the chord details line.
    pub fn notes_text(&self) -> String {
        self.note_names
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Stacks thirds on every degree of a seven-note scale.
///
/// For degree `i` the triad takes scale steps `i`, `i+2` and `i+4` (mod 7)
/// and is named after the spelled note on degree `i`.
pub fn build_triads_from_scale(
    scale: &[PitchClass; SCALE_LENGTH],
    names: &[SpelledNote; SCALE_LENGTH],
) -> Vec<Triad> {
    (0..SCALE_LENGTH)
        .map(|i| {
            let third_idx = (i + 2) % SCALE_LENGTH;
            let fifth_idx = (i + 4) % SCALE_LENGTH;
            let (root, third, fifth) = (scale[i], scale[third_idx], scale[fifth_idx]);
            let quality =
                TriadQuality::from_intervals(root.semitones_to(third), root.semitones_to(fifth));

            Triad {
                root,
                third,
                fifth,
                quality,
                degree: (i + 1) as u8,
                name: format!("{}{}", names[i], quality.suffix()),
                note_names: [names[i], names[third_idx], names[fifth_idx]],
            }
        })
        .collect()
}
