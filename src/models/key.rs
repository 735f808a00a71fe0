//! Key representation: tonic pitch class + mode
//!
//! 0=C, 1=C#, 2=D, 3=D#, 4=E, 5=F, 6=F#, 7=G, 8=G#, 9=A, 10=A#, 11=B

use serde::{Deserialize, Serialize};

/// Major/minor mode of a detected key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Major,
    Minor,
}

/// A key as tonic pitch class plus mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    /// Chromatic pitch class of the tonic, 0-11 with 0 = C.
    pub tonic_pc: u8,
    pub mode: Mode,
}

/// Canonical tonic for normalization: C for major keys, A for minor keys.
pub const CANONICAL_MAJOR_PC: u8 = 0;
pub const CANONICAL_MINOR_PC: u8 = 9;

impl Key {
    pub fn new(tonic_pc: u8, mode: Mode) -> Self {
        Key {
            tonic_pc: tonic_pc % 12,
            mode,
        }
    }

    pub fn c_major() -> Self {
        Key::new(CANONICAL_MAJOR_PC, Mode::Major)
    }

    pub fn a_minor() -> Self {
        Key::new(CANONICAL_MINOR_PC, Mode::Minor)
    }

    /// The canonical key this key normalizes to (same mode).
    pub fn canonical(&self) -> Key {
        match self.mode {
            Mode::Major => Key::c_major(),
            Mode::Minor => Key::a_minor(),
        }
    }

    /// Signed semitone shift that moves this key's tonic onto the canonical
    /// tonic for its mode. Matches interval arithmetic between tonics in the
    /// same octave, so the result lies in -11..=11; the register heuristic
    /// downstream corrects any resulting octave drift.
    pub fn semitones_to_canonical(&self) -> i16 {
        let target = match self.mode {
            Mode::Major => CANONICAL_MAJOR_PC,
            Mode::Minor => CANONICAL_MINOR_PC,
        };
        target as i16 - self.tonic_pc as i16
    }

    /// Conventional name of the tonic pitch class (sharp spelling).
    pub fn tonic_name(&self) -> &'static str {
        PITCH_CLASS_NAMES[(self.tonic_pc % 12) as usize]
    }
}

const PITCH_CLASS_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.mode {
            Mode::Major => write!(f, "{} major", self.tonic_name()),
            Mode::Minor => write!(f, "{} minor", self.tonic_name()),
        }
    }
}
