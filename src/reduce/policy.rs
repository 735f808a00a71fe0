//! Difficulty policy
//!
//! A named configuration selecting how far each part is simplified:
//! which chord pitches survive, whether off-beat accompaniment is dropped,
//! whether durations are forced, and whether decorative expansion is
//! applied. The policy is a value object; the reducer interprets it.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ArrangeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    /// Keep the original rhythm; thin chords to at most two voices.
    Easy,
    /// Single melody voice, accompaniment only on downbeats, everything a
    /// quarter note in the left hand.
    SuperEasy,
    /// Decorated version: melody harmonized into a fixed chord shape, long
    /// accompaniment notes arpeggiated.
    Hard,
}

impl Difficulty {
    /// All tiers, in presentation order.
    pub const ALL: [Difficulty; 3] = [Difficulty::SuperEasy, Difficulty::Easy, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::SuperEasy => "super_easy",
            Difficulty::Hard => "hard",
        }
    }

    /// Whether off-beat accompaniment events are eliminated.
    pub fn drops_offbeat_accompaniment(&self) -> bool {
        matches!(self, Difficulty::SuperEasy)
    }

    /// Whether surviving accompaniment notes get their duration forced to
    /// one quarter note.
    pub fn forces_quarter_accompaniment(&self) -> bool {
        matches!(self, Difficulty::SuperEasy)
    }

    /// Whether decorative expansion (arpeggiation, fixed harmonization) is
    /// applied instead of plain reduction.
    pub fn decorates(&self) -> bool {
        matches!(self, Difficulty::Hard)
    }
}

impl FromStr for Difficulty {
    type Err = ArrangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "super_easy" => Ok(Difficulty::SuperEasy),
            "hard" => Ok(Difficulty::Hard),
            other => Err(ArrangeError::UnknownDifficulty(other.to_string())),
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for tier in Difficulty::ALL {
            assert_eq!(tier.as_str().parse::<Difficulty>().unwrap(), tier);
        }
    }

    #[test]
    fn test_unknown_name_rejected() {
        assert!(matches!(
            "medium".parse::<Difficulty>(),
            Err(ArrangeError::UnknownDifficulty(_))
        ));
    }

    #[test]
    fn test_policy_flags() {
        assert!(Difficulty::SuperEasy.drops_offbeat_accompaniment());
        assert!(!Difficulty::Easy.drops_offbeat_accompaniment());
        assert!(Difficulty::Hard.decorates());
        assert!(!Difficulty::SuperEasy.decorates());
    }
}
