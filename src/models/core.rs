//! Core score data model for the arrangement engine
//!
//! A `Score` is an ordered list of `Part`s; a `Part` is an ordered sequence
//! of timed `Event`s for one staff. Time is measured in quarter-note units
//! as exact rationals so that binary and ternary subdivisions both survive
//! round trips through the quantizer.

use num_rational::Ratio;
use serde::{Deserialize, Serialize};

use super::key::Key;

/// Time value in quarter-note units (offset from part start, or duration).
pub type Beats = Ratio<i64>;

/// One beat, the unit everything else is expressed in.
pub fn one_beat() -> Beats {
    Ratio::from_integer(1)
}

/// One musical sound (note or chord) at a point in time.
///
/// Pitches are MIDI note numbers (60 = middle C), kept sorted ascending so
/// the first entry is the bass and the last is the top voice. An event with
/// no pitches is never kept in a part; silence is implicit in the gaps
/// between events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Start time, in quarter notes since the start of the part. Never negative.
    pub offset: Beats,

    /// Length in quarter notes. Always positive after quantization.
    pub duration: Beats,

    /// MIDI pitches, sorted ascending, deduplicated. Non-empty.
    pub pitches: Vec<u8>,

    /// Opaque decorations (staccato, accent, ...) carried through unchanged.
    /// The engine never interprets these.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub articulations: Vec<String>,
}

impl Event {
    /// Create an event from arbitrary pitches; sorts and deduplicates them.
    pub fn new(offset: Beats, duration: Beats, pitches: Vec<u8>) -> Self {
        let mut event = Event {
            offset,
            duration,
            pitches,
            articulations: Vec::new(),
        };
        event.normalize_pitches();
        event
    }

    /// Convenience constructor for a single note.
    pub fn note(offset: Beats, duration: Beats, pitch: u8) -> Self {
        Event {
            offset,
            duration,
            pitches: vec![pitch],
            articulations: Vec::new(),
        }
    }

    /// Restore the sorted-ascending, deduplicated pitch invariant.
    pub fn normalize_pitches(&mut self) {
        self.pitches.sort_unstable();
        self.pitches.dedup();
    }

    pub fn is_chord(&self) -> bool {
        self.pitches.len() > 1
    }

    /// Top voice of the event (melody pitch for chords).
    pub fn highest(&self) -> Option<u8> {
        self.pitches.last().copied()
    }

    /// Pitch directly under the top voice, if the chord has one.
    pub fn second_highest(&self) -> Option<u8> {
        let n = self.pitches.len();
        if n >= 2 {
            Some(self.pitches[n - 2])
        } else {
            None
        }
    }

    /// Bottom voice of the event (bass pitch for chords).
    pub fn lowest(&self) -> Option<u8> {
        self.pitches.first().copied()
    }

    /// True when the event starts on an integer quarter-note beat.
    pub fn is_on_beat(&self) -> bool {
        self.offset.is_integer()
    }
}

/// One staff worth of events plus notation hints carried through unchanged.
///
/// A part's role is structural: part index 0 in a `Score` is the melody
/// (right hand), every later part is accompaniment (left hand). The role is
/// not stored per part.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Part {
    /// Events ordered by non-decreasing offset. Simultaneous pitches in the
    /// same part are represented as a chord at one offset, not as separate
    /// overlapping events.
    pub events: Vec<Event>,

    /// Clef hint from the source notation (e.g. "treble", "bass").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clef: Option<String>,

    /// Key signature hint from the source notation (e.g. "G major").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_signature: Option<String>,
}

impl Part {
    pub fn new(events: Vec<Event>) -> Self {
        Part {
            events,
            clef: None,
            key_signature: None,
        }
    }

    /// Restore ordering by offset after edits that may have disturbed it.
    pub fn sort_events(&mut self) {
        self.events.sort_by(|a, b| a.offset.cmp(&b.offset));
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Role a part plays in the arrangement, derived from its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartRole {
    /// Part index 0: right hand, carries the tune.
    Melody,
    /// Part index > 0: left hand, carries the bass/harmony.
    Accompaniment,
}

impl PartRole {
    pub fn from_index(index: usize) -> Self {
        if index == 0 {
            PartRole::Melody
        } else {
            PartRole::Accompaniment
        }
    }
}

/// Time signature as written; unrecognized input falls back to 4/4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    pub numerator: u8,
    pub denominator: u8,
}

impl Default for TimeSignature {
    fn default() -> Self {
        TimeSignature {
            numerator: 4,
            denominator: 4,
        }
    }
}

impl TimeSignature {
    pub fn new(numerator: u8, denominator: u8) -> Self {
        TimeSignature {
            numerator,
            denominator,
        }
    }

    /// Parse "4/4"-style text; anything unrecognized falls back to 4/4.
    pub fn parse(text: &str) -> Self {
        let mut it = text.splitn(2, '/');
        let num = it.next().and_then(|s| s.trim().parse::<u8>().ok());
        let den = it.next().and_then(|s| s.trim().parse::<u8>().ok());
        match (num, den) {
            (Some(n), Some(d)) if n > 0 && d > 0 => TimeSignature::new(n, d),
            _ => {
                log::warn!("unrecognized time signature '{}', using 4/4", text);
                TimeSignature::default()
            }
        }
    }
}

impl std::fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// A whole piece: ordered parts plus score-level metadata.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Score {
    pub parts: Vec<Part>,

    #[serde(default)]
    pub time_signature: Option<TimeSignature>,

    /// Detected or declared key; `None` when undetermined.
    #[serde(default)]
    pub key: Option<Key>,
}

impl Score {
    pub fn new(parts: Vec<Part>) -> Self {
        Score {
            parts,
            time_signature: None,
            key: None,
        }
    }

    /// Effective time signature, defaulting to 4/4 when absent.
    pub fn effective_time_signature(&self) -> TimeSignature {
        self.time_signature.unwrap_or_default()
    }

    /// Total number of sounded events across all parts.
    pub fn event_count(&self) -> usize {
        self.parts.iter().map(|p| p.events.len()).sum()
    }

    /// Iterator over every pitch in the score, part by part.
    pub fn pitches(&self) -> impl Iterator<Item = u8> + '_ {
        self.parts
            .iter()
            .flat_map(|p| p.events.iter())
            .flat_map(|e| e.pitches.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beats(n: i64, d: i64) -> Beats {
        Ratio::new(n, d)
    }

    #[test]
    fn test_event_sorts_and_dedups_pitches() {
        let e = Event::new(beats(0, 1), one_beat(), vec![67, 60, 64, 60]);
        assert_eq!(e.pitches, vec![60, 64, 67]);
        assert_eq!(e.lowest(), Some(60));
        assert_eq!(e.highest(), Some(67));
        assert_eq!(e.second_highest(), Some(64));
    }

    #[test]
    fn test_on_beat_detection() {
        let on = Event::note(beats(2, 1), one_beat(), 60);
        let off = Event::note(beats(1, 2), one_beat(), 60);
        assert!(on.is_on_beat());
        assert!(!off.is_on_beat());
    }

    #[test]
    fn test_time_signature_parse_fallback() {
        assert_eq!(TimeSignature::parse("3/4"), TimeSignature::new(3, 4));
        assert_eq!(TimeSignature::parse("garbage"), TimeSignature::default());
        assert_eq!(TimeSignature::parse("0/4"), TimeSignature::default());
    }

    #[test]
    fn test_part_role_from_index() {
        assert_eq!(PartRole::from_index(0), PartRole::Melody);
        assert_eq!(PartRole::from_index(1), PartRole::Accompaniment);
        assert_eq!(PartRole::from_index(5), PartRole::Accompaniment);
    }
}
