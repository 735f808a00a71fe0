//! Voice reduction
//!
//! The decision engine of the arranger. Applied independently per part and
//! per event under a selected `Difficulty`:
//!
//! - Melody (part 0): single notes pass through; chords are thinned to the
//!   top voice (plus the voice under it for `easy` on thick chords), or
//!   rebuilt as a fixed harmonization shape under `hard`.
//! - Accompaniment (parts 1..): chords collapse to their bass note;
//!   `super_easy` additionally drops off-beat events and forces surviving
//!   durations to one quarter; `hard` arpeggiates long bass notes into
//!   root-fifth-octave-fifth and thickens short ones with the lower octave.
//!
//! Every event resolves to exactly one of `Kept`, `Dropped` or `Expanded`.
//! `Dropped` is only reachable through the super-easy off-beat rule;
//! `Expanded` only through the hard arpeggio rule.

pub mod policy;

pub use policy::Difficulty;

use num_rational::Ratio;

use crate::models::{one_beat, Beats, Event, Part, PartRole, Score};

/// Terminal state of one event after reduction.
#[derive(Debug, Clone, PartialEq)]
pub enum Reduction {
    /// A single event survives (possibly with fewer pitches).
    Kept(Event),
    /// The event is eliminated entirely. Expected control flow, not an error.
    Dropped,
    /// The event became several shorter events (hard-mode arpeggio).
    Expanded(Vec<Event>),
}

impl Reduction {
    /// Flatten into the emitted events.
    pub fn into_events(self) -> Vec<Event> {
        match self {
            Reduction::Kept(e) => vec![e],
            Reduction::Dropped => Vec::new(),
            Reduction::Expanded(events) => events,
        }
    }
}

/// Interval shape for the hard-mode melody chord: the melody pitch, a major
/// third below it, and the octave below it.
const HARD_MELODY_THIRD: i16 = 4;

/// Interval shape for the hard-mode arpeggio: root, fifth, octave, fifth.
const HARD_ARPEGGIO: [i16; 4] = [0, 7, 12, 7];

fn offset_pitch(pitch: u8, semitones: i16) -> u8 {
    (pitch as i16 + semitones).clamp(0, 127) as u8
}

/// Reduce one melody event under the given policy.
pub fn reduce_melody(event: &Event, difficulty: Difficulty) -> Reduction {
    let Some(melody) = event.highest() else {
        // Degenerate empty event: nothing to keep.
        return Reduction::Dropped;
    };

    if !event.is_chord() {
        return Reduction::Kept(event.clone());
    }

    let mut kept = event.clone();
    kept.pitches = match difficulty {
        Difficulty::Hard => {
            // Fixed harmonization shape regardless of the original chord.
            vec![
                offset_pitch(melody, -12),
                offset_pitch(melody, -HARD_MELODY_THIRD),
                melody,
            ]
        }
        Difficulty::Easy if event.pitches.len() >= 3 => {
            // second_highest exists: the chord has >= 3 pitches
            match event.second_highest() {
                Some(harmony) => vec![harmony, melody],
                None => vec![melody],
            }
        }
        _ => vec![melody],
    };
    kept.normalize_pitches();
    Reduction::Kept(kept)
}

/// Reduce one accompaniment event under the given policy.
pub fn reduce_accompaniment(event: &Event, difficulty: Difficulty) -> Reduction {
    let Some(bass) = event.lowest() else {
        return Reduction::Dropped;
    };

    if difficulty.drops_offbeat_accompaniment() && !event.is_on_beat() {
        return Reduction::Dropped;
    }

    if difficulty.decorates() {
        return decorate_accompaniment(event, bass);
    }

    let mut kept = event.clone();
    kept.pitches = vec![bass];
    if difficulty.forces_quarter_accompaniment() {
        kept.duration = one_beat();
    }
    Reduction::Kept(kept)
}

/// Hard-mode decoration: long notes become a root-fifth-octave-fifth
/// arpeggio of four equal notes; short notes become a two-pitch chord with
/// the octave below the bass.
fn decorate_accompaniment(event: &Event, bass: u8) -> Reduction {
    if event.duration >= one_beat() {
        let step: Beats = event.duration / Ratio::from_integer(4);
        let events = HARD_ARPEGGIO
            .iter()
            .enumerate()
            .map(|(i, &interval)| {
                let mut note = Event::note(
                    event.offset + step * Ratio::from_integer(i as i64),
                    step,
                    offset_pitch(bass, interval),
                );
                note.articulations = event.articulations.clone();
                note
            })
            .collect();
        Reduction::Expanded(events)
    } else {
        let mut kept = event.clone();
        kept.pitches = vec![offset_pitch(bass, -12), bass];
        kept.normalize_pitches();
        Reduction::Kept(kept)
    }
}

/// Reduce one event according to its part's role.
pub fn reduce_event(event: &Event, role: PartRole, difficulty: Difficulty) -> Reduction {
    match role {
        PartRole::Melody => reduce_melody(event, difficulty),
        PartRole::Accompaniment => reduce_accompaniment(event, difficulty),
    }
}

/// Reduce a whole part, preserving its notation hints.
pub fn reduce_part(part: &Part, role: PartRole, difficulty: Difficulty) -> Part {
    let mut events = Vec::with_capacity(part.events.len());
    for event in &part.events {
        events.extend(reduce_event(event, role, difficulty).into_events());
    }
    let mut reduced = Part::new(events);
    reduced.clef = part.clef.clone();
    reduced.key_signature = part.key_signature.clone();
    reduced.sort_events();
    reduced
}

/// Reduce every part of a score under one policy. The input is untouched;
/// each tier works on its own copy.
pub fn reduce_score(score: &Score, difficulty: Difficulty) -> Score {
    let parts = score
        .parts
        .iter()
        .enumerate()
        .map(|(i, part)| reduce_part(part, PartRole::from_index(i), difficulty))
        .collect();
    Score {
        parts,
        time_signature: score.time_signature,
        key: score.key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beats(n: i64, d: i64) -> Beats {
        Ratio::new(n, d)
    }

    fn chord(offset: Beats, duration: Beats, pitches: &[u8]) -> Event {
        Event::new(offset, duration, pitches.to_vec())
    }

    #[test]
    fn test_melody_single_note_unchanged() {
        let note = Event::note(beats(0, 1), one_beat(), 62);
        for tier in Difficulty::ALL {
            assert_eq!(reduce_melody(&note, tier), Reduction::Kept(note.clone()));
        }
    }

    #[test]
    fn test_melody_easy_keeps_top_two_of_triad() {
        let triad = chord(beats(0, 1), one_beat(), &[60, 64, 67]);
        let Reduction::Kept(out) = reduce_melody(&triad, Difficulty::Easy) else {
            panic!("expected Kept");
        };
        assert_eq!(out.pitches, vec![64, 67]);
        assert_eq!(out.duration, one_beat());
    }

    #[test]
    fn test_melody_easy_two_note_chord_keeps_only_top() {
        let dyad = chord(beats(0, 1), one_beat(), &[60, 67]);
        let Reduction::Kept(out) = reduce_melody(&dyad, Difficulty::Easy) else {
            panic!("expected Kept");
        };
        assert_eq!(out.pitches, vec![67]);
    }

    #[test]
    fn test_melody_super_easy_keeps_only_top() {
        let triad = chord(beats(0, 1), one_beat(), &[60, 64, 67]);
        let Reduction::Kept(out) = reduce_melody(&triad, Difficulty::SuperEasy) else {
            panic!("expected Kept");
        };
        assert_eq!(out.pitches, vec![67]);
    }

    #[test]
    fn test_melody_hard_builds_fixed_shape() {
        let dyad = chord(beats(0, 1), one_beat(), &[60, 67]);
        let Reduction::Kept(out) = reduce_melody(&dyad, Difficulty::Hard) else {
            panic!("expected Kept");
        };
        // melody 67 plus octave below and major third below
        assert_eq!(out.pitches, vec![55, 63, 67]);
    }

    #[test]
    fn test_accompaniment_takes_bass() {
        let triad = chord(beats(0, 1), one_beat(), &[48, 52, 55]);
        let Reduction::Kept(out) = reduce_accompaniment(&triad, Difficulty::Easy) else {
            panic!("expected Kept");
        };
        assert_eq!(out.pitches, vec![48]);
    }

    #[test]
    fn test_super_easy_drops_offbeat() {
        let offbeat = Event::note(beats(1, 2), one_beat(), 48);
        assert_eq!(
            reduce_accompaniment(&offbeat, Difficulty::SuperEasy),
            Reduction::Dropped
        );
        // same event survives under easy
        assert!(matches!(
            reduce_accompaniment(&offbeat, Difficulty::Easy),
            Reduction::Kept(_)
        ));
    }

    #[test]
    fn test_super_easy_forces_quarter_duration() {
        let held = Event::note(beats(2, 1), beats(3, 1), 48);
        let Reduction::Kept(out) = reduce_accompaniment(&held, Difficulty::SuperEasy) else {
            panic!("expected Kept");
        };
        assert_eq!(out.duration, one_beat());
    }

    #[test]
    fn test_easy_preserves_triplet_duration() {
        let triplet = Event::note(beats(0, 1), beats(1, 3), 48);
        let Reduction::Kept(out) = reduce_accompaniment(&triplet, Difficulty::Easy) else {
            panic!("expected Kept");
        };
        assert_eq!(out.duration, beats(1, 3));
    }

    #[test]
    fn test_hard_arpeggiates_long_notes() {
        let held = chord(beats(0, 1), beats(2, 1), &[48, 55]);
        let Reduction::Expanded(out) = reduce_accompaniment(&held, Difficulty::Hard) else {
            panic!("expected Expanded");
        };
        assert_eq!(out.len(), 4);
        let pitches: Vec<u8> = out.iter().map(|e| e.pitches[0]).collect();
        assert_eq!(pitches, vec![48, 55, 60, 55]);
        for (i, e) in out.iter().enumerate() {
            assert_eq!(e.duration, beats(1, 2));
            assert_eq!(e.offset, beats(i as i64, 2));
        }
    }

    #[test]
    fn test_hard_thickens_short_notes() {
        let short = Event::note(beats(0, 1), beats(1, 2), 48);
        let Reduction::Kept(out) = reduce_accompaniment(&short, Difficulty::Hard) else {
            panic!("expected Kept");
        };
        assert_eq!(out.pitches, vec![36, 48]);
        assert_eq!(out.duration, beats(1, 2));
    }

    #[test]
    fn test_articulations_carried_through() {
        let mut note = Event::note(beats(0, 1), beats(2, 1), 48);
        note.articulations = vec!["staccato".to_string()];
        let Reduction::Expanded(out) = reduce_accompaniment(&note, Difficulty::Hard) else {
            panic!("expected Expanded");
        };
        for e in &out {
            assert_eq!(e.articulations, vec!["staccato".to_string()]);
        }
    }

    #[test]
    fn test_reduce_part_keeps_hints() {
        let mut part = Part::new(vec![Event::note(beats(0, 1), one_beat(), 48)]);
        part.clef = Some("bass".to_string());
        let reduced = reduce_part(&part, PartRole::Accompaniment, Difficulty::Easy);
        assert_eq!(reduced.clef.as_deref(), Some("bass"));
    }
}
