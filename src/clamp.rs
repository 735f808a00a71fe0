//! Register clamp
//!
//! Hard playability constraint applied after reduction and decoration:
//! melody pitches are octave-folded up until they reach middle C, so the
//! right hand always plays in a comfortable treble register; accompaniment
//! pitches are folded into the two-octave left-hand span [36, 60].
//!
//! Folding can make two chord pitches collide (e.g. a pitch and its lower
//! octave both land on the same note); the duplicate is discarded.

use crate::models::{Part, PartRole, Score};

/// Lowest pitch the melody (right hand) may use: middle C.
pub const MELODY_FLOOR: u8 = 60;

/// Accompaniment (left hand) span: C2 to middle C.
pub const ACCOMPANIMENT_FLOOR: u8 = 36;
pub const ACCOMPANIMENT_CEILING: u8 = 60;

/// Fold a melody pitch up by octaves until it reaches the floor.
pub fn clamp_melody_pitch(pitch: u8) -> u8 {
    let mut p = pitch as i16;
    while p < MELODY_FLOOR as i16 {
        p += 12;
    }
    p as u8
}

/// Fold an accompaniment pitch into [36, 60] by octave steps.
pub fn clamp_accompaniment_pitch(pitch: u8) -> u8 {
    let mut p = pitch as i16;
    while p < ACCOMPANIMENT_FLOOR as i16 {
        p += 12;
    }
    while p > ACCOMPANIMENT_CEILING as i16 {
        p -= 12;
    }
    p as u8
}

fn clamp_part(part: &mut Part, role: PartRole) {
    for event in &mut part.events {
        for pitch in &mut event.pitches {
            *pitch = match role {
                PartRole::Melody => clamp_melody_pitch(*pitch),
                PartRole::Accompaniment => clamp_accompaniment_pitch(*pitch),
            };
        }
        event.normalize_pitches();
    }
}

/// Clamp every part of a score into its hand's register.
pub fn clamp_score(mut score: Score) -> Score {
    for (i, part) in score.parts.iter_mut().enumerate() {
        clamp_part(part, PartRole::from_index(i));
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{one_beat, Beats, Event};

    #[test]
    fn test_melody_pitch_folded_up_to_floor() {
        assert_eq!(clamp_melody_pitch(48), 60);
        assert_eq!(clamp_melody_pitch(59), 71);
        assert_eq!(clamp_melody_pitch(60), 60);
        // above the floor stays put
        assert_eq!(clamp_melody_pitch(84), 84);
    }

    #[test]
    fn test_accompaniment_pitch_folded_into_span() {
        assert_eq!(clamp_accompaniment_pitch(24), 36);
        assert_eq!(clamp_accompaniment_pitch(72), 60);
        assert_eq!(clamp_accompaniment_pitch(61), 49);
        assert_eq!(clamp_accompaniment_pitch(48), 48);
    }

    #[test]
    fn test_clamp_score_respects_roles() {
        let melody = Part::new(vec![Event::note(Beats::from_integer(0), one_beat(), 48)]);
        let accomp = Part::new(vec![Event::note(Beats::from_integer(0), one_beat(), 72)]);
        let score = clamp_score(Score::new(vec![melody, accomp]));
        assert_eq!(score.parts[0].events[0].pitches, vec![60]);
        assert_eq!(score.parts[1].events[0].pitches, vec![60]);
    }

    #[test]
    fn test_colliding_pitches_deduplicated() {
        // 36 and 48 both fold within range; 24 folds onto 36
        let event = Event::new(Beats::from_integer(0), one_beat(), vec![24, 36, 48]);
        let score = clamp_score(Score::new(vec![Part::new(vec![]), Part::new(vec![event])]));
        assert_eq!(score.parts[1].events[0].pitches, vec![36, 48]);
    }
}
