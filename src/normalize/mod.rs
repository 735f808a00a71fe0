//! Key and register normalization
//!
//! Brings every input score to a canonical tonic (C major / A minor) and a
//! plausible register before any difficulty tier is derived from it, so all
//! tiers of one piece share the same key and octave placement.
//!
//! The register correction is a heuristic against OMR clef misreads: a score
//! whose mean pitch lands above `high_mean` is shifted down, one below
//! `low_mean` is shifted up. The shift is applied at most once, sized in
//! whole octaves so the corrected mean lands inside the band, which keeps
//! repeated normalization a no-op. The thresholds are configuration, not
//! invariants; their default values (80 / 50) have no derivation beyond
//! working well on real OMR output.

use crate::analysis::detect_key;
use crate::config::EngineConfig;
use crate::models::Score;
use crate::quantize::quantize;

/// Shift every pitch in the score by `semitones`, saturating at the MIDI
/// range boundaries.
pub fn transpose(score: &mut Score, semitones: i16) {
    if semitones == 0 {
        return;
    }
    for part in &mut score.parts {
        for event in &mut part.events {
            for pitch in &mut event.pitches {
                *pitch = (*pitch as i16 + semitones).clamp(0, 127) as u8;
            }
            event.normalize_pitches();
        }
    }
}

/// Arithmetic mean of all pitch numbers in the score, `None` when there are
/// no pitches.
pub fn mean_pitch(score: &Score) -> Option<f64> {
    let mut sum = 0u64;
    let mut count = 0u64;
    for pitch in score.pitches() {
        sum += pitch as u64;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        Some(sum as f64 / count as f64)
    }
}

/// Whole-octave register correction for `mean`, zero when it already sits
/// inside `[low_mean, high_mean]`. Sized so a single shift lands the mean
/// inside the band whenever the band spans at least an octave.
fn octave_correction(mean: f64, config: &EngineConfig) -> i16 {
    if mean > config.high_mean {
        -12 * ((mean - config.high_mean) / 12.0).ceil() as i16
    } else if mean < config.low_mean {
        12 * ((config.low_mean - mean) / 12.0).ceil() as i16
    } else {
        0
    }
}

/// Normalize a score: quantize onto the configured grid, transpose to the
/// canonical tonic, then correct implausible register.
///
/// Key detection failure is recoverable: the score passes through with its
/// pitches untouched and `key` left as it was. The function is pure in its
/// input (the score is consumed and rebuilt) and deterministic.
pub fn normalize(score: Score, config: &EngineConfig) -> Score {
    let mut score = quantize(score, &config.grid);

    match detect_key(&score) {
        Some(key) => {
            let shift = key.semitones_to_canonical();
            log::info!(
                "normalizing key: {} -> {} ({:+} semitones)",
                key,
                key.canonical(),
                shift
            );
            transpose(&mut score, shift);
            score.key = Some(key.canonical());
        }
        None => {
            log::warn!("key detection failed, leaving pitches untransposed");
        }
    }

    if let Some(mean) = mean_pitch(&score) {
        let shift = octave_correction(mean, config);
        if shift != 0 {
            log::info!(
                "mean pitch {:.1} outside [{}, {}], shifting {:+} semitones",
                mean,
                config.low_mean,
                config.high_mean,
                shift
            );
            transpose(&mut score, shift);
        }
    }

    // Missing time signature defaults to 4/4 here so every tier derived
    // from this score agrees on the meter.
    score.time_signature.get_or_insert_with(Default::default);

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{one_beat, Beats, Event, Key, Mode, Part};

    fn score_of(pitches: &[u8]) -> Score {
        let events = pitches
            .iter()
            .enumerate()
            .map(|(i, &p)| Event::note(Beats::from_integer(i as i64), one_beat(), p))
            .collect();
        Score::new(vec![Part::new(events)])
    }

    #[test]
    fn test_transpose_shifts_and_saturates() {
        let mut score = score_of(&[60, 2]);
        transpose(&mut score, -5);
        assert_eq!(score.parts[0].events[0].pitches, vec![55]);
        assert_eq!(score.parts[0].events[1].pitches, vec![0]);
    }

    #[test]
    fn test_mean_pitch() {
        assert_eq!(mean_pitch(&score_of(&[60, 64, 68])), Some(64.0));
        assert_eq!(mean_pitch(&Score::new(vec![])), None);
    }

    #[test]
    fn test_g_major_scale_lands_in_c() {
        // G major scale; normalization should move the tonic to C
        let score = score_of(&[67, 69, 71, 72, 74, 76, 78, 79]);
        let normalized = normalize(score, &EngineConfig::default());
        assert_eq!(normalized.key, Some(Key::new(0, Mode::Major)));
        // down a fifth: first note G4 -> C4
        assert_eq!(normalized.parts[0].events[0].pitches, vec![60]);
    }

    #[test]
    fn test_high_register_shifted_down() {
        // C major scale two octaves up: mean is 93.5, above the threshold
        let score = score_of(&[84, 86, 88, 89, 91, 93, 95, 96]);
        let normalized = normalize(score, &EngineConfig::default());
        let mean = mean_pitch(&normalized).unwrap();
        assert!(mean < 85.0, "mean {} should have been lowered", mean);
        assert_eq!(normalized.parts[0].events[0].pitches, vec![72]);
    }

    #[test]
    fn test_low_register_shifted_up() {
        let score = score_of(&[36, 38, 40, 41, 43, 45, 47, 48]);
        let normalized = normalize(score, &EngineConfig::default());
        assert_eq!(normalized.parts[0].events[0].pitches, vec![48]);
    }

    #[test]
    fn test_octave_correction_sizing() {
        let config = EngineConfig::default();
        assert_eq!(octave_correction(65.0, &config), 0);
        assert_eq!(octave_correction(80.0, &config), 0);
        assert_eq!(octave_correction(50.0, &config), 0);
        assert_eq!(octave_correction(90.0, &config), -12);
        assert_eq!(octave_correction(114.25, &config), -36);
        assert_eq!(octave_correction(42.0, &config), 12);
        assert_eq!(octave_correction(30.0, &config), 24);
    }

    #[test]
    fn test_unpitched_score_passes_through() {
        let score = Score::new(vec![Part::new(vec![])]);
        let normalized = normalize(score.clone(), &EngineConfig::default());
        assert_eq!(normalized.parts, score.parts);
        assert_eq!(normalized.key, None);
    }

    #[test]
    fn test_normalize_idempotent_on_typical_input() {
        let score = score_of(&[67, 69, 71, 72, 74, 76, 78, 79]);
        let once = normalize(score, &EngineConfig::default());
        let twice = normalize(once.clone(), &EngineConfig::default());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_idempotent_on_extreme_register() {
        // C major line parked around C8: the mean stays out of band after
        // one octave down, so the single correction must span three
        let score = score_of(&[108, 110, 112, 113, 115, 117, 119, 120]);
        let once = normalize(score, &EngineConfig::default());
        assert_eq!(once.parts[0].events[0].pitches, vec![72]);
        let twice = normalize(once.clone(), &EngineConfig::default());
        assert_eq!(once, twice);
    }
}
