//! Arrangement orchestrator
//!
//! Runs the pipeline once per requested difficulty tier:
//!
//! ```text
//! input -> quantize + normalize (once, shared)
//!            \-> per tier: copy -> reduce -> clamp -> quantize -> output
//! ```
//!
//! Normalization happens exactly once per input score so every tier of the
//! same piece agrees on key and register. Tiers are independent: a failure
//! while producing one tier is recorded in that tier's outcome and never
//! aborts the others. The per-tier pipeline is pure computation over the
//! tier's own deep copy of the normalized score, so a host is free to run
//! tiers on separate threads.

use serde::Serialize;

use crate::clamp::clamp_score;
use crate::config::EngineConfig;
use crate::error::{ArrangeError, ArrangeResult};
use crate::models::Score;
use crate::quantize::quantize;
use crate::reduce::{reduce_score, Difficulty};

/// Result of one tier's pipeline run, keyed by tier name so callers can
/// reassemble outputs in any order.
#[derive(Debug, Clone, Serialize)]
pub struct TierOutcome {
    pub tier: String,
    pub result: Result<Score, String>,
}

impl TierOutcome {
    pub fn score(&self) -> Option<&Score> {
        self.result.as_ref().ok()
    }
}

/// Normalize an input score: quantize onto the configured grid, move it to
/// the canonical tonic, correct implausible register. Idempotent.
pub fn normalize(score: Score, config: &EngineConfig) -> Score {
    crate::normalize::normalize(score, config)
}

/// Produce one difficulty tier from an already-normalized score.
///
/// Deterministic for identical input and policy. The final quantization
/// pass puts the fractional durations introduced by hard-mode arpeggios
/// back onto the permitted grid.
pub fn arrange(
    normalized: &Score,
    difficulty: Difficulty,
    config: &EngineConfig,
) -> ArrangeResult<Score> {
    if normalized.parts.is_empty() {
        return Err(ArrangeError::EmptyScore);
    }

    let reduced = reduce_score(normalized, difficulty);
    let clamped = clamp_score(reduced);
    let arranged = quantize(clamped, &config.grid);

    if arranged.event_count() == 0 {
        return Err(ArrangeError::NothingSurvived(
            difficulty.as_str().to_string(),
        ));
    }

    log::info!(
        "arranged tier '{}': {} events across {} parts",
        difficulty,
        arranged.event_count(),
        arranged.parts.len()
    );
    Ok(arranged)
}

/// Produce every requested tier from one raw score.
///
/// The input is normalized once; each tier then works on its own copy.
/// Failed tiers yield an error string in their outcome while the other
/// tiers complete normally.
pub fn arrange_all(score: Score, tiers: &[Difficulty], config: &EngineConfig) -> Vec<TierOutcome> {
    let normalized = normalize(score, config);

    tiers
        .iter()
        .map(|&difficulty| {
            let result = arrange(&normalized, difficulty, config).map_err(|e| {
                log::warn!("tier '{}' failed: {}", difficulty, e);
                e.to_string()
            });
            TierOutcome {
                tier: difficulty.as_str().to_string(),
                result,
            }
        })
        .collect()
}

/// Parse tier names and produce those tiers. An unknown name becomes a
/// failed outcome under that name rather than aborting the request.
pub fn arrange_named(score: Score, names: &[&str], config: &EngineConfig) -> Vec<TierOutcome> {
    let mut tiers = Vec::new();
    let mut outcomes = Vec::new();
    for name in names {
        match name.parse::<Difficulty>() {
            Ok(tier) => tiers.push(tier),
            Err(e) => {
                log::warn!("{}", e);
                outcomes.push(TierOutcome {
                    tier: name.to_string(),
                    result: Err(e.to_string()),
                });
            }
        }
    }
    outcomes.extend(arrange_all(score, &tiers, config));
    outcomes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{one_beat, Beats, Event, Part};

    fn two_hand_score() -> Score {
        let melody = Part::new(vec![
            Event::new(Beats::from_integer(0), one_beat(), vec![60, 64, 67]),
            Event::note(Beats::from_integer(1), one_beat(), 64),
        ]);
        let accomp = Part::new(vec![
            Event::note(Beats::from_integer(0), Beats::from_integer(2), 48),
            Event::note(Beats::new(5, 2), one_beat(), 50),
        ]);
        Score::new(vec![melody, accomp])
    }

    #[test]
    fn test_empty_score_is_a_tier_error() {
        let err = arrange(&Score::new(vec![]), Difficulty::Easy, &EngineConfig::default());
        assert!(matches!(err, Err(ArrangeError::EmptyScore)));
    }

    #[test]
    fn test_tiers_are_independent_copies() {
        let config = EngineConfig::default();
        let normalized = normalize(two_hand_score(), &config);
        let easy = arrange(&normalized, Difficulty::Easy, &config).unwrap();
        let hard = arrange(&normalized, Difficulty::Hard, &config).unwrap();
        // producing hard after easy must not have disturbed the shared input
        let easy_again = arrange(&normalized, Difficulty::Easy, &config).unwrap();
        assert_eq!(easy, easy_again);
        assert_ne!(easy, hard);
    }

    #[test]
    fn test_arrange_all_produces_every_tier() {
        let outcomes = arrange_all(
            two_hand_score(),
            &Difficulty::ALL,
            &EngineConfig::default(),
        );
        assert_eq!(outcomes.len(), 3);
        for outcome in &outcomes {
            assert!(
                outcome.score().is_some(),
                "tier {} unexpectedly failed",
                outcome.tier
            );
        }
    }

    #[test]
    fn test_arrange_named_isolates_bad_names() {
        let outcomes = arrange_named(
            two_hand_score(),
            &["easy", "impossible"],
            &EngineConfig::default(),
        );
        assert_eq!(outcomes.len(), 2);
        let failed: Vec<_> = outcomes.iter().filter(|o| o.score().is_none()).collect();
        assert_eq!(failed.len(), 1);
    }
}
