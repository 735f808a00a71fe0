//! Rational time grid quantizer
//!
//! Snaps event offsets and durations onto a small set of permitted rhythmic
//! subdivisions. The grid is a set of denominators in quarter-note units:
//! 4 admits sixteenth notes (k/4 of a beat), 12 admits triplets (k/12).
//! Each value is snapped independently to whichever grid yields the smaller
//! error, so a passage can mix plain sixteenths with triplet figures without
//! either being destroyed.
//!
//! Running the quantizer on its own output is a no-op: every grid point
//! snaps to itself.

use num_rational::Ratio;
use num_traits::Signed;

use crate::models::{one_beat, Beats, Score};

/// Default grid: sixteenth notes and eighth-note triplets.
pub const DEFAULT_GRID: [i64; 2] = [4, 12];

/// Snap a single time value to the nearest point on any of the allowed
/// grids, minimizing absolute error. Ties go to the denominator listed
/// first, which keeps the result deterministic.
pub fn snap(value: Beats, grid: &[i64]) -> Beats {
    let mut best: Option<(Beats, Beats)> = None;
    for &d in grid {
        if d <= 0 {
            continue;
        }
        let scaled = value * Ratio::from_integer(d);
        let k = scaled.round().to_integer();
        let candidate = Ratio::new(k, d);
        let err = (value - candidate).abs();
        match best {
            Some((_, best_err)) if err >= best_err => {}
            _ => best = Some((candidate, err)),
        }
    }
    best.map(|(c, _)| c).unwrap_or(value)
}

/// Quantize every event of a score onto the given grid.
///
/// Degenerate durations (zero or negative, as OMR output sometimes carries)
/// are treated as one quarter note before snapping. A duration that would
/// snap to zero is held at the finest permitted grid step instead, so
/// quantization never erases an event. Offsets never go negative because a
/// non-negative offset snaps to a non-negative grid point.
pub fn quantize(mut score: Score, grid: &[i64]) -> Score {
    let zero = Ratio::from_integer(0);
    let min_step = grid
        .iter()
        .copied()
        .filter(|&d| d > 0)
        .max()
        .map(|d| Ratio::new(1, d))
        .unwrap_or_else(one_beat);

    for part in &mut score.parts {
        for event in &mut part.events {
            event.offset = snap(event.offset, grid);

            let duration = if event.duration <= zero {
                one_beat()
            } else {
                event.duration
            };
            let snapped = snap(duration, grid);
            event.duration = if snapped <= zero { min_step } else { snapped };
        }
        part.sort_events();
    }
    score
}
