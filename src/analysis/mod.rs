//! Key detection
//!
//! Krumhansl-Schmuckler template matching: build a duration-weighted
//! pitch-class histogram of the score, correlate it against the major and
//! minor key profiles at each of the 12 transpositions, and pick the
//! rotation/mode with the highest Pearson correlation.
//!
//! Detection is best-effort. Scores with no pitched content, or whose
//! histogram is flat enough that the correlation is undefined, return
//! `None`; the normalizer treats that as "leave pitches alone".

use num_traits::ToPrimitive;

use crate::models::{Key, Mode, Score};

/// Krumhansl-Schmuckler major key profile (C major at index 0).
const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];

/// Krumhansl-Schmuckler minor key profile (C minor at index 0).
const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

/// Detected key plus the winning correlation, for callers that want to
/// judge confidence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyEstimate {
    pub key: Key,
    pub correlation: f64,
}

/// Duration-weighted pitch-class histogram of a score.
fn pitch_class_weights(score: &Score) -> [f64; 12] {
    let mut weights = [0.0f64; 12];
    for part in &score.parts {
        for event in &part.events {
            let w = event.duration.to_f64().unwrap_or(0.0).max(0.0);
            for &pitch in &event.pitches {
                weights[(pitch % 12) as usize] += w;
            }
        }
    }
    weights
}

/// Pearson correlation between a histogram and a profile rotated so that
/// `tonic_pc` lines up with the profile's tonic.
fn correlate(weights: &[f64; 12], profile: &[f64; 12], tonic_pc: usize) -> f64 {
    let n = 12.0;
    let mean_w: f64 = weights.iter().sum::<f64>() / n;
    let mean_p: f64 = profile.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut den_w = 0.0;
    let mut den_p = 0.0;
    for pc in 0..12 {
        let dw = weights[pc] - mean_w;
        let dp = profile[(pc + 12 - tonic_pc) % 12] - mean_p;
        num += dw * dp;
        den_w += dw * dw;
        den_p += dp * dp;
    }

    let den = (den_w * den_p).sqrt();
    if den == 0.0 {
        f64::NAN
    } else {
        num / den
    }
}

/// Estimate the key of a score, with the winning correlation attached.
pub fn estimate_key(score: &Score) -> Option<KeyEstimate> {
    let weights = pitch_class_weights(score);
    if weights.iter().all(|&w| w == 0.0) {
        return None;
    }

    let mut best: Option<KeyEstimate> = None;
    for tonic_pc in 0..12u8 {
        for (mode, profile) in [(Mode::Major, &MAJOR_PROFILE), (Mode::Minor, &MINOR_PROFILE)] {
            let r = correlate(&weights, profile, tonic_pc as usize);
            if !r.is_finite() {
                continue;
            }
            let candidate = KeyEstimate {
                key: Key::new(tonic_pc, mode),
                correlation: r,
            };
            match best {
                Some(b) if b.correlation >= r => {}
                _ => best = Some(candidate),
            }
        }
    }

    if let Some(est) = best {
        log::debug!(
            "detected key {} (r = {:.3})",
            est.key,
            est.correlation
        );
    }
    best
}

/// Estimate the key of a score, discarding the confidence value.
pub fn detect_key(score: &Score) -> Option<Key> {
    estimate_key(score).map(|e| e.key)
}
