//! Engine configuration
//!
//! Gathers every tunable the pipeline and the external tool wrappers use.
//! The register thresholds and the recognition quality threshold are magic
//! numbers inherited from field experience with OMR output; they live here
//! as configuration rather than as hard-coded invariants.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::quantize::DEFAULT_GRID;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Permitted grid denominators in quarter-note units. The default
    /// `[4, 12]` admits sixteenth notes and triplets.
    pub grid: Vec<i64>,

    /// Mean-pitch ceiling; a normalized score averaging above this is
    /// shifted down one octave.
    pub high_mean: f64,

    /// Mean-pitch floor; a normalized score averaging below this is shifted
    /// up one octave.
    pub low_mean: f64,

    /// Minimum number of recognized events for OMR output to count as a
    /// usable score rather than a quality failure.
    pub min_recognized_notes: usize,

    /// Explicit path to the notation renderer binary; `None` means search
    /// the conventional install locations and PATH.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub musescore_path: Option<PathBuf>,

    /// Explicit OMR install root; `None` means search the conventional
    /// install locations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audiveris_root: Option<PathBuf>,

    /// Wall-clock limit for one external tool invocation, in seconds.
    pub tool_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            grid: DEFAULT_GRID.to_vec(),
            high_mean: 80.0,
            low_mean: 50.0,
            min_recognized_notes: 4,
            musescore_path: None,
            audiveris_root: None,
            tool_timeout_secs: 180,
        }
    }
}
