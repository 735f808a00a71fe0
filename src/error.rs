//! Error types for the arrangement engine and its tool wrappers
//!
//! Two hierarchies, matching the two failure domains: `ArrangeError` for
//! per-tier structural failures inside the pure pipeline (isolated per tier,
//! the orchestrator keeps going), and `ToolError` for external collaborator
//! failures (fatal to the whole request, since there is nothing to arrange).

use thiserror::Error;

/// A structural failure while producing one difficulty tier.
#[derive(Debug, Clone, Error)]
pub enum ArrangeError {
    /// The input score has no parts at all.
    #[error("score has no parts")]
    EmptyScore,

    /// Reduction removed every event of every part.
    #[error("no events survived reduction for tier '{0}'")]
    NothingSurvived(String),

    /// A difficulty name that isn't one of easy/super_easy/hard.
    #[error("unknown difficulty '{0}'")]
    UnknownDifficulty(String),
}

pub type ArrangeResult<T> = std::result::Result<T, ArrangeError>;

/// A failure of an external collaborator (OMR engine, notation renderer,
/// image pre-filter).
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool binary or install directory could not be located.
    #[error("{0} not found; install it or set an explicit path")]
    NotFound(&'static str),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The tool ran but exited unsuccessfully.
    #[error("{tool} failed: {detail}")]
    ExecFailed { tool: &'static str, detail: String },

    /// The tool ran but produced no usable output file.
    #[error("{tool} produced no output")]
    NoOutput { tool: &'static str },

    /// OMR ran but recognized nothing (or not enough) on the page.
    #[error("no usable content recognized: {0} events found, {1} required")]
    TooLittleContent(usize, usize),
}

pub type ToolResult<T> = std::result::Result<T, ToolError>;
