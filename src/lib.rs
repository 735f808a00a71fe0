//! gradus - piano score simplification and arrangement engine
//!
//! Takes a parsed musical score and produces simplified rearrangements of
//! it for different performer skill levels, keeping the result recognizable
//! and free of rhythmic or pitch errors. The pipeline:
//!
//! ```text
//! raw score -> quantize -> key/register normalize -> (per difficulty tier)
//!           reduce voices -> clamp registers -> quantize -> output score
//! ```
//!
//! The engine is pure computation over the in-memory [`models::Score`];
//! reading images, recognizing notation and rendering pages are external
//! tools wrapped in [`tools`].

pub mod analysis;
pub mod arrange;
pub mod clamp;
pub mod config;
pub mod error;
pub mod models;
pub mod normalize;
pub mod quantize;
pub mod reduce;
pub mod tools;

// Re-export the surface most callers need.
pub use arrange::{arrange, arrange_all, arrange_named, normalize as normalize_score, TierOutcome};
pub use config::EngineConfig;
pub use error::{ArrangeError, ToolError};
pub use models::{Beats, Event, Key, Mode, Part, PartRole, Score, TimeSignature};
pub use quantize::quantize;
pub use reduce::Difficulty;
