//! Data model for scores, parts and events

pub mod core;
pub mod key;

pub use self::core::{one_beat, Beats, Event, Part, PartRole, Score, TimeSignature};
pub use self::key::{Key, Mode};
