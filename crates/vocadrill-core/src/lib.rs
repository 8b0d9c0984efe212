//! vocadrill-core — Pure types and word-picking logic.
//!
//! No async runtime, no network, no audio dependencies.

pub mod dictionary;
pub mod picker;
pub mod types;
pub mod wav;
pub mod words;
