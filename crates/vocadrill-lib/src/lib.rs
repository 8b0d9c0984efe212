//! vocadrill-lib — Drill engine.
//!
//! Recorded-clip resolution with a coalescing cache, rodio playback, speech
//! synthesis fallback, the periodic drill loop, word-list storage, and HTTP
//! API. Depends on vocadrill-core for the picker, dictionary, and types.

pub mod clip;
pub mod drill;
pub mod error;
pub mod fetch;
pub mod playback;
pub mod resolver;
pub mod server;
pub mod store;
pub mod synth;

// Re-export vocadrill-core for convenience
pub use vocadrill_core;
