//! Error types for the drill engine.

use std::path::PathBuf;

/// Failure on the recorded-clip or synthesis path.
///
/// `Clone` because one in-flight fetch result is handed to every caller
/// waiting on it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AudioError {
    #[error("audio request failed: {0}")]
    Fetch(String),

    #[error("audio endpoint returned status {0}")]
    Status(u16),

    #[error("audio decode failed: {0}")]
    Decode(String),

    #[error("playback failed: {0}")]
    Playback(String),

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),
}

/// Word-list persistence failure.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("word list I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("word list in {path} is not a JSON string array: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("remote word list: {0}")]
    Fetch(String),

    #[error("invalid remote word-list url: {0}")]
    Url(String),
}
