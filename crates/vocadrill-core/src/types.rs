//! Shared types for the vocadrill workspace.
//!
//! Configuration and status types live here so that consumers can depend on
//! them without pulling in tokio, rodio, or reqwest.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ─── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// ─── Configuration ─────────────────────────────────────────────────────────

/// Default recorded-clip endpoint. `{word}` is replaced by the
/// percent-encoded word.
pub const DEFAULT_AUDIO_URL_TEMPLATE: &str =
    "https://assiets.vdegenne.com/data/japanese/audio/{word}";

/// Base URL that relative remote references resolve against.
pub const DEFAULT_REMOTE_BASE_URL: &str = "https://assiets.vdegenne.com/data/japanese/";

/// Remote word-list document, relative to the remote base URL.
pub const DEFAULT_REMOTE_WORDS: &str = "./data.json";

/// Longest word (in UTF-16 code units) for which a recorded clip is attempted.
pub const DEFAULT_MAX_RECORDED_LEN: usize = 6;

/// Settings for the recorded-clip path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub max_recorded_len: usize,
    pub volume: f32,
    pub audio_url_template: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_recorded_len: DEFAULT_MAX_RECORDED_LEN,
            volume: 1.0,
            audio_url_template: DEFAULT_AUDIO_URL_TEMPLATE.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SynthesisEngine {
    /// OpenAI-compatible Kokoro server.
    Kokoro,
    /// `spd-say` / `espeak-ng` subprocess.
    System,
}

/// Speech synthesis fallback settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub engine: SynthesisEngine,
    pub kokoro_url: String,
    pub voice: String,
    pub speed: f32,
    /// Language code handed to the system synthesizer.
    pub language: String,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            engine: SynthesisEngine::Kokoro,
            kokoro_url: "http://localhost:3001".into(),
            voice: "jf_alpha".into(),
            speed: 1.0,
            language: "ja".into(),
        }
    }
}

/// Top-level application configuration, read from an optional JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Seconds between two drilled words.
    pub interval_secs: u64,
    /// Local word-list file (JSON array of strings).
    pub words_path: PathBuf,
    /// Base for relative remote references.
    pub remote_base_url: String,
    /// Remote word-list document, absolute or relative to `remote_base_url`.
    /// Seeds an empty local list and backs the remote reload. `null`
    /// disables both.
    pub remote_words_url: Option<String>,
    /// Dictionary gating recorded clips. The bundled list is used when unset.
    pub dictionary_path: Option<PathBuf>,
    pub resolver: ResolverConfig,
    pub synthesis: SynthesisConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            words_path: data_dir().join("words.json"),
            remote_base_url: DEFAULT_REMOTE_BASE_URL.into(),
            remote_words_url: Some(DEFAULT_REMOTE_WORDS.into()),
            dictionary_path: None,
            resolver: ResolverConfig::default(),
            synthesis: SynthesisConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `path`, or return defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

/// Per-user data directory, falling back to the working directory.
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("vocadrill"))
        .unwrap_or_else(|| PathBuf::from("."))
}

// ─── Drill status ──────────────────────────────────────────────────────────

/// Observable drill state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrillState {
    Idle,
    Running,
    Speaking,
}

/// Drill status snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrillStatus {
    pub state: DrillState,
    pub running: bool,
    pub current_word: Option<String>,
    pub word_count: usize,
    pub history_len: usize,
}

/// How a word ended up being pronounced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pronunciation {
    /// Pre-recorded clip played.
    Recording,
    /// Speech synthesis played.
    Synthesis,
    /// Both paths failed.
    Silent,
}
