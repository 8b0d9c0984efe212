//! Speech synthesis backends for the fallback path.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use vocadrill_core::types::{SynthesisConfig, SynthesisEngine};
use vocadrill_core::wav::wav_from_pcm;

use crate::clip::AudioClip;
use crate::error::AudioError;
use crate::playback::Player;

/// Speaks raw text aloud, resolving once speech has finished.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    async fn speak(&self, text: &str) -> Result<(), AudioError>;

    fn name(&self) -> &str;
}

/// Build the configured synthesizer.
pub fn from_config(
    config: &SynthesisConfig,
    player: Arc<dyn Player>,
    volume: f32,
) -> Arc<dyn Synthesizer> {
    let synth: Arc<dyn Synthesizer> = match config.engine {
        SynthesisEngine::Kokoro => Arc::new(KokoroSynthesizer::new(config, player, volume)),
        SynthesisEngine::System => Arc::new(SystemSynthesizer::new(&config.language)),
    };
    info!("synthesis engine: {}", synth.name());
    synth
}

// ─── Kokoro ────────────────────────────────────────────────────────────────

/// OpenAI-compatible `/v1/audio/speech` client. The raw PCM response is
/// wrapped as WAV and played through the shared [`Player`].
pub struct KokoroSynthesizer {
    client: reqwest::Client,
    url: String,
    voice: String,
    speed: f32,
    volume: f32,
    player: Arc<dyn Player>,
}

impl KokoroSynthesizer {
    pub fn new(config: &SynthesisConfig, player: Arc<dyn Player>, volume: f32) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{}/v1/audio/speech", config.kokoro_url.trim_end_matches('/')),
            voice: config.voice.clone(),
            speed: config.speed,
            volume,
            player,
        }
    }

    async fn synthesize(&self, text: &str) -> Result<AudioClip, AudioError> {
        let body = serde_json::json!({
            "input": text,
            "voice": self.voice,
            "model": "kokoro",
            "response_format": "pcm",
            "speed": self.speed,
        });

        debug!("synth: POST {} chars", text.chars().count());

        let resp = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AudioError::Synthesis(format!("request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(AudioError::Synthesis(format!("Kokoro error {status}: {text}")));
        }

        let pcm = resp
            .bytes()
            .await
            .map_err(|e| AudioError::Synthesis(format!("stream error: {e}")))?;
        if pcm.len() < 2 {
            return Err(AudioError::Synthesis("empty audio".into()));
        }

        AudioClip::decode(wav_from_pcm(&pcm))
    }
}

#[async_trait]
impl Synthesizer for KokoroSynthesizer {
    async fn speak(&self, text: &str) -> Result<(), AudioError> {
        let clip = self.synthesize(text).await?;
        self.player.play(&clip, self.volume).await
    }

    fn name(&self) -> &str {
        "kokoro"
    }
}

// ─── System ────────────────────────────────────────────────────────────────

/// `spd-say`, then `espeak-ng`, awaited until speech ends.
#[derive(Debug, Clone)]
pub struct SystemSynthesizer {
    language: String,
}

impl SystemSynthesizer {
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
        }
    }
}

#[async_trait]
impl Synthesizer for SystemSynthesizer {
    async fn speak(&self, text: &str) -> Result<(), AudioError> {
        let attempts: [(&str, Vec<&str>); 2] = [
            ("spd-say", vec!["--wait", "-l", self.language.as_str(), text]),
            ("espeak-ng", vec!["-v", self.language.as_str(), text]),
        ];

        for (program, args) in attempts {
            match Command::new(program).args(&args).status().await {
                Ok(status) if status.success() => return Ok(()),
                Ok(status) => {
                    return Err(AudioError::Synthesis(format!("{program} exited with {status}")));
                }
                Err(e) => debug!("synth: {program} unavailable: {e}"),
            }
        }

        Err(AudioError::Synthesis(
            "no system TTS command found (tried spd-say, espeak-ng)".into(),
        ))
    }

    fn name(&self) -> &str {
        "system"
    }
}
