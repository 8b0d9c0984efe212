//! Test doubles for the resolver's collaborators.
//!
//! Every mock records what it was asked to do so tests can assert on network
//! traffic, playback, and fallback behavior without audio hardware.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use vocadrill_lib::clip::AudioClip;
use vocadrill_lib::error::AudioError;
use vocadrill_lib::fetch::AudioFetcher;
use vocadrill_lib::playback::Player;
use vocadrill_lib::resolver::{AudioCache, AudioResolver};
use vocadrill_lib::synth::Synthesizer;
use vocadrill_lib::vocadrill_core::dictionary::{Dictionary, WordDictionary};
use vocadrill_lib::vocadrill_core::types::ResolverConfig;
use vocadrill_lib::vocadrill_core::wav::write_wav;

/// A short decodable clip.
pub fn wav_bytes() -> Vec<u8> {
    write_wav(&vec![0i16; 240], 24_000)
}

// ─── Fetcher ───────────────────────────────────────────────────────────────

pub struct MockFetcher {
    pub requests: Mutex<Vec<String>>,
    response: Result<Vec<u8>, AudioError>,
    delay: Duration,
}

impl MockFetcher {
    pub fn ok(bytes: Vec<u8>) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            response: Ok(bytes),
            delay: Duration::ZERO,
        }
    }

    pub fn failing(err: AudioError) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            response: Err(err),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl AudioFetcher for MockFetcher {
    async fn fetch(&self, word: &str) -> Result<Vec<u8>, AudioError> {
        self.requests.lock().unwrap().push(word.to_string());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.response.clone()
    }
}

// ─── Player ────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockPlayer {
    pub played: Mutex<Vec<f32>>,
    pub fail: bool,
}

impl MockPlayer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn plays(&self) -> usize {
        self.played.lock().unwrap().len()
    }
}

#[async_trait]
impl Player for MockPlayer {
    async fn play(&self, _clip: &AudioClip, volume: f32) -> Result<(), AudioError> {
        if self.fail {
            return Err(AudioError::Playback("mock output error".into()));
        }
        self.played.lock().unwrap().push(volume);
        Ok(())
    }
}

// ─── Synthesizer ───────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockSynth {
    pub spoken: Mutex<Vec<String>>,
    pub fail: bool,
}

impl MockSynth {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl Synthesizer for MockSynth {
    async fn speak(&self, text: &str) -> Result<(), AudioError> {
        self.spoken.lock().unwrap().push(text.to_string());
        if self.fail {
            return Err(AudioError::Synthesis("mock synthesis failure".into()));
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ─── Dictionary ────────────────────────────────────────────────────────────

pub struct CountingDictionary {
    inner: WordDictionary,
    lookups: AtomicUsize,
}

impl CountingDictionary {
    pub fn new(entries: &[&str]) -> Self {
        Self {
            inner: WordDictionary::new(entries.iter().copied()),
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl Dictionary for CountingDictionary {
    fn lookup(&self, word: &str) -> Option<&str> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.lookup(word)
    }
}

// ─── Wiring ────────────────────────────────────────────────────────────────

pub struct Harness {
    pub resolver: Arc<AudioResolver>,
    pub fetcher: Arc<MockFetcher>,
    pub player: Arc<MockPlayer>,
    pub synth: Arc<MockSynth>,
    pub dictionary: Arc<CountingDictionary>,
}

impl Harness {
    pub fn new(fetcher: MockFetcher, player: MockPlayer, synth: MockSynth, entries: &[&str]) -> Self {
        Self::with_config(ResolverConfig::default(), fetcher, player, synth, entries)
    }

    pub fn with_config(
        config: ResolverConfig,
        fetcher: MockFetcher,
        player: MockPlayer,
        synth: MockSynth,
        entries: &[&str],
    ) -> Self {
        let fetcher = Arc::new(fetcher);
        let player = Arc::new(player);
        let synth = Arc::new(synth);
        let dictionary = Arc::new(CountingDictionary::new(entries));
        let resolver = Arc::new(AudioResolver::new(
            config,
            Arc::new(AudioCache::new()),
            dictionary.clone(),
            fetcher.clone(),
            player.clone(),
            synth.clone(),
        ));
        Self {
            resolver,
            fetcher,
            player,
            synth,
            dictionary,
        }
    }

    /// Recorded clips available for every dictionary word.
    pub fn working(entries: &[&str]) -> Self {
        Self::new(
            MockFetcher::ok(wav_bytes()),
            MockPlayer::default(),
            MockSynth::default(),
            entries,
        )
    }
}
