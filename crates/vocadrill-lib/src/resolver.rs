//! Word pronunciation: recorded clip when available, synthesis otherwise.
//!
//! ```text
//! pronounce(word)
//!     → eligible? (length ≤ max, then dictionary hit)
//!         yes → cache: Resolved → play
//!                      Pending  → await shared fetch → play
//!                      absent   → register Pending, fetch, decode → Resolved → play
//!     → any failure or ineligible → synthesize raw word (once, no retry)
//! ```
//!
//! The cache lives for the whole process and is never evicted. Concurrent
//! requests for one word share a single in-flight fetch. A failed fetch
//! removes its `Pending` entry so a later call can try again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, warn};

use vocadrill_core::dictionary::Dictionary;
use vocadrill_core::types::{Pronunciation, ResolverConfig};

use crate::clip::AudioClip;
use crate::error::AudioError;
use crate::fetch::AudioFetcher;
use crate::playback::Player;
use crate::synth::Synthesizer;

type ClipResult = Result<AudioClip, AudioError>;
type PendingFetch = Shared<BoxFuture<'static, ClipResult>>;

enum CacheEntry {
    Pending(PendingFetch),
    Resolved(AudioClip),
}

/// Observable state of one cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Absent,
    Pending,
    Resolved,
}

/// Process-lifetime clip cache keyed by word.
#[derive(Default)]
pub struct AudioCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl AudioCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, word: &str) -> CacheState {
        match self.entries().get(word) {
            None => CacheState::Absent,
            Some(CacheEntry::Pending(_)) => CacheState::Pending,
            Some(CacheEntry::Resolved(_)) => CacheState::Resolved,
        }
    }

    /// Number of resolved clips.
    pub fn resolved_len(&self) -> usize {
        self.entries()
            .values()
            .filter(|e| matches!(e, CacheEntry::Resolved(_)))
            .count()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached clip, join the in-flight fetch, or start one with
    /// `fetch`. The lock is never held across an await.
    async fn get_or_fetch<F>(&self, word: &str, fetch: F) -> ClipResult
    where
        F: FnOnce() -> BoxFuture<'static, ClipResult>,
    {
        let pending = {
            let mut entries = self.entries();
            match entries.get(word) {
                Some(CacheEntry::Resolved(clip)) => {
                    debug!("cache: hit for {word}");
                    return Ok(clip.clone());
                }
                Some(CacheEntry::Pending(pending)) => {
                    debug!("cache: joining in-flight fetch for {word}");
                    pending.clone()
                }
                None => {
                    debug!("cache: miss for {word}");
                    let pending = fetch().shared();
                    entries.insert(word.to_string(), CacheEntry::Pending(pending.clone()));
                    pending
                }
            }
        };

        let result = pending.clone().await;
        self.settle(word, &pending, &result);
        result
    }

    /// Replace our own `Pending` entry with the outcome. Every waiter calls
    /// this; only the first one still finding the same fetch acts.
    fn settle(&self, word: &str, pending: &PendingFetch, result: &ClipResult) {
        let mut entries = self.entries();
        let ours = matches!(
            entries.get(word),
            Some(CacheEntry::Pending(current)) if current.ptr_eq(pending)
        );
        if !ours {
            return;
        }
        match result {
            Ok(clip) => {
                entries.insert(word.to_string(), CacheEntry::Resolved(clip.clone()));
            }
            Err(_) => {
                entries.remove(word);
            }
        }
    }
}

/// Resolves and plays the pronunciation of a word.
pub struct AudioResolver {
    config: ResolverConfig,
    cache: Arc<AudioCache>,
    dictionary: Arc<dyn Dictionary>,
    fetcher: Arc<dyn AudioFetcher>,
    player: Arc<dyn Player>,
    synth: Arc<dyn Synthesizer>,
}

impl AudioResolver {
    pub fn new(
        config: ResolverConfig,
        cache: Arc<AudioCache>,
        dictionary: Arc<dyn Dictionary>,
        fetcher: Arc<dyn AudioFetcher>,
        player: Arc<dyn Player>,
        synth: Arc<dyn Synthesizer>,
    ) -> Self {
        Self {
            config,
            cache,
            dictionary,
            fetcher,
            player,
            synth,
        }
    }

    pub fn cache(&self) -> &Arc<AudioCache> {
        &self.cache
    }

    /// Length, in UTF-16 code units, is checked before the dictionary is
    /// consulted.
    pub fn is_eligible(&self, word: &str) -> bool {
        word.encode_utf16().count() <= self.config.max_recorded_len
            && self.dictionary.lookup(word).is_some()
    }

    /// Pronounce `word`, returning once playback or the fallback finishes.
    /// Never fails: recorded-path errors fall back to synthesis, synthesis
    /// errors are logged.
    pub async fn pronounce(&self, word: &str) -> Pronunciation {
        if self.is_eligible(word) {
            match self.play_recorded(word).await {
                Ok(()) => return Pronunciation::Recording,
                Err(e) => warn!("recorded clip for {word:?} failed ({e}), using synthesis"),
            }
        } else {
            debug!("{word:?} not eligible for a recorded clip");
        }

        match self.synth.speak(word).await {
            Ok(()) => Pronunciation::Synthesis,
            Err(e) => {
                warn!("synthesis ({}) failed for {word:?}: {e}", self.synth.name());
                Pronunciation::Silent
            }
        }
    }

    async fn play_recorded(&self, word: &str) -> Result<(), AudioError> {
        let fetcher = self.fetcher.clone();
        let owned = word.to_string();
        let clip = self
            .cache
            .get_or_fetch(word, move || {
                async move {
                    let bytes = fetcher.fetch(&owned).await?;
                    AudioClip::decode(bytes)
                }
                .boxed()
            })
            .await?;

        self.player.play(&clip, self.config.volume).await
    }
}
