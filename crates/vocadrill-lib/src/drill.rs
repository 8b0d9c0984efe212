//! Drill engine — periodic pick → pronounce loop.
//!
//! ```text
//! start() → [cmd_tx] → drill task: tick every interval while running
//!     → WordPicker::next(words, history)
//!     → AudioResolver::pronounce(word)  (awaited before the next tick)
//! ```
//!
//! One task owns the word list, the picker and its history, so picks are
//! serialized by construction. Commands arriving while a word is being
//! pronounced are handled once it finishes. Missed ticks are delayed, never
//! bursted.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use vocadrill_core::picker::WordPicker;
use vocadrill_core::types::{DrillState, DrillStatus, Pronunciation};

use crate::resolver::AudioResolver;

/// Cloneable handle to the drill task. All methods except [`say`] and
/// [`next`] return immediately.
///
/// [`say`]: DrillEngine::say
/// [`next`]: DrillEngine::next
#[derive(Clone)]
pub struct DrillEngine {
    cmd_tx: mpsc::UnboundedSender<Cmd>,
    status_rx: watch::Receiver<DrillStatus>,
}

enum Cmd {
    Start,
    Stop,
    Toggle,
    SetWords(Vec<String>),
    GetWords(oneshot::Sender<Vec<String>>),
    Next(oneshot::Sender<Option<(String, Pronunciation)>>),
    Say(String, oneshot::Sender<Pronunciation>),
}

impl DrillEngine {
    /// Spawn the drill task with an entropy-seeded RNG. Requires a tokio
    /// runtime.
    pub fn new(resolver: Arc<AudioResolver>, words: Vec<String>, interval: Duration) -> Self {
        Self::with_picker(
            resolver,
            words,
            interval,
            WordPicker::new(StdRng::from_entropy()),
        )
    }

    pub fn with_picker<R>(
        resolver: Arc<AudioResolver>,
        words: Vec<String>,
        interval: Duration,
        picker: WordPicker<R>,
    ) -> Self
    where
        R: rand::Rng + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (status_tx, status_rx) = watch::channel(DrillStatus {
            state: DrillState::Idle,
            running: false,
            current_word: None,
            word_count: words.len(),
            history_len: 0,
        });

        let session = Session {
            resolver,
            picker,
            words,
            history: Vec::new(),
            status_tx,
        };
        tokio::spawn(drill_task(cmd_rx, session, interval));

        Self { cmd_tx, status_rx }
    }

    pub fn start(&self) {
        let _ = self.cmd_tx.send(Cmd::Start);
    }

    pub fn stop(&self) {
        let _ = self.cmd_tx.send(Cmd::Stop);
    }

    pub fn toggle(&self) {
        let _ = self.cmd_tx.send(Cmd::Toggle);
    }

    /// Replace the word list. Clears the history; an empty list stops a
    /// running drill.
    pub fn set_words(&self, words: Vec<String>) {
        let _ = self.cmd_tx.send(Cmd::SetWords(words));
    }

    pub async fn words(&self) -> Vec<String> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Cmd::GetWords(tx));
        rx.await.unwrap_or_default()
    }

    /// Pick and pronounce one word now, outside the timer. `None` when the
    /// list is empty.
    pub async fn next(&self) -> Option<(String, Pronunciation)> {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Cmd::Next(tx));
        rx.await.ok().flatten()
    }

    /// Pronounce an arbitrary word without touching the history.
    pub async fn say(&self, word: &str) -> Pronunciation {
        let (tx, rx) = oneshot::channel();
        let _ = self.cmd_tx.send(Cmd::Say(word.to_string(), tx));
        rx.await.unwrap_or(Pronunciation::Silent)
    }

    pub fn status(&self) -> DrillStatus {
        self.status_rx.borrow().clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<DrillStatus> {
        self.status_rx.clone()
    }
}

// ─── Drill task ─────────────────────────────────────────────────────────────

struct Session<R> {
    resolver: Arc<AudioResolver>,
    picker: WordPicker<R>,
    words: Vec<String>,
    history: Vec<String>,
    status_tx: watch::Sender<DrillStatus>,
}

impl<R: rand::Rng> Session<R> {
    async fn drill_one(&mut self) -> Option<(String, Pronunciation)> {
        let word = self.picker.next(&self.words, &mut self.history)?;
        let history_len = self.history.len();
        update_status(&self.status_tx, |s| {
            s.state = DrillState::Speaking;
            s.current_word = Some(word.clone());
            s.history_len = history_len;
        });

        let outcome = self.resolver.pronounce(&word).await;
        debug!("drill: {word:?} → {outcome:?}");

        update_status(&self.status_tx, |s| {
            s.state = if s.running {
                DrillState::Running
            } else {
                DrillState::Idle
            };
        });
        Some((word, outcome))
    }

    async fn say(&mut self, word: &str) -> Pronunciation {
        let previous = self.status_tx.borrow().state;
        update_status(&self.status_tx, |s| s.state = DrillState::Speaking);
        let outcome = self.resolver.pronounce(word).await;
        update_status(&self.status_tx, |s| s.state = previous);
        outcome
    }

    fn set_running(&self, running: bool) {
        update_status(&self.status_tx, |s| {
            s.running = running;
            s.state = if running {
                DrillState::Running
            } else {
                DrillState::Idle
            };
        });
    }

    fn set_words(&mut self, words: Vec<String>) {
        self.words = words;
        self.history.clear();
        let count = self.words.len();
        update_status(&self.status_tx, |s| {
            s.word_count = count;
            s.history_len = 0;
        });
    }
}

async fn drill_task<R: rand::Rng>(
    mut cmd_rx: mpsc::UnboundedReceiver<Cmd>,
    mut session: Session<R>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut running = false;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else { break };
                match cmd {
                    Cmd::Start | Cmd::Toggle if !running => {
                        if session.words.is_empty() {
                            info!("drill: not starting, word list is empty");
                            continue;
                        }
                        info!("drill: started ({} words, every {:?})", session.words.len(), interval);
                        running = true;
                        ticker.reset_immediately();
                        session.set_running(true);
                    }
                    Cmd::Stop | Cmd::Toggle if running => {
                        info!("drill: stopped");
                        running = false;
                        session.set_running(false);
                    }
                    Cmd::Start | Cmd::Stop | Cmd::Toggle => {}
                    Cmd::SetWords(words) => {
                        debug!("drill: word list replaced ({} words)", words.len());
                        session.set_words(words);
                        if running && session.words.is_empty() {
                            info!("drill: word list emptied, stopping");
                            running = false;
                            session.set_running(false);
                        }
                    }
                    Cmd::GetWords(reply) => {
                        let _ = reply.send(session.words.clone());
                    }
                    Cmd::Next(reply) => {
                        let result = session.drill_one().await;
                        let _ = reply.send(result);
                    }
                    Cmd::Say(word, reply) => {
                        let _ = reply.send(session.say(&word).await);
                    }
                }
            }
            _ = ticker.tick(), if running => {
                if session.drill_one().await.is_none() {
                    running = false;
                    session.set_running(false);
                }
            }
        }
    }
}

fn update_status(tx: &watch::Sender<DrillStatus>, f: impl FnOnce(&mut DrillStatus)) {
    tx.send_modify(f);
}
