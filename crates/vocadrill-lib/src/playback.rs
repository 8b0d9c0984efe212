//! Clip playback on a dedicated audio thread.
//!
//! rodio's `OutputStream` is `!Send`, so one OS thread owns the output device
//! and receives play requests over a channel. Every clip gets its own `Sink`:
//! overlapping requests play concurrently, and each request is answered
//! through a oneshot once its sink drains.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Duration;

use async_trait::async_trait;
use rodio::{OutputStream, OutputStreamHandle, Sink};
use tokio::sync::oneshot;
use tracing::{debug, error};

use crate::clip::AudioClip;
use crate::error::AudioError;

/// How often the playback thread checks active sinks for completion.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Plays a clip to completion.
#[async_trait]
pub trait Player: Send + Sync {
    /// Resolve once playback ends naturally; fail on any output or decode
    /// error.
    async fn play(&self, clip: &AudioClip, volume: f32) -> Result<(), AudioError>;
}

type Done = oneshot::Sender<Result<(), AudioError>>;

struct PlayCmd {
    clip: AudioClip,
    volume: f32,
    done: Done,
}

/// Cloneable handle to the playback thread.
#[derive(Clone)]
pub struct RodioPlayer {
    cmd_tx: mpsc::Sender<PlayCmd>,
}

impl RodioPlayer {
    /// Spawn the playback thread.
    pub fn new() -> Result<Self, AudioError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<PlayCmd>();
        std::thread::Builder::new()
            .name("vocadrill-playback".into())
            .spawn(move || playback_thread(cmd_rx))
            .map_err(|e| AudioError::Playback(format!("failed to spawn playback thread: {e}")))?;
        Ok(Self { cmd_tx })
    }
}

#[async_trait]
impl Player for RodioPlayer {
    async fn play(&self, clip: &AudioClip, volume: f32) -> Result<(), AudioError> {
        let (done, rx) = oneshot::channel();
        self.cmd_tx
            .send(PlayCmd {
                clip: clip.clone(),
                volume,
                done,
            })
            .map_err(|_| AudioError::Playback("playback thread is gone".into()))?;

        rx.await
            .map_err(|_| AudioError::Playback("playback thread dropped the request".into()))?
    }
}

// ─── Playback OS thread ───────────────────────────────────────────────────

fn playback_thread(cmd_rx: mpsc::Receiver<PlayCmd>) {
    let (_stream, stream_handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            error!("playback: failed to open audio output: {e}");
            let reason = format!("no audio output: {e}");
            while let Ok(cmd) = cmd_rx.recv() {
                let _ = cmd.done.send(Err(AudioError::Playback(reason.clone())));
            }
            return;
        }
    };

    let mut active: Vec<(Sink, Done)> = Vec::new();

    loop {
        let cmd = if active.is_empty() {
            match cmd_rx.recv() {
                Ok(cmd) => Some(cmd),
                Err(_) => break,
            }
        } else {
            match cmd_rx.recv_timeout(POLL_INTERVAL) {
                Ok(cmd) => Some(cmd),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => break,
            }
        };

        if let Some(PlayCmd { clip, volume, done }) = cmd {
            match start_sink(&stream_handle, &clip, volume) {
                Ok(sink) => {
                    debug!(
                        "playback: {:?} clip appended ({} active)",
                        clip.duration().unwrap_or_default(),
                        active.len() + 1
                    );
                    active.push((sink, done));
                }
                Err(e) => {
                    let _ = done.send(Err(e));
                }
            }
        }

        let mut i = 0;
        while i < active.len() {
            if active[i].0.empty() {
                let (_, done) = active.swap_remove(i);
                let _ = done.send(Ok(()));
            } else {
                i += 1;
            }
        }
    }

    for (sink, _) in active {
        sink.stop();
    }
}

fn start_sink(
    handle: &OutputStreamHandle,
    clip: &AudioClip,
    volume: f32,
) -> Result<Sink, AudioError> {
    let source = clip.source()?;
    let sink = Sink::try_new(handle).map_err(|e| AudioError::Playback(e.to_string()))?;
    sink.set_volume(volume.max(0.0));
    sink.append(source);
    Ok(sink)
}
