//! vocadrill CLI — periodic vocabulary driller.
//!
//! ```text
//! vocadrill serve [--port 2004] [--host 127.0.0.1] [--config vocadrill.json]
//! vocadrill run [--config ...]
//! vocadrill say 猫
//! vocadrill pick [--count 10]
//! vocadrill words [--file list.txt | --remote] [--server http://localhost:2004]
//! vocadrill start / stop / toggle / next / status [--server ...]
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use vocadrill_lib::drill::DrillEngine;
use vocadrill_lib::fetch::HttpAudioFetcher;
use vocadrill_lib::playback::{Player, RodioPlayer};
use vocadrill_lib::resolver::{AudioCache, AudioResolver};
use vocadrill_lib::store::{WordStore, resolve_remote_url};
use vocadrill_lib::vocadrill_core::dictionary::{Dictionary, WordDictionary};
use vocadrill_lib::vocadrill_core::picker::WordPicker;
use vocadrill_lib::vocadrill_core::types::{AppConfig, DrillState};
use vocadrill_lib::vocadrill_core::words::{format_word_list, parse_word_list};
use vocadrill_lib::{server, synth};

const DEFAULT_SERVER: &str = "http://localhost:2004";

/// vocadrill — drill a word list aloud on a fixed interval
#[derive(Parser)]
#[command(name = "vocadrill", version, about)]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP control server with an idle drill
    Serve {
        /// Listen port
        #[arg(long, default_value = "2004")]
        port: u16,
        /// Listen host
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Drill the stored word list until Ctrl-C
    Run,
    /// Pronounce one word and exit
    Say {
        /// Word to pronounce
        word: String,
    },
    /// Print picks from the stored word list without audio
    Pick {
        #[arg(long, default_value = "10")]
        count: usize,
    },
    /// Show the server's word list, or replace it from a text file or the
    /// remote source
    Words {
        /// One word per line
        #[arg(long)]
        file: Option<PathBuf>,
        /// Reload the list from the remote source without saving it
        #[arg(long, conflicts_with = "file")]
        remote: bool,
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },
    /// Start drilling
    Start {
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },
    /// Stop drilling
    Stop {
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },
    /// Start if stopped, stop if started
    Toggle {
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },
    /// Pick and pronounce one word now
    Next {
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },
    /// Get drill status
    Status {
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vocadrill=info,vocadrill_lib=debug".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve { port, host } => {
            let remote = remote_words_url(&config);
            let store = WordStore::new(&config.words_path);
            let words = store.load_or_fetch(remote.as_deref()).await?;
            let engine = DrillEngine::new(build_resolver(&config)?, words, config.interval());
            let app = server::router(engine, Some(store), remote);

            let addr = format!("{host}:{port}");
            info!("vocadrill listening on {addr}");

            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;
            axum::serve(listener, app).await.context("server error")?;
        }

        Command::Run => {
            let store = WordStore::new(&config.words_path);
            let words = store
                .load_or_fetch(remote_words_url(&config).as_deref())
                .await?;
            anyhow::ensure!(
                !words.is_empty(),
                "no words in {} and no remote list available",
                store.path().display()
            );

            let engine = DrillEngine::new(build_resolver(&config)?, words, config.interval());
            let mut status_rx = engine.subscribe_status();
            engine.start();

            loop {
                tokio::select! {
                    changed = status_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let status = status_rx.borrow_and_update().clone();
                        if status.state == DrillState::Speaking {
                            if let Some(word) = status.current_word {
                                println!("{word}");
                            }
                        }
                    }
                    signal = tokio::signal::ctrl_c() => {
                        signal?;
                        break;
                    }
                }
            }
            engine.stop();
        }

        Command::Say { word } => {
            let via = build_resolver(&config)?.pronounce(&word).await;
            println!("{word}: {}", serde_json::to_string(&via)?);
        }

        Command::Pick { count } => {
            let words = WordStore::new(&config.words_path).load().await?;
            let mut picker = WordPicker::default();
            let mut history = Vec::new();
            for _ in 0..count {
                match picker.next(&words, &mut history) {
                    Some(word) => println!("{word}"),
                    None => break,
                }
            }
        }

        Command::Words {
            remote: true,
            server,
            ..
        } => post_simple(&server, "words/remote").await?,

        Command::Words {
            file: None, server, ..
        } => {
            let body: serde_json::Value = reqwest::get(format!("{server}/words"))
                .await?
                .json()
                .await?;
            let words: Vec<String> = serde_json::from_value(body["words"].clone())?;
            println!("{}", format_word_list(&words));
        }

        Command::Words {
            file: Some(file),
            server,
            ..
        } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;
            let words = parse_word_list(&text);
            let resp = reqwest::Client::new()
                .put(format!("{server}/words"))
                .json(&serde_json::json!({ "words": words }))
                .send()
                .await?;
            println!("{}", resp.text().await.unwrap_or_default());
        }

        Command::Start { server } => post_simple(&server, "start").await?,
        Command::Stop { server } => post_simple(&server, "stop").await?,
        Command::Toggle { server } => post_simple(&server, "toggle").await?,
        Command::Next { server } => post_simple(&server, "next").await?,

        Command::Status { server } => {
            let resp = reqwest::get(format!("{server}/status")).await?;
            println!("{}", resp.text().await.unwrap_or_default());
        }
    }

    Ok(())
}

/// Wire the real collaborators: dictionary, HTTP fetcher, rodio player, and
/// the configured synthesizer.
fn build_resolver(config: &AppConfig) -> anyhow::Result<Arc<AudioResolver>> {
    let dictionary: Arc<dyn Dictionary> = Arc::new(load_dictionary(config.dictionary_path.as_deref())?);
    let player: Arc<dyn Player> = Arc::new(RodioPlayer::new()?);
    let synth = synth::from_config(&config.synthesis, player.clone(), config.resolver.volume);
    let fetcher = Arc::new(HttpAudioFetcher::new(&config.resolver.audio_url_template));

    Ok(Arc::new(AudioResolver::new(
        config.resolver.clone(),
        Arc::new(AudioCache::new()),
        dictionary,
        fetcher,
        player,
        synth,
    )))
}

/// Absolute word-list URL from the configured reference and base. An
/// unusable URL is logged and disables the remote source.
fn remote_words_url(config: &AppConfig) -> Option<String> {
    let reference = config.remote_words_url.as_deref()?;
    resolve_remote_url(&config.remote_base_url, reference)
        .inspect_err(|e| warn!("{e}"))
        .ok()
}

fn load_dictionary(path: Option<&Path>) -> anyhow::Result<WordDictionary> {
    let dictionary = match path {
        Some(path) => WordDictionary::load(path)?,
        None => WordDictionary::bundled(),
    };
    info!("dictionary: {} entries", dictionary.len());
    Ok(dictionary)
}

async fn post_simple(server: &str, endpoint: &str) -> anyhow::Result<()> {
    let resp = reqwest::Client::new()
        .post(format!("{server}/{endpoint}"))
        .send()
        .await
        .with_context(|| format!("request to {server} failed"))?;
    println!("{}", resp.text().await.unwrap_or_default());
    Ok(())
}
