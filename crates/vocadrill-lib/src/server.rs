//! HTTP API for the drill engine.
//!
//! CORS-permissive so a browser front end on another port can drive it.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::warn;

use vocadrill_core::types::{DrillStatus, Pronunciation};

use crate::drill::DrillEngine;
use crate::store::{WordStore, fetch_remote_words};

#[derive(Clone)]
struct AppState {
    engine: DrillEngine,
    store: Option<WordStore>,
    remote_words: Option<String>,
}

/// Build the axum router. When a store is given, `PUT /words` also persists
/// the new list. `remote_words` is the absolute URL `POST /words/remote`
/// reloads from; the reloaded list is not persisted.
pub fn router(
    engine: DrillEngine,
    store: Option<WordStore>,
    remote_words: Option<String>,
) -> Router {
    Router::new()
        .route("/start", post(start))
        .route("/stop", post(stop))
        .route("/toggle", post(toggle))
        .route("/next", post(next))
        .route("/pronounce", post(pronounce))
        .route("/status", get(status))
        .route("/words", get(get_words).put(put_words))
        .route("/words/remote", post(reload_remote_words))
        .layer(CorsLayer::permissive())
        .with_state(AppState {
            engine,
            store,
            remote_words,
        })
}

#[derive(serde::Deserialize)]
struct PronounceRequest {
    word: String,
}

#[derive(serde::Serialize)]
struct PronounceResponse {
    ok: bool,
    word: Option<String>,
    via: Option<Pronunciation>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct WordsBody {
    words: Vec<String>,
}

#[derive(serde::Serialize)]
struct OkResponse {
    ok: bool,
}

#[derive(serde::Serialize)]
struct ReloadResponse {
    ok: bool,
    count: usize,
}

async fn start(State(state): State<AppState>) -> Json<OkResponse> {
    state.engine.start();
    Json(OkResponse { ok: true })
}

async fn stop(State(state): State<AppState>) -> Json<OkResponse> {
    state.engine.stop();
    Json(OkResponse { ok: true })
}

async fn toggle(State(state): State<AppState>) -> Json<OkResponse> {
    state.engine.toggle();
    Json(OkResponse { ok: true })
}

async fn next(State(state): State<AppState>) -> Json<PronounceResponse> {
    let picked = state.engine.next().await;
    Json(PronounceResponse {
        ok: picked.is_some(),
        word: picked.as_ref().map(|(w, _)| w.clone()),
        via: picked.map(|(_, via)| via),
    })
}

async fn pronounce(
    State(state): State<AppState>,
    Json(req): Json<PronounceRequest>,
) -> Json<PronounceResponse> {
    let via = state.engine.say(&req.word).await;
    Json(PronounceResponse {
        ok: true,
        word: Some(req.word),
        via: Some(via),
    })
}

async fn status(State(state): State<AppState>) -> Json<DrillStatus> {
    Json(state.engine.status())
}

async fn get_words(State(state): State<AppState>) -> Json<WordsBody> {
    Json(WordsBody {
        words: state.engine.words().await,
    })
}

async fn put_words(
    State(state): State<AppState>,
    Json(body): Json<WordsBody>,
) -> (StatusCode, Json<OkResponse>) {
    if let Some(store) = &state.store {
        if let Err(e) = store.save(&body.words).await {
            warn!("server: {e}");
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(OkResponse { ok: false }));
        }
    }
    state.engine.set_words(body.words);
    (StatusCode::OK, Json(OkResponse { ok: true }))
}

async fn reload_remote_words(State(state): State<AppState>) -> (StatusCode, Json<ReloadResponse>) {
    let failed = |status: StatusCode| (status, Json(ReloadResponse { ok: false, count: 0 }));

    let Some(url) = &state.remote_words else {
        return failed(StatusCode::NOT_FOUND);
    };

    match fetch_remote_words(url).await {
        Ok(words) => {
            let count = words.len();
            state.engine.set_words(words);
            (StatusCode::OK, Json(ReloadResponse { ok: true, count }))
        }
        Err(e) => {
            warn!("server: {e}");
            failed(StatusCode::BAD_GATEWAY)
        }
    }
}
