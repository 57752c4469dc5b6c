// HTTP API routes: the command endpoint a chat transport forwards to, plus
// leaderboard, health, and metrics.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::command::Command;
use crate::db::StoreError;
use crate::game::{Game, PlayerRef};
use crate::metrics;
use crate::render::render;
use crate::reply::Reply;

// ── Request types ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub player_id: i64,
    pub display_name: Option<String>,
    pub command: String,
    pub payload: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub reply: Reply,
    pub text: String,
}

// ── Per-player serialization ─────────────────────────────────────────

/// Hands out one async lock per player so that commands for the same
/// player run one at a time while different players proceed in parallel.
#[derive(Debug, Clone, Default)]
pub struct PlayerLocks {
    inner: Arc<Mutex<HashMap<i64, Arc<tokio::sync::Mutex<()>>>>>,
}

impl PlayerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the player's lock, creating it if needed. Idle locks of other
    /// players are pruned on the way.
    pub fn lock_for(&self, player_id: i64) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.retain(|id, lock| *id == player_id || Arc::strong_count(lock) > 1);
        map.entry(player_id).or_default().clone()
    }

    /// Drop the player's lock once nobody else holds or waits on it.
    /// Call after releasing the handle returned by [`PlayerLocks::lock_for`].
    pub fn release(&self, player_id: i64) {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if map
            .get(&player_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            map.remove(&player_id);
        }
    }

    /// Number of players with a lock entry.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ── Shared application state ─────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub game: Arc<Game>,
    pub locks: PlayerLocks,
}

// ── Error helper ──────────────────────────────────────────────────────

fn json_error(status: StatusCode, msg: &str) -> impl IntoResponse {
    (status, Json(json!({ "error": msg })))
}

fn internal_error(e: StoreError) -> impl IntoResponse {
    tracing::error!("Store error: {e}");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

// ── Router ────────────────────────────────────────────────────────────

pub fn router(game: Arc<Game>) -> Router {
    let state = AppState {
        game,
        locks: PlayerLocks::new(),
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        .route("/api/command", post(run_command))
        .route("/api/leaderboard", get(get_leaderboard))
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "pokebot" }))
}

async fn get_metrics() -> impl IntoResponse {
    metrics::gather_metrics()
}

fn payload_text(payload: &Value) -> String {
    match payload {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

async fn run_command(
    State(state): State<AppState>,
    Json(req): Json<CommandRequest>,
) -> impl IntoResponse {
    let payload = req.payload.as_ref().map(payload_text);
    let command = match Command::parse(&req.command, payload.as_deref()) {
        Ok(c) => c,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, &e.to_string()).into_response(),
    };

    // A missing name stays empty; the core keeps the stored one.
    let display_name = req.display_name.unwrap_or_default();
    let player = PlayerRef::new(req.player_id, display_name.trim());

    let lock = state.locks.lock_for(player.id);
    let result = {
        let _guard = lock.lock().await;
        state.game.dispatch(&player, command).await
    };
    drop(lock);
    state.locks.release(player.id);

    match result {
        Ok(reply) => {
            let text = render(&reply);
            (StatusCode::OK, Json(CommandResponse { reply, text })).into_response()
        }
        Err(e) => internal_error(e).into_response(),
    }
}

async fn get_leaderboard(State(state): State<AppState>) -> impl IntoResponse {
    match state.game.leaderboard().await {
        Ok(Reply::LeaderboardRows { rows }) => (StatusCode::OK, Json(json!(rows))).into_response(),
        Ok(_) => (StatusCode::OK, Json(json!([]))).into_response(),
        Err(crate::game::GameError::Store(e)) => internal_error(e).into_response(),
        Err(e) => json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()).into_response(),
    }
}
