//! Axum route handlers for the announcer RPC API.

use axum::extract::State;
use axum::response::Json;
use std::sync::Arc;
use std::time::Instant;

use crate::poller::PollerHandle;

pub struct AppState {
    /// None when no API token is configured and the poller never started.
    pub handle: Option<PollerHandle>,
    pub start_time: Instant,
    pub poll_interval_secs: u64,
}

// GET /rpc/status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let (poller_state, last_tick_at) = match &state.handle {
        Some(handle) => (
            handle.state().await.as_str().to_string(),
            handle.last_tick_at().await,
        ),
        None => ("disabled".to_string(), None),
    };

    Json(serde_json::json!({
        "service": "reminder-announcer",
        "state": poller_state,
        "last_tick_at": last_tick_at,
        "poll_interval_secs": state.poll_interval_secs,
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}
