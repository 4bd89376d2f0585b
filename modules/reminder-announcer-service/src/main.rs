//! Reminder Announcer Service — standalone binary that polls the Saathi API
//! for due medicine and memory reminders and speaks them.
//!
//! Hosts a small RPC status endpoint on its own port.
//! Default: http://127.0.0.1:9103/

mod announce;
mod api;
mod matcher;
mod poller;
mod routes;
mod speech;

use api::ApiClient;
use routes::AppState;
use speech::Speaker;
use std::sync::Arc;
use std::time::Instant;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    let port: u16 = std::env::var("ANNOUNCER_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(9103);

    let api_url =
        std::env::var("SAATHI_API_URL").unwrap_or_else(|_| "http://127.0.0.1:5000".to_string());

    let poll_interval_secs: u64 = std::env::var("ANNOUNCER_POLL_INTERVAL")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(poller::DEFAULT_POLL_INTERVAL_SECS);

    let voice_id = std::env::var("MURF_VOICE_ID").ok();
    let player_cmd =
        std::env::var("ANNOUNCER_AUDIO_PLAYER").unwrap_or_else(|_| "mpg123 -q".to_string());
    let synth_cmd = std::env::var("ANNOUNCER_SYNTH").unwrap_or_else(|_| "espeak-ng".to_string());

    // The poller fetches the owner's reminders with this bearer token.
    let handle = match std::env::var("SAATHI_API_TOKEN") {
        Ok(token) if !token.is_empty() => {
            let api = ApiClient::new(&api_url, &token);
            let speaker = Arc::new(Speaker::with_default_chain(
                api.clone(),
                &player_cmd,
                &synth_cmd,
            ));
            let handle = poller::spawn_poller(Arc::new(api), speaker, voice_id, poll_interval_secs);
            log::info!(
                "Reminder poller started against {} (poll interval: {}s)",
                api_url,
                poll_interval_secs
            );
            Some(handle)
        }
        _ => {
            log::warn!("SAATHI_API_TOKEN not set — reminder poller disabled");
            None
        }
    };

    let state = Arc::new(AppState {
        handle,
        start_time: Instant::now(),
        poll_interval_secs,
    });

    let cors = tower_http::cors::CorsLayer::permissive();

    let app = axum::Router::new()
        .route("/rpc/status", axum::routing::get(routes::status))
        .with_state(state)
        .layer(cors);

    let addr = format!("127.0.0.1:{}", port);
    log::info!("Reminder Announcer Service listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");

    axum::serve(listener, app).await.expect("Server error");
}
