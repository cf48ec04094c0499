use std::time::Duration;

use axum::{Router, middleware::from_fn};
use dotenv::dotenv;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::FmtSubscriber;

use crate::{
    config::config::CONFIG, health::handlers::health_routes, mw::request_mw::request_mw,
    server::app_state::AppState, session::handlers::session_routes,
};

mod client;
mod config;
mod health;
mod mw;
mod quiz;
mod scoring;
mod server;
mod session;


/// Sessions idle for longer than this are dropped by the background sweep.
const SESSION_MAX_IDLE_MINUTES: i64 = 30;
const SWEEP_INTERVAL_SECS: u64 = 300;

#[tokio::main]
async fn main() {
    // Initialize .env
    dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(LevelFilter::DEBUG)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set global tracing");

    // Initialize state
    let state = AppState::from_config().unwrap_or_else(|e| panic!("{}", e));

    // Sweep sessions abandoned by their users
    let sweeper_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            let pruned = sweeper_state
                .sessions()
                .prune_idle(chrono::Duration::minutes(SESSION_MAX_IDLE_MINUTES));
            if pruned > 0 {
                info!(
                    "Dropped {} idle sessions, {} still active",
                    pruned,
                    sweeper_state.sessions().len()
                );
            }
        }
    });

    // Initialize routes
    let app = Router::new()
        .nest("/health", health_routes())
        .nest("/session", session_routes(state.clone()))
        .layer(from_fn(request_mw));

    // Initialize webserver
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", CONFIG.server.address, CONFIG.server.port))
            .await
            .unwrap();

    info!(
        "Server listening on address: {}",
        listener.local_addr().unwrap()
    );
    axum::serve(listener, app).await.unwrap();
}
