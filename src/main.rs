//! Quizdeck · Quiz App Backend
//!
//! - Axum HTTP API for the mobile quiz app
//! - Question-format normalization, answer validation, session scoring
//! - Optional Supabase store integration (via environment variables)
//!
//! Important env variables:
//!   PORT          : u16 (default 3000)
//!   SUPABASE_URL      : enables the remote store if present
//!   SUPABASE_ANON_KEY : goes with SUPABASE_URL
//!   QUIZ_CONFIG_PATH  : path to TOML config (settings + optional quiz bank)
//!   LOG_LEVEL    : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT      : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod normalize;
mod shuffle;
mod validate;
mod session;
mod repository;
mod config;
mod seeds;
mod store;
mod state;
mod protocol;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (bank/seed snapshot, optional store).
  let state = Arc::new(AppState::new());

  // With a store configured, try to replace the built-in content with a
  // remote snapshot right away; failure keeps the seed content serving.
  if state.store.is_some() {
    if let Err(e) = state.refresh().await {
      error!(target: "quiz_backend", error = %e, "Startup refresh failed; serving bank/seed content");
    }
  }

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "quiz_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
