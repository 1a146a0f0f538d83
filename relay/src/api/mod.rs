//! HTTP surface (`spec.md` §4.1, §6, C9). Grounded on the teacher's
//! `admin_server.rs`: a small `axum::Router` over a shared state handle, with
//! permissive CORS for the front-end origin.

pub mod errors;
pub mod handlers;
pub mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::engine::Engine;

pub use handlers::AppState;

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/request-wallet", post(handlers::request_wallet))
        .route("/api/status", get(handlers::status))
        .route("/api/claim-wallet", get(handlers::claim_wallet))
        .route("/health", get(handlers::health))
        .layer(cors)
        .with_state(state)
}

/// Binds and serves the HTTP API on `port`, mirroring the teacher's
/// `start_api` in that it never returns while the listener is healthy.
pub async fn start_api(engine: Arc<Engine>, port: u16) -> std::io::Result<()> {
    let app = router(engine);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "relay API listening");
    axum::serve(listener, app).await
}
