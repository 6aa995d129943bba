//! Axum router construction for the Observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the Observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/sessions/{id}` -- `WebSocket` snapshot stream
/// - `GET /api/sessions` -- list session ids
/// - `GET`/`DELETE /api/sessions/{id}` -- status / teardown
/// - `POST /api/sessions/{id}/{start,stop,pause,resume,speed,config}`
/// - `GET /api/sessions/{id}/history[/{n}]` -- snapshot log
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/sessions/{id}", get(ws::ws_session))
        // REST API
        .route("/api/sessions", get(handlers::list_sessions))
        .route("/api/sessions/{id}", get(handlers::get_session))
        .route("/api/sessions/{id}", delete(handlers::disconnect))
        .route("/api/sessions/{id}/start", post(handlers::start))
        .route("/api/sessions/{id}/stop", post(handlers::stop))
        .route("/api/sessions/{id}/pause", post(handlers::pause))
        .route("/api/sessions/{id}/resume", post(handlers::resume))
        .route("/api/sessions/{id}/speed", post(handlers::set_speed))
        .route("/api/sessions/{id}/config", post(handlers::update_config))
        .route("/api/sessions/{id}/history", get(handlers::history))
        .route(
            "/api/sessions/{id}/history/{n}",
            get(handlers::history_entry),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
