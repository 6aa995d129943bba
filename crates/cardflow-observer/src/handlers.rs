//! REST API endpoint handlers for the Observer server.
//!
//! Session endpoints are keyed by client identity: `GET
//! /api/sessions/{id}` lazily creates the session on first contact,
//! mirroring how a viewer connection claims its session. Control
//! endpoints require the session to already exist.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/sessions` | List live session ids |
//! | `GET` | `/api/sessions/{id}` | Session status (creates on first contact) |
//! | `DELETE` | `/api/sessions/{id}` | Disconnect and remove the session |
//! | `POST` | `/api/sessions/{id}/start` | Start a run |
//! | `POST` | `/api/sessions/{id}/stop` | Cancel the run |
//! | `POST` | `/api/sessions/{id}/pause` | Pause the run |
//! | `POST` | `/api/sessions/{id}/resume` | Resume the run |
//! | `POST` | `/api/sessions/{id}/speed` | Set the step interval |
//! | `POST` | `/api/sessions/{id}/config` | Update session config |
//! | `GET` | `/api/sessions/{id}/history` | Page the snapshot log |
//! | `GET` | `/api/sessions/{id}/history/{n}` | One history entry |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use cardflow_core::session::SessionController;
use cardflow_types::{SessionId, ViewMode};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/sessions/{id}/speed`.
#[derive(Debug, serde::Deserialize)]
pub struct SetSpeedRequest {
    /// New delay between transitions in milliseconds (0 = none).
    pub step_interval_ms: u64,
}

/// Request body for `POST /api/sessions/{id}/config`.
#[derive(Debug, serde::Deserialize)]
pub struct UpdateConfigRequest {
    /// New participant count (rejected while a run is active).
    pub participant_count: Option<u8>,
    /// New presentation mode (applies immediately).
    pub view_mode: Option<ViewMode>,
}

/// Query parameters for `GET /api/sessions/{id}/history`.
#[derive(Debug, serde::Deserialize)]
pub struct HistoryQuery {
    /// Entries to skip from the newest end.
    pub offset: Option<usize>,
    /// Maximum entries to return (default 100).
    pub limit: Option<usize>,
}

/// Generic success response for control commands.
#[derive(Debug, serde::Serialize)]
struct CommandResponse {
    /// Whether the command was accepted.
    ok: bool,
    /// Human-readable message.
    message: String,
}

fn parse_session_id(raw: &str) -> Result<SessionId, ApiError> {
    Uuid::parse_str(raw)
        .map(SessionId::from)
        .map_err(|_| ApiError::InvalidUuid(raw.to_owned()))
}

/// Resolve an existing session or fail with 404. Control commands use
/// this so a typo'd id does not silently spawn a session.
async fn existing_session(
    state: &AppState,
    raw: &str,
) -> Result<Arc<SessionController>, ApiError> {
    let id = parse_session_id(raw)?;
    state
        .registry
        .get(id)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("no session {id}")))
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing server status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let session_count = state.registry.len().await;

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Cardflow Observer</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .status {{ color: #3fb950; font-weight: bold; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Cardflow Observer</h1>
    <p class="subtitle">Session scheduler and viewer API</p>

    <p>Status: <span class="status">RUNNING</span></p>

    <div>
        <div class="metric">
            <div class="label">Sessions</div>
            <div class="value">{session_count}</div>
        </div>
    </div>

    <hr>
    <ul>
        <li>GET /api/sessions</li>
        <li>GET /api/sessions/{{id}}</li>
        <li>GET /api/sessions/{{id}}/history</li>
        <li>GET /ws/sessions/{{id}}</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// Session status
// ---------------------------------------------------------------------------

/// `GET /api/sessions` -- status of every live session.
pub async fn list_sessions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut sessions = Vec::new();
    for id in state.registry.ids().await {
        if let Some(controller) = state.registry.get(id).await {
            sessions.push(controller.status().await);
        }
    }
    Json(serde_json::json!({ "sessions": sessions }))
}

/// `GET /api/sessions/{id}` -- session status, creating the session on
/// first contact.
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_session_id(&raw)?;
    let controller = state.registry.get_or_create(id).await;
    Ok(Json(controller.status().await))
}

/// `DELETE /api/sessions/{id}` -- tear the session down and forget it.
pub async fn disconnect(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_session_id(&raw)?;
    if !state.registry.remove(id).await {
        return Err(ApiError::NotFound(format!("no session {id}")));
    }
    state.hub.remove(id).await;
    Ok(Json(CommandResponse {
        ok: true,
        message: format!("session {id} removed"),
    }))
}

// ---------------------------------------------------------------------------
// Control commands
// ---------------------------------------------------------------------------

/// `POST /api/sessions/{id}/start` -- start a new run.
pub async fn start(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let controller = existing_session(&state, &raw).await?;
    controller.start().await?;
    Ok(Json(CommandResponse {
        ok: true,
        message: "run started".to_owned(),
    }))
}

/// `POST /api/sessions/{id}/stop` -- request cancellation of the run.
pub async fn stop(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let controller = existing_session(&state, &raw).await?;
    controller.stop();
    Ok(Json(CommandResponse {
        ok: true,
        message: "stop requested".to_owned(),
    }))
}

/// `POST /api/sessions/{id}/pause` -- pause the run.
pub async fn pause(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let controller = existing_session(&state, &raw).await?;
    controller.pause();
    Ok(Json(CommandResponse {
        ok: true,
        message: "session paused".to_owned(),
    }))
}

/// `POST /api/sessions/{id}/resume` -- resume a paused run.
pub async fn resume(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let controller = existing_session(&state, &raw).await?;
    controller.resume();
    Ok(Json(CommandResponse {
        ok: true,
        message: "session resumed".to_owned(),
    }))
}

/// `POST /api/sessions/{id}/speed` -- change the step interval.
///
/// The new interval takes effect at the worker's next wait; a pending
/// wait is re-evaluated immediately.
pub async fn set_speed(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
    Json(body): Json<SetSpeedRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let controller = existing_session(&state, &raw).await?;
    controller.set_step_interval(body.step_interval_ms).await;
    Ok(Json(serde_json::json!({
        "ok": true,
        "message": format!("step interval set to {}ms", body.step_interval_ms),
        "step_interval_ms": body.step_interval_ms,
    })))
}

/// `POST /api/sessions/{id}/config` -- update session configuration.
pub async fn update_config(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
    Json(body): Json<UpdateConfigRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let controller = existing_session(&state, &raw).await?;
    controller
        .update_config(body.participant_count, body.view_mode)
        .await?;
    Ok(Json(controller.status().await))
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

const DEFAULT_HISTORY_LIMIT: usize = 100;

/// `GET /api/sessions/{id}/history` -- page the snapshot log, newest
/// first.
pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(raw): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let controller = existing_session(&state, &raw).await?;
    let history = controller.history();
    let offset = query.offset.unwrap_or(0);
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let page = history.page(offset, limit).await;
    let entries: Vec<serde_json::Value> = page
        .iter()
        .map(|snapshot| serde_json::to_value(&**snapshot))
        .collect::<Result<_, _>>()?;
    Ok(Json(serde_json::json!({
        "total": history.len().await,
        "offset": offset,
        "entries": entries,
    })))
}

/// `GET /api/sessions/{id}/history/{n}` -- one history entry, where 0
/// is the most recent snapshot.
pub async fn history_entry(
    State(state): State<Arc<AppState>>,
    Path((raw, index)): Path<(String, usize)>,
) -> Result<impl IntoResponse, ApiError> {
    let controller = existing_session(&state, &raw).await?;
    let snapshot = controller
        .history()
        .get(index)
        .await
        .ok_or_else(|| ApiError::NotFound(format!("no history entry {index}")))?;
    Ok(Json(serde_json::to_value(&*snapshot)?))
}
