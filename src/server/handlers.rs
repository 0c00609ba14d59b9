use axum::{
    Json,
    body::Bytes,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::header::CONTENT_TYPE,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::AppState;
use super::error::ApiError;
use crate::foundation::config::is_plain_component;
use crate::protocol::payload::EditPayload;

#[derive(Debug, PartialEq, Serialize)]
pub(super) struct SaveResponse {
    status: &'static str,
}

/// `POST /canvas_pro/save`: hand the browser's result to the waiting run.
pub(super) async fn save_canvas(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SaveResponse>, ApiError> {
    if !state.store.is_active() {
        return Err(ApiError::BadRequest("No active canvas instance".into()));
    }
    let payload = EditPayload::from_json_bytes(&body).inspect_err(|e| {
        tracing::warn!(error = %e, "rejected canvas save body");
    })?;
    state.store.deliver(payload)?;
    Ok(Json(SaveResponse { status: "success" }))
}

#[derive(Debug, Deserialize)]
pub(super) struct ViewQuery {
    filename: String,
    #[serde(default)]
    subfolder: String,
}

/// `GET /view`: serve a published artifact to the browser.
pub(super) async fn view(
    State(state): State<AppState>,
    Query(q): Query<ViewQuery>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_plain_component(&q.filename)
        || !(q.subfolder.is_empty() || is_plain_component(&q.subfolder))
    {
        return Err(ApiError::BadRequest("Invalid file path".into()));
    }
    let path = state.output_root.join(&q.subfolder).join(&q.filename);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| ApiError::NotFound(format!("{} not found", q.filename)))?;
    let mime = if q.filename.ends_with(".png") {
        "image/png"
    } else {
        "application/octet-stream"
    };
    Ok(([(CONTENT_TYPE, mime)], bytes))
}

/// `GET /ws`: push channel to the browser.
pub(super) async fn ws(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| forward_events(socket, state.events.subscribe()))
}

async fn forward_events(mut socket: WebSocket, mut events: broadcast::Receiver<String>) {
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(text) => {
                    if socket.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "browser fell behind on canvas events");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            msg = socket.recv() => match msg {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                Some(Ok(_)) => continue,
            },
        }
    }
    tracing::debug!("event socket closed");
}

#[cfg(test)]
#[path = "../../tests/unit/server/handlers.rs"]
mod tests;
