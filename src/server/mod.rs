//! HTTP surface shared with the browser editor.
//!
//! - `POST /canvas_pro/save`: completion endpoint.
//! - `GET /view`: artifact download.
//! - `GET /ws`: push events.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;

use crate::foundation::config::CanvasProOpts;
use crate::foundation::error::CanvasResult;
use crate::session::store::SessionStore;

mod error;
/// Broadcast-backed event sink.
pub mod events;
mod handlers;

use events::BroadcastEvents;

/// State shared by every handler.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Session slot the completion endpoint delivers into.
    pub store: Arc<SessionStore>,
    /// Push channel feeding `/ws`.
    pub events: BroadcastEvents,
    /// Root that `/view` resolves `subfolder/filename` against.
    pub output_root: PathBuf,
}

impl AppState {
    /// State with a fresh event channel.
    pub fn new(store: Arc<SessionStore>, opts: &CanvasProOpts) -> Self {
        Self {
            store,
            events: BroadcastEvents::default(),
            output_root: opts.output_root.clone(),
        }
    }
}

/// Router with all canvas routes.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/canvas_pro/save", post(handlers::save_canvas))
        .route("/view", get(handlers::view))
        .route("/ws", get(handlers::ws))
        .with_state(state)
}

/// Serve the canvas routes on `listener` until the task is dropped.
pub async fn serve(listener: TcpListener, state: AppState) -> CanvasResult<()> {
    let addr = listener.local_addr().context("read listener address")?;
    tracing::info!(%addr, "canvas endpoints listening");
    axum::serve(listener, router(state))
        .await
        .context("serve canvas endpoints")?;
    Ok(())
}
