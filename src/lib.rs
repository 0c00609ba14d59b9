//! Web Canvas Pro is an interactive layer/mask canvas node for graph-based image pipelines.
//!
//! A run of the node pauses the graph, hands a background and up to ten foreground layers to a
//! browser editor, and resumes with the edited composite plus per-layer masks.
//!
//! # Session overview
//!
//! 1. **Assemble**: node inputs -> ordered [`Layer`] list with derived opacity
//! 2. **Publish**: layers -> PNG artifacts in the scratch directory ([`ArtifactPublisher`])
//! 3. **Request**: `show_canvas_pro` push with URLs, geometry and window id ([`request_edit`])
//! 4. **Wait**: the node thread blocks on its [`SessionTicket`] (bounded by a timeout)
//! 5. **Complete**: the browser posts to `/canvas_pro/save`, which delivers into the
//!    [`SessionStore`] and wakes the node
//! 6. **Decode**: data URIs -> output tensors ([`decode_edit`])
//!
//! Exactly one session is active at a time. A newer run replaces the active session without
//! queueing.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod artifacts;
mod foundation;
mod layers;
mod node;
mod protocol;
mod session;

/// HTTP surface: completion endpoint, artifact download and push socket.
pub mod server;

pub use artifacts::publish::{ArtifactPublisher, LayerMeta, PublishedArtifacts};
pub use foundation::config::{
    CanvasProOpts, DEFAULT_PLACEHOLDER_SIZE, DEFAULT_SUBFOLDER, DEFAULT_WAIT_TIMEOUT_SECS,
};
pub use foundation::error::{CanvasError, CanvasResult};
pub use foundation::tensor::{Tensor, unit_to_u8};
pub use layers::assemble::{Layer, LayerInput, LayerInputs, MAX_LAYERS, assemble_layers};
pub use node::process::{NodeInputs, NodeOutputs, WebCanvasNode};
pub use node::schema::{KEEP_CANVAS_INPUT, NodeSchema, RETURN_NAMES, Socket, node_schema};
pub use protocol::decode::{
    DecodedEdit, decode_data_uri, decode_edit, decode_mask, decode_rgb, placeholder_mask,
    png_data_uri,
};
pub use protocol::payload::EditPayload;
pub use protocol::push::{
    EventSink, NODE_CLASS, SHOW_CANVAS_EVENT, ShowCanvasMessage, request_edit, resolve_window_id,
};
pub use server::events::BroadcastEvents;
pub use session::gate::{SessionTicket, WaitOutcome};
pub use session::seed::{FixedSeed, SeedSource, SeedToken, ThreadRngSeed};
pub use session::store::SessionStore;
