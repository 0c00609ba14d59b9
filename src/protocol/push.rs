use serde_json::Value;

use crate::artifacts::publish::{LayerMeta, PublishedArtifacts};
use crate::foundation::error::{CanvasError, CanvasResult};
use crate::foundation::tensor::Tensor;
use crate::session::seed::SeedToken;

/// Event name the browser listens for.
pub const SHOW_CANVAS_EVENT: &str = "show_canvas_pro";

/// Node class name as it appears in saved workflows.
pub const NODE_CLASS: &str = "WebCanvasNodePro";

/// Fire-and-forget channel from the node to connected browsers.
pub trait EventSink: Send + Sync {
    /// Publish `data` under `event` to every listener.
    fn send_sync(&self, event: &str, data: Value) -> CanvasResult<()>;
}

/// Payload of the [`SHOW_CANVAS_EVENT`] message.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ShowCanvasMessage {
    /// Background URL.
    pub back_image: String,
    /// First layer URL, kept for older dialogs that only read one foreground.
    pub fore_image: String,
    /// All layers in publish order.
    pub layers: Vec<LayerMeta>,
    /// File-name seed of this run.
    pub seed: SeedToken,
    /// Background width.
    pub canvas_width: usize,
    /// Background height.
    pub canvas_height: usize,
    /// Routes the message to the browser window that owns the node.
    pub window_id: Value,
}

impl ShowCanvasMessage {
    /// Message for freshly published artifacts; geometry comes from the background.
    pub fn new(
        artifacts: &PublishedArtifacts,
        seed: SeedToken,
        background: &Tensor,
        window_id: Value,
    ) -> Self {
        let (canvas_height, canvas_width) = background.spatial().unwrap_or((0, 0));
        Self {
            back_image: artifacts.back_url.clone(),
            fore_image: artifacts.fore_url().to_string(),
            layers: artifacts.layers.clone(),
            seed,
            canvas_width,
            canvas_height,
            window_id,
        }
    }
}

/// Tell the browser a session is ready.
pub fn request_edit(sink: &dyn EventSink, msg: &ShowCanvasMessage) -> CanvasResult<()> {
    let data = serde_json::to_value(msg)?;
    sink.send_sync(SHOW_CANVAS_EVENT, data)?;
    tracing::info!(
        seed = %msg.seed,
        layers = msg.layers.len(),
        window_id = %msg.window_id,
        "requested canvas edit"
    );
    Ok(())
}

/// Window id stored by the browser in the node's second widget value.
///
/// Looks through `extra_pnginfo.workflow.nodes` for the first node of type [`NODE_CLASS`] and
/// returns its `widgets_values[1]`.
pub fn resolve_window_id(extra_pnginfo: &Value) -> CanvasResult<Value> {
    let nodes = extra_pnginfo
        .pointer("/workflow/nodes")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            CanvasError::configuration(format!(
                "workflow metadata has no node list; cannot locate the {NODE_CLASS} window id \
                 (run the graph from the editor so workflow info is attached)"
            ))
        })?;

    nodes
        .iter()
        .find(|n| n.get("type").and_then(Value::as_str) == Some(NODE_CLASS))
        .and_then(|n| n.get("widgets_values"))
        .and_then(|w| w.get(1))
        .filter(|id| !id.is_null())
        .cloned()
        .ok_or_else(|| {
            CanvasError::configuration(format!(
                "no {NODE_CLASS} node with a window id in the workflow; re-add the node so the \
                 editor can assign one"
            ))
        })
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/push.rs"]
mod tests;
