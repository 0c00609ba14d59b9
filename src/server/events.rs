use serde_json::{Value, json};
use tokio::sync::broadcast;

use crate::foundation::error::CanvasResult;
use crate::protocol::push::EventSink;

/// [`EventSink`] fanning events out to every connected `/ws` client.
///
/// Events are wrapped as `{"type": <event>, "data": <payload>}`. Sending with no browser connected
/// is not an error; the waiting run simply times out.
#[derive(Clone, Debug)]
pub struct BroadcastEvents {
    tx: broadcast::Sender<String>,
}

impl BroadcastEvents {
    /// Channel buffering up to `capacity` undelivered events per client.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// New receiver for one client.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastEvents {
    fn default() -> Self {
        Self::new(16)
    }
}

impl EventSink for BroadcastEvents {
    fn send_sync(&self, event: &str, data: Value) -> CanvasResult<()> {
        let text = serde_json::to_string(&json!({ "type": event, "data": data }))?;
        match self.tx.send(text) {
            Ok(receivers) => tracing::debug!(event, receivers, "event sent"),
            Err(_) => tracing::warn!(event, "no browser connected; event dropped"),
        }
        Ok(())
    }
}
