use serde::{Deserialize, Deserializer, Serialize};

use crate::foundation::error::{CanvasError, CanvasResult};

/// Body of `POST /canvas_pro/save`, sent by the browser when the user confirms or cancels.
///
/// Image fields are data URIs (`data:image/png;base64,...`). When `confirmed` is false every other
/// field is ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditPayload {
    /// `false` means the user cancelled.
    pub confirmed: bool,
    /// Flattened composite.
    pub image: Option<String>,
    /// Total coverage mask.
    pub mask: Option<String>,
    /// Per-layer masks in layer order; may be shorter than the layer count.
    #[serde(deserialize_with = "null_as_empty")]
    pub layer_masks: Vec<Option<String>>,
}

impl EditPayload {
    /// Payload the browser sends when the dialog is cancelled.
    pub fn cancelled() -> Self {
        Self::default()
    }

    /// Parse a request body. The body must be a JSON object.
    pub fn from_json_bytes(body: &[u8]) -> CanvasResult<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| CanvasError::serde(format!("Invalid JSON: {e}")))?;
        if !value.is_object() {
            return Err(CanvasError::serde("Invalid data format: expected a JSON object"));
        }
        serde_json::from_value(value)
            .map_err(|e| CanvasError::serde(format!("Invalid data format: {e}")))
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<Option<String>>, D::Error> {
    Ok(Option::<Vec<Option<String>>>::deserialize(d)?.unwrap_or_default())
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/payload.rs"]
mod tests;
