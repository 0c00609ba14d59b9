/// Convenience result type used across the canvas node.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Top-level error taxonomy used by the node, the session store and the HTTP surface.
#[derive(thiserror::Error, Debug)]
pub enum CanvasError {
    /// Malformed input tensor dimensions.
    #[error("shape error: {0}")]
    Shape(String),

    /// Host wiring problem the user has to fix (missing window id, mask slot wired but empty).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A completion arrived while no edit session was active.
    #[error("no active canvas session")]
    NoActiveSession,

    /// A confirmed completion payload is missing required data.
    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    /// Embedded image data could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Errors when serializing or deserializing wire data.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CanvasError {
    /// Build a [`CanvasError::Shape`] value.
    pub fn shape(msg: impl Into<String>) -> Self {
        Self::Shape(msg.into())
    }

    /// Build a [`CanvasError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`CanvasError::DataIntegrity`] value.
    pub fn data_integrity(msg: impl Into<String>) -> Self {
        Self::DataIntegrity(msg.into())
    }

    /// Build a [`CanvasError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`CanvasError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether this error must abort the node run instead of degrading to fallback outputs.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Shape(_) | Self::Configuration(_) | Self::DataIntegrity(_)
        )
    }
}

impl From<serde_json::Error> for CanvasError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
