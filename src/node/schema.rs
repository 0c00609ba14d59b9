use serde::Serialize;
use serde_json::{Value, json};

use crate::layers::assemble::MAX_LAYERS;
use crate::protocol::push::NODE_CLASS;

/// Name of the boolean "keep this canvas, skip the dialog next run" input.
pub const KEEP_CANVAS_INPUT: &str = "keep_canvas";

/// Output names in host order.
pub const RETURN_NAMES: [&str; MAX_LAYERS + 2] = [
    "image",
    "mask",
    "fore_image",
    "fore_2_mask",
    "fore_3_mask",
    "fore_4_mask",
    "fore_5_mask",
    "fore_6_mask",
    "fore_7_mask",
    "fore_8_mask",
    "fore_9_mask",
    "fore_10_mask",
];

/// One declared input or output socket.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Socket {
    /// Socket name.
    pub name: String,
    /// Host type tag (`IMAGE`, `MASK`, `BOOLEAN`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Widget default, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl Socket {
    fn new(name: impl Into<String>, kind: &str) -> Self {
        Self {
            name: name.into(),
            kind: kind.to_string(),
            default: None,
        }
    }
}

/// Node registration data for the host graph engine.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeSchema {
    /// Class name.
    pub name: String,
    /// Menu category.
    pub category: String,
    /// Entry point name.
    pub function: String,
    /// Mandatory inputs.
    pub required: Vec<Socket>,
    /// Optional inputs.
    pub optional: Vec<Socket>,
    /// Inputs filled in by the host.
    pub hidden: Vec<Socket>,
    /// Outputs in host order.
    pub outputs: Vec<Socket>,
}

/// Declared interface of the canvas node.
pub fn node_schema() -> NodeSchema {
    let required = vec![
        Socket::new("back_image", "IMAGE"),
        Socket::new("fore_image", "IMAGE"),
        Socket {
            default: Some(json!(false)),
            ..Socket::new(KEEP_CANVAS_INPUT, "BOOLEAN")
        },
    ];

    let mut optional = vec![Socket::new("fore_mask", "MASK")];
    for n in 2..=MAX_LAYERS {
        optional.push(Socket::new(format!("fore_image{n}"), "IMAGE"));
        optional.push(Socket::new(format!("fore_mask{n}"), "MASK"));
    }

    let hidden = vec![
        Socket::new("prompt", "PROMPT"),
        Socket::new("extra_pnginfo", "EXTRA_PNGINFO"),
    ];

    let outputs = RETURN_NAMES
        .iter()
        .enumerate()
        .map(|(i, name)| Socket::new(*name, if i == 0 { "IMAGE" } else { "MASK" }))
        .collect();

    NodeSchema {
        name: NODE_CLASS.to_string(),
        category: "image/process".to_string(),
        function: "process".to_string(),
        required,
        optional,
        hidden,
        outputs,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/node/schema.rs"]
mod tests;
