use std::sync::Arc;

use serde_json::Value;

use crate::artifacts::publish::ArtifactPublisher;
use crate::foundation::config::CanvasProOpts;
use crate::foundation::error::CanvasResult;
use crate::foundation::tensor::Tensor;
use crate::layers::assemble::{Layer, LayerInputs, MAX_LAYERS, assemble_layers};
use crate::protocol::decode::{DecodedEdit, decode_edit, placeholder_mask};
use crate::protocol::push::{EventSink, ShowCanvasMessage, request_edit, resolve_window_id};
use crate::session::gate::WaitOutcome;
use crate::session::seed::{SeedSource, SeedToken, ThreadRngSeed};
use crate::session::store::SessionStore;

/// Everything the host hands the node for one run.
#[derive(Clone, Debug)]
pub struct NodeInputs {
    /// Background, foreground and optional layer pairs.
    pub layers: LayerInputs,
    /// "Keep this canvas, skip the dialog next run".
    pub keep_canvas: bool,
    /// Hidden workflow metadata; only used to find the window id.
    pub extra_pnginfo: Value,
}

/// The node's twelve outputs.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeOutputs {
    /// Composite image.
    pub image: Tensor,
    /// Total coverage mask.
    pub mask: Tensor,
    /// Per-layer masks in slot order.
    pub layer_masks: [Tensor; MAX_LAYERS],
}

impl NodeOutputs {
    /// Outputs for a run with no edit (timeout or cancel): the background, a full-coverage mask
    /// and placeholder layer masks.
    pub fn unedited(background: &Tensor, placeholder_size: usize) -> Self {
        let (h, w) = background.spatial().unwrap_or((0, 0));
        Self {
            image: background.clone(),
            mask: Tensor::ones(vec![1, h, w]),
            layer_masks: std::array::from_fn(|_| placeholder_mask(placeholder_size)),
        }
    }

    /// Outputs after a recoverable failure: the background and the first layer's mask.
    pub fn fallback(background: &Tensor, first_mask: &Tensor, placeholder_size: usize) -> Self {
        Self {
            image: background.clone(),
            mask: first_mask.clone(),
            layer_masks: std::array::from_fn(|_| placeholder_mask(placeholder_size)),
        }
    }

    /// All outputs in host order (`image`, `mask`, then the layer masks).
    pub fn slots(&self) -> Vec<&Tensor> {
        std::iter::once(&self.image)
            .chain(std::iter::once(&self.mask))
            .chain(self.layer_masks.iter())
            .collect()
    }
}

impl From<DecodedEdit> for NodeOutputs {
    fn from(d: DecodedEdit) -> Self {
        Self {
            image: d.image,
            mask: d.mask,
            layer_masks: d.layer_masks,
        }
    }
}

/// The canvas node: publishes layers, blocks until the browser answers, returns the edit.
pub struct WebCanvasNode {
    id: String,
    opts: CanvasProOpts,
    store: Arc<SessionStore>,
    events: Arc<dyn EventSink>,
    publisher: ArtifactPublisher,
    seeds: Box<dyn SeedSource>,
}

impl WebCanvasNode {
    /// Node `id` sharing `store` and `events` with the HTTP surface.
    ///
    /// Invalid `opts` are rejected here with [`crate::CanvasError::Configuration`].
    pub fn new(
        id: impl Into<String>,
        opts: CanvasProOpts,
        store: Arc<SessionStore>,
        events: Arc<dyn EventSink>,
    ) -> CanvasResult<Self> {
        let publisher = ArtifactPublisher::new(&opts)?;
        Ok(Self {
            id: id.into(),
            opts,
            store,
            events,
            publisher,
            seeds: Box::new(ThreadRngSeed),
        })
    }

    /// Replace the random source used for seeds and cache keys.
    pub fn with_seed_source(mut self, seeds: Box<dyn SeedSource>) -> Self {
        self.seeds = seeds;
        self
    }

    /// Node id, used as the session owner.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Host cache key: stable when the canvas is kept, fresh otherwise.
    pub fn is_changed(&mut self, keep_canvas: bool) -> SeedToken {
        SeedToken::draw(keep_canvas, self.seeds.as_mut())
    }

    /// Run one edit session.
    ///
    /// Input problems fail before anything is written or sent. Once the browser has been asked,
    /// only shape, configuration and data-integrity errors escape; anything else degrades to
    /// [`NodeOutputs::fallback`]. The session slot is released on every path.
    #[tracing::instrument(skip(self, inputs), fields(node = %self.id))]
    pub fn process(&mut self, inputs: &NodeInputs) -> CanvasResult<NodeOutputs> {
        let window_id = resolve_window_id(&inputs.extra_pnginfo)?;
        let layers = assemble_layers(&inputs.layers, self.opts.placeholder_size)?;
        let seed = SeedToken::draw(inputs.keep_canvas, self.seeds.as_mut());
        let background = &inputs.layers.background;

        let ticket = self.store.begin(self.id.clone());
        let artifacts = self.publisher.publish(background, &layers, seed)?;
        let msg = ShowCanvasMessage::new(&artifacts, seed, background, window_id);
        request_edit(self.events.as_ref(), &msg)?;

        let outcome = ticket.wait(self.opts.wait_timeout());
        ticket.end();

        match self.finish(outcome, background) {
            Ok(out) => Ok(out),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "canvas edit unusable; returning unedited inputs");
                Ok(NodeOutputs::fallback(
                    background,
                    &first_mask(&layers),
                    self.opts.placeholder_size,
                ))
            }
        }
    }

    fn finish(&self, outcome: WaitOutcome, background: &Tensor) -> CanvasResult<NodeOutputs> {
        let p = self.opts.placeholder_size;
        match outcome {
            WaitOutcome::TimedOut => Ok(NodeOutputs::unedited(background, p)),
            WaitOutcome::Delivered(payload) if !payload.confirmed => {
                tracing::info!("canvas edit cancelled");
                Ok(NodeOutputs::unedited(background, p))
            }
            WaitOutcome::Delivered(payload) => {
                let out = NodeOutputs::from(decode_edit(&payload, p)?);
                tracing::info!(shape = ?out.image.shape(), "canvas edit applied");
                Ok(out)
            }
        }
    }
}

fn first_mask(layers: &[Layer]) -> Tensor {
    layers
        .first()
        .map(|l| l.mask.clone())
        .unwrap_or_else(|| Tensor::ones(vec![1, 0, 0]))
}

#[cfg(test)]
#[path = "../../tests/unit/node/process.rs"]
mod tests;
