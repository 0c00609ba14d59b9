use crate::foundation::error::{CanvasError, CanvasResult};
use crate::foundation::tensor::Tensor;

/// Maximum number of foreground layers (the mandatory one plus nine optional slots).
pub const MAX_LAYERS: usize = 10;

/// One optional `(image, mask)` input pair.
#[derive(Clone, Debug)]
pub struct LayerInput {
    /// `(B, H, W, C)` image.
    pub image: Tensor,
    /// `(B, H, W)` mask; `None` means fully opaque.
    pub mask: Option<Tensor>,
}

/// Raw node inputs feeding the layer assembler.
#[derive(Clone, Debug)]
pub struct LayerInputs {
    /// `(B, H, W, 3)` background.
    pub background: Tensor,
    /// Mandatory first foreground image.
    pub foreground: Tensor,
    /// Optional mask for the first foreground.
    pub foreground_mask: Option<Tensor>,
    /// Slots for layers 2 through 10; `extras[0]` is layer 2.
    pub extras: [Option<LayerInput>; MAX_LAYERS - 1],
}

impl LayerInputs {
    /// Inputs with only the two mandatory images.
    pub fn new(background: Tensor, foreground: Tensor) -> Self {
        Self {
            background,
            foreground,
            foreground_mask: None,
            extras: Default::default(),
        }
    }

    /// Set the first foreground's mask.
    pub fn with_foreground_mask(mut self, mask: Tensor) -> Self {
        self.foreground_mask = Some(mask);
        self
    }

    /// Fill the slot for 1-based layer `ordinal` (2..=10).
    pub fn with_extra(
        mut self,
        ordinal: usize,
        image: Tensor,
        mask: Option<Tensor>,
    ) -> CanvasResult<Self> {
        let slot = ordinal
            .checked_sub(2)
            .filter(|s| *s < self.extras.len())
            .ok_or_else(|| {
                CanvasError::configuration(format!(
                    "extra layer ordinal must be within 2..={MAX_LAYERS}, got {ordinal}"
                ))
            })?;
        self.extras[slot] = Some(LayerInput { image, mask });
        Ok(self)
    }
}

/// One normalized layer handed to the publisher.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    /// `(B, H, W, C)` image.
    pub image: Tensor,
    /// `(B, H, W)` mask, synthesized as all ones when none was given.
    pub mask: Tensor,
    /// Stable zero-based position: `0` for the first layer, `ordinal - 1` for extras.
    pub index: usize,
    /// 1-based display name, e.g. `Layer 3`.
    pub name: String,
    /// Mean of the mask, `1.0` when the mask was synthesized.
    pub opacity: f32,
}

/// Validate the node inputs and turn them into an ordered layer list.
///
/// `placeholder_size` is the side of the host's empty-mask placeholder. An extra layer mask with
/// exactly that spatial size means the mask socket is wired but was never painted, which is
/// reported as [`CanvasError::Configuration`] rather than accepted as a real mask.
pub fn assemble_layers(inputs: &LayerInputs, placeholder_size: usize) -> CanvasResult<Vec<Layer>> {
    let bg = &inputs.background;
    if bg.ndim() != 4 || bg.shape()[3] != 3 {
        return Err(CanvasError::shape(format!(
            "expected back_image shape (B,H,W,3), got {:?}",
            bg.shape()
        )));
    }
    if bg.shape()[0] == 0 {
        return Err(CanvasError::shape("back_image batch is empty"));
    }

    let mut layers = Vec::with_capacity(MAX_LAYERS);

    check_image("fore_image", &inputs.foreground)?;
    let (mask, opacity) = match &inputs.foreground_mask {
        None => (ones_mask_for(&inputs.foreground), 1.0),
        Some(mask) => {
            check_mask_rank("fore_mask", mask)?;
            (mask.clone(), mask.mean())
        }
    };
    check_mask_fits("fore_mask", &inputs.foreground, &mask)?;
    layers.push(Layer {
        image: inputs.foreground.clone(),
        mask,
        index: 0,
        name: "Layer 1".to_string(),
        opacity,
    });

    for (slot, input) in inputs.extras.iter().enumerate() {
        let Some(input) = input else {
            continue;
        };
        let ordinal = slot + 2;
        check_image(&format!("fore_image{ordinal}"), &input.image)?;

        let mask_name = format!("fore_mask{ordinal}");
        let (mask, opacity) = match &input.mask {
            None => (ones_mask_for(&input.image), 1.0),
            Some(mask) => {
                check_mask_rank(&mask_name, mask)?;
                if mask.spatial() == Some((placeholder_size, placeholder_size)) {
                    return Err(CanvasError::configuration(format!(
                        "{mask_name} is {placeholder_size}x{placeholder_size}: the MASK slot is \
                         connected but the mask was never painted; paint it or disconnect the slot"
                    )));
                }
                (mask.clone(), mask.mean())
            }
        };
        check_mask_fits(&mask_name, &input.image, &mask)?;

        layers.push(Layer {
            image: input.image.clone(),
            mask,
            index: ordinal - 1,
            name: format!("Layer {ordinal}"),
            opacity,
        });
    }

    tracing::debug!(layers = layers.len(), "assembled canvas layers");
    Ok(layers)
}

fn ones_mask_for(image: &Tensor) -> Tensor {
    let (h, w) = image.spatial().unwrap_or((0, 0));
    Tensor::ones(vec![1, h, w])
}

fn check_image(name: &str, image: &Tensor) -> CanvasResult<()> {
    let ok = image.ndim() == 4 && image.shape()[0] > 0 && matches!(image.shape()[3], 3 | 4);
    if !ok {
        return Err(CanvasError::shape(format!(
            "expected {name} shape (B,H,W,3|4), got {:?}",
            image.shape()
        )));
    }
    Ok(())
}

fn check_mask_rank(name: &str, mask: &Tensor) -> CanvasResult<()> {
    if mask.ndim() != 3 || mask.shape()[0] == 0 {
        return Err(CanvasError::shape(format!(
            "expected {name} shape (B,H,W), got {:?}",
            mask.shape()
        )));
    }
    Ok(())
}

fn check_mask_fits(name: &str, image: &Tensor, mask: &Tensor) -> CanvasResult<()> {
    if image.spatial() != mask.spatial() {
        return Err(CanvasError::shape(format!(
            "{name} {:?} does not match its image {:?}",
            mask.shape(),
            image.shape()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/layers/assemble.rs"]
mod tests;
