use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::foundation::error::{CanvasError, CanvasResult};
use crate::foundation::tensor::Tensor;
use crate::layers::assemble::MAX_LAYERS;
use crate::protocol::payload::EditPayload;

/// Tensors recovered from a confirmed edit.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodedEdit {
    /// `(1, H, W, 3)` composite.
    pub image: Tensor,
    /// `(1, H, W)` total mask.
    pub mask: Tensor,
    /// One mask per layer slot; absent entries are placeholders.
    pub layer_masks: [Tensor; MAX_LAYERS],
}

/// All-zero `(1, size, size)` mask standing in for a layer the browser did not return.
pub fn placeholder_mask(size: usize) -> Tensor {
    Tensor::zeros(vec![1, size, size])
}

/// Decode the image data of a confirmed payload.
///
/// Missing `image` or `mask` is a [`CanvasError::DataIntegrity`]; undecodable data is a
/// [`CanvasError::Decode`].
pub fn decode_edit(payload: &EditPayload, placeholder_size: usize) -> CanvasResult<DecodedEdit> {
    let (Some(image), Some(mask)) = (payload.image.as_deref(), payload.mask.as_deref()) else {
        return Err(CanvasError::data_integrity(
            "confirmed canvas edit is missing `image` or `mask`",
        ));
    };

    let image = decode_rgb(&decode_data_uri(image)?)?;
    let mask = decode_mask(&decode_data_uri(mask)?)?;

    let mut layer_masks: [Tensor; MAX_LAYERS] =
        std::array::from_fn(|_| placeholder_mask(placeholder_size));
    for (slot, entry) in layer_masks.iter_mut().zip(&payload.layer_masks) {
        if let Some(uri) = entry.as_deref().filter(|m| !m.is_empty()) {
            *slot = decode_mask(&decode_data_uri(uri)?)?;
        }
    }

    Ok(DecodedEdit {
        image,
        mask,
        layer_masks,
    })
}

/// Bytes embedded in a data URI: the base64 text after the first comma.
pub fn decode_data_uri(uri: &str) -> CanvasResult<Vec<u8>> {
    let (_, b64) = uri
        .split_once(',')
        .ok_or_else(|| CanvasError::decode("data URI has no ',' separator"))?;
    STANDARD
        .decode(b64.trim())
        .map_err(|e| CanvasError::decode(format!("invalid base64 in data URI: {e}")))
}

/// Wrap PNG bytes as a `data:image/png;base64,` URI.
pub fn png_data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

/// Decode an encoded image into a `(1, H, W, 3)` tensor, dropping any alpha.
pub fn decode_rgb(bytes: &[u8]) -> CanvasResult<Tensor> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| CanvasError::decode(format!("decode composite image: {e}")))?
        .to_rgb8();
    let (w, h) = img.dimensions();
    Tensor::from_u8(vec![1, h as usize, w as usize, 3], img.as_raw())
}

/// Decode an encoded image into a `(1, H, W)` luminance mask.
pub fn decode_mask(bytes: &[u8]) -> CanvasResult<Tensor> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| CanvasError::decode(format!("decode mask image: {e}")))?
        .to_luma8();
    let (w, h) = img.dimensions();
    Tensor::from_u8(vec![1, h as usize, w as usize], img.as_raw())
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/decode.rs"]
mod tests;
