use crate::foundation::error::{CanvasError, CanvasResult};

/// Dense row-major `f32` buffer with a dynamic shape.
///
/// Images follow the host's `(B, H, W, C)` convention and masks `(B, H, W)`. Values are nominally
/// in `[0, 1]`; nothing here clamps them except the 8-bit conversions.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Tensor {
    /// Wrap `data` as a tensor of `shape`, checking the element count.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> CanvasResult<Self> {
        let expected: usize = shape.iter().product();
        if expected != data.len() {
            return Err(CanvasError::shape(format!(
                "shape {shape:?} needs {expected} values, got {}",
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// Tensor of `shape` filled with `value`.
    pub fn filled(shape: Vec<usize>, value: f32) -> Self {
        let len = shape.iter().product();
        Self {
            shape,
            data: vec![value; len],
        }
    }

    /// All-zero tensor.
    pub fn zeros(shape: Vec<usize>) -> Self {
        Self::filled(shape, 0.0)
    }

    /// All-one tensor.
    pub fn ones(shape: Vec<usize>) -> Self {
        Self::filled(shape, 1.0)
    }

    /// Build a tensor from 8-bit samples, mapping `0..=255` onto `[0, 1]`.
    pub fn from_u8(shape: Vec<usize>, bytes: &[u8]) -> CanvasResult<Self> {
        let data = bytes.iter().map(|&b| f32::from(b) / 255.0).collect();
        Self::new(shape, data)
    }

    /// Dimensions.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Flat row-major values.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// `(H, W)` of a batched image or mask, i.e. dimensions 1 and 2.
    pub fn spatial(&self) -> Option<(usize, usize)> {
        match self.shape.as_slice() {
            [_, h, w] | [_, h, w, _] => Some((*h, *w)),
            _ => None,
        }
    }

    /// Arithmetic mean of all values (`0.0` for an empty tensor).
    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.data.iter().map(|&v| f64::from(v)).sum();
        (sum / self.data.len() as f64) as f32
    }

    /// Values of the first batch item.
    pub fn first_item(&self) -> &[f32] {
        let Some((&batch, rest)) = self.shape.split_first() else {
            return &self.data;
        };
        if batch == 0 {
            return &[];
        }
        let stride: usize = rest.iter().product();
        &self.data[..stride]
    }

    /// First batch item scaled to `0..=255`, clipped and truncated.
    pub fn first_item_u8(&self) -> Vec<u8> {
        self.first_item().iter().map(|&v| unit_to_u8(v)).collect()
    }
}

/// `clip(255 * v, 0, 255)` truncated to `u8`. NaN maps to `0`.
pub fn unit_to_u8(v: f32) -> u8 {
    (255.0 * v).clamp(0.0, 255.0) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/tensor.rs"]
mod tests;
