use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::config::CanvasProOpts;
use crate::foundation::error::{CanvasError, CanvasResult};
use crate::foundation::tensor::{Tensor, unit_to_u8};
use crate::layers::assemble::Layer;
use crate::session::seed::SeedToken;

/// Layer entry of the `show_canvas_pro` message.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct LayerMeta {
    /// Retrieval URL of the layer PNG.
    pub url: String,
    /// Stable layer index (not the publish position).
    pub index: usize,
    /// Display name by publish position.
    pub name: String,
    /// Always `true` on publish.
    pub visible: bool,
    /// Initial layer opacity.
    pub opacity: f32,
}

/// What one publish wrote and how the browser can fetch it.
#[derive(Clone, Debug, PartialEq)]
pub struct PublishedArtifacts {
    /// URL of `back_<seed>.png`.
    pub back_url: String,
    /// Metadata per layer, in publish order.
    pub layers: Vec<LayerMeta>,
    /// Every file written, background first.
    pub files: Vec<PathBuf>,
}

impl PublishedArtifacts {
    /// URL of the first layer, or the background when there are no layers.
    pub fn fore_url(&self) -> &str {
        self.layers
            .first()
            .map(|l| l.url.as_str())
            .unwrap_or(&self.back_url)
    }
}

/// Writes session artifacts into the scratch directory.
#[derive(Clone, Debug)]
pub struct ArtifactPublisher {
    dir: PathBuf,
    subfolder: String,
}

impl ArtifactPublisher {
    /// Publisher for `opts.scratch_dir()`. Fails on options that [`CanvasProOpts::validate`]
    /// rejects, since [`Self::clear`] empties whatever directory the options point at.
    pub fn new(opts: &CanvasProOpts) -> CanvasResult<Self> {
        opts.validate()?;
        Ok(Self {
            dir: opts.scratch_dir(),
            subfolder: opts.subfolder.clone(),
        })
    }

    /// Scratch directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `/view` URL for a file in the scratch directory.
    pub fn view_url(&self, filename: &str) -> String {
        format!("/view?filename={filename}&subfolder={}", self.subfolder)
    }

    /// Remove everything in the scratch directory, creating it if needed.
    pub fn clear(&self) -> CanvasResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create scratch dir '{}'", self.dir.display()))?;
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("list scratch dir '{}'", self.dir.display()))?;
        for entry in entries {
            let path = entry.context("read scratch dir entry")?.path();
            let removed = if path.is_dir() {
                std::fs::remove_dir_all(&path)
            } else {
                std::fs::remove_file(&path)
            };
            removed.with_context(|| format!("remove stale artifact '{}'", path.display()))?;
        }
        Ok(())
    }

    /// Clear the scratch directory, then write the background and one RGBA PNG per layer.
    ///
    /// Layer files are named by publish position, metadata carries the stable index.
    #[tracing::instrument(skip(self, background, layers), fields(layers = layers.len()))]
    pub fn publish(
        &self,
        background: &Tensor,
        layers: &[Layer],
        seed: SeedToken,
    ) -> CanvasResult<PublishedArtifacts> {
        self.clear()?;

        let mut files = Vec::with_capacity(layers.len() + 1);

        let back_name = format!("back_{seed}.png");
        let back_path = self.dir.join(&back_name);
        let back = rgb_image(background)?;
        back.save_with_format(&back_path, image::ImageFormat::Png)
            .with_context(|| format!("write background '{}'", back_path.display()))?;
        files.push(back_path);

        let mut metas = Vec::with_capacity(layers.len());
        for (i, layer) in layers.iter().enumerate() {
            let name = format!("fore_{seed}_{i}.png");
            let path = self.dir.join(&name);
            let img = rgba_image(&layer.image, &layer.mask)?;
            img.save_with_format(&path, image::ImageFormat::Png)
                .with_context(|| format!("write layer '{}'", path.display()))?;
            files.push(path);

            metas.push(LayerMeta {
                url: self.view_url(&name),
                index: layer.index,
                name: format!("Layer {}", i + 1),
                visible: true,
                opacity: layer.opacity,
            });
        }

        tracing::debug!(dir = %self.dir.display(), files = files.len(), "published canvas artifacts");
        Ok(PublishedArtifacts {
            back_url: self.view_url(&back_name),
            layers: metas,
            files,
        })
    }
}

fn spatial_u32(t: &Tensor) -> CanvasResult<(u32, u32)> {
    let (h, w) = t
        .spatial()
        .ok_or_else(|| CanvasError::shape(format!("expected (B,H,W,..), got {:?}", t.shape())))?;
    let h = u32::try_from(h).map_err(|_| CanvasError::shape("image height overflows u32"))?;
    let w = u32::try_from(w).map_err(|_| CanvasError::shape("image width overflows u32"))?;
    Ok((w, h))
}

fn channels(t: &Tensor) -> usize {
    t.shape().last().copied().unwrap_or(0)
}

/// Opaque 8-bit RGB image from the first batch item.
fn rgb_image(t: &Tensor) -> CanvasResult<image::RgbImage> {
    let (w, h) = spatial_u32(t)?;
    let c = channels(t);
    if c < 3 {
        return Err(CanvasError::shape(format!(
            "expected at least 3 channels, got {:?}",
            t.shape()
        )));
    }
    let raw: Vec<u8> = t
        .first_item()
        .chunks_exact(c)
        .flat_map(|px| [unit_to_u8(px[0]), unit_to_u8(px[1]), unit_to_u8(px[2])])
        .collect();
    image::RgbImage::from_raw(w, h, raw)
        .ok_or_else(|| CanvasError::shape(format!("buffer does not fit {w}x{h} rgb")))
}

/// RGBA image whose alpha channel is the layer mask.
fn rgba_image(image: &Tensor, mask: &Tensor) -> CanvasResult<image::RgbaImage> {
    let rgb = rgb_image(image)?;
    let (w, h) = rgb.dimensions();
    if mask.spatial() != image.spatial() {
        return Err(CanvasError::shape(format!(
            "mask {:?} does not match image {:?}",
            mask.shape(),
            image.shape()
        )));
    }
    let alpha = mask.first_item_u8();
    let raw: Vec<u8> = rgb
        .pixels()
        .zip(alpha)
        .flat_map(|(px, a)| [px[0], px[1], px[2], a])
        .collect();
    image::RgbaImage::from_raw(w, h, raw)
        .ok_or_else(|| CanvasError::shape(format!("buffer does not fit {w}x{h} rgba")))
}

#[cfg(test)]
#[path = "../../tests/unit/artifacts/publish.rs"]
mod tests;
