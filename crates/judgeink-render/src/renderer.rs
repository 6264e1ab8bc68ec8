//! Renderer trait abstraction.

use judgeink_core::Frame;
use kurbo::Affine;
use peniko::{Blob, Color, ImageAlphaType, ImageData, ImageFormat};
use std::sync::Arc;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Image decode failed: {0}")]
    ImageDecode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// The composed frame to draw.
    pub frame: &'a Frame,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    /// Extra transform applied after the scale factor (e.g. a view offset).
    pub view_transform: Affine,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(frame: &'a Frame) -> Self {
        Self {
            frame,
            scale_factor: 1.0,
            view_transform: Affine::IDENTITY,
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_view_transform(mut self, transform: Affine) -> Self {
        self.view_transform = transform;
        self
    }

    /// Transform from frame coordinates to device pixels.
    pub fn transform(&self) -> Affine {
        Affine::scale(self.scale_factor) * self.view_transform
    }
}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Build the drawing commands for a frame.
    ///
    /// Called once per frame; layers are drawn in frame order.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Color to clear the surface with.
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.frame.background.into()
    }
}

/// Decode an encoded reference image (PNG, JPEG or WebP) into RGBA pixels.
pub fn decode_reference_image(bytes: &[u8]) -> RenderResult<ImageData> {
    let decoded =
        ::image::load_from_memory(bytes).map_err(|e| RendererError::ImageDecode(e.to_string()))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(RendererError::ImageDecode("image has no pixels".to_string()));
    }
    Ok(ImageData {
        data: Blob::new(Arc::new(rgba.into_vec())),
        format: ImageFormat::Rgba8,
        width,
        height,
        alpha_type: ImageAlphaType::Alpha,
    })
}
