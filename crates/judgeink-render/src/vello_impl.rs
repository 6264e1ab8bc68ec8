//! Vello-based renderer implementation.

use crate::renderer::{RenderContext, RenderResult, Renderer, decode_reference_image};
use judgeink_core::{DrawOp, Frame};
use kurbo::{Affine, BezPath, Cap, Join, Point, Rect, Shape as KurboShape, Size, Stroke};
use peniko::{Color, Fill, ImageData};
use vello::Scene;

/// Vello-based renderer for annotation frames.
pub struct VelloRenderer {
    /// The Vello scene being built.
    scene: Scene,
    /// Decoded reference image, if one loaded successfully.
    reference: Option<ImageData>,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloRenderer {
    /// Create a new Vello renderer.
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            reference: None,
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    /// Decode and keep the reference image.
    ///
    /// On failure the previous image is dropped and a placeholder is drawn
    /// in its place until a valid image is set.
    pub fn set_reference_image(&mut self, bytes: &[u8]) -> RenderResult<()> {
        match decode_reference_image(bytes) {
            Ok(image) => {
                log::debug!("Reference image {}x{}", image.width, image.height);
                self.reference = Some(image);
                Ok(())
            }
            Err(e) => {
                log::warn!("Reference image unusable: {}", e);
                self.reference = None;
                Err(e)
            }
        }
    }

    pub fn clear_reference_image(&mut self) {
        self.reference = None;
    }

    pub fn has_reference_image(&self) -> bool {
        self.reference.is_some()
    }

    /// Build a scene for export at `scale` times the frame size.
    /// Returns the scene and the pixel bounds (for texture dimensions).
    ///
    /// `frame` is expected to come from `Compositor::compose_export`, which
    /// already placed the strokes for the target size.
    pub fn build_export_scene(&mut self, frame: &Frame, scale: f64) -> (Scene, Rect) {
        self.scene.reset();
        let transform = Affine::scale(scale);
        self.render_frame(frame, transform);
        let bounds = Size::new(frame.size.width * scale, frame.size.height * scale).to_rect();
        (std::mem::take(&mut self.scene), bounds)
    }

    fn render_frame(&mut self, frame: &Frame, transform: Affine) {
        self.scene.fill(
            Fill::NonZero,
            transform,
            Color::from(frame.background),
            None,
            &frame.size.to_rect(),
        );
        for (_, op) in frame.ops() {
            self.render_op(op, transform);
        }
    }

    fn render_op(&mut self, op: &DrawOp, transform: Affine) {
        match op {
            DrawOp::Stroke { path, color, width } => {
                let stroke = Stroke::new(*width)
                    .with_caps(Cap::Round)
                    .with_join(Join::Round);
                self.scene.stroke(
                    &stroke,
                    transform,
                    Color::from(*color),
                    None,
                    &path.to_bez_path(),
                );
            }
            DrawOp::Fill { path, color } => {
                self.scene.fill(
                    Fill::NonZero,
                    transform,
                    Color::from(*color),
                    None,
                    &path.to_bez_path(),
                );
            }
            DrawOp::Image { bounds } => self.render_reference(*bounds, transform),
        }
    }

    /// Draw the reference image scaled into `bounds`.
    fn render_reference(&mut self, bounds: Rect, transform: Affine) {
        let Some(image) = self.reference.clone() else {
            self.render_reference_placeholder(bounds, transform);
            return;
        };

        let scale_x = bounds.width() / image.width as f64;
        let scale_y = bounds.height() / image.height as f64;
        let image_transform = transform
            * Affine::translate((bounds.x0, bounds.y0))
            * Affine::scale_non_uniform(scale_x, scale_y);

        self.scene.draw_image(&image.into(), image_transform);
    }

    /// Gray box with an X where the reference image should be.
    fn render_reference_placeholder(&mut self, bounds: Rect, transform: Affine) {
        let rect_path = bounds.to_path(0.1);
        self.scene.fill(
            Fill::NonZero,
            transform,
            Color::from_rgba8(200, 200, 200, 255),
            None,
            &rect_path,
        );

        let stroke = Stroke::new(2.0);
        let mut x_path = BezPath::new();
        x_path.move_to(Point::new(bounds.x0, bounds.y0));
        x_path.line_to(Point::new(bounds.x1, bounds.y1));
        x_path.move_to(Point::new(bounds.x1, bounds.y0));
        x_path.line_to(Point::new(bounds.x0, bounds.y1));
        self.scene.stroke(
            &stroke,
            transform,
            Color::from_rgba8(150, 150, 150, 255),
            None,
            &x_path,
        );
        self.scene.stroke(
            &stroke,
            transform,
            Color::from_rgba8(100, 100, 100, 255),
            None,
            &rect_path,
        );
    }
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.scene.reset();
        self.render_frame(ctx.frame, ctx.transform());
    }
}
