//! Layered composition of strokes and the reference image.
//!
//! Layers are drawn bottom to top in [`Layer::ORDER`]: sketch marks sit
//! under the reference image, emphasis marks sit above it. The output is a
//! backend-agnostic [`Frame`]; renderers walk it in order.

use crate::color::SerializableColor;
use crate::constants::{
    HIGHLIGHTER_FILL_OPACITY, HIGHLIGHTER_OUTLINE_OPACITY, TELESTRATOR_OPACITY,
};
use crate::path::StrokePath;
use crate::stroke::{Stroke, ToolType};
use crate::tools::ResolvedStyle;
use crate::transform::CanvasTransform;
use kurbo::{Rect, Size};

/// Compositing layer, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    /// Normal and eraser strokes.
    Base,
    /// The reference diagram.
    Reference,
    Telestrator,
    Highlighter,
}

impl Layer {
    pub const ORDER: [Layer; 4] = [
        Layer::Base,
        Layer::Reference,
        Layer::Telestrator,
        Layer::Highlighter,
    ];

    /// Layer a stroke made with `tool` is drawn on.
    pub fn for_tool(tool: ToolType) -> Self {
        match tool {
            ToolType::Normal => Layer::Base,
            ToolType::Telestrator => Layer::Telestrator,
            ToolType::Highlighter => Layer::Highlighter,
        }
    }
}

/// One drawing primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Outline a path with round caps and joins.
    Stroke {
        path: StrokePath,
        color: SerializableColor,
        width: f64,
    },
    /// Fill a closed path (non-zero winding).
    Fill {
        path: StrokePath,
        color: SerializableColor,
    },
    /// The reference image, scaled into `bounds`.
    Image { bounds: Rect },
}

/// Draw operations of one layer.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLayer {
    pub layer: Layer,
    pub ops: Vec<DrawOp>,
}

/// A fully composed frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub size: Size,
    pub background: SerializableColor,
    /// Always one entry per layer, in [`Layer::ORDER`].
    pub layers: Vec<FrameLayer>,
}

impl Frame {
    fn empty(size: Size, background: SerializableColor) -> Self {
        Self {
            size,
            background,
            layers: Layer::ORDER
                .iter()
                .map(|&layer| FrameLayer {
                    layer,
                    ops: Vec::new(),
                })
                .collect(),
        }
    }

    /// Operations of `layer`.
    pub fn layer(&self, layer: Layer) -> &[DrawOp] {
        self.layers
            .iter()
            .find(|l| l.layer == layer)
            .map(|l| l.ops.as_slice())
            .unwrap_or(&[])
    }

    fn layer_mut(&mut self, layer: Layer) -> &mut Vec<DrawOp> {
        // Layers are created for every variant in `Frame::empty`.
        let index = Layer::ORDER.iter().position(|&l| l == layer).unwrap_or(0);
        &mut self.layers[index].ops
    }

    /// All operations, bottom to top.
    pub fn ops(&self) -> impl Iterator<Item = (Layer, &DrawOp)> {
        self.layers
            .iter()
            .flat_map(|l| l.ops.iter().map(move |op| (l.layer, op)))
    }

    /// Total number of operations.
    pub fn op_count(&self) -> usize {
        self.layers.iter().map(|l| l.ops.len()).sum()
    }
}

/// Emit the draw operations for one stroke.
///
/// Eraser strokes are drawn in `background`, not their stored color.
pub fn stroke_ops(
    path: StrokePath,
    color: SerializableColor,
    width: f64,
    tool: ToolType,
    is_eraser: bool,
    background: SerializableColor,
) -> Vec<DrawOp> {
    if is_eraser {
        return vec![DrawOp::Stroke {
            path,
            color: background,
            width,
        }];
    }
    match tool {
        ToolType::Normal => vec![DrawOp::Stroke { path, color, width }],
        ToolType::Telestrator => vec![DrawOp::Stroke {
            path,
            color: color.with_opacity(TELESTRATOR_OPACITY),
            width,
        }],
        ToolType::Highlighter => vec![
            DrawOp::Fill {
                path: path.clone(),
                color: color.with_opacity(HIGHLIGHTER_FILL_OPACITY),
            },
            DrawOp::Stroke {
                path,
                color: color.with_opacity(HIGHLIGHTER_OUTLINE_OPACITY),
                width,
            },
        ],
    }
}

/// Builds frames for one canvas.
#[derive(Debug, Clone)]
pub struct Compositor {
    size: Size,
    background: SerializableColor,
    reference: Option<Rect>,
}

impl Compositor {
    pub fn new(size: Size, background: SerializableColor) -> Self {
        Self {
            size,
            background,
            reference: None,
        }
    }

    /// Place the reference image at `bounds` (canvas coordinates).
    pub fn with_reference(mut self, bounds: Option<Rect>) -> Self {
        self.reference = bounds;
        self
    }

    pub fn set_reference(&mut self, bounds: Option<Rect>) {
        self.reference = bounds;
    }

    pub fn reference(&self) -> Option<Rect> {
        self.reference
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn background(&self) -> SerializableColor {
        self.background
    }

    /// Compose the live canvas.
    ///
    /// `in_progress` is the gesture being drawn and the style it would
    /// commit with; it is drawn last within its tool's layer.
    pub fn compose<'a>(
        &self,
        strokes: impl IntoIterator<Item = &'a Stroke>,
        in_progress: Option<(&StrokePath, &ResolvedStyle)>,
    ) -> Frame {
        let mut frame = self.compose_with(
            strokes,
            &CanvasTransform::IDENTITY,
            self.size,
            self.background,
        );
        if let Some((path, style)) = in_progress {
            if path.has_segments() {
                let ops = stroke_ops(
                    path.clone(),
                    style.color,
                    style.width,
                    style.tool,
                    style.is_eraser,
                    self.background,
                );
                frame.layer_mut(Layer::for_tool(style.tool)).extend(ops);
            }
        }
        frame
    }

    /// Compose `strokes` recorded on a `source`-sized canvas into a
    /// `target`-sized frame, fitted and centered.
    pub fn compose_export<'a>(
        &self,
        strokes: impl IntoIterator<Item = &'a Stroke>,
        source: Size,
        target: Size,
        background: SerializableColor,
    ) -> Frame {
        let transform = CanvasTransform::fit(source, target.to_rect());
        self.compose_with(strokes, &transform, target, background)
    }

    fn compose_with<'a>(
        &self,
        strokes: impl IntoIterator<Item = &'a Stroke>,
        transform: &CanvasTransform,
        size: Size,
        background: SerializableColor,
    ) -> Frame {
        let mut frame = Frame::empty(size, background);
        for stroke in strokes {
            let stroke = if transform.is_identity() {
                stroke.clone()
            } else {
                stroke.transformed(transform)
            };
            let layer = Layer::for_tool(stroke.tool());
            let ops = stroke_ops(
                stroke.path().clone(),
                stroke.color(),
                stroke.stroke_width(),
                stroke.tool(),
                stroke.is_eraser(),
                background,
            );
            frame.layer_mut(layer).extend(ops);
        }
        if let Some(bounds) = self.reference {
            frame.layer_mut(Layer::Reference).push(DrawOp::Image {
                bounds: transform.apply_rect(bounds),
            });
        }
        frame
    }
}
