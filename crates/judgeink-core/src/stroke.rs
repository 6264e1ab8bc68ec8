//! Committed strokes.

use crate::color::SerializableColor;
use crate::path::{PathError, StrokePath};
use crate::transform::CanvasTransform;
use kurbo::Rect;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Drawing instrument a stroke was made with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ToolType {
    #[default]
    Normal,
    /// Thin translucent marker drawn above the reference image.
    Telestrator,
    /// Translucent filled shape drawn on top of everything else.
    Highlighter,
}

impl ToolType {
    /// Integer code used in persisted records.
    pub fn code(self) -> i64 {
        match self {
            ToolType::Normal => 0,
            ToolType::Telestrator => 1,
            ToolType::Highlighter => 2,
        }
    }

    /// Decode a persisted code. Unknown codes fall back to `Normal`.
    pub fn from_code(code: i64) -> Self {
        match code {
            1 => ToolType::Telestrator,
            2 => ToolType::Highlighter,
            _ => ToolType::Normal,
        }
    }
}

/// Errors raised when assembling a stroke.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrokeError {
    #[error("invalid path: {0}")]
    Path(#[from] PathError),
    #[error("stroke width must be positive and finite, got {0}")]
    InvalidWidth(f64),
    #[error("eraser strokes must use the normal tool")]
    EraserWithTool(ToolType),
}

/// One committed freehand drawing action.
///
/// Immutable after construction; edits happen through new strokes and
/// undo/redo.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    path: StrokePath,
    color: SerializableColor,
    stroke_width: f64,
    tool: ToolType,
    is_eraser: bool,
}

impl Stroke {
    /// Assemble a stroke, validating path structure and styling.
    ///
    /// Highlighter paths are closed back to their first point if they are
    /// still open.
    pub fn new(
        mut path: StrokePath,
        color: SerializableColor,
        stroke_width: f64,
        tool: ToolType,
        is_eraser: bool,
    ) -> Result<Self, StrokeError> {
        path.validate()?;
        if !(stroke_width.is_finite() && stroke_width > 0.0) {
            return Err(StrokeError::InvalidWidth(stroke_width));
        }
        if is_eraser && tool != ToolType::Normal {
            return Err(StrokeError::EraserWithTool(tool));
        }
        if tool == ToolType::Highlighter && !path.is_closed() {
            if let Some(first) = path.first_point() {
                path.line_to(first);
            }
        }
        Ok(Self {
            path,
            color,
            stroke_width,
            tool,
            is_eraser,
        })
    }

    pub fn path(&self) -> &StrokePath {
        &self.path
    }

    pub fn color(&self) -> SerializableColor {
        self.color
    }

    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    pub fn tool(&self) -> ToolType {
        self.tool
    }

    pub fn is_eraser(&self) -> bool {
        self.is_eraser
    }

    /// Bounds of the path, inflated by half the stroke width.
    pub fn bounds(&self) -> Rect {
        let half = self.stroke_width / 2.0;
        self.path.bounds().inflate(half, half)
    }

    /// A copy remapped into another canvas space. Width scales with the
    /// transform so the reproduction keeps its proportions.
    pub fn transformed(&self, transform: &CanvasTransform) -> Self {
        Self {
            path: transform.apply(&self.path),
            stroke_width: self.stroke_width * transform.scale,
            ..self.clone()
        }
    }
}
