//! Engine-wide constants.

use crate::color::SerializableColor;
use std::time::Duration;

/// Maximum number of committed strokes kept per canvas.
pub const CAP_STROKES: usize = 500;

/// Maximum number of undone strokes kept for redo.
pub const CAP_UNDO: usize = 50;

/// Distance above which the sampler interpolates intermediate points.
pub const SMOOTHING_THRESHOLD: f64 = 8.0;

/// Quiet period before a pending save is written.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(750);

/// Smallest width the pen accepts.
pub const MIN_WIDTH: f64 = 0.5;
/// Largest width the pen accepts.
pub const MAX_WIDTH: f64 = 40.0;
/// Width a fresh install starts with.
pub const DEFAULT_WIDTH: f64 = 3.0;

/// Eraser width is the pre-eraser width times this factor...
pub const ERASER_WIDTH_MULTIPLIER: f64 = 4.0;
/// ...capped at this value.
pub const MAX_ERASER_WIDTH: f64 = 24.0;

/// Telestrator marks always use this width.
pub const TELESTRATOR_WIDTH: f64 = 3.0;
/// Telestrator line opacity.
pub const TELESTRATOR_OPACITY: f64 = 0.6;

/// Highlighter fill opacity.
pub const HIGHLIGHTER_FILL_OPACITY: f64 = 0.25;
/// Highlighter outline opacity.
pub const HIGHLIGHTER_OUTLINE_OPACITY: f64 = 0.5;

/// Telestrator color (red 600).
pub const TELESTRATOR_COLOR: SerializableColor = SerializableColor::new(229, 57, 53, 255);

/// Highlighter color (yellow 500).
pub const HIGHLIGHTER_COLOR: SerializableColor = SerializableColor::new(255, 235, 59, 255);

/// Default pen color.
pub const DEFAULT_COLOR: SerializableColor = SerializableColor::new(0, 0, 0, 255);

/// Default canvas background.
pub const DEFAULT_BACKGROUND: SerializableColor = SerializableColor::new(255, 255, 255, 255);
