//! Tool/pen state for a canvas instance.
//!
//! The manager owns a [`ToolConfig`] seeded from the process-wide
//! [`DefaultsStore`]. Normal-pen color and width changes are written back to
//! the store so the next canvas inherits them; telestrator, highlighter and
//! eraser adjustments stay local.

use crate::color::SerializableColor;
use crate::config::{DefaultsStore, ToolDefaultsPatch};
use crate::constants::{
    ERASER_WIDTH_MULTIPLIER, HIGHLIGHTER_COLOR, MAX_ERASER_WIDTH, MAX_WIDTH, MIN_WIDTH,
    TELESTRATOR_COLOR, TELESTRATOR_WIDTH,
};
use crate::stroke::ToolType;
use std::sync::Arc;

/// Mutable tool state of one canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolConfig {
    pub active_tool: ToolType,
    pub active_color: SerializableColor,
    pub active_width: f64,
    /// Only ever true while `active_tool` is `Normal`.
    pub eraser_active: bool,
    pub remembered_normal_color: SerializableColor,
    pub remembered_width_before_eraser: f64,
}

impl ToolConfig {
    /// Normal pen with the given color and width.
    pub fn normal(color: SerializableColor, width: f64) -> Self {
        Self {
            active_tool: ToolType::Normal,
            active_color: color,
            active_width: width,
            eraser_active: false,
            remembered_normal_color: color,
            remembered_width_before_eraser: width,
        }
    }
}

/// Styling a stroke commits with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedStyle {
    pub color: SerializableColor,
    pub width: f64,
    pub tool: ToolType,
    pub is_eraser: bool,
}

/// Clamp a requested pen width into the accepted range.
pub fn clamp_width(width: f64) -> f64 {
    if width.is_finite() {
        width.clamp(MIN_WIDTH, MAX_WIDTH)
    } else {
        MIN_WIDTH
    }
}

/// Width used while erasing, derived from the pen width before erasing.
pub fn eraser_width(pre_eraser_width: f64) -> f64 {
    (pre_eraser_width * ERASER_WIDTH_MULTIPLIER).min(MAX_ERASER_WIDTH)
}

/// State machine over Normal / Telestrator / Highlighter plus the eraser flag.
pub struct ToolManager {
    config: ToolConfig,
    defaults: Arc<dyn DefaultsStore>,
}

impl std::fmt::Debug for ToolManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolManager")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ToolManager {
    /// Create a manager seeded from the process-wide defaults.
    pub fn new(defaults: Arc<dyn DefaultsStore>) -> Self {
        let seed = defaults.load_defaults();
        Self {
            config: ToolConfig::normal(seed.color, clamp_width(seed.width)),
            defaults,
        }
    }

    pub fn config(&self) -> &ToolConfig {
        &self.config
    }

    pub fn active_tool(&self) -> ToolType {
        self.config.active_tool
    }

    pub fn is_erasing(&self) -> bool {
        self.config.eraser_active
    }

    /// Select a drawing tool. Always leaves eraser mode.
    pub fn select_tool(&mut self, tool: ToolType) {
        if self.config.eraser_active {
            self.eraser_off();
        }
        if self.config.active_tool == tool {
            return;
        }
        if self.config.active_tool == ToolType::Normal {
            self.config.remembered_normal_color = self.config.active_color;
        }

        self.config.active_tool = tool;
        self.config.active_color = match tool {
            ToolType::Normal => self.config.remembered_normal_color,
            ToolType::Telestrator => TELESTRATOR_COLOR,
            ToolType::Highlighter => HIGHLIGHTER_COLOR,
        };
        log::debug!("Selected tool {:?}", tool);
    }

    /// Flip eraser mode.
    pub fn toggle_eraser(&mut self) {
        if self.config.eraser_active {
            self.eraser_off();
        } else {
            self.eraser_on();
        }
    }

    fn eraser_on(&mut self) {
        if self.config.active_tool != ToolType::Normal {
            self.select_tool(ToolType::Normal);
        }
        self.config.remembered_width_before_eraser = self.config.active_width;
        self.config.active_width = eraser_width(self.config.active_width);
        self.config.eraser_active = true;
    }

    fn eraser_off(&mut self) {
        self.config.active_width = self.config.remembered_width_before_eraser;
        self.config.eraser_active = false;
    }

    /// Change the pen color.
    pub fn set_color(&mut self, color: SerializableColor) {
        match (self.config.active_tool, self.config.eraser_active) {
            (ToolType::Normal, false) => {
                self.config.active_color = color;
                self.config.remembered_normal_color = color;
                self.persist(ToolDefaultsPatch {
                    color: Some(color),
                    ..Default::default()
                });
            }
            // Eraser draws in the background color; keep the choice for later.
            (ToolType::Normal, true) => {
                self.config.active_color = color;
                self.config.remembered_normal_color = color;
            }
            _ => self.config.active_color = color,
        }
    }

    /// Change the pen width (clamped). While erasing, the eraser cap applies.
    pub fn set_width(&mut self, width: f64) {
        let width = if self.config.eraser_active {
            clamp_width(width).min(MAX_ERASER_WIDTH)
        } else {
            clamp_width(width)
        };
        self.config.active_width = width;
        if self.config.active_tool == ToolType::Normal && !self.config.eraser_active {
            self.persist(ToolDefaultsPatch {
                width: Some(width),
                ..Default::default()
            });
        }
    }

    fn persist(&self, patch: ToolDefaultsPatch) {
        if let Err(e) = self.defaults.save_defaults(patch) {
            log::warn!("Failed to save tool defaults: {}", e);
        }
    }

    /// Styling for a stroke committed now on a canvas with `background`.
    pub fn resolve_style(&self, background: SerializableColor) -> ResolvedStyle {
        let config = &self.config;
        match config.active_tool {
            ToolType::Normal if config.eraser_active => ResolvedStyle {
                color: background,
                width: config.active_width,
                tool: ToolType::Normal,
                is_eraser: true,
            },
            ToolType::Normal => ResolvedStyle {
                color: config.active_color,
                width: config.active_width,
                tool: ToolType::Normal,
                is_eraser: false,
            },
            ToolType::Telestrator => ResolvedStyle {
                color: TELESTRATOR_COLOR,
                width: TELESTRATOR_WIDTH,
                tool: ToolType::Telestrator,
                is_eraser: false,
            },
            ToolType::Highlighter => ResolvedStyle {
                color: HIGHLIGHTER_COLOR,
                width: config.active_width,
                tool: ToolType::Highlighter,
                is_eraser: false,
            },
        }
    }
}
