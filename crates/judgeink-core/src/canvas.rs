//! One mounted annotation canvas.
//!
//! [`Canvas`] ties the pieces together: input is filtered by the input mode
//! and fed to the [`StrokeBuilder`]; finished strokes go into the
//! [`History`]; every history change schedules a debounced save.

use crate::color::SerializableColor;
use crate::compositor::{Compositor, Frame};
use crate::config::{DefaultsStore, ToolDefaultsPatch};
use crate::constants::{DEFAULT_BACKGROUND, DEFAULT_QUIET_PERIOD};
use crate::gesture::StrokeBuilder;
use crate::history::History;
use crate::input::{InputEvent, InputMode, PointerPhase};
use crate::storage::{PersistenceAdapter, Scheduler, StrokeStore};
use crate::stroke::{Stroke, ToolType};
use crate::tools::{ToolConfig, ToolManager};
use kurbo::{Point, Rect, Size};
use std::sync::Arc;
use std::time::Duration;

/// Mount-time settings of a canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasOptions {
    /// Key the strokes are stored under.
    pub owner_id: String,
    /// Logical canvas size; input outside it abandons the gesture.
    pub size: Size,
    pub background: SerializableColor,
    pub quiet_period: Duration,
    /// Where the reference image is drawn, if there is one.
    pub reference: Option<Rect>,
}

impl CanvasOptions {
    pub fn new(owner_id: impl Into<String>, size: Size) -> Self {
        Self {
            owner_id: owner_id.into(),
            size,
            background: DEFAULT_BACKGROUND,
            quiet_period: DEFAULT_QUIET_PERIOD,
            reference: None,
        }
    }

    pub fn with_background(mut self, background: SerializableColor) -> Self {
        self.background = background;
        self
    }

    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    /// Draw the reference image over the whole canvas.
    pub fn with_full_reference(mut self) -> Self {
        self.reference = Some(self.size.to_rect());
        self
    }

    pub fn with_reference(mut self, bounds: Rect) -> Self {
        self.reference = Some(bounds);
        self
    }
}

/// What [`Canvas::handle_input`] did with an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Filtered out; nothing changed.
    Ignored,
    Started,
    Updated,
    /// A stroke was committed to the history.
    Committed,
    /// The gesture was dropped without committing anything.
    Abandoned,
}

/// A mounted canvas instance.
pub struct Canvas {
    options: CanvasOptions,
    defaults: Arc<dyn DefaultsStore>,
    input_mode: InputMode,
    tools: ToolManager,
    builder: StrokeBuilder,
    history: History,
    compositor: Compositor,
    persistence: PersistenceAdapter,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("owner_id", &self.options.owner_id)
            .field("input_mode", &self.input_mode)
            .field("tools", &self.tools)
            .field("strokes", &self.history.len())
            .finish_non_exhaustive()
    }
}

impl Canvas {
    /// Mount a canvas, loading the owner's persisted strokes.
    pub async fn mount(
        options: CanvasOptions,
        store: Arc<dyn StrokeStore>,
        scheduler: Arc<dyn Scheduler>,
        defaults: Arc<dyn DefaultsStore>,
    ) -> Self {
        let persistence = PersistenceAdapter::new(options.owner_id.clone(), store, scheduler)
            .with_quiet_period(options.quiet_period);
        let strokes = persistence.load().await;
        log::info!(
            "Mounted canvas for {} with {} strokes",
            options.owner_id,
            strokes.len()
        );

        let input_mode = defaults.load_defaults().input_mode;
        let compositor =
            Compositor::new(options.size, options.background).with_reference(options.reference);

        Self {
            tools: ToolManager::new(Arc::clone(&defaults)),
            builder: StrokeBuilder::new(),
            history: History::from_strokes(strokes),
            input_mode,
            defaults,
            compositor,
            persistence,
            options,
        }
    }

    /// Write any pending changes and tear the canvas down.
    pub async fn unmount(mut self) {
        self.builder.cancel();
        self.persistence.flush().await;
        log::info!("Unmounted canvas for {}", self.options.owner_id);
    }

    pub fn options(&self) -> &CanvasOptions {
        &self.options
    }

    pub fn owner_id(&self) -> &str {
        &self.options.owner_id
    }

    /// Feed one input event.
    pub fn handle_input(&mut self, event: InputEvent) -> InputOutcome {
        if !self.input_mode.accepts(event.class) {
            return InputOutcome::Ignored;
        }
        let inside = self.contains(event.position);

        if event.phase == PointerPhase::Down {
            if inside && self.builder.on_start(event.position, event.class) {
                return InputOutcome::Started;
            }
            return InputOutcome::Ignored;
        }

        // Later phases only concern the device that started the gesture.
        if self.builder.active_class() != Some(event.class) {
            return InputOutcome::Ignored;
        }

        match event.phase {
            PointerPhase::Cancel => self.abandon(),
            _ if !inside => self.abandon(),
            PointerPhase::Move => {
                self.builder.on_update(event.position, event.class);
                InputOutcome::Updated
            }
            PointerPhase::Up => {
                self.builder.on_update(event.position, event.class);
                let style = self.tools.resolve_style(self.options.background);
                match self.builder.on_end(&style) {
                    Some(stroke) => {
                        self.history.commit(stroke);
                        self.save();
                        InputOutcome::Committed
                    }
                    None => InputOutcome::Abandoned,
                }
            }
            PointerPhase::Down => InputOutcome::Ignored,
        }
    }

    fn abandon(&mut self) -> InputOutcome {
        self.builder.cancel();
        log::debug!("Gesture abandoned");
        InputOutcome::Abandoned
    }

    fn contains(&self, point: Point) -> bool {
        let size = self.options.size;
        point.is_finite()
            && (0.0..=size.width).contains(&point.x)
            && (0.0..=size.height).contains(&point.y)
    }

    /// Whether a gesture is in progress.
    pub fn is_drawing(&self) -> bool {
        self.builder.is_active()
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// Switch the input policy and remember it for future canvases.
    ///
    /// A gesture from a device the new mode rejects is abandoned.
    pub fn set_input_mode(&mut self, mode: InputMode) {
        if self.input_mode == mode {
            return;
        }
        self.input_mode = mode;
        if let Some(class) = self.builder.active_class() {
            if !mode.accepts(class) {
                self.builder.cancel();
            }
        }
        let patch = ToolDefaultsPatch {
            input_mode: Some(mode),
            ..Default::default()
        };
        if let Err(e) = self.defaults.save_defaults(patch) {
            log::warn!("Failed to save input mode: {}", e);
        }
    }

    pub fn tool_config(&self) -> &ToolConfig {
        self.tools.config()
    }

    pub fn select_tool(&mut self, tool: ToolType) {
        self.tools.select_tool(tool);
    }

    pub fn toggle_eraser(&mut self) {
        self.tools.toggle_eraser();
    }

    pub fn set_color(&mut self, color: SerializableColor) {
        self.tools.set_color(color);
    }

    pub fn set_width(&mut self, width: f64) {
        self.tools.set_width(width);
    }

    /// Undo the newest stroke. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo();
        if changed {
            self.save();
        }
        changed
    }

    /// Redo the newest undone stroke. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo();
        if changed {
            self.save();
        }
        changed
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Committed strokes, oldest first.
    pub fn strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.history.strokes()
    }

    /// Whether a save is waiting for its quiet period.
    pub fn has_pending_save(&self) -> bool {
        self.persistence.has_pending()
    }

    /// Write pending changes now without unmounting.
    pub async fn flush(&self) {
        self.persistence.flush().await;
    }

    /// Compose the live canvas, including the gesture in progress.
    pub fn frame(&self) -> Frame {
        let style = self.tools.resolve_style(self.options.background);
        let in_progress = self.builder.preview().map(|path| (path, &style));
        self.compositor.compose(self.history.strokes(), in_progress)
    }

    /// Compose the committed strokes for a `target`-sized export.
    pub fn export_frame(&self, target: Size, background: SerializableColor) -> Frame {
        self.compositor
            .compose_export(self.history.strokes(), self.options.size, target, background)
    }

    fn save(&self) {
        self.persistence.schedule_save(self.history.snapshot());
    }
}
