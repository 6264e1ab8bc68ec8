//! Input abstraction for pointer, touch and stylus events.
//!
//! The engine only ever sees [`InputEvent`]s. [`PlatformInputAdapter`]
//! produces them from winit window events.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, Force, MouseButton, Touch, TouchPhase, WindowEvent};

/// Kind of device that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputClass {
    Finger,
    Stylus,
    Mouse,
}

/// Which devices may draw. Persisted with the tool defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InputMode {
    #[default]
    FingerOnly,
    StylusOnly,
}

impl InputMode {
    /// Whether events of `class` may drive the canvas under this mode.
    ///
    /// Mouse input has no finger/stylus counterpart and is accepted in both.
    pub fn accepts(self, class: InputClass) -> bool {
        match (self, class) {
            (_, InputClass::Mouse) => true,
            (InputMode::FingerOnly, InputClass::Finger) => true,
            (InputMode::StylusOnly, InputClass::Stylus) => true,
            _ => false,
        }
    }
}

/// Phase of a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// The gesture was abandoned (pointer left the window, touch cancelled).
    Cancel,
}

/// A normalized input event in canvas-local logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputEvent {
    pub phase: PointerPhase,
    pub position: Point,
    pub class: InputClass,
}

impl InputEvent {
    pub fn new(phase: PointerPhase, position: Point, class: InputClass) -> Self {
        Self {
            phase,
            position,
            class,
        }
    }

    pub fn down(position: Point, class: InputClass) -> Self {
        Self::new(PointerPhase::Down, position, class)
    }

    pub fn moved(position: Point, class: InputClass) -> Self {
        Self::new(PointerPhase::Move, position, class)
    }

    pub fn up(position: Point, class: InputClass) -> Self {
        Self::new(PointerPhase::Up, position, class)
    }

    pub fn cancel(position: Point, class: InputClass) -> Self {
        Self::new(PointerPhase::Cancel, position, class)
    }
}

/// Translates winit window events into [`InputEvent`]s.
///
/// Tracks the cursor position, the left mouse button and the first active
/// touch; additional simultaneous touches are ignored.
#[derive(Debug, Clone)]
pub struct PlatformInputAdapter {
    scale_factor: f64,
    cursor: Point,
    mouse_down: bool,
    active_touch: Option<u64>,
}

impl Default for PlatformInputAdapter {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl PlatformInputAdapter {
    /// Create an adapter for a window with the given DPI scale factor.
    pub fn new(scale_factor: f64) -> Self {
        Self {
            scale_factor: if scale_factor > 0.0 { scale_factor } else { 1.0 },
            cursor: Point::ZERO,
            mouse_down: false,
            active_touch: None,
        }
    }

    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        if scale_factor > 0.0 {
            self.scale_factor = scale_factor;
        }
    }

    /// Translate a window event. Returns `None` for events the canvas does not consume.
    pub fn handle_window_event(&mut self, event: &WindowEvent) -> Option<InputEvent> {
        match event {
            WindowEvent::CursorMoved { position, .. } => self.cursor_moved(*position),
            WindowEvent::MouseInput { state, button, .. } => self.mouse_input(*state, *button),
            WindowEvent::CursorLeft { .. } => self.cursor_left(),
            WindowEvent::Touch(touch) => self.touch(touch),
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.set_scale_factor(*scale_factor);
                None
            }
            _ => None,
        }
    }

    pub fn cursor_moved(&mut self, position: PhysicalPosition<f64>) -> Option<InputEvent> {
        self.cursor = self.to_logical(position);
        self.mouse_down
            .then(|| InputEvent::moved(self.cursor, InputClass::Mouse))
    }

    pub fn mouse_input(&mut self, state: ElementState, button: MouseButton) -> Option<InputEvent> {
        if button != MouseButton::Left {
            return None;
        }
        match state {
            ElementState::Pressed if !self.mouse_down => {
                self.mouse_down = true;
                Some(InputEvent::down(self.cursor, InputClass::Mouse))
            }
            ElementState::Released if self.mouse_down => {
                self.mouse_down = false;
                Some(InputEvent::up(self.cursor, InputClass::Mouse))
            }
            _ => None,
        }
    }

    pub fn cursor_left(&mut self) -> Option<InputEvent> {
        if self.mouse_down {
            self.mouse_down = false;
            Some(InputEvent::cancel(self.cursor, InputClass::Mouse))
        } else {
            None
        }
    }

    pub fn touch(&mut self, touch: &Touch) -> Option<InputEvent> {
        self.touch_parts(touch.id, touch.phase, touch.location, touch.force)
    }

    /// Touch translation on decomposed fields.
    pub fn touch_parts(
        &mut self,
        id: u64,
        phase: TouchPhase,
        location: PhysicalPosition<f64>,
        force: Option<Force>,
    ) -> Option<InputEvent> {
        let position = self.to_logical(location);
        let class = classify_touch(force);

        match phase {
            TouchPhase::Started => {
                if self.active_touch.is_some() {
                    return None;
                }
                self.active_touch = Some(id);
                Some(InputEvent::down(position, class))
            }
            TouchPhase::Moved if self.active_touch == Some(id) => {
                Some(InputEvent::moved(position, class))
            }
            TouchPhase::Ended if self.active_touch == Some(id) => {
                self.active_touch = None;
                Some(InputEvent::up(position, class))
            }
            TouchPhase::Cancelled if self.active_touch == Some(id) => {
                self.active_touch = None;
                Some(InputEvent::cancel(position, class))
            }
            _ => None,
        }
    }

    fn to_logical(&self, position: PhysicalPosition<f64>) -> Point {
        Point::new(position.x / self.scale_factor, position.y / self.scale_factor)
    }
}

/// Touches reporting a pen altitude come from a stylus; everything else is a finger.
pub fn classify_touch(force: Option<Force>) -> InputClass {
    match force {
        Some(Force::Calibrated {
            altitude_angle: Some(_),
            ..
        }) => InputClass::Stylus,
        _ => InputClass::Finger,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(x: f64, y: f64) -> PhysicalPosition<f64> {
        PhysicalPosition::new(x, y)
    }

    fn pencil() -> Option<Force> {
        Some(Force::Calibrated {
            force: 0.5,
            max_possible_force: 1.0,
            altitude_angle: Some(0.8),
        })
    }

    #[test]
    fn test_input_mode_policy() {
        assert!(InputMode::FingerOnly.accepts(InputClass::Finger));
        assert!(!InputMode::FingerOnly.accepts(InputClass::Stylus));
        assert!(InputMode::StylusOnly.accepts(InputClass::Stylus));
        assert!(!InputMode::StylusOnly.accepts(InputClass::Finger));
        assert!(InputMode::StylusOnly.accepts(InputClass::Mouse));
        assert!(InputMode::FingerOnly.accepts(InputClass::Mouse));
    }

    #[test]
    fn test_classify_touch() {
        assert_eq!(classify_touch(pencil()), InputClass::Stylus);
        assert_eq!(classify_touch(Some(Force::Normalized(0.3))), InputClass::Finger);
        assert_eq!(classify_touch(None), InputClass::Finger);
    }

    #[test]
    fn test_mouse_drag_sequence() {
        let mut adapter = PlatformInputAdapter::new(2.0);

        // Hover without a button is not a canvas event.
        assert_eq!(adapter.cursor_moved(pos(20.0, 40.0)), None);

        let down = adapter
            .mouse_input(ElementState::Pressed, MouseButton::Left)
            .unwrap();
        assert_eq!(down, InputEvent::down(Point::new(10.0, 20.0), InputClass::Mouse));

        let moved = adapter.cursor_moved(pos(40.0, 40.0)).unwrap();
        assert_eq!(moved.phase, PointerPhase::Move);
        assert_eq!(moved.position, Point::new(20.0, 20.0));

        let up = adapter
            .mouse_input(ElementState::Released, MouseButton::Left)
            .unwrap();
        assert_eq!(up.phase, PointerPhase::Up);
    }

    #[test]
    fn test_right_button_ignored() {
        let mut adapter = PlatformInputAdapter::default();
        assert_eq!(adapter.mouse_input(ElementState::Pressed, MouseButton::Right), None);
    }

    #[test]
    fn test_cursor_left_cancels_drag() {
        let mut adapter = PlatformInputAdapter::default();
        adapter.mouse_input(ElementState::Pressed, MouseButton::Left);
        let cancel = adapter.cursor_left().unwrap();
        assert_eq!(cancel.phase, PointerPhase::Cancel);
        assert_eq!(adapter.cursor_left(), None);
    }

    #[test]
    fn test_second_touch_ignored() {
        let mut adapter = PlatformInputAdapter::default();
        let first = adapter
            .touch_parts(1, TouchPhase::Started, pos(5.0, 5.0), pencil())
            .unwrap();
        assert_eq!(first.class, InputClass::Stylus);

        assert_eq!(adapter.touch_parts(2, TouchPhase::Started, pos(9.0, 9.0), None), None);
        assert_eq!(adapter.touch_parts(2, TouchPhase::Moved, pos(9.0, 9.0), None), None);

        let moved = adapter
            .touch_parts(1, TouchPhase::Moved, pos(6.0, 6.0), pencil())
            .unwrap();
        assert_eq!(moved.phase, PointerPhase::Move);

        let ended = adapter
            .touch_parts(1, TouchPhase::Ended, pos(6.0, 6.0), pencil())
            .unwrap();
        assert_eq!(ended.phase, PointerPhase::Up);

        // Slot is free again.
        assert!(adapter.touch_parts(2, TouchPhase::Started, pos(1.0, 1.0), None).is_some());
    }

    #[test]
    fn test_touch_cancel() {
        let mut adapter = PlatformInputAdapter::default();
        adapter.touch_parts(3, TouchPhase::Started, pos(0.0, 0.0), None);
        let cancel = adapter
            .touch_parts(3, TouchPhase::Cancelled, pos(1.0, 0.0), None)
            .unwrap();
        assert_eq!(cancel.phase, PointerPhase::Cancel);
        assert_eq!(cancel.class, InputClass::Finger);
    }
}
