//! Gesture sampling and stroke building.
//!
//! One gesture at a time is accumulated into a [`StrokePath`]. Fast
//! movements are densified by linear interpolation so no segment exceeds
//! [`SMOOTHING_THRESHOLD`]; at commit the path is styled and, for the
//! highlighter, closed back to its first point.

use crate::constants::SMOOTHING_THRESHOLD;
use crate::input::InputClass;
use crate::path::StrokePath;
use crate::stroke::{Stroke, ToolType};
use crate::tools::ResolvedStyle;
use kurbo::Point;

/// Baseline interpolation steps for a class of input device.
///
/// Coarse, noisy input gets fewer steps; precise input gets more.
pub fn base_steps(class: InputClass) -> usize {
    match class {
        InputClass::Finger => 2,
        InputClass::Mouse => 3,
        InputClass::Stylus => 4,
    }
}

/// Upper bound on points inserted for a single jump.
pub const MAX_INTERPOLATION_STEPS: usize = 4096;

/// Interpolation steps used for a jump of length `distance`.
///
/// At least [`base_steps`], raised so every resulting segment is at most
/// `threshold` long, up to [`MAX_INTERPOLATION_STEPS`]. Non-finite
/// distances get no interpolation.
pub fn interpolation_steps(class: InputClass, distance: f64, threshold: f64) -> usize {
    if !distance.is_finite() || !threshold.is_finite() || threshold <= 0.0 {
        return 0;
    }
    let required = (distance / threshold)
        .ceil()
        .min(MAX_INTERPOLATION_STEPS as f64 + 1.0) as usize;
    base_steps(class)
        .max(required.saturating_sub(1))
        .min(MAX_INTERPOLATION_STEPS)
}

/// The gesture currently being drawn.
#[derive(Debug, Clone)]
struct ActiveGesture {
    class: InputClass,
    path: StrokePath,
    last: Point,
}

/// Accumulates one gesture at a time and turns it into a [`Stroke`].
#[derive(Debug, Clone)]
pub struct StrokeBuilder {
    active: Option<ActiveGesture>,
    threshold: f64,
}

impl Default for StrokeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StrokeBuilder {
    pub fn new() -> Self {
        Self::with_threshold(SMOOTHING_THRESHOLD)
    }

    /// Builder with a custom interpolation threshold.
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            active: None,
            threshold: if threshold > 0.0 {
                threshold
            } else {
                SMOOTHING_THRESHOLD
            },
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether a gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Input class of the gesture in progress.
    pub fn active_class(&self) -> Option<InputClass> {
        self.active.as_ref().map(|g| g.class)
    }

    /// Begin a gesture. Returns `false` (and changes nothing) if one is
    /// already active or `point` is not finite.
    pub fn on_start(&mut self, point: Point, class: InputClass) -> bool {
        if self.active.is_some() || !point.is_finite() {
            return false;
        }
        self.active = Some(ActiveGesture {
            class,
            path: StrokePath::begin(point),
            last: point,
        });
        true
    }

    /// Extend the gesture. Updates from a different input class than the
    /// one that started the gesture, and non-finite points, are ignored.
    pub fn on_update(&mut self, point: Point, class: InputClass) {
        let threshold = self.threshold;
        let Some(gesture) = self.active.as_mut() else {
            return;
        };
        if gesture.class != class || !point.is_finite() {
            return;
        }

        let last = gesture.last;
        let distance = last.distance(point);
        if distance == 0.0 {
            return;
        }

        if distance > threshold {
            let steps = interpolation_steps(class, distance, threshold);
            let segments = (steps + 1) as f64;
            for i in 1..=steps {
                gesture.path.line_to(last.lerp(point, i as f64 / segments));
            }
        }
        gesture.path.line_to(point);
        gesture.last = point;
    }

    /// Finish the gesture and build a stroke with `style`.
    ///
    /// Returns `None` when no gesture was active or it never produced a
    /// line segment.
    pub fn on_end(&mut self, style: &ResolvedStyle) -> Option<Stroke> {
        let gesture = self.active.take()?;
        let mut path = gesture.path;
        if !path.has_segments() {
            return None;
        }

        if style.tool == ToolType::Highlighter {
            if let Some(first) = path.first_point() {
                path.line_to(first);
            }
        }

        match Stroke::new(path, style.color, style.width, style.tool, style.is_eraser) {
            Ok(stroke) => Some(stroke),
            Err(e) => {
                log::warn!("Discarding gesture: {}", e);
                None
            }
        }
    }

    /// Abandon the gesture in progress.
    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// Path of the gesture in progress, for live preview.
    pub fn preview(&self) -> Option<&StrokePath> {
        self.active.as_ref().map(|g| &g.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::SerializableColor;
    use crate::path::PathCommand;

    fn style(tool: ToolType) -> ResolvedStyle {
        ResolvedStyle {
            color: SerializableColor::black(),
            width: 3.0,
            tool,
            is_eraser: false,
        }
    }

    #[test]
    fn test_single_gesture_only() {
        let mut builder = StrokeBuilder::new();
        assert!(builder.on_start(Point::new(0.0, 0.0), InputClass::Stylus));
        assert!(!builder.on_start(Point::new(50.0, 50.0), InputClass::Stylus));
        assert_eq!(builder.preview().unwrap().first_point(), Some(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_short_moves_append_directly() {
        let mut builder = StrokeBuilder::new();
        builder.on_start(Point::new(0.0, 0.0), InputClass::Finger);
        builder.on_update(Point::new(3.0, 0.0), InputClass::Finger);
        builder.on_update(Point::new(6.0, 0.0), InputClass::Finger);
        assert_eq!(builder.preview().unwrap().len(), 3);
    }

    #[test]
    fn test_duplicate_points_skipped() {
        let mut builder = StrokeBuilder::new();
        builder.on_start(Point::new(1.0, 1.0), InputClass::Finger);
        builder.on_update(Point::new(1.0, 1.0), InputClass::Finger);
        assert_eq!(builder.preview().unwrap().len(), 1);
    }

    #[test]
    fn test_interpolation_steps_by_class() {
        // A jump just over the threshold uses the class baseline.
        let mut finger = StrokeBuilder::new();
        finger.on_start(Point::ZERO, InputClass::Finger);
        finger.on_update(Point::new(9.0, 0.0), InputClass::Finger);
        assert_eq!(finger.preview().unwrap().len(), 1 + 2 + 1);

        let mut stylus = StrokeBuilder::new();
        stylus.on_start(Point::ZERO, InputClass::Stylus);
        stylus.on_update(Point::new(9.0, 0.0), InputClass::Stylus);
        assert_eq!(stylus.preview().unwrap().len(), 1 + 4 + 1);
    }

    #[test]
    fn test_smoothing_bound() {
        let threshold = SMOOTHING_THRESHOLD;
        let raw = [
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
            Point::new(100.0, 3.0),
            Point::new(-250.0, 410.0),
            Point::new(-249.0, 409.0),
        ];
        for class in [InputClass::Finger, InputClass::Mouse, InputClass::Stylus] {
            let mut builder = StrokeBuilder::new();
            builder.on_start(raw[0], class);
            for p in &raw[1..] {
                builder.on_update(*p, class);
            }
            let points: Vec<Point> = builder.preview().unwrap().points().collect();
            for pair in points.windows(2) {
                assert!(
                    pair[0].distance(pair[1]) <= threshold + 1e-9,
                    "segment {:?} -> {:?} too long for {:?}",
                    pair[0],
                    pair[1],
                    class
                );
            }
            assert_eq!(points.last(), raw.last());
        }
    }

    #[test]
    fn test_non_finite_points_ignored() {
        let mut builder = StrokeBuilder::new();
        assert!(!builder.on_start(Point::new(f64::NAN, 0.0), InputClass::Stylus));
        assert!(!builder.is_active());

        builder.on_start(Point::new(1.0, 1.0), InputClass::Stylus);
        builder.on_update(Point::new(4.0, 1.0), InputClass::Stylus);
        let before = builder.preview().unwrap().clone();
        builder.on_update(Point::new(f64::INFINITY, 0.0), InputClass::Stylus);
        builder.on_update(Point::new(f64::NAN, 2.0), InputClass::Stylus);
        assert_eq!(builder.preview().unwrap(), &before);
    }

    #[test]
    fn test_huge_jump_is_capped() {
        assert_eq!(interpolation_steps(InputClass::Finger, f64::INFINITY, 8.0), 0);
        assert_eq!(
            interpolation_steps(InputClass::Finger, 1e9, 8.0),
            MAX_INTERPOLATION_STEPS
        );

        let mut builder = StrokeBuilder::new();
        builder.on_start(Point::ZERO, InputClass::Mouse);
        builder.on_update(Point::new(1e9, 0.0), InputClass::Mouse);
        let path = builder.preview().unwrap();
        assert_eq!(path.len(), 1 + MAX_INTERPOLATION_STEPS + 1);
        assert_eq!(path.last_point(), Some(Point::new(1e9, 0.0)));
    }

    #[test]
    fn test_other_class_updates_ignored() {
        let mut builder = StrokeBuilder::new();
        builder.on_start(Point::ZERO, InputClass::Stylus);
        builder.on_update(Point::new(5.0, 5.0), InputClass::Finger);
        assert_eq!(builder.preview().unwrap().len(), 1);
    }

    #[test]
    fn test_tap_produces_no_stroke() {
        let mut builder = StrokeBuilder::new();
        builder.on_start(Point::new(4.0, 4.0), InputClass::Finger);
        assert!(builder.on_end(&style(ToolType::Normal)).is_none());
        assert!(!builder.is_active());
    }

    #[test]
    fn test_end_without_start() {
        let mut builder = StrokeBuilder::new();
        assert!(builder.on_end(&style(ToolType::Normal)).is_none());
    }

    #[test]
    fn test_cancel_discards() {
        let mut builder = StrokeBuilder::new();
        builder.on_start(Point::ZERO, InputClass::Finger);
        builder.on_update(Point::new(5.0, 0.0), InputClass::Finger);
        builder.cancel();
        assert!(!builder.is_active());
        assert!(builder.on_end(&style(ToolType::Normal)).is_none());
    }

    #[test]
    fn test_highlighter_closes_path() {
        let mut builder = StrokeBuilder::new();
        builder.on_start(Point::new(10.0, 10.0), InputClass::Stylus);
        builder.on_update(Point::new(15.0, 10.0), InputClass::Stylus);
        builder.on_update(Point::new(15.0, 15.0), InputClass::Stylus);
        let stroke = builder.on_end(&style(ToolType::Highlighter)).unwrap();
        assert_eq!(
            stroke.path().commands().last(),
            Some(&PathCommand::LineTo(Point::new(10.0, 10.0)))
        );
        assert!(stroke.path().is_closed());
    }

    #[test]
    fn test_normal_and_telestrator_stay_open() {
        for tool in [ToolType::Normal, ToolType::Telestrator] {
            let mut builder = StrokeBuilder::new();
            builder.on_start(Point::new(10.0, 10.0), InputClass::Stylus);
            builder.on_update(Point::new(15.0, 10.0), InputClass::Stylus);
            let stroke = builder.on_end(&style(tool)).unwrap();
            assert_eq!(stroke.path().len(), 2);
            assert!(!stroke.path().is_closed());
        }
    }

    #[test]
    fn test_style_is_applied() {
        let mut builder = StrokeBuilder::new();
        builder.on_start(Point::ZERO, InputClass::Mouse);
        builder.on_update(Point::new(2.0, 2.0), InputClass::Mouse);
        let resolved = ResolvedStyle {
            color: SerializableColor::white(),
            width: 12.0,
            tool: ToolType::Normal,
            is_eraser: true,
        };
        let stroke = builder.on_end(&resolved).unwrap();
        assert!(stroke.is_eraser());
        assert_eq!(stroke.color(), SerializableColor::white());
        assert!((stroke.stroke_width() - 12.0).abs() < f64::EPSILON);
    }
}
