//! Coordinate remapping between canvas spaces.
//!
//! The live canvas renders strokes with [`CanvasTransform::IDENTITY`]; the
//! export path remaps the same strokes into a differently sized target.

use crate::path::StrokePath;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Remap every point of `path` to `(x * scale + offset_x, y * scale + offset_y)`.
///
/// Pure: command order and move/line structure are preserved and the input
/// is not modified.
pub fn transform_path(path: &StrokePath, scale: f64, offset_x: f64, offset_y: f64) -> StrokePath {
    path.map_points(|p| Point::new(p.x * scale + offset_x, p.y * scale + offset_y))
}

/// Uniform scale followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasTransform {
    pub scale: f64,
    pub offset: Vec2,
}

impl Default for CanvasTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl CanvasTransform {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        offset: Vec2::ZERO,
    };

    pub fn new(scale: f64, offset: Vec2) -> Self {
        Self { scale, offset }
    }

    /// Whether this transform leaves coordinates unchanged.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Apply to a path.
    pub fn apply(&self, path: &StrokePath) -> StrokePath {
        transform_path(path, self.scale, self.offset.x, self.offset.y)
    }

    /// Apply to a single point.
    pub fn apply_point(&self, point: Point) -> Point {
        Point::new(
            point.x * self.scale + self.offset.x,
            point.y * self.scale + self.offset.y,
        )
    }

    /// Apply to a rectangle.
    pub fn apply_rect(&self, rect: Rect) -> Rect {
        Rect::from_points(self.apply_point(rect.origin()), self.apply_point(Point::new(rect.x1, rect.y1)))
    }

    /// The transform that undoes this one, i.e. `(1/k, -dx/k, -dy/k)`.
    pub fn inverse(&self) -> Self {
        Self {
            scale: 1.0 / self.scale,
            offset: Vec2::new(-self.offset.x / self.scale, -self.offset.y / self.scale),
        }
    }

    /// Equivalent kurbo affine.
    pub fn to_affine(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.scale)
    }

    /// Fit a `source` canvas into `target`, preserving aspect ratio and
    /// centering the result.
    pub fn fit(source: Size, target: Rect) -> Self {
        if source.width <= 0.0 || source.height <= 0.0 || target.is_zero_area() {
            return Self::new(1.0, target.origin().to_vec2());
        }

        let scale = (target.width() / source.width).min(target.height() / source.height);
        let fitted = Size::new(source.width * scale, source.height * scale);
        let offset = Vec2::new(
            target.x0 + (target.width() - fitted.width) / 2.0,
            target.y0 + (target.height() - fitted.height) / 2.0,
        );
        Self { scale, offset }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::PathCommand;

    fn sample() -> StrokePath {
        let mut path = StrokePath::begin(Point::new(3.0, 4.0));
        path.line_to(Point::new(10.5, -2.0));
        path.line_to(Point::new(100.0, 250.25));
        path
    }

    fn assert_close(a: &StrokePath, b: &StrokePath) {
        assert_eq!(a.len(), b.len());
        for (ca, cb) in a.commands().iter().zip(b.commands()) {
            assert_eq!(
                std::mem::discriminant(ca),
                std::mem::discriminant(cb),
                "command kinds differ"
            );
            assert!((ca.point().x - cb.point().x).abs() < 1e-9);
            assert!((ca.point().y - cb.point().y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_transform_maps_points() {
        let out = transform_path(&sample(), 2.0, 10.0, -5.0);
        assert_eq!(out.commands()[0], PathCommand::MoveTo(Point::new(16.0, 3.0)));
        assert_eq!(out.commands()[1], PathCommand::LineTo(Point::new(31.0, -9.0)));
    }

    #[test]
    fn test_identity_is_noop() {
        let path = sample();
        assert_eq!(CanvasTransform::IDENTITY.apply(&path), path);
    }

    #[test]
    fn test_round_trip() {
        let path = sample();
        for &(k, dx, dy) in &[(2.0, 10.0, -5.0), (0.37, -120.5, 33.3), (7.5, 0.0, 0.0)] {
            let there = transform_path(&path, k, dx, dy);
            let back = transform_path(&there, 1.0 / k, -dx / k, -dy / k);
            assert_close(&back, &path);
        }
    }

    #[test]
    fn test_inverse_matches_formula() {
        let t = CanvasTransform::new(4.0, Vec2::new(8.0, -12.0));
        let path = sample();
        assert_close(&t.inverse().apply(&t.apply(&path)), &path);
    }

    #[test]
    fn test_affine_agrees() {
        let t = CanvasTransform::new(1.5, Vec2::new(30.0, -20.0));
        let p = Point::new(123.0, 456.0);
        let a = t.to_affine() * p;
        let b = t.apply_point(p);
        assert!((a.x - b.x).abs() < 1e-10);
        assert!((a.y - b.y).abs() < 1e-10);
    }

    #[test]
    fn test_fit_letterboxes() {
        // 800x600 into 400x400: limited by width, centered vertically.
        let t = CanvasTransform::fit(Size::new(800.0, 600.0), Rect::new(0.0, 0.0, 400.0, 400.0));
        assert!((t.scale - 0.5).abs() < f64::EPSILON);
        assert!((t.offset.x).abs() < f64::EPSILON);
        assert!((t.offset.y - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_degenerate_source() {
        let t = CanvasTransform::fit(Size::ZERO, Rect::new(10.0, 20.0, 110.0, 120.0));
        assert!((t.scale - 1.0).abs() < f64::EPSILON);
        assert_eq!(t.offset, Vec2::new(10.0, 20.0));
    }
}
