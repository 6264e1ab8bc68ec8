//! Stroke paths: move/line command lists and their text encoding.
//!
//! Paths are encoded as a compact description string, e.g. `M10 20 L12.5 21 L15 23`.
//! Coordinates use Rust's shortest round-trip float formatting, so a path
//! survives an encode/decode cycle bit-for-bit.

use kurbo::{BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when building or parsing a path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    #[error("path is empty")]
    Empty,
    #[error("path must start with a move command")]
    MissingMoveTo,
    #[error("path has no line segments")]
    NoSegments,
    #[error("non-finite coordinate in path")]
    NonFinite,
    #[error("unexpected character {0:?} at offset {1}")]
    UnexpectedChar(char, usize),
    #[error("invalid number {0:?}")]
    InvalidNumber(String),
    #[error("command {0} is missing coordinates")]
    MissingCoordinate(char),
}

/// A single drawing command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
}

impl PathCommand {
    /// The point this command moves or draws to.
    pub fn point(&self) -> Point {
        match *self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => p,
        }
    }

    /// Same command kind, different point.
    pub fn with_point(&self, point: Point) -> Self {
        match self {
            PathCommand::MoveTo(_) => PathCommand::MoveTo(point),
            PathCommand::LineTo(_) => PathCommand::LineTo(point),
        }
    }
}

/// An ordered list of move/line commands.
///
/// Always starts with a `MoveTo`. Committed strokes additionally carry at
/// least one `LineTo`; see [`StrokePath::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokePath {
    commands: Vec<PathCommand>,
}

impl StrokePath {
    /// Start a new path at `start`.
    pub fn begin(start: Point) -> Self {
        Self {
            commands: vec![PathCommand::MoveTo(start)],
        }
    }

    /// Build from raw commands, checking structure and coordinates.
    pub fn from_commands(commands: Vec<PathCommand>) -> Result<Self, PathError> {
        let path = Self { commands };
        path.validate()?;
        Ok(path)
    }

    /// Check that this path is a drawable stroke path.
    pub fn validate(&self) -> Result<(), PathError> {
        match self.commands.first() {
            None => return Err(PathError::Empty),
            Some(PathCommand::LineTo(_)) => return Err(PathError::MissingMoveTo),
            Some(PathCommand::MoveTo(_)) => {}
        }
        if self
            .commands
            .iter()
            .any(|c| !c.point().x.is_finite() || !c.point().y.is_finite())
        {
            return Err(PathError::NonFinite);
        }
        if !self.has_segments() {
            return Err(PathError::NoSegments);
        }
        Ok(())
    }

    /// Append a line command.
    pub fn line_to(&mut self, point: Point) {
        self.commands.push(PathCommand::LineTo(point));
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Whether at least one line segment exists.
    pub fn has_segments(&self) -> bool {
        self.commands
            .iter()
            .any(|c| matches!(c, PathCommand::LineTo(_)))
    }

    pub fn first_point(&self) -> Option<Point> {
        self.commands.first().map(PathCommand::point)
    }

    pub fn last_point(&self) -> Option<Point> {
        self.commands.last().map(PathCommand::point)
    }

    /// Iterate over all command points in order.
    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.commands.iter().map(PathCommand::point)
    }

    /// Whether the last point coincides with the first.
    pub fn is_closed(&self) -> bool {
        match (self.first_point(), self.last_point()) {
            (Some(first), Some(last)) => self.len() > 1 && first == last,
            _ => false,
        }
    }

    /// Bounding box of all points.
    pub fn bounds(&self) -> Rect {
        let mut points = self.points();
        let Some(first) = points.next() else {
            return Rect::ZERO;
        };
        points.fold(Rect::from_points(first, first), |rect, p| rect.union_pt(p))
    }

    /// Convert to a kurbo path for rendering.
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => path.move_to(p),
                PathCommand::LineTo(p) => path.line_to(p),
            }
        }
        path
    }

    /// Map every point through `f`, keeping command kinds and order.
    pub fn map_points(&self, mut f: impl FnMut(Point) -> Point) -> Self {
        Self {
            commands: self
                .commands
                .iter()
                .map(|c| c.with_point(f(c.point())))
                .collect(),
        }
    }

    /// Encode as a path-description string.
    pub fn to_description(&self) -> String {
        let mut out = String::with_capacity(self.commands.len() * 12);
        for (i, command) in self.commands.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let (letter, p) = match *command {
                PathCommand::MoveTo(p) => ('M', p),
                PathCommand::LineTo(p) => ('L', p),
            };
            // Writing to a String cannot fail.
            let _ = write!(out, "{letter}{} {}", p.x, p.y);
        }
        out
    }

    /// Parse a path-description string.
    ///
    /// Accepts `M`/`L` commands (either case) with whitespace or comma
    /// separators. Extra coordinate pairs after a command repeat it as line
    /// commands, as in SVG.
    pub fn parse_description(input: &str) -> Result<Self, PathError> {
        let mut scanner = Scanner::new(input);
        let mut commands = Vec::new();
        let mut current: Option<char> = None;

        loop {
            scanner.skip_separators();
            let Some(ch) = scanner.peek() else { break };
            let letter = if ch.is_ascii_alphabetic() {
                scanner.bump();
                match ch.to_ascii_uppercase() {
                    'M' | 'L' => ch.to_ascii_uppercase(),
                    _ => return Err(PathError::UnexpectedChar(ch, scanner.pos - 1)),
                }
            } else {
                match current {
                    // Implicit repeat: pairs following M are line commands.
                    Some(_) => 'L',
                    None => return Err(PathError::MissingMoveTo),
                }
            };

            let x = scanner
                .number()?
                .ok_or(PathError::MissingCoordinate(letter))?;
            let y = scanner
                .number()?
                .ok_or(PathError::MissingCoordinate(letter))?;
            let point = Point::new(x, y);
            commands.push(if letter == 'M' {
                PathCommand::MoveTo(point)
            } else {
                PathCommand::LineTo(point)
            });
            current = Some(letter);
        }

        Self::from_commands(commands)
    }
}

impl fmt::Display for StrokePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_description())
    }
}

impl FromStr for StrokePath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_description(s)
    }
}

/// Minimal cursor over a path description.
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(ch) = self.peek() {
            self.pos += ch.len_utf8();
        }
    }

    fn skip_separators(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() || ch == ',' {
                self.bump();
            } else {
                break;
            }
        }
    }

    /// Read the next number, or `None` if the next token is not numeric.
    fn number(&mut self) -> Result<Option<f64>, PathError> {
        self.skip_separators();
        let start = self.pos;
        if matches!(self.peek(), Some('+' | '-')) {
            self.bump();
        }
        let mut seen_digit = false;
        let mut seen_dot = false;
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                seen_digit = true;
                self.bump();
            } else if ch == '.' && !seen_dot {
                seen_dot = true;
                self.bump();
            } else {
                break;
            }
        }
        if seen_digit && matches!(self.peek(), Some('e' | 'E')) {
            self.bump();
            if matches!(self.peek(), Some('+' | '-')) {
                self.bump();
            }
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.bump();
            }
        }

        let token = &self.input[start..self.pos];
        if token.is_empty() {
            return Ok(None);
        }
        if !seen_digit {
            return Err(PathError::InvalidNumber(token.to_string()));
        }
        token
            .parse::<f64>()
            .map(Some)
            .map_err(|_| PathError::InvalidNumber(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> StrokePath {
        let mut path = StrokePath::begin(Point::new(10.0, 20.0));
        path.line_to(Point::new(12.5, 21.0));
        path.line_to(Point::new(-3.25, 1e-7));
        path
    }

    #[test]
    fn test_description_format() {
        let path = sample();
        assert_eq!(path.to_description(), "M10 20 L12.5 21 L-3.25 0.0000001");
    }

    #[test]
    fn test_description_is_exact() {
        let mut path = StrokePath::begin(Point::new(0.1 + 0.2, 1.0 / 3.0));
        path.line_to(Point::new(std::f64::consts::PI, -1234.5678e10));
        let parsed: StrokePath = path.to_description().parse().unwrap();
        assert_eq!(parsed, path);
    }

    #[test]
    fn test_parse_separators_and_implicit_lines() {
        let path = StrokePath::parse_description("m 1,2 3 4 L5,6").unwrap();
        assert_eq!(
            path.commands(),
            &[
                PathCommand::MoveTo(Point::new(1.0, 2.0)),
                PathCommand::LineTo(Point::new(3.0, 4.0)),
                PathCommand::LineTo(Point::new(5.0, 6.0)),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert_eq!(StrokePath::parse_description(""), Err(PathError::Empty));
        assert_eq!(
            StrokePath::parse_description("L1 2 L3 4"),
            Err(PathError::MissingMoveTo)
        );
        assert_eq!(
            StrokePath::parse_description("M1 2"),
            Err(PathError::NoSegments)
        );
        assert!(matches!(
            StrokePath::parse_description("M1 2 Q3 4"),
            Err(PathError::UnexpectedChar('Q', _))
        ));
        assert_eq!(
            StrokePath::parse_description("M1 2 L3"),
            Err(PathError::MissingCoordinate('L'))
        );
        assert!(matches!(
            StrokePath::parse_description("M1 2 L- 4"),
            Err(PathError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_from_commands_rejects_non_finite() {
        let result = StrokePath::from_commands(vec![
            PathCommand::MoveTo(Point::new(0.0, 0.0)),
            PathCommand::LineTo(Point::new(f64::NAN, 1.0)),
        ]);
        assert_eq!(result, Err(PathError::NonFinite));
    }

    #[test]
    fn test_bounds() {
        let bounds = sample().bounds();
        assert!((bounds.x0 + 3.25).abs() < f64::EPSILON);
        assert!((bounds.x1 - 12.5).abs() < f64::EPSILON);
        assert!((bounds.y1 - 21.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_is_closed() {
        let mut path = sample();
        assert!(!path.is_closed());
        path.line_to(Point::new(10.0, 20.0));
        assert!(path.is_closed());
    }

    #[test]
    fn test_to_bez_path_keeps_structure() {
        let bez = sample().to_bez_path();
        assert_eq!(bez.elements().len(), 3);
        assert!(matches!(bez.elements()[0], kurbo::PathEl::MoveTo(_)));
    }
}
