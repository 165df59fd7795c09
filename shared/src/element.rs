//! Drawn elements and the per-gesture update rules.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::Point;

pub const DEFAULT_COLOR: &str = "#000000";
pub const DEFAULT_BRUSH_WIDTH: u32 = 2;
const MAX_COLOR_LEN: usize = 32;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tool {
    #[default]
    Pencil,
    Line,
    Rectangle,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Pencil, Tool::Line, Tool::Rectangle];

    /// Value used by the tool radio inputs.
    pub fn as_str(self) -> &'static str {
        match self {
            Tool::Pencil => "pencil",
            Tool::Line => "line",
            Tool::Rectangle => "rect",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown tool: {0:?}")]
pub struct ParseToolError(pub String);

impl FromStr for Tool {
    type Err = ParseToolError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pencil" => Ok(Tool::Pencil),
            "line" => Ok(Tool::Line),
            "rect" | "rectangle" => Ok(Tool::Rectangle),
            other => Err(ParseToolError(other.to_string())),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    pub color: String,
    pub width: u32,
}

impl StrokeStyle {
    pub fn new(color: impl Into<String>, width: u32) -> Self {
        Self {
            color: sanitize_color(color.into()),
            width: sanitize_width(width),
        }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::new(DEFAULT_COLOR, DEFAULT_BRUSH_WIDTH)
    }
}

pub fn sanitize_color(mut color: String) -> String {
    if color.is_empty() {
        return DEFAULT_COLOR.to_string();
    }
    if color.len() > MAX_COLOR_LEN {
        let mut end = MAX_COLOR_LEN;
        while !color.is_char_boundary(end) {
            end -= 1;
        }
        color.truncate(end);
    }
    color
}

pub fn sanitize_width(width: u32) -> u32 {
    width.max(1)
}

/// A single drawn shape.
///
/// The origin is fixed at pointer-down. Each variant stores the style that
/// was current when the gesture began, so rendering never consults the
/// session's live tool state.
#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    Pencil {
        origin: Point,
        path: Vec<Point>,
        style: StrokeStyle,
    },
    Line {
        origin: Point,
        delta_x: f64,
        delta_y: f64,
        style: StrokeStyle,
    },
    Rectangle {
        origin: Point,
        width: f64,
        height: f64,
        style: StrokeStyle,
    },
}

impl Element {
    pub fn begin(tool: Tool, origin: Point, style: StrokeStyle) -> Self {
        match tool {
            Tool::Pencil => Element::Pencil {
                origin,
                path: vec![origin],
                style,
            },
            Tool::Line => Element::Line {
                origin,
                delta_x: 0.0,
                delta_y: 0.0,
                style,
            },
            Tool::Rectangle => Element::Rectangle {
                origin,
                width: 0.0,
                height: 0.0,
                style,
            },
        }
    }

    /// Applies one pointer-move sample.
    ///
    /// Pencil paths grow by exactly one point. Lines and rectangles are
    /// recomputed as the offset from the origin, never accumulated.
    pub fn extend(mut self, point: Point) -> Self {
        match &mut self {
            Element::Pencil { path, .. } => path.push(point),
            Element::Line {
                origin,
                delta_x,
                delta_y,
                ..
            } => {
                *delta_x = point.x - origin.x;
                *delta_y = point.y - origin.y;
            }
            Element::Rectangle {
                origin,
                width,
                height,
                ..
            } => {
                *width = point.x - origin.x;
                *height = point.y - origin.y;
            }
        }
        self
    }

    pub fn tool(&self) -> Tool {
        match self {
            Element::Pencil { .. } => Tool::Pencil,
            Element::Line { .. } => Tool::Line,
            Element::Rectangle { .. } => Tool::Rectangle,
        }
    }

    pub fn origin(&self) -> Point {
        match self {
            Element::Pencil { origin, .. }
            | Element::Line { origin, .. }
            | Element::Rectangle { origin, .. } => *origin,
        }
    }

    pub fn style(&self) -> &StrokeStyle {
        match self {
            Element::Pencil { style, .. }
            | Element::Line { style, .. }
            | Element::Rectangle { style, .. } => style,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pencil_appends_each_sample() {
        let element = Element::begin(Tool::Pencil, Point::new(10.0, 10.0), StrokeStyle::default())
            .extend(Point::new(12.0, 11.0))
            .extend(Point::new(15.0, 9.0));
        match element {
            Element::Pencil { path, origin, .. } => {
                assert_eq!(origin, Point::new(10.0, 10.0));
                assert_eq!(
                    path,
                    vec![
                        Point::new(10.0, 10.0),
                        Point::new(12.0, 11.0),
                        Point::new(15.0, 9.0)
                    ]
                );
            }
            other => panic!("expected pencil, got {other:?}"),
        }
    }

    #[test]
    fn rectangle_uses_last_sample_only() {
        let element = Element::begin(Tool::Rectangle, Point::new(5.0, 5.0), StrokeStyle::default())
            .extend(Point::new(100.0, 3.0))
            .extend(Point::new(-20.0, 80.0))
            .extend(Point::new(30.0, 45.0));
        assert_eq!(
            element,
            Element::Rectangle {
                origin: Point::new(5.0, 5.0),
                width: 25.0,
                height: 40.0,
                style: StrokeStyle::default(),
            }
        );
    }

    #[test]
    fn line_delta_is_relative_to_origin() {
        let element = Element::begin(Tool::Line, Point::new(10.0, 20.0), StrokeStyle::default())
            .extend(Point::new(11.0, 21.0))
            .extend(Point::new(4.0, 50.0));
        match element {
            Element::Line {
                delta_x, delta_y, ..
            } => {
                assert_eq!(delta_x, -6.0);
                assert_eq!(delta_y, 30.0);
            }
            other => panic!("expected line, got {other:?}"),
        }
    }

    #[test]
    fn tool_parsing_rejects_unknown_values() {
        assert_eq!("rect".parse::<Tool>(), Ok(Tool::Rectangle));
        assert_eq!("line".parse::<Tool>(), Ok(Tool::Line));
        assert_eq!(
            "eraser".parse::<Tool>(),
            Err(ParseToolError("eraser".to_string()))
        );
        for tool in Tool::ALL {
            assert_eq!(tool.as_str().parse::<Tool>(), Ok(tool));
        }
    }

    #[test]
    fn style_is_sanitized() {
        let style = StrokeStyle::new("", 0);
        assert_eq!(style.color, DEFAULT_COLOR);
        assert_eq!(style.width, 1);
        let long = StrokeStyle::new("#".repeat(40), 3);
        assert_eq!(long.color.len(), 32);
    }
}
