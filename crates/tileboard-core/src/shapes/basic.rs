//! Rectangles, diamonds and ellipses.

use super::ShapeStyle;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasicKind {
    #[default]
    Rectangle,
    Diamond,
    Ellipse,
}

/// A closed shape described by its axis-aligned geometry box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicShape {
    #[serde(default)]
    pub kind: BasicKind,
    /// Top-left corner position.
    pub position: Point,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub style: ShapeStyle,
}

impl BasicShape {
    pub fn new(kind: BasicKind, position: Point, width: f64, height: f64) -> Self {
        Self {
            kind,
            position,
            width,
            height,
            style: ShapeStyle::default(),
        }
    }

    /// Geometry box, normalized for negative extents.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            self.position.x + self.width,
            self.position.y + self.height,
        )
        .abs()
    }
}
