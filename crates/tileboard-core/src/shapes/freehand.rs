//! Freehand strokes and the transient laser-pointer trail.

use super::ShapeStyle;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// A freehand drawing (series of points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Freehand {
    pub points: Vec<Point>,
    #[serde(default)]
    pub style: ShapeStyle,
}

impl Freehand {
    pub fn from_points(points: Vec<Point>) -> Self {
        Self {
            points,
            style: ShapeStyle::default(),
        }
    }
}

/// Laser-pointer trail. Never selectable and has no bounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Laser {
    pub points: Vec<Point>,
}
