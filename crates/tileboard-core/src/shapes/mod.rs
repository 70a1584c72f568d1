//! Board element definitions.

mod basic;
mod connector;
mod frame;
mod freehand;
mod text;

pub use basic::{BasicKind, BasicShape};
pub use connector::{AnchorPosition, Connection, Connector, ConnectorEnd, ConnectorKind, PathStyle};
pub use frame::{Frame, FrameKind, TileKind};
pub use freehand::{Freehand, Laser};
pub use text::Text;

use kurbo::{Point, Rect};
use peniko::Color;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Stroke and fill properties shared by drawable elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    pub stroke_color: SerializableColor,
    pub stroke_width: f64,
    /// Fill color (None = no fill).
    #[serde(default)]
    pub fill_color: Option<SerializableColor>,
}

impl ShapeStyle {
    /// Get the stroke color as a peniko Color.
    pub fn stroke(&self) -> Color {
        self.stroke_color.into()
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: SerializableColor::black(),
            stroke_width: 2.0,
            fill_color: None,
        }
    }
}

/// Unique identifier for board elements.
pub type ElementId = Uuid;
/// Identifier shared by every member of a group.
pub type GroupId = Uuid;

/// Geometry payload of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    Connector(Connector),
    Basic(BasicShape),
    Frame(Frame),
    Text(Text),
    Freehand(Freehand),
    Laser(Laser),
}

impl Shape {
    /// Stroke width used for bounds padding (0 for unstroked shapes).
    pub fn stroke_width(&self) -> f64 {
        match self {
            Shape::Connector(c) => c.style.stroke_width,
            Shape::Basic(b) => b.style.stroke_width,
            Shape::Freehand(f) => f.style.stroke_width,
            Shape::Frame(_) | Shape::Text(_) | Shape::Laser(_) => 0.0,
        }
    }

    pub fn is_connector(&self) -> bool {
        matches!(self, Shape::Connector(_))
    }
}

/// A board element: identity, grouping, rotation and geometry.
///
/// `version` is bumped by the store on every write and, together with `id`,
/// identifies one immutable revision of the element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub version: u32,
    /// Rotation in degrees around the element's bounding-box centre.
    #[serde(default)]
    pub rotation: f64,
    pub shape: Shape,
}

impl Element {
    /// Create a new element with a fresh id.
    pub fn new(shape: Shape) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id: None,
            version: 0,
            rotation: 0.0,
            shape,
        }
    }

    pub fn with_group(mut self, group_id: GroupId) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn as_connector(&self) -> Option<&Connector> {
        match &self.shape {
            Shape::Connector(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_connector_mut(&mut self) -> Option<&mut Connector> {
        match &mut self.shape {
            Shape::Connector(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_connector(&self) -> bool {
        self.shape.is_connector()
    }
}

/// Distance from a point to a line segment (a→b).
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = b - a;
    let pv = point - a;
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    point.distance(a + seg * t)
}

/// Minimum distance from a point to a polyline.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => point.distance(*only),
        _ => points
            .windows(2)
            .map(|w| point_to_segment_dist(point, w[0], w[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Test if two line segments (a-b) and (c-d) intersect, touching included.
pub fn segments_intersect(a: Point, b: Point, c: Point, d: Point) -> bool {
    let cross = |o: Point, p: Point, q: Point| -> f64 { (p.x - o.x) * (q.y - o.y) - (p.y - o.y) * (q.x - o.x) };
    let d1 = cross(c, d, a);
    let d2 = cross(c, d, b);
    let d3 = cross(a, b, c);
    let d4 = cross(a, b, d);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0)) && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0)) {
        return true;
    }
    let on_segment = |p: Point, q: Point, r: Point| -> bool {
        r.x >= p.x.min(q.x) && r.x <= p.x.max(q.x) && r.y >= p.y.min(q.y) && r.y <= p.y.max(q.y)
    };
    (d1.abs() < 1e-10 && on_segment(c, d, a))
        || (d2.abs() < 1e-10 && on_segment(c, d, b))
        || (d3.abs() < 1e-10 && on_segment(a, b, c))
        || (d4.abs() < 1e-10 && on_segment(a, b, d))
}

/// Point-in-rectangle test that includes the far edges.
///
/// `Rect::contains` is half-open, which is wrong for containment of boxes
/// that share an edge with the selection.
pub fn rect_contains_inclusive(rect: Rect, p: Point) -> bool {
    p.x >= rect.x0 && p.x <= rect.x1 && p.y >= rect.y0 && p.y <= rect.y1
}

/// The four corners of a rectangle, clockwise from the top-left.
pub fn rect_corners(rect: Rect) -> [Point; 4] {
    [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ]
}

/// Whether the segment a→b passes through the interior of `rect`.
///
/// Segments that only run along the boundary do not count, so routed paths
/// may hug an inflated obstacle box.
pub fn segment_crosses_rect(a: Point, b: Point, rect: Rect) -> bool {
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return false;
    }
    let strictly_inside = |p: Point| p.x > rect.x0 && p.x < rect.x1 && p.y > rect.y0 && p.y < rect.y1;
    if strictly_inside(a) || strictly_inside(b) || strictly_inside(a.midpoint(b)) {
        return true;
    }
    // Liang-Barsky clip against the open rectangle.
    let d = b - a;
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;
    for (p, q) in [
        (-d.x, a.x - rect.x0),
        (d.x, rect.x1 - a.x),
        (-d.y, a.y - rect.y0),
        (d.y, rect.y1 - a.y),
    ] {
        if p.abs() < f64::EPSILON {
            if q <= 0.0 {
                return false;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    if t1 - t0 <= 1e-9 {
        return false;
    }
    strictly_inside(a + d * ((t0 + t1) / 2.0))
}
