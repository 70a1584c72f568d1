//! Line and arrow connectors.

use super::{ElementId, ShapeStyle, point_to_polyline_dist};
use crate::geometry::curve::{catmull_rom_path, catmull_rom_polyline};
use crate::geometry::elbow::{ElbowRoute, elbow_polyline_for_vertices, expand_virtual_elbow};
use kurbo::{BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Samples per spline segment when a curved connector is flattened for hit-testing.
const HIT_TEST_SAMPLES: usize = 16;

/// Whether the connector draws arrowheads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorKind {
    #[default]
    Line,
    Arrow,
}

/// How the stored points are turned into a visual path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    /// Straight segments between consecutive points.
    #[default]
    Sharp,
    /// Catmull-Rom spline through every point.
    Curved,
    /// Axis-aligned segments; a 3-point elbow has a virtual middle control.
    Elbow,
}

/// One of the eight anchor positions on a shape's bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorPosition {
    N,
    E,
    S,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl AnchorPosition {
    pub const ALL: [AnchorPosition; 8] = [
        AnchorPosition::N,
        AnchorPosition::E,
        AnchorPosition::S,
        AnchorPosition::W,
        AnchorPosition::Ne,
        AnchorPosition::Nw,
        AnchorPosition::Se,
        AnchorPosition::Sw,
    ];

    /// Location of this anchor on `bounds`.
    pub fn point_on(self, bounds: Rect) -> Point {
        let center = bounds.center();
        match self {
            AnchorPosition::N => Point::new(center.x, bounds.y0),
            AnchorPosition::E => Point::new(bounds.x1, center.y),
            AnchorPosition::S => Point::new(center.x, bounds.y1),
            AnchorPosition::W => Point::new(bounds.x0, center.y),
            AnchorPosition::Ne => Point::new(bounds.x1, bounds.y0),
            AnchorPosition::Nw => Point::new(bounds.x0, bounds.y0),
            AnchorPosition::Se => Point::new(bounds.x1, bounds.y1),
            AnchorPosition::Sw => Point::new(bounds.x0, bounds.y1),
        }
    }

    /// Unit direction a connector leaves this anchor in.
    ///
    /// Corner anchors leave along their north/south component.
    pub fn exit_direction(self) -> Vec2 {
        match self {
            AnchorPosition::N | AnchorPosition::Ne | AnchorPosition::Nw => Vec2::new(0.0, -1.0),
            AnchorPosition::S | AnchorPosition::Se | AnchorPosition::Sw => Vec2::new(0.0, 1.0),
            AnchorPosition::E => Vec2::new(1.0, 0.0),
            AnchorPosition::W => Vec2::new(-1.0, 0.0),
        }
    }

    /// True if the exit direction is horizontal.
    pub fn exits_horizontally(self) -> bool {
        matches!(self, AnchorPosition::E | AnchorPosition::W)
    }
}

/// Attachment of a connector end to another element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub element_id: ElementId,
    pub position: AnchorPosition,
}

/// Which end of a connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectorEnd {
    Start,
    End,
}

impl ConnectorEnd {
    /// The end that a drag of point `index` moves, if it is an endpoint.
    pub fn from_index(index: usize, len: usize) -> Option<Self> {
        if index == 0 {
            Some(ConnectorEnd::Start)
        } else if len > 0 && index == len - 1 {
            Some(ConnectorEnd::End)
        } else {
            None
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            ConnectorEnd::Start => ConnectorEnd::End,
            ConnectorEnd::End => ConnectorEnd::Start,
        }
    }
}

/// A multi-point line or arrow.
///
/// `points[0]` and the last point are the true endpoints for every style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    #[serde(default)]
    pub kind: ConnectorKind,
    pub points: Vec<Point>,
    #[serde(default)]
    pub path_style: PathStyle,
    /// Orientation of a 3-point elbow. Ignored for other shapes.
    #[serde(default)]
    pub route: Option<ElbowRoute>,
    #[serde(default)]
    pub start_connection: Option<Connection>,
    #[serde(default)]
    pub end_connection: Option<Connection>,
    #[serde(default)]
    pub arrow_start: bool,
    #[serde(default)]
    pub arrow_end: bool,
    #[serde(default)]
    pub style: ShapeStyle,
}

impl Connector {
    /// Create a straight two-point connector.
    pub fn new(kind: ConnectorKind, start: Point, end: Point) -> Self {
        Self::from_points(kind, vec![start, end], PathStyle::Sharp)
    }

    pub fn from_points(kind: ConnectorKind, points: Vec<Point>, path_style: PathStyle) -> Self {
        Self {
            kind,
            points,
            path_style,
            route: None,
            start_connection: None,
            end_connection: None,
            arrow_start: false,
            arrow_end: kind == ConnectorKind::Arrow,
            style: ShapeStyle::default(),
        }
    }

    pub fn start(&self) -> Point {
        self.points.first().copied().unwrap_or(Point::ZERO)
    }

    pub fn end(&self) -> Point {
        self.points.last().copied().unwrap_or(Point::ZERO)
    }

    pub fn endpoint(&self, end: ConnectorEnd) -> Point {
        match end {
            ConnectorEnd::Start => self.start(),
            ConnectorEnd::End => self.end(),
        }
    }

    pub fn connection(&self, end: ConnectorEnd) -> Option<Connection> {
        match end {
            ConnectorEnd::Start => self.start_connection,
            ConnectorEnd::End => self.end_connection,
        }
    }

    pub fn set_connection(&mut self, end: ConnectorEnd, connection: Option<Connection>) {
        match end {
            ConnectorEnd::Start => self.start_connection = connection,
            ConnectorEnd::End => self.end_connection = connection,
        }
    }

    /// True for a 3-point elbow whose middle point is a virtual control.
    pub fn is_virtual_elbow(&self) -> bool {
        self.path_style == PathStyle::Elbow && self.points.len() == 3
    }

    /// Route of a 3-point elbow, derived from the endpoints when unset.
    pub fn effective_route(&self) -> Option<ElbowRoute> {
        if !self.is_virtual_elbow() {
            return None;
        }
        Some(
            self.route
                .unwrap_or_else(|| ElbowRoute::from_endpoints(self.start(), self.end())),
        )
    }

    /// Fully expanded orthogonal polyline of an elbow connector.
    pub fn elbow_polyline(&self, eps: f64) -> Vec<Point> {
        match (self.effective_route(), self.points.as_slice()) {
            (Some(route), &[start, control, end]) => expand_virtual_elbow(start, control, end, route).to_vec(),
            _ => elbow_polyline_for_vertices(&self.points, eps),
        }
    }

    /// Points of the drawn path, flattening splines for curved connectors.
    pub fn rendered_polyline(&self, eps: f64) -> Vec<Point> {
        match self.path_style {
            PathStyle::Elbow => self.elbow_polyline(eps),
            PathStyle::Curved if self.points.len() >= 3 => catmull_rom_polyline(&self.points, HIT_TEST_SAMPLES),
            _ => self.points.clone(),
        }
    }

    /// Visual path of the connector.
    pub fn to_path(&self, eps: f64) -> BezPath {
        if self.path_style == PathStyle::Curved {
            if let Some(path) = catmull_rom_path(&self.points) {
                return path;
            }
        }
        let mut path = BezPath::new();
        let points = self.rendered_polyline(eps);
        if let Some((&first, rest)) = points.split_first() {
            path.move_to(first);
            for &p in rest {
                path.line_to(p);
            }
        }
        path
    }

    /// Check if a point lies within `tolerance` of the drawn path.
    pub fn hit_test(&self, point: Point, tolerance: f64, eps: f64) -> bool {
        point_to_polyline_dist(point, &self.rendered_polyline(eps)) <= tolerance + self.style.stroke_width / 2.0
    }
}
