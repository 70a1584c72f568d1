//! Drag session construction.

use super::ConnectorDragKind;
use crate::controls::{ConnectorHandle, EdgeHitTarget};
use crate::error::{BoardError, BoardResult};
use crate::geometry::elbow::{Axis, ElbowRoute};
use crate::shapes::{Element, ElementId, PathStyle};
use kurbo::Point;

/// An active connector drag.
///
/// `original` is the pre-drag snapshot of the connector and is never mutated
/// while the drag is active; every preview is derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub element_id: ElementId,
    pub kind: ConnectorDragKind,
    /// Index of the dragged point in the stored points.
    pub index: usize,
    /// Axis the dragged run shifts along (elbow drags).
    pub axis: Option<Axis>,
    /// Inclusive index range of the dragged run in the expanded polyline.
    pub range: Option<(usize, usize)>,
    /// Stable `"left-right"` key of the dragged run.
    pub edge_key: Option<String>,
    /// Cursor position where the drag started, in the local frame.
    pub anchor: Option<Point>,
    /// Style applied by a corner-creating drag.
    pub target_style: Option<PathStyle>,
    /// Route fixed when the drag started.
    pub route: Option<ElbowRoute>,
    /// The drag begins by inserting a point, which is written immediately.
    pub creates_point: bool,
    pub original: Element,
}

impl DragSession {
    /// Start a drag of point `index`.
    pub fn new(original: Element, kind: ConnectorDragKind, index: usize) -> BoardResult<Self> {
        if !original.is_connector() {
            return Err(BoardError::NotAConnector(original.id));
        }
        Ok(Self {
            element_id: original.id,
            kind,
            index,
            axis: None,
            range: None,
            edge_key: None,
            anchor: None,
            target_style: None,
            route: None,
            creates_point: false,
            original,
        })
    }

    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = Some(axis);
        self
    }

    pub fn with_anchor(mut self, anchor: Point) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn with_range(mut self, left: usize, right: usize) -> Self {
        self.range = Some((left, right));
        self.edge_key = Some(format!("{left}-{right}"));
        self
    }

    /// Drag the midpoint of a 2-point connector into a corner.
    ///
    /// For an elbow target the route is chosen here from the endpoint
    /// displacement and stays fixed for the whole drag.
    pub fn create_corner(original: Element, target_style: PathStyle) -> BoardResult<Self> {
        let mut session = Self::new(original, ConnectorDragKind::CreateCorner, 1)?;
        session.target_style = Some(target_style);
        if target_style == PathStyle::Elbow {
            if let Some(c) = session.original.as_connector() {
                session.route = Some(ElbowRoute::from_endpoints(c.start(), c.end()));
            }
        }
        Ok(session)
    }

    /// Shift the run containing point `index` along `axis`.
    pub fn elbow_ortho(original: Element, index: usize, axis: Axis, anchor: Point) -> BoardResult<Self> {
        Ok(Self::new(original, ConnectorDragKind::ElbowOrtho, index)?
            .with_axis(axis)
            .with_anchor(anchor))
    }

    /// Shift the run `left..=right` of the expanded polyline.
    pub fn elbow_edge(original: Element, left: usize, right: usize, anchor: Point) -> BoardResult<Self> {
        Ok(Self::new(original, ConnectorDragKind::ElbowEdge, left)?
            .with_range(left, right)
            .with_anchor(anchor))
    }

    /// Start a drag from a rendered handle. `cursor` is in the local frame.
    ///
    /// Insert handles splice their point into the snapshot first; the drag
    /// then moves the new point like any other.
    pub fn from_handle(original: Element, handle: &ConnectorHandle, cursor: Point) -> BoardResult<Self> {
        if handle.creates_point {
            let mut baseline = original;
            let id = baseline.id;
            let connector = baseline.as_connector_mut().ok_or(BoardError::NotAConnector(id))?;
            let at = handle.index.min(connector.points.len());
            connector.points.insert(at, handle.position);
            let mut session = Self::new(baseline, ConnectorDragKind::Normal, at)?;
            session.creates_point = true;
            return Ok(session.with_anchor(cursor));
        }

        if handle.kind == ConnectorDragKind::CreateCorner {
            let style = original
                .as_connector()
                .map(|c| c.path_style)
                .ok_or(BoardError::NotAConnector(original.id))?;
            return Ok(Self::create_corner(original, style)?.with_anchor(cursor));
        }

        let mut session = Self::new(original, handle.kind, handle.index)?.with_anchor(cursor);
        session.axis = handle.axis;
        if let Some((left, right)) = handle.range {
            session = session.with_range(left, right);
        }
        if handle.kind == ConnectorDragKind::ElbowHandle {
            session.route = session.original.as_connector().and_then(|c| c.effective_route());
        }
        Ok(session)
    }

    /// Start an edge drag from an invisible elbow hit target.
    pub fn from_edge(original: Element, target: &EdgeHitTarget, cursor: Point) -> BoardResult<Self> {
        let (left, right) = target.range;
        Self::elbow_edge(original, left, right, cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{BasicKind, BasicShape, Connector, ConnectorKind, Shape};

    fn line(points: Vec<Point>, style: PathStyle) -> Element {
        Element::new(Shape::Connector(Connector::from_points(ConnectorKind::Line, points, style)))
    }

    #[test]
    fn test_non_connector_is_rejected() {
        let rect = Element::new(Shape::Basic(BasicShape::new(BasicKind::Rectangle, Point::ZERO, 10.0, 10.0)));
        let id = rect.id;
        assert!(matches!(
            DragSession::new(rect, ConnectorDragKind::Normal, 0),
            Err(BoardError::NotAConnector(found)) if found == id
        ));
    }

    #[test]
    fn test_create_corner_fixes_route() {
        let e = line(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)], PathStyle::Sharp);
        let session = DragSession::create_corner(e.clone(), PathStyle::Elbow).unwrap();
        assert_eq!(session.route, Some(ElbowRoute::Vertical));
        assert_eq!(session.index, 1);

        let curved = DragSession::create_corner(e, PathStyle::Curved).unwrap();
        assert_eq!(curved.route, None);
    }

    #[test]
    fn test_edge_key() {
        let e = line(
            vec![Point::new(0.0, 0.0), Point::new(0.0, 50.0), Point::new(100.0, 50.0), Point::new(100.0, 0.0)],
            PathStyle::Elbow,
        );
        let session = DragSession::elbow_edge(e, 1, 2, Point::new(50.0, 50.0)).unwrap();
        assert_eq!(session.edge_key.as_deref(), Some("1-2"));
        assert_eq!(session.range, Some((1, 2)));
    }

    #[test]
    fn test_insert_handle_splices_point() {
        let e = line(
            vec![Point::new(0.0, 0.0), Point::new(50.0, 50.0), Point::new(100.0, 0.0)],
            PathStyle::Sharp,
        );
        let handle = ConnectorHandle {
            kind: ConnectorDragKind::Normal,
            index: 1,
            axis: None,
            range: None,
            position: Point::new(25.0, 25.0),
            radius: 4.0,
            creates_point: true,
        };
        let session = DragSession::from_handle(e, &handle, Point::new(25.0, 25.0)).unwrap();
        assert!(session.creates_point);
        assert_eq!(session.index, 1);
        let points = &session.original.as_connector().unwrap().points;
        assert_eq!(points.len(), 4);
        assert_eq!(points[1], Point::new(25.0, 25.0));
    }
}
