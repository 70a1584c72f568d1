//! Handle layout for the selected connector.
//!
//! Controls are recomputed on every render from the element alone; nothing
//! here is cached between frames. Positions are in the connector's local
//! frame, and radii are in world units for the current zoom.

use crate::config::InteractionConfig;
use crate::drag::ConnectorDragKind;
use crate::geometry::curve::{catmull_rom_segments, cubic_arc_length, cubic_arc_midpoint};
use crate::geometry::elbow::{Axis, Orientation, segment_orientation};
use crate::shapes::{Connector, Element, PathStyle, point_to_segment_dist};
use kurbo::Point;

/// Viewport state that affects handle layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlView {
    pub zoom: f64,
    /// Point-editing mode; enables insert handles.
    pub edit_mode: bool,
}

impl Default for ControlView {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            edit_mode: false,
        }
    }
}

/// A draggable handle on a connector.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectorHandle {
    pub kind: ConnectorDragKind,
    /// Index of the stored point the drag starts on.
    pub index: usize,
    pub axis: Option<Axis>,
    /// Run of the expanded elbow polyline this handle moves.
    pub range: Option<(usize, usize)>,
    pub position: Point,
    pub radius: f64,
    /// Dragging this handle first inserts a new point at `index`.
    pub creates_point: bool,
}

impl ConnectorHandle {
    fn new(kind: ConnectorDragKind, index: usize, position: Point, radius: f64) -> Self {
        Self {
            kind,
            index,
            axis: None,
            range: None,
            position,
            radius,
            creates_point: false,
        }
    }

    pub fn hit_test(&self, point: Point) -> bool {
        point.distance(self.position) <= self.radius
    }
}

/// Invisible strip along an elbow run that starts an edge drag.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeHitTarget {
    pub range: (usize, usize),
    pub start: Point,
    pub end: Point,
    pub width: f64,
    pub edge_key: String,
}

impl EdgeHitTarget {
    pub fn hit_test(&self, point: Point) -> bool {
        point_to_segment_dist(point, self.start, self.end) <= self.width / 2.0
    }
}

/// Everything the renderer draws (or hit-tests) for a selected connector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectorControls {
    pub handles: Vec<ConnectorHandle>,
    pub edge_targets: Vec<EdgeHitTarget>,
}

impl ConnectorControls {
    /// The handle under `point`, nearest first.
    pub fn handle_at(&self, point: Point) -> Option<&ConnectorHandle> {
        self.handles
            .iter()
            .filter(|h| h.hit_test(point))
            .min_by(|a, b| a.position.distance(point).total_cmp(&b.position.distance(point)))
    }

    pub fn edge_at(&self, point: Point) -> Option<&EdgeHitTarget> {
        self.edge_targets.iter().find(|t| t.hit_test(point))
    }
}

/// A maximal straight run of an orthogonal polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Run {
    left: usize,
    right: usize,
    orientation: Orientation,
}

/// Split an orthogonal polyline into runs, skipping zero-length segments.
fn orthogonal_runs(points: &[Point], eps: f64) -> Vec<Run> {
    let mut runs = Vec::new();
    let mut i = 0;
    while i + 1 < points.len() {
        let Some(orientation) = segment_orientation(points[i], points[i + 1], eps) else {
            i += 1;
            continue;
        };
        let mut j = i + 1;
        while j + 1 < points.len() && segment_orientation(points[j], points[j + 1], eps) == Some(orientation) {
            j += 1;
        }
        runs.push(Run {
            left: i,
            right: j,
            orientation,
        });
        i = j;
    }
    runs
}

/// Compute the handles and hit targets of a connector element.
///
/// Non-connectors have no connector controls.
pub fn connector_controls(element: &Element, view: ControlView, config: &InteractionConfig) -> ConnectorControls {
    let Some(connector) = element.as_connector() else {
        return ConnectorControls::default();
    };
    let zoom = if view.zoom > 0.0 { view.zoom } else { 1.0 };
    let mut controls = ConnectorControls::default();
    if connector.points.len() < 2 {
        return controls;
    }
    match connector.path_style {
        PathStyle::Elbow => elbow_controls(connector, zoom, config, &mut controls),
        PathStyle::Sharp | PathStyle::Curved => {
            point_controls(connector, zoom, config, &mut controls);
            if view.edit_mode {
                insert_controls(connector, zoom, config, &mut controls);
            }
        }
    }
    controls
}

fn point_controls(c: &Connector, zoom: f64, config: &InteractionConfig, controls: &mut ConnectorControls) {
    let radius = config.endpoint_handle_radius / zoom;
    for (index, &point) in c.points.iter().enumerate() {
        let kind = if c.path_style == PathStyle::Curved && c.points.len() == 3 && index == 1 {
            ConnectorDragKind::CurvedMid
        } else {
            ConnectorDragKind::Normal
        };
        let radius = if kind == ConnectorDragKind::CurvedMid {
            config.insert_handle_radius / zoom
        } else {
            radius
        };
        controls.handles.push(ConnectorHandle::new(kind, index, point, radius));
    }

    // A straight 2-point connector gets a synthetic midpoint that bends it.
    if c.points.len() == 2 {
        let (start, end) = (c.start(), c.end());
        let mid = start.midpoint(end);
        let clearance = config.endpoint_handle_radius + config.insert_handle_radius + config.min_handle_gap;
        if start.distance(mid) * zoom >= clearance {
            controls.handles.push(ConnectorHandle::new(
                ConnectorDragKind::CreateCorner,
                1,
                mid,
                config.insert_handle_radius / zoom,
            ));
        }
    }
}

fn insert_controls(c: &Connector, zoom: f64, config: &InteractionConfig, controls: &mut ConnectorControls) {
    if c.points.len() < 3 {
        return;
    }
    let min_length = config.min_run_screen_length() / zoom;
    let curved = (c.path_style == PathStyle::Curved).then(|| catmull_rom_segments(&c.points));
    for (i, pair) in c.points.windows(2).enumerate() {
        let segment = curved.as_ref().and_then(|segments| segments.get(i));
        let length = segment.map_or_else(|| pair[0].distance(pair[1]), cubic_arc_length);
        if length < min_length {
            continue;
        }
        let position = segment.map_or_else(|| pair[0].midpoint(pair[1]), cubic_arc_midpoint);
        let mut handle =
            ConnectorHandle::new(ConnectorDragKind::Normal, i + 1, position, config.insert_handle_radius / zoom);
        handle.creates_point = true;
        controls.handles.push(handle);
    }
}

fn elbow_controls(c: &Connector, zoom: f64, config: &InteractionConfig, controls: &mut ConnectorControls) {
    let eps = config.elbow_epsilon;
    let len = c.points.len();
    let endpoint_kind = if len >= 3 {
        ConnectorDragKind::ElbowEndpoint
    } else {
        ConnectorDragKind::Normal
    };
    let radius = config.endpoint_handle_radius / zoom;
    controls
        .handles
        .push(ConnectorHandle::new(endpoint_kind, 0, c.start(), radius));
    controls
        .handles
        .push(ConnectorHandle::new(endpoint_kind, len - 1, c.end(), radius));

    let polyline = c.elbow_polyline(eps);
    let min_length = config.min_run_screen_length() / zoom;
    let min_endpoint_distance = config.min_endpoint_distance / zoom;
    let virtual_control = c.is_virtual_elbow();

    for run in orthogonal_runs(&polyline, eps) {
        let (start, end) = (polyline[run.left], polyline[run.right]);
        let edge_key = format!("{}-{}", run.left, run.right);
        controls.edge_targets.push(EdgeHitTarget {
            range: (run.left, run.right),
            start,
            end,
            width: config.edge_hit_width / zoom,
            edge_key,
        });

        let mid = start.midpoint(end);
        let too_short = start.distance(end) < min_length;
        let near_endpoint =
            mid.distance(c.start()) < min_endpoint_distance || mid.distance(c.end()) < min_endpoint_distance;
        if too_short || near_endpoint {
            continue;
        }

        let axis = run.orientation.shift_axis();
        // The middle run of a 3-point elbow is the virtual control's run.
        let mut handle = if virtual_control && run.left <= 1 && run.right >= 2 {
            ConnectorHandle::new(ConnectorDragKind::ElbowHandle, 1, mid, config.insert_handle_radius / zoom)
        } else {
            ConnectorHandle::new(
                ConnectorDragKind::ElbowEdge,
                run.left,
                mid,
                config.insert_handle_radius / zoom,
            )
        };
        handle.axis = Some(axis);
        handle.range = Some((run.left, run.right));
        controls.handles.push(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{ConnectorKind, Shape};

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn element(points: Vec<Point>, style: PathStyle) -> Element {
        Element::new(Shape::Connector(Connector::from_points(ConnectorKind::Line, points, style)))
    }

    fn kinds(controls: &ConnectorControls) -> Vec<ConnectorDragKind> {
        controls.handles.iter().map(|h| h.kind).collect()
    }

    #[test]
    fn test_two_point_line_has_create_corner() {
        let e = element(vec![p(0.0, 0.0), p(100.0, 0.0)], PathStyle::Sharp);
        let controls = connector_controls(&e, ControlView::default(), &InteractionConfig::default());
        assert_eq!(
            kinds(&controls),
            vec![
                ConnectorDragKind::Normal,
                ConnectorDragKind::Normal,
                ConnectorDragKind::CreateCorner
            ]
        );
        assert_eq!(controls.handles[2].position, p(50.0, 0.0));
        assert!(controls.edge_targets.is_empty());
    }

    #[test]
    fn test_coincident_endpoints_hide_midpoint() {
        let e = element(vec![p(10.0, 10.0), p(10.0, 10.0)], PathStyle::Sharp);
        let controls = connector_controls(&e, ControlView::default(), &InteractionConfig::default());
        assert_eq!(controls.handles.len(), 2);
    }

    #[test]
    fn test_three_point_curved_has_control() {
        let e = element(vec![p(0.0, 0.0), p(50.0, 40.0), p(100.0, 0.0)], PathStyle::Curved);
        let controls = connector_controls(&e, ControlView::default(), &InteractionConfig::default());
        assert_eq!(
            kinds(&controls),
            vec![
                ConnectorDragKind::Normal,
                ConnectorDragKind::CurvedMid,
                ConnectorDragKind::Normal
            ]
        );
    }

    #[test]
    fn test_curved_insert_handle_uses_arc_length() {
        // The middle segment's chord is 20 but the spline bulges well past 24.
        let e = element(
            vec![p(0.0, 100.0), p(0.0, 0.0), p(20.0, 0.0), p(20.0, 100.0)],
            PathStyle::Curved,
        );
        let view = ControlView {
            zoom: 1.0,
            edit_mode: true,
        };
        let controls = connector_controls(&e, view, &InteractionConfig::default());
        let middle = controls
            .handles
            .iter()
            .find(|h| h.creates_point && h.index == 2)
            .unwrap();
        assert!((middle.position.x - 10.0).abs() < 1e-6);
        assert!(middle.position.y < -10.0);
    }

    #[test]
    fn test_insert_handles_only_in_edit_mode() {
        let e = element(vec![p(0.0, 0.0), p(100.0, 0.0), p(100.0, 10.0)], PathStyle::Sharp);
        let config = InteractionConfig::default();
        let view = ControlView {
            zoom: 1.0,
            edit_mode: true,
        };
        let controls = connector_controls(&e, view, &config);
        let inserts: Vec<_> = controls.handles.iter().filter(|h| h.creates_point).collect();
        // The 10-unit segment is too short for an insert handle.
        assert_eq!(inserts.len(), 1);
        assert_eq!(inserts[0].index, 1);
        assert_eq!(inserts[0].position, p(50.0, 0.0));

        let plain = connector_controls(&e, ControlView::default(), &config);
        assert!(plain.handles.iter().all(|h| !h.creates_point));

        // Zooming in makes the short segment long enough on screen.
        let zoomed = connector_controls(
            &e,
            ControlView {
                zoom: 4.0,
                edit_mode: true,
            },
            &config,
        );
        assert_eq!(zoomed.handles.iter().filter(|h| h.creates_point).count(), 2);
    }

    #[test]
    fn test_virtual_elbow_controls() {
        let e = element(vec![p(0.0, 0.0), p(50.0, 80.0), p(100.0, 0.0)], PathStyle::Elbow);
        let controls = connector_controls(&e, ControlView::default(), &InteractionConfig::default());
        // Expanded: (0,0) (0,80) (100,80) (100,0).
        assert_eq!(controls.edge_targets.len(), 3);
        assert_eq!(controls.edge_targets[1].edge_key, "1-2");

        let handle = controls
            .handles
            .iter()
            .find(|h| h.kind == ConnectorDragKind::ElbowHandle)
            .unwrap();
        assert_eq!(handle.index, 1);
        assert_eq!(handle.position, p(50.0, 80.0));
        assert_eq!(handle.axis, Some(Axis::Y));

        let edges: Vec<_> = controls
            .handles
            .iter()
            .filter(|h| h.kind == ConnectorDragKind::ElbowEdge)
            .collect();
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].range, Some((0, 1)));
        assert_eq!(edges[0].axis, Some(Axis::X));
        assert_eq!(controls.handles[0].kind, ConnectorDragKind::ElbowEndpoint);
    }

    #[test]
    fn test_short_runs_are_suppressed() {
        let e = element(vec![p(0.0, 0.0), p(50.0, 10.0), p(100.0, 0.0)], PathStyle::Elbow);
        let controls = connector_controls(&e, ControlView::default(), &InteractionConfig::default());
        // The two 10-unit legs are too short; only the middle run keeps a handle.
        let mids: Vec<_> = controls.handles.iter().skip(2).collect();
        assert_eq!(mids.len(), 1);
        assert_eq!(mids[0].kind, ConnectorDragKind::ElbowHandle);
        assert_eq!(controls.edge_targets.len(), 3);
    }

    #[test]
    fn test_two_point_elbow_endpoints_are_normal() {
        let e = element(vec![p(0.0, 0.0), p(100.0, 0.0)], PathStyle::Elbow);
        let controls = connector_controls(&e, ControlView::default(), &InteractionConfig::default());
        assert_eq!(controls.handles[0].kind, ConnectorDragKind::Normal);
        assert_eq!(controls.handles[1].kind, ConnectorDragKind::Normal);
        assert_eq!(controls.handles[1].index, 1);
    }

    #[test]
    fn test_hit_testing() {
        let e = element(vec![p(0.0, 0.0), p(50.0, 80.0), p(100.0, 0.0)], PathStyle::Elbow);
        let controls = connector_controls(&e, ControlView::default(), &InteractionConfig::default());
        assert_eq!(controls.handle_at(p(1.0, 1.0)).map(|h| h.index), Some(0));
        assert!(controls.handle_at(p(30.0, 30.0)).is_none());
        let edge = controls.edge_at(p(100.0, 40.0)).unwrap();
        assert_eq!(edge.range, (2, 3));
    }

    #[test]
    fn test_radius_scales_with_zoom() {
        let e = element(vec![p(0.0, 0.0), p(100.0, 0.0)], PathStyle::Sharp);
        let config = InteractionConfig::default();
        let controls = connector_controls(
            &e,
            ControlView {
                zoom: 2.0,
                edit_mode: false,
            },
            &config,
        );
        assert!((controls.handles[0].radius - config.endpoint_handle_radius / 2.0).abs() < 1e-9);
    }
}
