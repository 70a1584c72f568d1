//! Pure preview computation for connector drags.

use super::{ConnectorDragKind, DragSession};
use crate::bounds::BoundsCache;
use crate::geometry::elbow::{
    Axis, ElbowRoute, Orientation, elbow_polyline_for_vertices, orthogonal_to_elbow_form, segment_orientation,
    simplify_elbow_polyline,
};
use crate::routing::{RouteRequest, RouteStyle, route_around};
use crate::shapes::{Connector, ConnectorEnd, Element, ElementId, PathStyle, Shape};
use crate::snap::SnapTarget;
use kurbo::Point;

/// Why a drag could not be applied to the snapshot.
type Rejection = &'static str;

/// Compute the connector a drag would produce for `cursor`.
///
/// `cursor` and the snap point are in the element's local frame. The result
/// depends only on the arguments: the same snapshot and cursor always give
/// the same preview, whatever was previewed before. A session that does not
/// fit the snapshot (wrong element, style or index) yields the snapshot
/// unchanged.
pub fn preview(
    original: &Element,
    session: &DragSession,
    cursor: Point,
    snap: Option<&SnapTarget>,
    elements: &[Element],
    cache: &BoundsCache,
) -> Element {
    let result = match original.as_connector() {
        Some(_) if original.id != session.element_id => Err("session belongs to another element"),
        Some(connector) => PreviewContext {
            element_id: original.id,
            session,
            cursor,
            snap,
            elements,
            cache,
        }
        .compute(connector),
        None => Err("element is not a connector"),
    };

    match result {
        Ok(connector) => {
            let mut out = original.clone();
            out.shape = Shape::Connector(connector);
            out
        }
        Err(reason) => {
            log::warn!("Ignoring {:?} drag on {}: {}", session.kind, original.id, reason);
            original.clone()
        }
    }
}

struct PreviewContext<'a> {
    element_id: ElementId,
    session: &'a DragSession,
    cursor: Point,
    snap: Option<&'a SnapTarget>,
    elements: &'a [Element],
    cache: &'a BoundsCache,
}

impl PreviewContext<'_> {
    fn eps(&self) -> f64 {
        self.cache.config().elbow_epsilon
    }

    fn compute(&self, c: &Connector) -> Result<Connector, Rejection> {
        let mut out = c.clone();
        match self.session.kind {
            ConnectorDragKind::Normal => self.normal(c, &mut out)?,
            ConnectorDragKind::CreateCorner => self.create_corner(c, &mut out)?,
            ConnectorDragKind::CurvedMid => self.curved_mid(c, &mut out)?,
            ConnectorDragKind::ElbowHandle => self.elbow_handle(c, &mut out)?,
            ConnectorDragKind::ElbowOrtho => {
                let axis = self.session.axis.or_else(|| infer_run_axis(&c.points, self.session.index, self.eps()));
                self.elbow_ortho(c, &mut out, self.session.index, axis.ok_or("cannot infer drag axis")?)?
            }
            ConnectorDragKind::ElbowEdge => self.elbow_edge(c, &mut out)?,
            ConnectorDragKind::ElbowEndpoint => self.elbow_endpoint(c, &mut out)?,
        }
        Ok(out)
    }

    /// Route from the connector's other end to the snap point, ordered so the
    /// dragged end keeps its index.
    fn route_to_snap(&self, c: &Connector, end: ConnectorEnd, snap: &SnapTarget, style: RouteStyle) -> Vec<Point> {
        let other = end.opposite();
        let request = RouteRequest {
            fixed: c.endpoint(other),
            moving: snap.point,
            elements: self.elements,
            moving_element_id: self.element_id,
            target_element_id: Some(snap.element_id),
            target_position: Some(snap.position),
            other_end_connection: c.connection(other),
            style,
        };
        let mut path = route_around(&request, self.cache);
        if end == ConnectorEnd::Start {
            path.reverse();
        }
        path
    }

    fn set_elbow_polyline(&self, out: &mut Connector, polyline: &[Point]) {
        let (points, route) = orthogonal_to_elbow_form(polyline, self.eps());
        out.points = points;
        out.route = route;
        out.path_style = PathStyle::Elbow;
    }

    fn normal(&self, c: &Connector, out: &mut Connector) -> Result<(), Rejection> {
        let len = c.points.len();
        let index = self.session.index;
        if index >= len {
            return Err("point index out of range");
        }
        let Some(end) = ConnectorEnd::from_index(index, len) else {
            out.points[index] = self.cursor;
            return Ok(());
        };
        let other = end.opposite();

        match self.snap {
            Some(snap) if c.path_style == PathStyle::Curved => {
                out.points = self.route_to_snap(c, end, snap, RouteStyle::Curved);
            }
            Some(snap) if c.path_style == PathStyle::Sharp && snap.out_of_line_of_sight => {
                let path = self.route_to_snap(c, end, snap, RouteStyle::Elbow);
                self.set_elbow_polyline(out, &path);
            }
            Some(snap) => out.points[index] = snap.point,
            None => match c.connection(other) {
                Some(anchored) => {
                    let fixed = c.endpoint(other);
                    let corner = if anchored.position.exits_horizontally() {
                        Point::new(self.cursor.x, fixed.y)
                    } else {
                        Point::new(fixed.x, self.cursor.y)
                    };
                    let eps = self.eps();
                    let mut path = if corner.distance(fixed) <= eps || corner.distance(self.cursor) <= eps {
                        vec![fixed, self.cursor]
                    } else {
                        vec![fixed, corner, self.cursor]
                    };
                    if end == ConnectorEnd::Start {
                        path.reverse();
                    }
                    if c.path_style == PathStyle::Elbow {
                        self.set_elbow_polyline(out, &path);
                    } else {
                        out.points = path;
                    }
                }
                None => out.points[index] = self.cursor,
            },
        }
        out.set_connection(end, self.snap.map(|s| s.connection()));
        Ok(())
    }

    fn create_corner(&self, c: &Connector, out: &mut Connector) -> Result<(), Rejection> {
        if c.points.len() != 2 || self.session.index != 1 {
            return Err("corner creation needs a 2-point connector");
        }
        let style = self.session.target_style.unwrap_or(c.path_style);
        out.points = vec![c.start(), self.cursor, c.end()];
        out.path_style = style;
        out.route = match style {
            PathStyle::Elbow => Some(
                self.session
                    .route
                    .unwrap_or_else(|| ElbowRoute::from_endpoints(c.start(), c.end())),
            ),
            _ => None,
        };
        Ok(())
    }

    fn curved_mid(&self, c: &Connector, out: &mut Connector) -> Result<(), Rejection> {
        if c.path_style != PathStyle::Curved || c.points.len() < 3 || self.session.index != 1 {
            return Err("control drag needs a curved connector with a control point");
        }
        out.points[1] = self.cursor;
        Ok(())
    }

    fn elbow_handle(&self, c: &Connector, out: &mut Connector) -> Result<(), Rejection> {
        if c.path_style != PathStyle::Elbow || c.points.len() < 3 || self.session.index != 1 {
            return Err("elbow handle drag needs an elbow connector with a middle point");
        }
        if let Some(route) = self.session.route.or(c.effective_route()) {
            let axis = route.free_axis();
            let mut control = c.points[1];
            axis.set(&mut control, axis.of(self.cursor));
            out.points[1] = control;
            out.route = Some(route);
            return Ok(());
        }
        let axis = self
            .session
            .axis
            .or_else(|| infer_run_axis(&c.points, 1, self.eps()))
            .ok_or("cannot infer drag axis")?;
        self.elbow_ortho(c, out, 1, axis)
    }

    fn elbow_ortho(&self, c: &Connector, out: &mut Connector, index: usize, axis: Axis) -> Result<(), Rejection> {
        let len = c.points.len();
        if c.path_style != PathStyle::Elbow || index == 0 || index + 1 >= len {
            return Err("orthogonal drag needs an interior point of an elbow connector");
        }
        let eps = self.eps();
        let anchor = self.session.anchor.unwrap_or(c.points[index]);
        let delta = axis.of(self.cursor) - axis.of(anchor);
        let (lo, hi) = run_sharing_axis(&c.points, index, axis, eps);
        let shifted = shift_run(&c.points, lo, hi, axis, delta);

        if c.is_virtual_elbow() && shifted.len() == 3 {
            out.route = c.effective_route();
            out.points = shifted;
        } else {
            self.set_elbow_polyline(out, &elbow_polyline_for_vertices(&shifted, eps));
        }
        Ok(())
    }

    fn elbow_edge(&self, c: &Connector, out: &mut Connector) -> Result<(), Rejection> {
        if c.path_style != PathStyle::Elbow {
            return Err("edge drag needs an elbow connector");
        }
        let (left, right) = self.session.range.ok_or("edge drag without a range")?;
        let polyline = c.elbow_polyline(self.eps());
        if left >= right || right >= polyline.len() {
            return Err("edge range out of bounds");
        }
        let orientation =
            segment_orientation(polyline[left], polyline[right], self.eps()).ok_or("edge is not axis-aligned")?;
        let axis = orientation.shift_axis();
        let anchor = self
            .session
            .anchor
            .unwrap_or_else(|| polyline[left].midpoint(polyline[right]));
        let delta = axis.of(self.cursor) - axis.of(anchor);
        let shifted = shift_run(&polyline, left, right, axis, delta);
        self.set_elbow_polyline(out, &shifted);
        Ok(())
    }

    fn elbow_endpoint(&self, c: &Connector, out: &mut Connector) -> Result<(), Rejection> {
        let len = c.points.len();
        if c.path_style != PathStyle::Elbow || len < 3 {
            return Err("elbow endpoint drag needs an elbow connector with at least 3 points");
        }
        let end = ConnectorEnd::from_index(self.session.index, len).ok_or("index is not an endpoint")?;

        if let Some(snap) = self.snap {
            let path = self.route_to_snap(c, end, snap, RouteStyle::Elbow);
            self.set_elbow_polyline(out, &path);
            out.set_connection(end, Some(snap.connection()));
            return Ok(());
        }

        let eps = self.eps();
        let mut polyline = simplify_elbow_polyline(&c.elbow_polyline(eps), eps);
        if end == ConnectorEnd::End {
            polyline.reverse();
        }
        polyline = move_leading_endpoint(&polyline, self.cursor, eps);
        if end == ConnectorEnd::End {
            polyline.reverse();
        }
        self.set_elbow_polyline(out, &polyline);
        out.set_connection(end, None);
        Ok(())
    }
}

/// Move `points[0]` to `cursor`, dragging the adjacent corner along so the
/// first edge keeps its orientation.
fn move_leading_endpoint(points: &[Point], cursor: Point, eps: f64) -> Vec<Point> {
    let mut out = points.to_vec();
    if out.len() < 3 {
        if let Some(first) = out.first_mut() {
            *first = cursor;
        }
        return elbow_polyline_for_vertices(&out, eps);
    }
    // A zero-length first edge takes the orientation perpendicular to the next one.
    let edge = segment_orientation(out[0], out[1], eps).or_else(|| {
        segment_orientation(out[1], out[2], eps).map(|next| match next {
            Orientation::Horizontal => Orientation::Vertical,
            Orientation::Vertical => Orientation::Horizontal,
        })
    });
    out[0] = cursor;
    match edge {
        Some(Orientation::Vertical) => out[1].x = cursor.x,
        Some(Orientation::Horizontal) => out[1].y = cursor.y,
        None => return elbow_polyline_for_vertices(&out, eps),
    }
    out
}

/// Axis a point's run shifts along, from the segments on either side of it.
fn infer_run_axis(points: &[Point], index: usize, eps: f64) -> Option<Axis> {
    let before = index
        .checked_sub(1)
        .and_then(|prev| segment_orientation(*points.get(prev)?, *points.get(index)?, eps));
    let after = points
        .get(index + 1)
        .and_then(|next| segment_orientation(*points.get(index)?, *next, eps));
    before.or(after).map(|o| o.shift_axis())
}

/// Inclusive range of the contiguous points around `index` that share its
/// coordinate on `axis`.
fn run_sharing_axis(points: &[Point], index: usize, axis: Axis, eps: f64) -> (usize, usize) {
    let value = axis.of(points[index]);
    let mut lo = index;
    while lo > 0 && (axis.of(points[lo - 1]) - value).abs() <= eps {
        lo -= 1;
    }
    let mut hi = index;
    while hi + 1 < points.len() && (axis.of(points[hi + 1]) - value).abs() <= eps {
        hi += 1;
    }
    (lo, hi)
}

/// Shift `points[lo..=hi]` by `delta` along `axis`.
///
/// A run touching a true endpoint gets a duplicate of that endpoint first,
/// so the endpoint stays put and the new duplicate moves with the run.
fn shift_run(points: &[Point], lo: usize, hi: usize, axis: Axis, delta: f64) -> Vec<Point> {
    let mut out = points.to_vec();
    let Some(last) = out.len().checked_sub(1) else {
        return out;
    };
    let (mut lo, mut hi) = (lo, hi.min(last));
    if hi == last {
        out.push(out[last]);
    }
    if lo == 0 {
        out.insert(0, out[0]);
        lo += 1;
        hi += 1;
    }
    for p in &mut out[lo..=hi] {
        let shifted = axis.of(*p) + delta;
        axis.set(p, shifted);
    }
    out
}
