//! Orthogonal ("elbow") polyline expansion and simplification.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Which axis the first leg of a 3-point elbow leaves its endpoints along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElbowRoute {
    /// Endpoints exit vertically; the middle run is horizontal at `control.y`.
    Vertical,
    /// Endpoints exit horizontally; the middle run is vertical at `control.x`.
    Horizontal,
}

impl ElbowRoute {
    /// Route implied by the displacement between two endpoints.
    ///
    /// Mostly-horizontal connectors get a vertical route so that pulling the
    /// control point bends them into a bracket.
    pub fn from_endpoints(start: Point, end: Point) -> Self {
        if (end.x - start.x).abs() >= (end.y - start.y).abs() {
            ElbowRoute::Vertical
        } else {
            ElbowRoute::Horizontal
        }
    }

    /// The axis a 3-point elbow's control point is free to move along.
    pub fn free_axis(self) -> Axis {
        match self {
            ElbowRoute::Vertical => Axis::Y,
            ElbowRoute::Horizontal => Axis::X,
        }
    }
}

/// A coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// The coordinate of `p` along this axis.
    pub fn of(self, p: Point) -> f64 {
        match self {
            Axis::X => p.x,
            Axis::Y => p.y,
        }
    }

    /// Set the coordinate of `p` along this axis.
    pub fn set(self, p: &mut Point, value: f64) {
        match self {
            Axis::X => p.x = value,
            Axis::Y => p.y = value,
        }
    }

    pub fn other(self) -> Axis {
        match self {
            Axis::X => Axis::Y,
            Axis::Y => Axis::X,
        }
    }
}

/// Orientation of an axis-aligned segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Axis a segment of this orientation is shifted along when dragged sideways.
    pub fn shift_axis(self) -> Axis {
        match self {
            Orientation::Horizontal => Axis::Y,
            Orientation::Vertical => Axis::X,
        }
    }
}

/// Orientation of the segment `a -> b`, if it is axis-aligned and not degenerate.
pub fn segment_orientation(a: Point, b: Point, eps: f64) -> Option<Orientation> {
    let dx = (b.x - a.x).abs();
    let dy = (b.y - a.y).abs();
    if dx <= eps && dy <= eps {
        None
    } else if dy <= eps {
        Some(Orientation::Horizontal)
    } else if dx <= eps {
        Some(Orientation::Vertical)
    } else {
        None
    }
}

/// Expand the virtual control of a 3-point elbow into its two real corners.
pub fn expand_virtual_elbow(start: Point, control: Point, end: Point, route: ElbowRoute) -> [Point; 4] {
    match route {
        ElbowRoute::Vertical => [
            start,
            Point::new(start.x, control.y),
            Point::new(end.x, control.y),
            end,
        ],
        ElbowRoute::Horizontal => [
            start,
            Point::new(control.x, start.y),
            Point::new(control.x, end.y),
            end,
        ],
    }
}

/// Expand a sparse waypoint list into a fully axis-aligned polyline.
///
/// Pairs already aligned within `eps` are snapped exactly; any other pair gets
/// one corner, horizontal-first unless the vertical displacement is larger.
pub fn elbow_polyline_for_vertices(points: &[Point], eps: f64) -> Vec<Point> {
    let Some(&first) = points.first() else {
        return Vec::new();
    };
    let mut out = Vec::with_capacity(points.len() * 2);
    out.push(first);
    for &next in &points[1..] {
        let prev = out[out.len() - 1];
        let dx = next.x - prev.x;
        let dy = next.y - prev.y;
        if dx.abs() <= eps || dy.abs() <= eps {
            let mut snapped = next;
            if dx.abs() <= eps {
                snapped.x = prev.x;
            }
            if dy.abs() <= eps {
                snapped.y = prev.y;
            }
            out.push(snapped);
        } else if dx.abs() >= dy.abs() {
            out.push(Point::new(next.x, prev.y));
            out.push(next);
        } else {
            out.push(Point::new(prev.x, next.y));
            out.push(next);
        }
    }
    out
}

fn axis_collinear(a: Point, b: Point, c: Point, eps: f64) -> bool {
    let same_x = (a.x - b.x).abs() <= eps && (b.x - c.x).abs() <= eps;
    let same_y = (a.y - b.y).abs() <= eps && (b.y - c.y).abs() <= eps;
    same_x || same_y
}

/// Remove near-duplicate points and the middle of every axis-collinear triple.
///
/// Returns the input unchanged if fewer than two points would remain.
pub fn simplify_elbow_polyline(points: &[Point], eps: f64) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for &p in points {
        match out.last() {
            Some(&last) if last.distance(p) <= eps => {}
            _ => out.push(p),
        }
    }
    // Keep the true end point even when a near-duplicate was dropped before it.
    if let (Some(&last_in), Some(last_out)) = (points.last(), out.last_mut()) {
        *last_out = last_in;
    }

    let mut i = 1;
    while out.len() >= 3 && i + 1 < out.len() {
        if axis_collinear(out[i - 1], out[i], out[i + 1], eps) {
            out.remove(i);
            i = i.saturating_sub(1).max(1);
        } else {
            i += 1;
        }
    }

    if out.len() < 2 {
        return points.to_vec();
    }
    out
}

/// Convert an orthogonal polyline into its stored elbow form.
///
/// The polyline is simplified first. A single-corner L collapses to the
/// 3-point control form: the corner becomes the control and the returned
/// route reproduces the same L when expanded.
pub fn orthogonal_to_elbow_form(points: &[Point], eps: f64) -> (Vec<Point>, Option<ElbowRoute>) {
    let simplified = simplify_elbow_polyline(points, eps);
    if let [start, corner, end] = simplified[..] {
        let route = if (corner.y - start.y).abs() <= eps {
            ElbowRoute::Horizontal
        } else {
            ElbowRoute::Vertical
        };
        return (vec![start, corner, end], Some(route));
    }
    (simplified, None)
}

/// Number of direction changes along an orthogonal polyline.
pub fn bend_count(points: &[Point], eps: f64) -> usize {
    let simplified = simplify_elbow_polyline(points, eps);
    simplified.len().saturating_sub(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 0.5;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    fn is_orthogonal(points: &[Point]) -> bool {
        points
            .windows(2)
            .all(|w| w[0].x == w[1].x || w[0].y == w[1].y)
    }

    #[test]
    fn test_route_from_endpoints() {
        assert_eq!(ElbowRoute::from_endpoints(p(0.0, 0.0), p(100.0, 0.0)), ElbowRoute::Vertical);
        assert_eq!(ElbowRoute::from_endpoints(p(0.0, 0.0), p(10.0, 90.0)), ElbowRoute::Horizontal);
        // Ties favour vertical.
        assert_eq!(ElbowRoute::from_endpoints(p(0.0, 0.0), p(50.0, 50.0)), ElbowRoute::Vertical);
    }

    #[test]
    fn test_expand_virtual_elbow() {
        let vertical = expand_virtual_elbow(p(0.0, 0.0), p(50.0, 80.0), p(100.0, 0.0), ElbowRoute::Vertical);
        assert_eq!(vertical, [p(0.0, 0.0), p(0.0, 80.0), p(100.0, 80.0), p(100.0, 0.0)]);
        let horizontal = expand_virtual_elbow(p(0.0, 0.0), p(30.0, 10.0), p(60.0, 90.0), ElbowRoute::Horizontal);
        assert_eq!(horizontal, [p(0.0, 0.0), p(30.0, 0.0), p(30.0, 90.0), p(60.0, 90.0)]);
    }

    #[test]
    fn test_expansion_inserts_corner_by_dominant_axis() {
        let wide = elbow_polyline_for_vertices(&[p(0.0, 0.0), p(100.0, 40.0)], EPS);
        assert_eq!(wide, vec![p(0.0, 0.0), p(100.0, 0.0), p(100.0, 40.0)]);
        let tall = elbow_polyline_for_vertices(&[p(0.0, 0.0), p(40.0, 100.0)], EPS);
        assert_eq!(tall, vec![p(0.0, 0.0), p(0.0, 100.0), p(40.0, 100.0)]);
        // Ties are horizontal-first.
        let tie = elbow_polyline_for_vertices(&[p(0.0, 0.0), p(50.0, 50.0)], EPS);
        assert_eq!(tie[1], p(50.0, 0.0));
    }

    #[test]
    fn test_expansion_snaps_drift() {
        let out = elbow_polyline_for_vertices(&[p(0.0, 0.0), p(100.0, 0.3), p(100.2, 50.0)], EPS);
        assert_eq!(out, vec![p(0.0, 0.0), p(100.0, 0.0), p(100.0, 50.0)]);
    }

    #[test]
    fn test_expansion_is_idempotent() {
        let inputs = vec![
            vec![p(0.0, 0.0), p(100.0, 40.0), p(30.0, 200.0), p(-50.0, 210.0)],
            vec![p(0.0, 0.0), p(0.2, 80.0), p(60.0, 80.4)],
            vec![p(5.0, 5.0)],
            vec![],
            vec![p(0.0, 0.0), p(0.0, 0.0), p(10.0, 10.0)],
        ];
        for input in inputs {
            let once = elbow_polyline_for_vertices(&input, EPS);
            let twice = elbow_polyline_for_vertices(&once, EPS);
            assert_eq!(once, twice);
            assert!(is_orthogonal(&once));
        }
    }

    #[test]
    fn test_simplify_removes_duplicates_and_collinear() {
        let input = vec![
            p(0.0, 0.0),
            p(0.1, 0.0),
            p(50.0, 0.0),
            p(100.0, 0.0),
            p(100.0, 50.0),
            p(100.0, 100.0),
        ];
        assert_eq!(
            simplify_elbow_polyline(&input, EPS),
            vec![p(0.0, 0.0), p(100.0, 0.0), p(100.0, 100.0)]
        );
    }

    #[test]
    fn test_simplify_backtracks() {
        // After each removal the sweep re-checks the triple around the new neighbour.
        let input = vec![
            p(0.0, 0.0),
            p(0.0, 10.0),
            p(0.0, 10.0),
            p(0.0, 20.0),
            p(0.0, 30.0),
            p(40.0, 30.0),
        ];
        assert_eq!(
            simplify_elbow_polyline(&input, EPS),
            vec![p(0.0, 0.0), p(0.0, 30.0), p(40.0, 30.0)]
        );
    }

    #[test]
    fn test_simplify_keeps_input_when_degenerate() {
        let input = vec![p(3.0, 3.0), p(3.0, 3.0), p(3.1, 3.0)];
        assert_eq!(simplify_elbow_polyline(&input, EPS), input);
    }

    #[test]
    fn test_simplify_does_not_exceed_minimal_representation() {
        // Minimal shape: a Z with two corners (4 points).
        let sparse = vec![p(0.0, 0.0), p(50.0, 0.0), p(50.0, 0.0), p(50.0, 80.0), p(120.0, 80.0)];
        let expanded = elbow_polyline_for_vertices(&sparse, EPS);
        let simplified = simplify_elbow_polyline(&expanded, EPS);
        assert!(simplified.len() <= 4);
        assert_eq!(simplified.first(), Some(&p(0.0, 0.0)));
        assert_eq!(simplified.last(), Some(&p(120.0, 80.0)));
        assert_eq!(bend_count(&expanded, EPS), 2);
    }

    #[test]
    fn test_l_shape_becomes_control_form() {
        let (points, route) = orthogonal_to_elbow_form(&[p(0.0, 0.0), p(60.0, 0.0), p(100.0, 0.0), p(100.0, 50.0)], EPS);
        assert_eq!(points, vec![p(0.0, 0.0), p(100.0, 0.0), p(100.0, 50.0)]);
        assert_eq!(route, Some(ElbowRoute::Horizontal));
        let expanded = expand_virtual_elbow(points[0], points[1], points[2], ElbowRoute::Horizontal);
        assert_eq!(simplify_elbow_polyline(&expanded, EPS), points);

        let (points, route) = orthogonal_to_elbow_form(&[p(0.0, 0.0), p(0.0, 50.0), p(100.0, 50.0)], EPS);
        assert_eq!(route, Some(ElbowRoute::Vertical));
        let expanded = expand_virtual_elbow(points[0], points[1], points[2], ElbowRoute::Vertical);
        assert_eq!(simplify_elbow_polyline(&expanded, EPS), points);
    }

    #[test]
    fn test_z_shape_keeps_corners() {
        let z = vec![p(0.0, 0.0), p(50.0, 0.0), p(50.0, 80.0), p(120.0, 80.0)];
        assert_eq!(orthogonal_to_elbow_form(&z, EPS), (z.clone(), None));
    }

    #[test]
    fn test_segment_orientation() {
        assert_eq!(segment_orientation(p(0.0, 0.0), p(10.0, 0.2), EPS), Some(Orientation::Horizontal));
        assert_eq!(segment_orientation(p(0.0, 0.0), p(0.0, -10.0), EPS), Some(Orientation::Vertical));
        assert_eq!(segment_orientation(p(0.0, 0.0), p(0.1, 0.1), EPS), None);
        assert_eq!(segment_orientation(p(0.0, 0.0), p(5.0, 5.0), EPS), None);
    }
}
