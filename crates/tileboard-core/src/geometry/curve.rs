//! Bézier and Catmull-Rom helpers used by connector paths and bounds.

use kurbo::{BezPath, CubicBez, Point, Rect};

/// Number of uniform samples taken per cubic segment when bounding a spline.
pub const SPLINE_BOUNDS_SAMPLES: usize = 32;

/// Number of samples used to approximate a segment's arc length.
const ARC_LENGTH_SAMPLES: usize = 64;

/// Evaluate a quadratic Bézier at `t`.
pub fn quadratic_bezier_point(p0: Point, control: Point, p1: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let a = mt * mt;
    let b = 2.0 * mt * t;
    let c = t * t;
    Point::new(
        a * p0.x + b * control.x + c * p1.x,
        a * p0.y + b * control.y + c * p1.y,
    )
}

/// Parameter of the extremum of one axis of a quadratic, if it lies strictly inside (0, 1).
fn quadratic_extremum(p0: f64, control: f64, p1: f64) -> Option<f64> {
    let denom = p0 - 2.0 * control + p1;
    if denom.abs() < f64::EPSILON {
        return None;
    }
    let t = (p0 - control) / denom;
    (t > 0.0 && t < 1.0).then_some(t)
}

/// Tight bounds of a quadratic Bézier, including its parametric extrema.
pub fn quadratic_bezier_bounds(p0: Point, control: Point, p1: Point) -> Rect {
    let mut rect = Rect::from_points(p0, p1);
    if let Some(t) = quadratic_extremum(p0.x, control.x, p1.x) {
        rect = rect.union_pt(quadratic_bezier_point(p0, control, p1, t));
    }
    if let Some(t) = quadratic_extremum(p0.y, control.y, p1.y) {
        rect = rect.union_pt(quadratic_bezier_point(p0, control, p1, t));
    }
    rect
}

/// Evaluate a cubic Bézier at `t` using the Bernstein basis.
pub fn cubic_bezier_point(p0: Point, c1: Point, c2: Point, p1: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    let a = mt * mt * mt;
    let b = 3.0 * mt * mt * t;
    let c = 3.0 * mt * t * t;
    let d = t * t * t;
    Point::new(
        a * p0.x + b * c1.x + c * c2.x + d * p1.x,
        a * p0.y + b * c1.y + c * c2.y + d * p1.y,
    )
}

/// Cubic control points for the Catmull-Rom segment `p1 -> p2` (tension 1).
pub fn catmull_rom_control_points(p0: Point, p1: Point, p2: Point, p3: Point) -> (Point, Point) {
    let c1 = Point::new(p1.x + (p2.x - p0.x) / 6.0, p1.y + (p2.y - p0.y) / 6.0);
    let c2 = Point::new(p2.x - (p3.x - p1.x) / 6.0, p2.y - (p3.y - p1.y) / 6.0);
    (c1, c2)
}

/// Convert a point list into the cubic segments of its Catmull-Rom spline.
///
/// The first and last points act as their own outer neighbours.
pub fn catmull_rom_segments(points: &[Point]) -> Vec<CubicBez> {
    if points.len() < 2 {
        return Vec::new();
    }
    let last = points.len() - 1;
    (0..last)
        .map(|i| {
            let p0 = points[i.saturating_sub(1)];
            let p1 = points[i];
            let p2 = points[i + 1];
            let p3 = points[(i + 2).min(last)];
            let (c1, c2) = catmull_rom_control_points(p0, p1, p2, p3);
            CubicBez::new(p1, c1, c2, p2)
        })
        .collect()
}

/// Build the rendered path of a curved connector.
///
/// Returns `None` for fewer than two points and a straight segment for
/// exactly two. Every input point lies on the resulting curve.
pub fn catmull_rom_path(points: &[Point]) -> Option<BezPath> {
    if points.len() < 2 {
        return None;
    }
    let mut path = BezPath::new();
    path.move_to(points[0]);
    if points.len() == 2 {
        path.line_to(points[1]);
        return Some(path);
    }
    for seg in catmull_rom_segments(points) {
        path.curve_to(seg.p1, seg.p2, seg.p3);
    }
    Some(path)
}

/// Approximate bounds of a Catmull-Rom spline by uniform sampling.
pub fn catmull_rom_bounds(points: &[Point]) -> Option<Rect> {
    if points.len() < 2 {
        return None;
    }
    let mut rect = Rect::from_points(points[0], points[0]);
    for seg in catmull_rom_segments(points) {
        for step in 0..=SPLINE_BOUNDS_SAMPLES {
            let t = step as f64 / SPLINE_BOUNDS_SAMPLES as f64;
            rect = rect.union_pt(cubic_bezier_point(seg.p0, seg.p1, seg.p2, seg.p3, t));
        }
    }
    Some(rect)
}

/// Axis-aligned bounds of a point list.
pub fn polyline_bounds(points: &[Point]) -> Option<Rect> {
    let first = *points.first()?;
    Some(
        points
            .iter()
            .skip(1)
            .fold(Rect::from_points(first, first), |rect, p| rect.union_pt(*p)),
    )
}

/// Total length of a polyline.
pub fn polyline_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance(w[1])).sum()
}

/// Point halfway along a cubic segment, measured by sampled arc length.
pub fn cubic_arc_midpoint(seg: &CubicBez) -> Point {
    let eval = |t: f64| cubic_bezier_point(seg.p0, seg.p1, seg.p2, seg.p3, t);
    let mut lengths = Vec::with_capacity(ARC_LENGTH_SAMPLES + 1);
    let mut total = 0.0;
    let mut prev = seg.p0;
    lengths.push(0.0);
    for step in 1..=ARC_LENGTH_SAMPLES {
        let p = eval(step as f64 / ARC_LENGTH_SAMPLES as f64);
        total += prev.distance(p);
        lengths.push(total);
        prev = p;
    }
    if total < f64::EPSILON {
        return seg.p0;
    }
    let half = total / 2.0;
    for step in 1..=ARC_LENGTH_SAMPLES {
        if lengths[step] >= half {
            let span = lengths[step] - lengths[step - 1];
            let frac = if span > f64::EPSILON {
                (half - lengths[step - 1]) / span
            } else {
                0.0
            };
            let t = (step as f64 - 1.0 + frac) / ARC_LENGTH_SAMPLES as f64;
            return eval(t);
        }
    }
    seg.p3
}

/// Arc length of a cubic segment by the same sampling as [`cubic_arc_midpoint`].
pub fn cubic_arc_length(seg: &CubicBez) -> f64 {
    let samples: Vec<Point> = (0..=ARC_LENGTH_SAMPLES)
        .map(|step| {
            let t = step as f64 / ARC_LENGTH_SAMPLES as f64;
            cubic_bezier_point(seg.p0, seg.p1, seg.p2, seg.p3, t)
        })
        .collect();
    polyline_length(&samples)
}

/// Densely sample a Catmull-Rom spline into a polyline (for hit and collision tests).
pub fn catmull_rom_polyline(points: &[Point], samples_per_segment: usize) -> Vec<Point> {
    let segments = catmull_rom_segments(points);
    if segments.is_empty() {
        return points.to_vec();
    }
    let steps = samples_per_segment.max(1);
    let mut out = vec![points[0]];
    for seg in &segments {
        for step in 1..=steps {
            let t = step as f64 / steps as f64;
            out.push(cubic_bezier_point(seg.p0, seg.p1, seg.p2, seg.p3, t));
        }
    }
    out
}
