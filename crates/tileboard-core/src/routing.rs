//! Best-effort obstacle avoidance for snapped connectors.
//!
//! The router does not search: it tries a short list of candidate shapes and
//! keeps the first that crosses no obstacle, or the one crossing the fewest.
//! Obstacle avoidance is a visual nicety, so a colliding route is still a
//! valid answer.

use crate::bounds::BoundsCache;
use crate::geometry::curve::catmull_rom_polyline;
use crate::geometry::elbow::{bend_count, elbow_polyline_for_vertices};
use crate::shapes::{AnchorPosition, Connection, Element, ElementId, segment_crosses_rect};
use kurbo::{Point, Rect};

/// Samples per spline segment when testing a curved candidate for collisions.
const CURVE_COLLISION_SAMPLES: usize = 24;

/// Path family the router produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStyle {
    /// Orthogonal polyline.
    Elbow,
    /// `[fixed, control, moving]` spline, or the direct segment.
    Curved,
}

/// Inputs of a routing query.
#[derive(Debug, Clone, Copy)]
pub struct RouteRequest<'a> {
    /// The endpoint that stays put (the connector's other end).
    pub fixed: Point,
    /// The endpoint being dragged, usually a snap point.
    pub moving: Point,
    pub elements: &'a [Element],
    /// The connector being routed. Never an obstacle for itself.
    pub moving_element_id: ElementId,
    /// Element the moving end is snapping to.
    pub target_element_id: Option<ElementId>,
    /// Anchor the moving end snaps to; the route enters it perpendicularly.
    pub target_position: Option<AnchorPosition>,
    /// Connection of the fixed end, if it is anchored to a shape edge.
    pub other_end_connection: Option<Connection>,
    pub style: RouteStyle,
}

/// World-space boxes a route is tested against.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Obstacles {
    /// Unrelated elements, inflated by the route margin. No leg may cross these.
    pub others: Vec<Rect>,
    /// The shape the fixed end is anchored to and the snap target. Only the
    /// perpendicular stubs touching them may enter these boxes.
    pub ends: Vec<Rect>,
}

impl Obstacles {
    fn all(&self) -> Vec<Rect> {
        self.others.iter().chain(&self.ends).copied().collect()
    }
}

/// Collect obstacle boxes for a routing query.
///
/// End boxes are inflated by at most half the stub length so a stub always
/// clears its own shape.
pub fn collect_obstacles(request: &RouteRequest<'_>, cache: &BoundsCache) -> Obstacles {
    let config = cache.config();
    let margin = config.route_margin;
    let end_margin = margin.min(config.route_stub / 2.0);
    let anchor_id = request.other_end_connection.map(|c| c.element_id);
    // A target without an anchor position gets no stub, so it cannot be an end box.
    let target_id = request.target_position.and(request.target_element_id);

    let mut obstacles = Obstacles::default();
    for element in request.elements {
        if element.is_connector() || element.id == request.moving_element_id {
            continue;
        }
        let is_end = Some(element.id) == anchor_id || Some(element.id) == target_id;
        if !is_end && Some(element.id) == request.target_element_id {
            continue;
        }
        let Some(bounds) = cache.world_bounds(element) else {
            continue;
        };
        if is_end {
            obstacles.ends.push(bounds.inflate(end_margin, end_margin));
        } else {
            obstacles.others.push(bounds.inflate(margin, margin));
        }
    }
    obstacles
}

/// Number of (segment, obstacle) pairs where the segment cuts through the obstacle.
pub fn path_obstacle_intersections(points: &[Point], obstacles: &[Rect]) -> usize {
    points
        .windows(2)
        .map(|w| obstacles.iter().filter(|r| segment_crosses_rect(w[0], w[1], **r)).count())
        .sum()
}

/// Route a connector between two endpoints, avoiding other elements.
///
/// The returned path includes both endpoints: two points when the direct
/// connection is clear, at least three when a detour was needed.
pub fn route_around(request: &RouteRequest<'_>, cache: &BoundsCache) -> Vec<Point> {
    let obstacles = collect_obstacles(request, cache);
    match request.style {
        RouteStyle::Elbow => route_elbow(request, &obstacles, cache),
        RouteStyle::Curved => route_curved(request, &obstacles.others, cache),
    }
}

/// Orthogonal candidates between `a` and `b`, most preferred first.
fn elbow_candidates(a: Point, b: Point, obstacles: &[Rect]) -> Vec<Vec<Point>> {
    let mid_x = (a.x + b.x) / 2.0;
    let mid_y = (a.y + b.y) / 2.0;
    let mut candidates = vec![
        vec![a, b],
        vec![a, Point::new(b.x, a.y), b],
        vec![a, Point::new(a.x, b.y), b],
        vec![a, Point::new(mid_x, a.y), Point::new(mid_x, b.y), b],
        vec![a, Point::new(a.x, mid_y), Point::new(b.x, mid_y), b],
    ];

    // Detour around every obstacle one of the simple shapes runs into, nearest first.
    let mut blocking: Vec<Rect> = obstacles
        .iter()
        .copied()
        .filter(|r| {
            candidates
                .iter()
                .any(|c| path_obstacle_intersections(&elbow_polyline_for_vertices(c, 0.0), &[*r]) > 0)
        })
        .collect();
    blocking.sort_by(|r1, r2| {
        let d1 = r1.center().distance(a);
        let d2 = r2.center().distance(a);
        d1.total_cmp(&d2)
    });
    for r in blocking {
        candidates.push(vec![a, Point::new(a.x, r.y0), Point::new(b.x, r.y0), b]);
        candidates.push(vec![a, Point::new(a.x, r.y1), Point::new(b.x, r.y1), b]);
        candidates.push(vec![a, Point::new(r.x0, a.y), Point::new(r.x0, b.y), b]);
        candidates.push(vec![a, Point::new(r.x1, a.y), Point::new(r.x1, b.y), b]);
    }
    candidates
}

/// Append `p` to an orthogonal path, folding the last point away when the
/// path carries straight on through it. Reversals are kept.
fn extend_straight(path: &mut Vec<Point>, p: Point, eps: f64) {
    let Some(&last) = path.last() else {
        path.push(p);
        return;
    };
    if last.distance(p) <= eps {
        return;
    }
    if path.len() >= 2 {
        let prev = path[path.len() - 2];
        let same_x = (prev.x - last.x).abs() <= eps && (last.x - p.x).abs() <= eps;
        let same_y = (prev.y - last.y).abs() <= eps && (last.y - p.y).abs() <= eps;
        if (same_x || same_y) && (last - prev).dot(p - last) > 0.0 {
            path.pop();
        }
    }
    path.push(p);
}

fn route_elbow(request: &RouteRequest<'_>, obstacles: &Obstacles, cache: &BoundsCache) -> Vec<Point> {
    let config = cache.config();
    let eps = config.elbow_epsilon;

    // The stubs are fixed: they leave and enter their shapes perpendicularly
    // and only they may touch the end boxes.
    let head = request
        .other_end_connection
        .map(|c| request.fixed + c.position.exit_direction() * config.route_stub);
    let tail = request
        .target_position
        .map(|position| request.moving + position.exit_direction() * config.route_stub);
    let a = head.unwrap_or(request.fixed);
    let b = tail.unwrap_or(request.moving);

    let mut stub_hits = 0;
    if head.is_some() {
        stub_hits += path_obstacle_intersections(&[request.fixed, a], &obstacles.others);
    }
    if tail.is_some() {
        stub_hits += path_obstacle_intersections(&[b, request.moving], &obstacles.others);
    }

    let all = obstacles.all();
    // Fewest collisions, then fewest bends.
    let mut best: Option<((usize, usize), Vec<Point>)> = None;
    for middle in elbow_candidates(a, b, &all) {
        let middle = elbow_polyline_for_vertices(&middle, eps);
        let hits = stub_hits + path_obstacle_intersections(&middle, &all);

        let mut path = vec![request.fixed];
        for &p in head.iter().chain(&middle).chain(tail.iter()) {
            extend_straight(&mut path, p, eps);
        }
        extend_straight(&mut path, request.moving, eps);
        if path.len() < 2 {
            path.push(request.moving);
        } else if let Some(last) = path.last_mut() {
            *last = request.moving;
        }

        if hits == 0 {
            return path;
        }
        let score = (hits, bend_count(&path, eps));
        if best.as_ref().is_none_or(|(fewest, _)| score < *fewest) {
            best = Some((score, path));
        }
    }

    log::debug!(
        "No clear elbow route from {:?} to {:?}; using best of {} obstacles",
        request.fixed,
        request.moving,
        all.len()
    );
    best.map(|(_, path)| path)
        .unwrap_or_else(|| vec![request.fixed, request.moving])
}

fn route_curved(request: &RouteRequest<'_>, obstacles: &[Rect], cache: &BoundsCache) -> Vec<Point> {
    let eps = cache.config().elbow_epsilon;
    let (a, b) = (request.fixed, request.moving);

    // `None` stands for the direct segment.
    let mut controls: Vec<Option<Point>> = Vec::new();
    if let Some(connection) = request.other_end_connection {
        let exit = connection.position.exit_direction();
        let reach = (b - a).dot(exit).max(cache.config().route_stub);
        let control = a + exit * reach;
        if control.distance(a) > eps && control.distance(b) > eps {
            controls.push(Some(control));
        }
    }
    controls.push(None);

    // Controls sit one margin beyond the inflated box.
    let clearance = cache.config().route_margin;
    let mid = a.midpoint(b);
    for r in obstacles.iter().filter(|r| segment_crosses_rect(a, b, **r)) {
        controls.push(Some(Point::new(mid.x, r.y0 - clearance)));
        controls.push(Some(Point::new(mid.x, r.y1 + clearance)));
        controls.push(Some(Point::new(r.x0 - clearance, mid.y)));
        controls.push(Some(Point::new(r.x1 + clearance, mid.y)));
    }

    let mut best: Option<(usize, Vec<Point>)> = None;
    for control in controls {
        let path = match control {
            Some(c) => vec![a, c, b],
            None => vec![a, b],
        };
        let sampled = catmull_rom_polyline(&path, CURVE_COLLISION_SAMPLES);
        let hits = path_obstacle_intersections(&sampled, obstacles);
        if hits == 0 {
            return path;
        }
        if best.as_ref().is_none_or(|(fewest, _)| hits < *fewest) {
            best = Some((hits, path));
        }
    }

    log::debug!("No clear curved route from {:?} to {:?}", a, b);
    best.map(|(_, path)| path).unwrap_or_else(|| vec![a, b])
}
