//! Box and lasso selection, and resize/rotate handles for closed shapes.

use crate::bounds::{BoundsCache, element_world_to_local};
use crate::geometry::transform::local_to_world;
use crate::shapes::{Element, ElementId, GroupId, Shape, rect_contains_inclusive, rect_corners, segments_intersect};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Distance from the top edge to the rotation handle (in world units).
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Resize/rotate handle of a closed shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    Corner(Corner),
    Edge(Edge),
    Rotate,
}

/// A handle and its position in world coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point hits this handle. `tolerance` should be adjusted for zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        self.position.distance_squared(point) <= tolerance * tolerance
    }
}

fn local_handles(bounds: Rect, resizable: bool) -> Vec<Handle> {
    let center = bounds.center();
    let rotate = Handle::new(Point::new(center.x, bounds.y0 - ROTATE_HANDLE_OFFSET), HandleKind::Rotate);
    if !resizable {
        return vec![rotate];
    }
    vec![
        Handle::new(Point::new(bounds.x0, bounds.y0), HandleKind::Corner(Corner::TopLeft)),
        Handle::new(Point::new(bounds.x1, bounds.y0), HandleKind::Corner(Corner::TopRight)),
        Handle::new(Point::new(bounds.x0, bounds.y1), HandleKind::Corner(Corner::BottomLeft)),
        Handle::new(Point::new(bounds.x1, bounds.y1), HandleKind::Corner(Corner::BottomRight)),
        Handle::new(Point::new(center.x, bounds.y0), HandleKind::Edge(Edge::Top)),
        Handle::new(Point::new(bounds.x1, center.y), HandleKind::Edge(Edge::Right)),
        Handle::new(Point::new(center.x, bounds.y1), HandleKind::Edge(Edge::Bottom)),
        Handle::new(Point::new(bounds.x0, center.y), HandleKind::Edge(Edge::Left)),
        rotate,
    ]
}

/// Handles of a closed shape in its unrotated frame.
///
/// Connectors expose their own controls and laser trails none, so both get
/// an empty list. Text only rotates.
fn shape_local_handles(element: &Element, cache: &BoundsCache) -> Vec<Handle> {
    let Some(bounds) = cache.get(element) else {
        return Vec::new();
    };
    match element.shape {
        Shape::Basic(_) | Shape::Frame(_) | Shape::Freehand(_) => local_handles(bounds, true),
        Shape::Text(_) => local_handles(bounds, false),
        Shape::Connector(_) | Shape::Laser(_) => Vec::new(),
    }
}

/// Resize/rotate handles of an element, positioned in world space.
pub fn shape_handles(element: &Element, cache: &BoundsCache) -> Vec<Handle> {
    let Some(center) = cache.get(element).map(|b| b.center()) else {
        return Vec::new();
    };
    shape_local_handles(element, cache)
        .into_iter()
        .map(|h| Handle::new(local_to_world(h.position, center, element.rotation), h.kind))
        .collect()
}

/// Find the handle under a world-space point.
///
/// The cursor is rotated into the element's local frame first, so a handle
/// is identified by its unrotated role (a 90° turned rectangle reports its
/// top edge handle when the cursor is on its visual east side).
pub fn shape_handle_at(element: &Element, world: Point, tolerance: f64, cache: &BoundsCache) -> Option<HandleKind> {
    let local = element_world_to_local(element, world, cache.config());
    shape_local_handles(element, cache)
        .into_iter()
        .find(|h| h.hit_test(local, tolerance))
        .map(|h| h.kind)
}

/// Select elements whose world bounds satisfy `contains`, applying
/// all-or-nothing semantics to groups. Result order follows `elements`.
fn select_contained(elements: &[Element], cache: &BoundsCache, contains: impl Fn(Rect) -> bool) -> Vec<ElementId> {
    let inside: Vec<Option<bool>> = elements
        .iter()
        .map(|e| cache.world_bounds(e).map(&contains))
        .collect();

    // A group qualifies only if it has at least one boundable member and every
    // boundable member is inside.
    let mut groups: HashMap<GroupId, bool> = HashMap::new();
    for (element, inside) in elements.iter().zip(&inside) {
        let (Some(group_id), Some(inside)) = (element.group_id, inside) else {
            continue;
        };
        let entry = groups.entry(group_id).or_insert(true);
        *entry &= *inside;
    }

    elements
        .iter()
        .zip(&inside)
        .filter(|(element, inside)| match element.group_id {
            Some(group_id) => inside.is_some() && groups.get(&group_id).copied().unwrap_or(false),
            None => inside.unwrap_or(false),
        })
        .map(|(element, _)| element.id)
        .collect()
}

/// Ids selected by a marquee rectangle.
pub fn box_selected_ids(selection: Rect, elements: &[Element], cache: &BoundsCache) -> Vec<ElementId> {
    let selection = selection.abs();
    select_contained(elements, cache, |bounds| {
        rect_contains_inclusive(selection, Point::new(bounds.x0, bounds.y0))
            && rect_contains_inclusive(selection, Point::new(bounds.x1, bounds.y1))
    })
}

/// Ray-casting point-in-polygon test.
fn point_in_polygon(p: Point, polygon: &[Point]) -> bool {
    let mut inside = false;
    let n = polygon.len();
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// A box is inside a (possibly concave) lasso if all its corners are inside
/// and no lasso edge cuts through it.
fn rect_in_polygon(rect: Rect, polygon: &[Point]) -> bool {
    let corners = rect_corners(rect);
    if !corners.iter().all(|c| point_in_polygon(*c, polygon)) {
        return false;
    }
    let n = polygon.len();
    (0..n).all(|i| {
        let (a, b) = (polygon[i], polygon[(i + 1) % n]);
        (0..4).all(|k| !segments_intersect(a, b, corners[k], corners[(k + 1) % 4]))
    })
}

/// Ids selected by a freeform lasso. Polygons with fewer than 3 points select nothing.
pub fn lasso_selected_ids(polygon: &[Point], elements: &[Element], cache: &BoundsCache) -> Vec<ElementId> {
    if polygon.len() < 3 {
        return Vec::new();
    }
    select_contained(elements, cache, |bounds| rect_in_polygon(bounds, polygon))
}
