//! Snapping connector endpoints to the anchors of other elements.

use crate::bounds::BoundsCache;
use crate::geometry::transform::local_to_world;
use crate::shapes::{AnchorPosition, Connection, Element, ElementId, Shape, segment_crosses_rect};
use kurbo::Point;

/// An anchor a dragged endpoint is about to attach to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapTarget {
    pub element_id: ElementId,
    /// World-space anchor location.
    pub point: Point,
    pub position: AnchorPosition,
    /// The straight segment from the connector's fixed end to `point` passes
    /// through an element, so a straight connector would be hidden behind it.
    pub out_of_line_of_sight: bool,
}

impl SnapTarget {
    /// The connection a committed snap stores on the connector.
    pub fn connection(&self) -> Connection {
        Connection {
            element_id: self.element_id,
            position: self.position,
        }
    }
}

/// Whether connectors may attach to this element.
pub fn accepts_connections(element: &Element) -> bool {
    matches!(
        element.shape,
        Shape::Basic(_) | Shape::Frame(_) | Shape::Text(_) | Shape::Freehand(_)
    )
}

/// World-space positions of the eight anchors of an element.
pub fn anchor_points(element: &Element, cache: &BoundsCache) -> Vec<(AnchorPosition, Point)> {
    let Some(bounds) = cache.get(element) else {
        return Vec::new();
    };
    let center = bounds.center();
    AnchorPosition::ALL
        .iter()
        .map(|&position| {
            let local = position.point_on(bounds);
            (position, local_to_world(local, center, element.rotation))
        })
        .collect()
}

/// Find the nearest anchor within the snap distance of `cursor`.
///
/// `fixed_end` is the connector's other endpoint and is used for the
/// line-of-sight check. The connector itself (`moving_id`) is never a target.
pub fn find_snap_target(
    cursor: Point,
    fixed_end: Point,
    elements: &[Element],
    moving_id: ElementId,
    cache: &BoundsCache,
) -> Option<SnapTarget> {
    let threshold = cache.config().snap_distance;
    let mut best: Option<(f64, ElementId, AnchorPosition, Point)> = None;
    for element in elements.iter().filter(|e| e.id != moving_id && accepts_connections(e)) {
        for (position, point) in anchor_points(element, cache) {
            let dist = point.distance(cursor);
            if dist <= threshold && best.is_none_or(|(best_dist, ..)| dist < best_dist) {
                best = Some((dist, element.id, position, point));
            }
        }
    }
    let (_, element_id, position, point) = best?;

    let out_of_line_of_sight = elements
        .iter()
        .filter(|e| e.id != moving_id && !e.is_connector())
        .filter_map(|e| cache.world_bounds(e))
        .any(|b| segment_crosses_rect(fixed_end, point, b));

    Some(SnapTarget {
        element_id,
        point,
        position,
        out_of_line_of_sight,
    })
}
