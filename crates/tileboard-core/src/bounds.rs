//! Axis-aligned bounding boxes for board elements.
//!
//! Connector and freehand boxes are padded by their stroke and never smaller
//! than [`InteractionConfig::min_hit_size`] so that even a single-click line
//! stays draggable.

use crate::config::InteractionConfig;
use crate::geometry::curve::{catmull_rom_bounds, polyline_bounds};
use crate::geometry::transform::{local_to_world, world_to_local};
use crate::shapes::{Connector, Element, ElementId, PathStyle, Shape, rect_corners};
use kurbo::{Point, Rect};
use std::collections::HashMap;
use std::sync::RwLock;

/// Grow `raw` by the stroke and enforce the minimum hit size about its centre.
fn pad_linear(raw: Rect, stroke_width: f64, min_size: f64) -> Rect {
    let padded = raw.inflate(stroke_width, stroke_width);
    let center = padded.center();
    let half_w = padded.width().max(min_size) / 2.0;
    let half_h = padded.height().max(min_size) / 2.0;
    Rect::new(center.x - half_w, center.y - half_h, center.x + half_w, center.y + half_h)
}

fn connector_raw_bounds(connector: &Connector, config: &InteractionConfig) -> Option<Rect> {
    match connector.path_style {
        PathStyle::Curved if connector.points.len() >= 3 => catmull_rom_bounds(&connector.points),
        PathStyle::Elbow if connector.points.len() >= 3 => {
            polyline_bounds(&connector.elbow_polyline(config.elbow_epsilon))
        }
        _ => polyline_bounds(&connector.points),
    }
}

/// Compute the bounding box of an element without caching.
///
/// Returns `None` for laser trails and for linear elements without points.
pub fn element_bounds(element: &Element, config: &InteractionConfig) -> Option<Rect> {
    let stroke = element.shape.stroke_width();
    match &element.shape {
        Shape::Connector(c) => connector_raw_bounds(c, config).map(|raw| pad_linear(raw, stroke, config.min_hit_size)),
        Shape::Freehand(f) => polyline_bounds(&f.points).map(|raw| pad_linear(raw, stroke, config.min_hit_size)),
        Shape::Basic(b) => Some(b.rect().inflate(stroke / 2.0, stroke / 2.0)),
        Shape::Frame(f) => Some(f.rect()),
        Shape::Text(t) => {
            let size = t.size(config.glyph_width_factor, config.line_height_factor);
            Some(Rect::from_origin_size(t.position, size))
        }
        Shape::Laser(_) => None,
    }
}

/// Memoized [`element_bounds`], one entry per element id tagged with the
/// version it was computed for.
///
/// Correct only while every write bumps the element's version (see
/// [`BoardHost::on_update_element`](crate::board::BoardHost::on_update_element)).
/// A lookup at a newer version replaces the older entry. Uses RwLock for
/// interior mutability so lookups can happen through a shared reference.
#[derive(Debug, Default)]
pub struct BoundsCache {
    config: InteractionConfig,
    entries: RwLock<HashMap<ElementId, (u32, Option<Rect>)>>,
}

impl BoundsCache {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Bounds of `element`, computed at most once per (id, version).
    pub fn get(&self, element: &Element) -> Option<Rect> {
        if let Ok(entries) = self.entries.read() {
            if let Some(&(version, bounds)) = entries.get(&element.id) {
                if version == element.version {
                    return bounds;
                }
            }
        }
        let bounds = element_bounds(element, &self.config);
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(element.id, (element.version, bounds));
        }
        bounds
    }

    /// Axis-aligned world-space box of a possibly rotated element.
    pub fn world_bounds(&self, element: &Element) -> Option<Rect> {
        let local = self.get(element)?;
        if element.rotation == 0.0 {
            return Some(local);
        }
        let center = local.center();
        let corners = rect_corners(local).map(|c| local_to_world(c, center, element.rotation));
        polyline_bounds(&corners)
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Union of the bounds of every element in `ids`; `None` if none resolve.
pub fn combined_bounds(ids: &[ElementId], elements: &[Element], config: &InteractionConfig) -> Option<Rect> {
    elements
        .iter()
        .filter(|e| ids.contains(&e.id))
        .filter_map(|e| element_bounds(e, config))
        .reduce(|acc, r| acc.union(r))
}

/// Centre of the element's bounding box, the pivot of its rotation.
pub fn rotation_center(element: &Element, config: &InteractionConfig) -> Option<Point> {
    element_bounds(element, config).map(|b| b.center())
}

/// Convert a world-space point into the element's unrotated frame.
pub fn element_world_to_local(element: &Element, world: Point, config: &InteractionConfig) -> Point {
    match rotation_center(element, config) {
        Some(center) if element.rotation != 0.0 => world_to_local(world, center, element.rotation),
        _ => world,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::elbow::ElbowRoute;
    use crate::shapes::{
        BasicKind, BasicShape, ConnectorKind, Frame, FrameKind, Freehand, Laser, Text, TileKind,
    };

    fn config() -> InteractionConfig {
        InteractionConfig::default()
    }

    fn connector(points: Vec<Point>, style: PathStyle, stroke_width: f64) -> Element {
        let mut c = Connector::from_points(ConnectorKind::Line, points, style);
        c.style.stroke_width = stroke_width;
        Element::new(Shape::Connector(c))
    }

    #[test]
    fn test_single_point_line_gets_min_hit_size() {
        let e = connector(vec![Point::new(50.0, 50.0), Point::new(50.0, 50.0)], PathStyle::Sharp, 2.0);
        let b = element_bounds(&e, &config()).unwrap();
        assert!((b.width() - 20.0).abs() < 1e-9);
        assert!((b.height() - 20.0).abs() < 1e-9);
        assert_eq!(b.center(), Point::new(50.0, 50.0));
    }

    #[test]
    fn test_horizontal_line_padding() {
        let e = connector(vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)], PathStyle::Sharp, 2.0);
        let b = element_bounds(&e, &config()).unwrap();
        assert!((b.x0 + 2.0).abs() < 1e-9);
        assert!((b.x1 - 102.0).abs() < 1e-9);
        // Height floors at the minimum, centred on the line.
        assert!((b.y0 + 10.0).abs() < 1e-9);
        assert!((b.y1 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_virtual_elbow_bounds_include_corners() {
        let mut e = connector(
            vec![Point::new(0.0, 0.0), Point::new(50.0, 80.0), Point::new(100.0, 0.0)],
            PathStyle::Elbow,
            0.0,
        );
        let b = element_bounds(&e, &config()).unwrap();
        assert_eq!(b, Rect::new(0.0, 0.0, 100.0, 80.0));

        // A horizontal route keeps the control's x but not its y.
        if let Some(c) = e.as_connector_mut() {
            c.route = Some(ElbowRoute::Horizontal);
        }
        let b = element_bounds(&e, &config()).unwrap();
        assert_eq!(b, Rect::new(0.0, -10.0, 100.0, 10.0));
    }

    #[test]
    fn test_curved_bounds_cover_spline() {
        let e = connector(
            vec![Point::new(0.0, 0.0), Point::new(50.0, 60.0), Point::new(100.0, 0.0)],
            PathStyle::Curved,
            0.0,
        );
        let b = element_bounds(&e, &config()).unwrap();
        assert!(b.y1 >= 60.0 - 1e-9);
    }

    #[test]
    fn test_basic_shape_inflated_by_half_stroke() {
        let mut shape = BasicShape::new(BasicKind::Diamond, Point::new(10.0, 10.0), 100.0, 50.0);
        shape.style.stroke_width = 4.0;
        let e = Element::new(Shape::Basic(shape));
        assert_eq!(element_bounds(&e, &config()), Some(Rect::new(8.0, 8.0, 112.0, 62.0)));
    }

    #[test]
    fn test_frame_and_tile_use_raw_rect() {
        let tile = Element::new(Shape::Frame(Frame::new(
            FrameKind::Tile(TileKind::Markdown),
            Point::new(0.0, 0.0),
            200.0,
            100.0,
        )));
        assert_eq!(element_bounds(&tile, &config()), Some(Rect::new(0.0, 0.0, 200.0, 100.0)));
    }

    #[test]
    fn test_text_estimate() {
        let e = Element::new(Shape::Text(Text::new(Point::new(0.0, 0.0), "abcd").with_font_size(20.0)));
        let b = element_bounds(&e, &config()).unwrap();
        assert!((b.width() - 4.0 * 20.0 * 0.55).abs() < 1e-9);
        assert!((b.height() - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_laser_and_empty_freehand_have_no_bounds() {
        let laser = Element::new(Shape::Laser(Laser::default()));
        assert_eq!(element_bounds(&laser, &config()), None);
        let empty = Element::new(Shape::Freehand(Freehand::from_points(Vec::new())));
        assert_eq!(element_bounds(&empty, &config()), None);
    }

    #[test]
    fn test_cache_keys_on_version() {
        let cache = BoundsCache::new(config());
        let mut e = Element::new(Shape::Basic(BasicShape::new(
            BasicKind::Rectangle,
            Point::ZERO,
            10.0,
            10.0,
        )));
        let first = cache.get(&e);
        assert_eq!(cache.get(&e), first);
        assert_eq!(cache.len(), 1);

        if let Shape::Basic(b) = &mut e.shape {
            b.width = 40.0;
        }
        e.version += 1;
        let second = cache.get(&e).unwrap();
        assert!(second.width() > 40.0);
        // The newer version replaces the old entry.
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&e), Some(second));
    }

    #[test]
    fn test_world_bounds_of_rotated_element() {
        let cache = BoundsCache::new(config());
        let rect = Element::new(Shape::Frame(Frame::new(FrameKind::Frame, Point::new(0.0, 0.0), 100.0, 50.0)))
            .with_rotation(90.0);
        let b = cache.world_bounds(&rect).unwrap();
        assert!((b.x0 - 25.0).abs() < 1e-9);
        assert!((b.x1 - 75.0).abs() < 1e-9);
        assert!((b.y0 + 25.0).abs() < 1e-9);
        assert!((b.y1 - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_combined_bounds() {
        let a = Element::new(Shape::Frame(Frame::new(FrameKind::Frame, Point::new(0.0, 0.0), 10.0, 10.0)));
        let b = Element::new(Shape::Frame(Frame::new(FrameKind::Frame, Point::new(50.0, 20.0), 10.0, 10.0)));
        let laser = Element::new(Shape::Laser(Laser::default()));
        let elements = vec![a.clone(), b.clone(), laser.clone()];
        assert_eq!(
            combined_bounds(&[a.id, b.id], &elements, &config()),
            Some(Rect::new(0.0, 0.0, 60.0, 30.0))
        );
        assert_eq!(combined_bounds(&[laser.id], &elements, &config()), None);
        assert_eq!(combined_bounds(&[], &elements, &config()), None);
    }

    #[test]
    fn test_world_to_local_uses_bounds_center() {
        let rect = Element::new(Shape::Frame(Frame::new(FrameKind::Frame, Point::new(0.0, 0.0), 100.0, 50.0)))
            .with_rotation(90.0);
        let local = element_world_to_local(&rect, Point::new(75.0, 25.0), &config());
        assert!((local.x - 50.0).abs() < 1e-9);
        assert!(local.y.abs() < 1e-9);
    }
}
