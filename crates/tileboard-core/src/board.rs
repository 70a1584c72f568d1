//! Element store and the host contract the drag machine writes through.

use crate::bounds::BoundsCache;
use crate::error::{BoardError, BoardResult};
use crate::geometry::elbow::ElbowRoute;
use crate::shapes::{
    AnchorPosition, Connection, Connector, ConnectorKind, Element, ElementId, PathStyle, Shape,
};
use crate::snap::{accepts_connections, anchor_points};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Callbacks through which interaction code mutates the board.
///
/// Implementations own the elements; interaction code only ever reads them
/// through [`BoardHost::elements`] and writes whole updates back.
pub trait BoardHost {
    /// All elements, back to front.
    fn elements(&self) -> &[Element];

    /// Replace the geometry of connector `id`.
    ///
    /// Implementations must bump the element's `version` on every write:
    /// [`BoundsCache`] keys its entries on it and would otherwise serve the
    /// bounds of the previous geometry.
    fn on_update_element(&mut self, id: ElementId, update: ElementUpdate) -> BoardResult<()>;

    fn on_add_element(&mut self, element: Element) -> BoardResult<()>;

    /// A transform is about to start; hosts take their undo checkpoint here.
    fn on_start_transform(&mut self);
}

/// A complete connector geometry write.
///
/// Always carries the whole point array, never a delta.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementUpdate {
    pub points: Vec<Point>,
    pub path_style: PathStyle,
    pub route: Option<ElbowRoute>,
    pub start_connection: Option<Connection>,
    pub end_connection: Option<Connection>,
}

impl ElementUpdate {
    pub fn from_connector(connector: &Connector) -> Self {
        Self {
            points: connector.points.clone(),
            path_style: connector.path_style,
            route: connector.route,
            start_connection: connector.start_connection,
            end_connection: connector.end_connection,
        }
    }

    pub fn apply_to(&self, connector: &mut Connector) {
        connector.points = self.points.clone();
        connector.path_style = self.path_style;
        connector.route = self.route;
        connector.start_connection = self.start_connection;
        connector.end_connection = self.end_connection;
    }
}

/// A board: elements in z-order (back to front).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Board {
    elements: Vec<Element>,
    /// Number of transforms started since load.
    #[serde(skip)]
    transform_count: usize,
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element on top of the z-order.
    pub fn add(&mut self, element: Element) -> ElementId {
        let id = element.id;
        self.elements.push(element);
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn remove(&mut self, id: ElementId) -> Option<Element> {
        let index = self.elements.iter().position(|e| e.id == id)?;
        Some(self.elements.remove(index))
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn transform_count(&self) -> usize {
        self.transform_count
    }

    pub fn from_json(json: &str) -> BoardResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> BoardResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl BoardHost for Board {
    fn elements(&self) -> &[Element] {
        &self.elements
    }

    fn on_update_element(&mut self, id: ElementId, update: ElementUpdate) -> BoardResult<()> {
        let element = self
            .elements
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(BoardError::ElementNotFound(id))?;
        let connector = element.as_connector_mut().ok_or(BoardError::NotAConnector(id))?;
        update.apply_to(connector);
        element.version = element.version.wrapping_add(1);
        Ok(())
    }

    fn on_add_element(&mut self, element: Element) -> BoardResult<()> {
        log::debug!("Adding element {}", element.id);
        self.add(element);
        Ok(())
    }

    fn on_start_transform(&mut self) {
        self.transform_count += 1;
    }
}

/// Create a connector from the edge handle of `source_id` at `position`.
///
/// The new connector has two coincident points on the anchor and its start
/// attached there, ready for its end to be dragged out.
pub fn spawn_connector<H: BoardHost + ?Sized>(
    host: &mut H,
    source_id: ElementId,
    position: AnchorPosition,
    kind: ConnectorKind,
    cache: &BoundsCache,
) -> BoardResult<ElementId> {
    let source = host
        .elements()
        .iter()
        .find(|e| e.id == source_id)
        .ok_or(BoardError::ElementNotFound(source_id))?;
    if !accepts_connections(source) {
        return Err(BoardError::NotConnectable(source_id));
    }
    let anchor = anchor_points(source, cache)
        .into_iter()
        .find(|(p, _)| *p == position)
        .map(|(_, point)| point)
        .ok_or(BoardError::NotConnectable(source_id))?;

    let mut connector = Connector::new(kind, anchor, anchor);
    connector.start_connection = Some(Connection {
        element_id: source_id,
        position,
    });
    let element = Element::new(Shape::Connector(connector));
    let id = element.id;
    host.on_add_element(element)?;
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InteractionConfig;
    use crate::shapes::{BasicKind, BasicShape, Laser};

    fn rect(x: f64, y: f64) -> Element {
        Element::new(Shape::Basic(BasicShape::new(BasicKind::Rectangle, Point::new(x, y), 100.0, 50.0)))
    }

    fn line() -> Element {
        Element::new(Shape::Connector(Connector::new(
            ConnectorKind::Line,
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        )))
    }

    #[test]
    fn test_add_get_remove() {
        let mut board = Board::new();
        let a = board.add(rect(0.0, 0.0));
        let b = board.add(line());
        assert_eq!(board.len(), 2);
        assert_eq!(board.elements()[1].id, b);
        assert!(board.get(a).is_some());
        assert!(board.remove(a).is_some());
        assert!(board.get(a).is_none());
        assert!(board.remove(a).is_none());
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn test_update_bumps_version() {
        let mut board = Board::new();
        let id = board.add(line());
        let update = ElementUpdate {
            points: vec![Point::new(0.0, 0.0), Point::new(50.0, 50.0), Point::new(100.0, 0.0)],
            path_style: PathStyle::Curved,
            route: None,
            start_connection: None,
            end_connection: None,
        };
        board.on_update_element(id, update.clone()).unwrap();
        let element = board.get(id).unwrap();
        assert_eq!(element.version, 1);
        let connector = element.as_connector().unwrap();
        assert_eq!(connector.points, update.points);
        assert_eq!(connector.path_style, PathStyle::Curved);
    }

    #[test]
    fn test_cached_bounds_follow_updates() {
        let mut board = Board::new();
        let id = board.add(line());
        let cache = BoundsCache::default();
        let before = board.get(id).and_then(|e| cache.get(e)).unwrap();

        let mut update = ElementUpdate::from_connector(board.get(id).unwrap().as_connector().unwrap());
        update.points = vec![Point::new(0.0, 0.0), Point::new(100.0, 200.0)];
        board.on_update_element(id, update).unwrap();
        let after = board.get(id).and_then(|e| cache.get(e)).unwrap();

        assert_ne!(before, after);
        assert!(after.height() > 200.0);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_update_errors() {
        let mut board = Board::new();
        let shape = board.add(rect(0.0, 0.0));
        let update = ElementUpdate::from_connector(&Connector::new(ConnectorKind::Line, Point::ZERO, Point::ZERO));
        assert!(matches!(
            board.on_update_element(shape, update.clone()),
            Err(BoardError::NotAConnector(_))
        ));
        assert!(matches!(
            board.on_update_element(ElementId::new_v4(), update),
            Err(BoardError::ElementNotFound(_))
        ));
        assert_eq!(board.get(shape).unwrap().version, 0);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut board = Board::new();
        board.add(rect(10.0, 20.0));
        board.add(line());
        board.on_start_transform();
        let json = board.to_json().unwrap();
        let loaded = Board::from_json(&json).unwrap();
        assert_eq!(loaded.elements(), board.elements());
        assert_eq!(loaded.transform_count(), 0);
        assert!(Board::from_json("[1, 2").is_err());
    }

    #[test]
    fn test_spawn_connector_from_edge() {
        let cache = BoundsCache::new(InteractionConfig::default());
        let mut board = Board::new();
        let mut shape = BasicShape::new(BasicKind::Rectangle, Point::new(0.0, 0.0), 100.0, 50.0);
        shape.style.stroke_width = 0.0;
        let source = board.add(Element::new(Shape::Basic(shape)));

        let id = spawn_connector(&mut board, source, AnchorPosition::E, ConnectorKind::Arrow, &cache).unwrap();
        let connector = board.get(id).unwrap().as_connector().unwrap();
        assert_eq!(connector.points, vec![Point::new(100.0, 25.0), Point::new(100.0, 25.0)]);
        assert_eq!(
            connector.start_connection,
            Some(Connection {
                element_id: source,
                position: AnchorPosition::E,
            })
        );
        assert!(connector.arrow_end);
    }

    #[test]
    fn test_spawn_connector_errors() {
        let cache = BoundsCache::new(InteractionConfig::default());
        let mut board = Board::new();
        let laser = board.add(Element::new(Shape::Laser(Laser::default())));
        assert!(matches!(
            spawn_connector(&mut board, laser, AnchorPosition::N, ConnectorKind::Line, &cache),
            Err(BoardError::NotConnectable(_))
        ));
        assert!(matches!(
            spawn_connector(&mut board, ElementId::new_v4(), AnchorPosition::N, ConnectorKind::Line, &cache),
            Err(BoardError::ElementNotFound(_))
        ));
        assert_eq!(board.len(), 1);
    }
}
