//! Tileboard Core Library
//!
//! Connector geometry, bounding boxes, obstacle-aware routing and the
//! interactive connector drag machine for the Tileboard whiteboard.

pub mod board;
pub mod bounds;
pub mod config;
pub mod controls;
pub mod drag;
pub mod error;
pub mod geometry;
pub mod routing;
pub mod selection;
pub mod shapes;
pub mod snap;

pub use board::{Board, BoardHost, ElementUpdate, spawn_connector};
pub use bounds::{BoundsCache, combined_bounds, element_bounds};
pub use config::InteractionConfig;
pub use controls::{ConnectorControls, ConnectorHandle, ControlView, EdgeHitTarget, connector_controls};
pub use drag::{ConnectorDragKind, DragMachine, DragSession, DragState};
pub use error::{BoardError, BoardResult};
pub use routing::{RouteRequest, RouteStyle, route_around};
pub use selection::{box_selected_ids, lasso_selected_ids, shape_handle_at};
pub use shapes::{Connector, Element, ElementId, PathStyle, Shape};
pub use snap::{SnapTarget, find_snap_target};
