//! The drag lifecycle: begin, update, commit.

use super::{DragSession, preview};
use crate::board::{BoardHost, ElementUpdate};
use crate::bounds::{BoundsCache, element_world_to_local, rotation_center};
use crate::config::InteractionConfig;
use crate::error::{BoardError, BoardResult};
use crate::geometry::transform::local_to_world;
use crate::shapes::{ConnectorEnd, Element};
use crate::snap::{SnapTarget, find_snap_target};
use kurbo::Point;

/// State of the connector drag machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        session: DragSession,
        /// Last connector written to the host.
        preview: Element,
    },
}

/// Drives at most one connector drag at a time.
#[derive(Debug, Default)]
pub struct DragMachine {
    state: DragState,
    cache: BoundsCache,
}

impl DragMachine {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            state: DragState::Idle,
            cache: BoundsCache::new(config),
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn session(&self) -> Option<&DragSession> {
        match &self.state {
            DragState::Dragging { session, .. } => Some(session),
            DragState::Idle => None,
        }
    }

    pub fn cache(&self) -> &BoundsCache {
        &self.cache
    }

    /// Start a drag.
    ///
    /// Sessions that insert a point write their new baseline immediately so
    /// the host sees the point even if the pointer never moves.
    pub fn begin<H: BoardHost + ?Sized>(&mut self, session: DragSession, host: &mut H) -> BoardResult<()> {
        if self.is_dragging() {
            return Err(BoardError::DragInProgress);
        }
        host.on_start_transform();
        if session.creates_point {
            let connector = session
                .original
                .as_connector()
                .ok_or(BoardError::NotAConnector(session.element_id))?;
            host.on_update_element(session.element_id, ElementUpdate::from_connector(connector))?;
        }
        log::debug!(
            "Begin {:?} drag on {} at index {}",
            session.kind,
            session.element_id,
            session.index
        );
        let preview = session.original.clone();
        self.state = DragState::Dragging { session, preview };
        Ok(())
    }

    /// Recompute the preview for a world-space cursor and write it to the host.
    pub fn update<H: BoardHost + ?Sized>(
        &mut self,
        world_cursor: Point,
        snap: Option<SnapTarget>,
        host: &mut H,
    ) -> BoardResult<&Element> {
        let DragState::Dragging { session, preview: current } = &mut self.state else {
            log::warn!("Ignoring drag update at {:?} with no active session", world_cursor);
            return Err(BoardError::NoActiveDrag);
        };
        let config = self.cache.config();
        let local = element_world_to_local(&session.original, world_cursor, config);
        let snap = snap
            .filter(|_| session.kind.snaps_endpoints())
            .map(|s| SnapTarget {
                point: element_world_to_local(&session.original, s.point, config),
                ..s
            });

        let next = preview(&session.original, session, local, snap.as_ref(), host.elements(), &self.cache);
        if let Some(connector) = next.as_connector() {
            host.on_update_element(session.element_id, ElementUpdate::from_connector(connector))?;
        }
        *current = next;
        Ok(current)
    }

    /// Finish the drag, writing the last preview.
    pub fn commit<H: BoardHost + ?Sized>(&mut self, host: &mut H) -> BoardResult<Element> {
        let DragState::Dragging { session, preview } = std::mem::take(&mut self.state) else {
            return Err(BoardError::NoActiveDrag);
        };
        if let Some(connector) = preview.as_connector() {
            host.on_update_element(session.element_id, ElementUpdate::from_connector(connector))?;
        }
        log::debug!("Commit {:?} drag on {}", session.kind, session.element_id);
        Ok(preview)
    }

    /// Snap target for the dragged endpoint at `world_cursor`, if any.
    pub fn find_snap<H: BoardHost + ?Sized>(&self, world_cursor: Point, host: &H) -> Option<SnapTarget> {
        let session = self.session()?;
        if !session.kind.snaps_endpoints() {
            return None;
        }
        let connector = session.original.as_connector()?;
        let end = ConnectorEnd::from_index(session.index, connector.points.len())?;
        let fixed = connector.endpoint(end.opposite());
        let fixed = match rotation_center(&session.original, self.cache.config()) {
            Some(center) => local_to_world(fixed, center, session.original.rotation),
            None => fixed,
        };
        find_snap_target(world_cursor, fixed, host.elements(), session.element_id, &self.cache)
    }
}
