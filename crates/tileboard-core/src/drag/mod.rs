//! Interactive connector editing.
//!
//! A drag starts from a [`DragSession`] holding an immutable snapshot of the
//! connector. Every pointer move recomputes the whole connector from that
//! snapshot via [`preview`], and [`DragMachine`] writes each result to the
//! host as a complete update.

mod machine;
mod preview;
mod session;

pub use machine::{DragMachine, DragState};
pub use preview::preview;
pub use session::DragSession;

use serde::{Deserialize, Serialize};

/// What a drag manipulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConnectorDragKind {
    /// Move one stored point (endpoints may snap and re-route).
    Normal,
    /// Turn a 2-point connector into a 3-point one through the cursor.
    CreateCorner,
    /// Move the control of a 3-point curved connector.
    CurvedMid,
    /// Move the virtual control of a 3-point elbow along its free axis.
    ElbowHandle,
    /// Shift the run of points sharing one axis value.
    ElbowOrtho,
    /// Shift a whole orthogonal run perpendicular to itself.
    ElbowEdge,
    /// Move an elbow endpoint while keeping its anchoring edge straight.
    ElbowEndpoint,
}

impl ConnectorDragKind {
    /// Kinds whose endpoint drags may snap to another element.
    pub fn snaps_endpoints(self) -> bool {
        matches!(self, ConnectorDragKind::Normal | ConnectorDragKind::ElbowEndpoint)
    }
}
