//! Interaction tuning shared by the bounds engine, router and handle layout.

use crate::error::BoardResult;
use serde::{Deserialize, Serialize};

/// Tolerance used when deciding whether two coordinates lie on the same axis.
pub const ELBOW_EPSILON: f64 = 0.5;
/// Minimum width/height of a linear element's bounding box (world units).
pub const MIN_HIT_SIZE: f64 = 20.0;
/// Radius of the large endpoint handles, in screen pixels.
pub const ENDPOINT_HANDLE_RADIUS: f64 = 6.0;
/// Radius of the small midpoint/insert handles, in screen pixels.
pub const INSERT_HANDLE_RADIUS: f64 = 4.0;
/// Extra room required between two handles on the same run, in screen pixels.
pub const MIN_HANDLE_GAP: f64 = 4.0;
/// Mid-run handles closer than this to a true endpoint are hidden (screen pixels).
pub const MIN_ENDPOINT_DISTANCE: f64 = 16.0;
/// Width of the invisible elbow edge hit target, in screen pixels.
pub const EDGE_HIT_WIDTH: f64 = 12.0;
/// Clearance kept between routed connectors and obstacles (world units).
pub const ROUTE_MARGIN: f64 = 16.0;
/// Length of the leg leaving an anchored edge before the first turn.
pub const ROUTE_STUB: f64 = 24.0;
/// Distance within which a dragged endpoint snaps to an anchor (world units).
pub const SNAP_DISTANCE: f64 = 12.0;

/// Tunable thresholds for connector geometry and interaction.
///
/// Every field falls back to its module-level default, so a partial JSON
/// object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    pub elbow_epsilon: f64,
    pub min_hit_size: f64,
    pub endpoint_handle_radius: f64,
    pub insert_handle_radius: f64,
    pub min_handle_gap: f64,
    pub min_endpoint_distance: f64,
    pub edge_hit_width: f64,
    pub route_margin: f64,
    pub route_stub: f64,
    pub snap_distance: f64,
    /// Average glyph width as a fraction of the font size.
    pub glyph_width_factor: f64,
    /// Line height as a fraction of the font size.
    pub line_height_factor: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            elbow_epsilon: ELBOW_EPSILON,
            min_hit_size: MIN_HIT_SIZE,
            endpoint_handle_radius: ENDPOINT_HANDLE_RADIUS,
            insert_handle_radius: INSERT_HANDLE_RADIUS,
            min_handle_gap: MIN_HANDLE_GAP,
            min_endpoint_distance: MIN_ENDPOINT_DISTANCE,
            edge_hit_width: EDGE_HIT_WIDTH,
            route_margin: ROUTE_MARGIN,
            route_stub: ROUTE_STUB,
            snap_distance: SNAP_DISTANCE,
            glyph_width_factor: 0.55,
            line_height_factor: 1.25,
        }
    }
}

impl InteractionConfig {
    /// Parse a configuration from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> BoardResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the configuration to pretty JSON.
    pub fn to_json(&self) -> BoardResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Minimum on-screen run length that fits an endpoint handle, an insert
    /// handle and the gap between them.
    pub fn min_run_screen_length(&self) -> f64 {
        2.0 * self.endpoint_handle_radius + 2.0 * self.insert_handle_radius + self.min_handle_gap
    }
}
