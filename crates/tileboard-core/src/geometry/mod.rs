//! Pure geometry: curves, orthogonal polylines and local-frame transforms.

pub mod curve;
pub mod elbow;
pub mod transform;

pub use curve::{
    catmull_rom_bounds, catmull_rom_control_points, catmull_rom_path, catmull_rom_segments,
    cubic_bezier_point, polyline_bounds, quadratic_bezier_bounds,
};
pub use elbow::{
    Axis, ElbowRoute, Orientation, elbow_polyline_for_vertices, expand_virtual_elbow, orthogonal_to_elbow_form,
    segment_orientation, simplify_elbow_polyline,
};
pub use transform::{local_to_world, rotate_about_degrees, world_to_local};
