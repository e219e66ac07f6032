//! Geometric building blocks for the route queries.
//!
//! Coordinates are `geo::Coord` with `x` = longitude and `y` = latitude, in degrees.

mod primitives;
mod sanitize;

pub use primitives::{
    haversine_distance, point_in_polygon, point_to_segment_distance, polygon_intersects_bbox,
    BoundingBox, EARTH_RADIUS_KM,
};
pub use sanitize::{polygon_from_rings, sanitize_rings, validate_rings};
