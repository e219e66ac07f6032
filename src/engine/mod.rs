//! Query engine over a [`RouteDataset`](crate::models::RouteDataset).
//!
//! All functions here are pure and read the dataset without modifying it.

mod distance;
mod nearest;
mod viewport;

pub use distance::{distance_to_route, region_distance, RegionDistance};
pub use nearest::{nearest_routes, rank_routes};
pub use viewport::points_in_viewport;
