//! Route, point and region records as served by the upstream feed.

mod lenient;
pub mod route;

pub use route::{Point, Region, Route, RouteDataset};
