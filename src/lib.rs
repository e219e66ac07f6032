//! Juniper - nearest-route and viewport queries over a cached route feed
//!
//! This library provides the geometry, query engine and dataset cache used by the
//! query server binary.

pub mod config;
pub mod dataset;
pub mod engine;
pub mod geometry;
pub mod models;

pub use dataset::{DatasetCache, DatasetError, HttpRouteSource, RouteSource};
pub use models::{Point, Region, Route, RouteDataset};
