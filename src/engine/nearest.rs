//! Nearest-route ranking.

use geo::Coord;
use rayon::prelude::*;
use tracing::debug;

use super::distance_to_route;
use crate::models::{Route, RouteDataset};

/// Every route paired with its distance to `query`, closest first.
///
/// Routes without a usable region sort last with an infinite distance. Equal
/// distances keep their dataset order.
pub fn rank_routes(dataset: &RouteDataset, query: Coord<f64>) -> Vec<(&Route, f64)> {
    let mut ranked: Vec<(&Route, f64)> = dataset
        .routes()
        .par_iter()
        .map(|route| {
            let d = distance_to_route(route, query);
            (route, if d.is_nan() { f64::INFINITY } else { d })
        })
        .collect();

    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked
}

/// The `k` routes closest to `query`, closest first
pub fn nearest_routes(dataset: &RouteDataset, query: Coord<f64>, k: usize) -> Vec<Route> {
    let ranked = rank_routes(dataset, query);

    debug!(
        "Ranked {} routes around ({}, {}), nearest at {:?} km",
        ranked.len(),
        query.x,
        query.y,
        ranked.first().map(|(_, d)| *d)
    );

    ranked
        .into_iter()
        .take(k)
        .map(|(route, _)| route.clone())
        .collect()
}
