//! Distance from a query coordinate to the regions of a route.

use geo::{Coord, Polygon};

use crate::geometry::{
    point_in_polygon, point_to_segment_distance, polygon_from_rings, sanitize_rings,
};
use crate::models::{Region, Route};

/// Outcome of measuring one region
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RegionDistance {
    /// The query coordinate lies in the region
    Inside,
    /// Distance in kilometres to the closest region edge
    Outside(f64),
    /// The region has no usable geometry
    Unusable,
}

/// Measure the distance from `query` to a single region
pub fn region_distance(region: &Region, query: Coord<f64>) -> RegionDistance {
    let polygon = match region
        .raw_rings()
        .and_then(sanitize_rings)
        .and_then(polygon_from_rings)
    {
        Some(polygon) => polygon,
        None => return RegionDistance::Unusable,
    };

    if point_in_polygon(query, &polygon) {
        return RegionDistance::Inside;
    }

    match edge_distance(&polygon, query) {
        Some(d) => RegionDistance::Outside(d),
        None => RegionDistance::Unusable,
    }
}

/// Smallest point-to-segment distance over every edge of every ring
fn edge_distance(polygon: &Polygon<f64>, query: Coord<f64>) -> Option<f64> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .flat_map(|ring| ring.lines())
        .map(|line| point_to_segment_distance(query, line.start, line.end))
        .filter(|d| !d.is_nan())
        .reduce(f64::min)
}

/// Distance in kilometres from `query` to the nearest region on `route`.
///
/// Zero if the coordinate lies in any region. Points without a usable region
/// are ignored; if none is usable the result is `f64::INFINITY`.
pub fn distance_to_route(route: &Route, query: Coord<f64>) -> f64 {
    let mut best = f64::INFINITY;

    for point in &route.points {
        let Some(region) = point.region.as_ref() else {
            continue;
        };

        match region_distance(region, query) {
            RegionDistance::Inside => return 0.0,
            RegionDistance::Outside(d) => best = best.min(d),
            RegionDistance::Unusable => {}
        }
    }

    best
}
