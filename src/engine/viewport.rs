//! Points whose region touches a viewport.

use geo::Coord;
use hashbrown::HashSet;
use std::sync::Arc;
use tracing::debug;

use crate::geometry::{polygon_from_rings, polygon_intersects_bbox, validate_rings, BoundingBox};
use crate::models::{Point, RouteDataset};

/// Unique points (by id) whose region intersects the rectangle spanned by
/// two corners given in any order. Results are in first-encountered order.
///
/// Points without an id are only deduplicated when the same record is
/// referenced more than once.
pub fn points_in_viewport(
    dataset: &RouteDataset,
    corner1: Coord<f64>,
    corner2: Coord<f64>,
) -> Vec<Arc<Point>> {
    let bbox = BoundingBox::from_corners(corner1, corner2).to_polygon();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut seen_anonymous: HashSet<*const Point> = HashSet::new();
    let mut result = Vec::new();
    let mut rejected = 0usize;

    for point in dataset.routes().iter().flat_map(|route| &route.points) {
        let has_id = !point.id.is_empty();
        let already_found = if has_id {
            seen.contains(point.id.as_str())
        } else {
            seen_anonymous.contains(&Arc::as_ptr(point))
        };
        if already_found {
            continue;
        }

        let polygon = point
            .region
            .as_ref()
            .and_then(|region| region.raw_rings())
            .and_then(validate_rings)
            .and_then(polygon_from_rings);

        let Some(polygon) = polygon else {
            rejected += 1;
            continue;
        };

        if polygon_intersects_bbox(&polygon, &bbox) {
            if has_id {
                seen.insert(point.id.as_str());
            } else {
                seen_anonymous.insert(Arc::as_ptr(point));
            }
            result.push(Arc::clone(point));
        }
    }

    debug!(
        "Viewport query found {} points ({} without a valid region)",
        result.len(),
        rejected
    );

    result
}
