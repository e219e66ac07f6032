//! Route dataset records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use super::lenient;

/// Polygonal area attached to a point.
///
/// The polygon is kept as raw JSON because the feed is not trusted to send
/// well-formed geometry; it is validated lazily by the query engine and written
/// back out untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Region {
    /// GeoJSON-style geometry (`{"type": "Polygon", "coordinates": [...]}`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Value>,

    /// Informational center `[lng, lat]`
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub center: Option<[f64; 2]>,

    /// Informational radius
    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub radius: Option<f64>,
}

impl Region {
    /// Raw ring list of the polygon, if one is present.
    ///
    /// Accepts either a geometry object with a `coordinates` member or a bare
    /// coordinate array.
    pub fn raw_rings(&self) -> Option<&Value> {
        match self.polygon.as_ref()? {
            Value::Object(geometry) => geometry.get("coordinates"),
            rings @ Value::Array(_) => Some(rings),
            _ => None,
        }
    }
}

/// A point of interest with its region
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: String,

    #[serde(
        default,
        alias = "createdAt",
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(
        default,
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub region: Option<Region>,
}

/// An ordered list of points.
///
/// Points are shared: the same point may appear on several routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    #[serde(default, deserialize_with = "lenient::id")]
    pub id: String,

    #[serde(
        default,
        alias = "createdAt",
        deserialize_with = "lenient::optional",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "lenient::sequence")]
    pub points: Vec<Arc<Point>>,
}

/// Immutable snapshot of every route served by the feed
#[derive(Debug, Clone, Default)]
pub struct RouteDataset {
    routes: Vec<Route>,
}

impl RouteDataset {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// Decode a feed payload.
    ///
    /// The payload must be a JSON array. Each element is decoded on its own and
    /// elements that are not route objects are skipped.
    pub fn from_json(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        let items: Vec<Value> = serde_json::from_slice(bytes)?;
        let total = items.len();

        let routes: Vec<Route> = items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<Route>(item) {
                Ok(route) => Some(route),
                Err(e) => {
                    debug!("Skipping malformed route record: {}", e);
                    None
                }
            })
            .collect();

        if routes.len() < total {
            warn!(
                "Skipped {} of {} route records that failed to decode",
                total - routes.len(),
                total
            );
        }

        Ok(Self { routes })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Total number of point references across all routes (duplicates included)
    pub fn point_refs(&self) -> usize {
        self.routes.iter().map(|r| r.points.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_route() {
        let payload = json!([{
            "id": "r1",
            "created_at": "2024-05-01T10:00:00Z",
            "points": [{
                "id": 7,
                "createdAt": "2024-05-01T10:00:00Z",
                "region": {
                    "polygon": {
                        "type": "Polygon",
                        "coordinates": [[[0, 0], [0, 1], [1, 1], [1, 0], [0, 0]]]
                    },
                    "center": [0.5, 0.5],
                    "radius": 50
                }
            }]
        }]);

        let dataset = RouteDataset::from_json(payload.to_string().as_bytes()).unwrap();
        assert_eq!(dataset.len(), 1);

        let route = &dataset.routes()[0];
        assert_eq!(route.id, "r1");
        assert!(route.created_at.is_some());
        assert_eq!(route.points.len(), 1);

        let point = &route.points[0];
        assert_eq!(point.id, "7");
        assert!(point.created_at.is_some());

        let region = point.region.as_ref().unwrap();
        assert_eq!(region.center, Some([0.5, 0.5]));
        assert_eq!(region.radius, Some(50.0));
        assert!(region.raw_rings().unwrap().is_array());
    }

    #[test]
    fn test_mistyped_metadata_is_dropped() {
        let payload = json!([{
            "id": "r1",
            "created_at": 12,
            "points": [{
                "id": "p1",
                "region": { "polygon": [[[0, 0], [0, 1], [1, 1]]], "center": "middle", "radius": "far" }
            }]
        }]);

        let dataset = RouteDataset::from_json(payload.to_string().as_bytes()).unwrap();
        let route = &dataset.routes()[0];
        assert!(route.created_at.is_none());

        let region = route.points[0].region.as_ref().unwrap();
        assert!(region.center.is_none());
        assert!(region.radius.is_none());
        // Bare coordinate arrays are accepted as the polygon
        assert!(region.raw_rings().is_some());
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let payload = json!([
            "not a route",
            { "id": "r1", "points": "nope" },
            { "id": "r2", "points": [42, { "id": "p1" }] }
        ]);

        let dataset = RouteDataset::from_json(payload.to_string().as_bytes()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert!(dataset.routes()[0].points.is_empty());
        assert_eq!(dataset.routes()[1].points.len(), 1);
        assert_eq!(dataset.point_refs(), 1);
    }

    #[test]
    fn test_non_array_payload_is_an_error() {
        assert!(RouteDataset::from_json(br#"{"routes": []}"#).is_err());
        assert!(RouteDataset::from_json(b"garbage").is_err());
    }

    #[test]
    fn test_region_round_trips_polygon_untouched() {
        let polygon = json!({ "type": "Polygon", "coordinates": [[["a", 1]]] });
        let region = Region {
            polygon: Some(polygon.clone()),
            center: None,
            radius: None,
        };
        let out = serde_json::to_value(&region).unwrap();
        assert_eq!(out["polygon"], polygon);
        assert!(out.get("center").is_none());
    }
}
