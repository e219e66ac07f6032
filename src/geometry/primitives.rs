//! Distance and intersection primitives.

use geo::{Coord, Intersects, Point, Polygon, Rect};

/// Mean Earth radius used by [`haversine_distance`]
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres between two `(lng, lat)` coordinates
pub fn haversine_distance(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let delta_lat = (b.y - a.y).to_radians();
    let delta_lng = (b.x - a.x).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// Distance in kilometres from `p` to the segment `s1`-`s2`.
///
/// The projection is planar in degree space; only the final distance to the
/// closest point is measured on the sphere.
pub fn point_to_segment_distance(p: Coord<f64>, s1: Coord<f64>, s2: Coord<f64>) -> f64 {
    let dx = s2.x - s1.x;
    let dy = s2.y - s1.y;
    let len_sq = dx * dx + dy * dy;

    if len_sq == 0.0 {
        return haversine_distance(p, s1);
    }

    let t = (((p.x - s1.x) * dx + (p.y - s1.y) * dy) / len_sq).clamp(0.0, 1.0);
    let closest = Coord {
        x: s1.x + t * dx,
        y: s1.y + t * dy,
    };

    haversine_distance(p, closest)
}

/// Whether `p` lies in `polygon`. Points on an edge or vertex count as inside;
/// points inside a hole do not.
pub fn point_in_polygon(p: Coord<f64>, polygon: &Polygon<f64>) -> bool {
    polygon.intersects(&Point::from(p))
}

/// Whether `polygon` and `bbox` share any boundary or interior point,
/// including full containment either way.
pub fn polygon_intersects_bbox(polygon: &Polygon<f64>, bbox: &Polygon<f64>) -> bool {
    polygon.intersects(bbox)
}

/// Axis-aligned lng/lat rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Normalize two opposite corners given in any order
    pub fn from_corners(a: Coord<f64>, b: Coord<f64>) -> Self {
        Self {
            min_lng: a.x.min(b.x),
            min_lat: a.y.min(b.y),
            max_lng: a.x.max(b.x),
            max_lat: a.y.max(b.y),
        }
    }

    pub fn to_polygon(&self) -> Polygon<f64> {
        Rect::new(
            Coord {
                x: self.min_lng,
                y: self.min_lat,
            },
            Coord {
                x: self.max_lng,
                y: self.max_lat,
            },
        )
        .to_polygon()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::LineString;

    const ONE_DEGREE_KM: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    fn unit_square() -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0), (0.0, 0.0)]),
            vec![],
        )
    }

    #[test]
    fn test_haversine_one_degree_of_latitude() {
        let d = haversine_distance(c(0.0, 0.0), c(0.0, 1.0));
        assert!((d - ONE_DEGREE_KM).abs() < 1e-9);
        assert!((d - 111.195).abs() < 1e-3);
    }

    #[test]
    fn test_haversine_symmetric_and_zero() {
        let pairs = [
            (c(-122.42, 37.77), c(-73.98, 40.75)),
            (c(2.35, 48.86), c(139.69, 35.69)),
            (c(0.0, 89.9), c(180.0, -89.9)),
        ];
        for (a, b) in pairs {
            assert_eq!(haversine_distance(a, b), haversine_distance(b, a));
            assert_eq!(haversine_distance(a, a), 0.0);
            assert!(haversine_distance(a, b) > 0.0);
        }
    }

    #[test]
    fn test_haversine_known_distance() {
        // Paris to London is roughly 344 km
        let d = haversine_distance(c(2.3522, 48.8566), c(-0.1276, 51.5072));
        assert!((d - 343.5).abs() < 2.0, "got {}", d);
    }

    #[test]
    fn test_segment_degenerate() {
        let p = c(10.0, 10.0);
        let s = c(1.0, 1.0);
        assert_eq!(point_to_segment_distance(p, s, s), haversine_distance(p, s));
    }

    #[test]
    fn test_segment_projection_inside() {
        let d = point_to_segment_distance(c(0.5, 1.0), c(0.0, 0.0), c(1.0, 0.0));
        assert_eq!(d, haversine_distance(c(0.5, 1.0), c(0.5, 0.0)));
    }

    #[test]
    fn test_segment_projection_clamped_to_endpoints() {
        let s1 = c(0.0, 0.0);
        let s2 = c(1.0, 0.0);
        assert_eq!(
            point_to_segment_distance(c(3.0, 0.5), s1, s2),
            haversine_distance(c(3.0, 0.5), s2)
        );
        assert_eq!(
            point_to_segment_distance(c(-2.0, -0.5), s1, s2),
            haversine_distance(c(-2.0, -0.5), s1)
        );
    }

    #[test]
    fn test_point_in_polygon() {
        let square = unit_square();
        assert!(point_in_polygon(c(0.5, 0.5), &square));
        assert!(!point_in_polygon(c(1.5, 0.5), &square));
        // Boundary and vertex count as inside
        assert!(point_in_polygon(c(1.0, 0.5), &square));
        assert!(point_in_polygon(c(0.0, 0.0), &square));
    }

    #[test]
    fn test_point_in_hole_is_outside() {
        let donut = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0), (0.0, 0.0)]),
            vec![LineString::from(vec![
                (1.0, 1.0),
                (1.0, 3.0),
                (3.0, 3.0),
                (3.0, 1.0),
                (1.0, 1.0),
            ])],
        );
        assert!(!point_in_polygon(c(2.0, 2.0), &donut));
        assert!(point_in_polygon(c(0.5, 0.5), &donut));
    }

    #[test]
    fn test_bbox_from_corners_any_order() {
        let expected = BoundingBox {
            min_lng: -1.0,
            min_lat: -2.0,
            max_lng: 3.0,
            max_lat: 4.0,
        };
        assert_eq!(BoundingBox::from_corners(c(-1.0, -2.0), c(3.0, 4.0)), expected);
        assert_eq!(BoundingBox::from_corners(c(3.0, 4.0), c(-1.0, -2.0)), expected);
        assert_eq!(BoundingBox::from_corners(c(-1.0, 4.0), c(3.0, -2.0)), expected);
    }

    #[test]
    fn test_polygon_intersects_bbox() {
        let square = unit_square();
        let bbox = |a, b| BoundingBox::from_corners(a, b).to_polygon();

        // Square inside bbox
        assert!(polygon_intersects_bbox(&square, &bbox(c(-1.0, -1.0), c(2.0, 2.0))));
        // Bbox inside square
        assert!(polygon_intersects_bbox(&square, &bbox(c(0.2, 0.2), c(0.4, 0.4))));
        // Partial overlap
        assert!(polygon_intersects_bbox(&square, &bbox(c(0.5, 0.5), c(3.0, 3.0))));
        // Shared edge only
        assert!(polygon_intersects_bbox(&square, &bbox(c(1.0, 0.0), c(2.0, 1.0))));
        // Disjoint
        assert!(!polygon_intersects_bbox(&square, &bbox(c(5.0, 5.0), c(6.0, 6.0))));
    }
}
