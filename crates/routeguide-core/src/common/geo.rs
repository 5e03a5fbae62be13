//! Geometry predicates over [`Coordinate`]s.
//!
//! Both functions are pure and never fail: degenerate rectangles and
//! coincident points have well-defined answers.

use crate::types::{BoundingBox, Coordinate};
use core::f64::consts::PI;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Returns `true` if `point` lies inside `bounds`, boundaries included.
///
/// The corners of `bounds` may be given in any order; each axis is normalized
/// to `[min, max]` independently.
pub fn in_range(point: Coordinate, bounds: &BoundingBox) -> bool {
    let (bottom, top) = bounds.latitude_span();
    let (left, right) = bounds.longitude_span();

    (left..=right).contains(&point.longitude) && (bottom..=top).contains(&point.latitude)
}

/// Great-circle distance between two coordinates in whole metres, using the
/// haversine formula.
///
/// The result is truncated toward zero. Callers summing a route add the
/// truncated per-segment values, so the total differs from the truncated true
/// length; summaries depend on that exact behavior.
pub fn distance(from: Coordinate, to: Coordinate) -> i32 {
    let lat1 = to_radians(from.latitude_degrees());
    let lat2 = to_radians(to.latitude_degrees());
    let lng1 = to_radians(from.longitude_degrees());
    let lng2 = to_radians(to.longitude_degrees());
    let dlat = lat2 - lat1;
    let dlng = lng2 - lng1;

    let half_lat = (dlat / 2.0).sin();
    let half_lng = (dlng / 2.0).sin();
    // Rounding can push `a` a hair above 1 for near-antipodal points.
    let a = (half_lat * half_lat + lat1.cos() * lat2.cos() * half_lng * half_lng).min(1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    (EARTH_RADIUS_METERS * c) as i32
}

fn to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(lo: (i32, i32), hi: (i32, i32)) -> BoundingBox {
        BoundingBox::new(Coordinate::new(lo.0, lo.1), Coordinate::new(hi.0, hi.1))
    }

    #[test]
    fn corners_and_edges_are_inside() {
        let bounds = bbox((0, 0), (10, 20));
        for corner in [(0, 0), (0, 20), (10, 0), (10, 20)] {
            assert!(in_range(Coordinate::new(corner.0, corner.1), &bounds));
        }
        assert!(in_range(Coordinate::new(5, 20), &bounds));
        assert!(in_range(Coordinate::new(10, 7), &bounds));
    }

    #[test]
    fn outside_points_are_rejected() {
        let bounds = bbox((0, 0), (10, 20));
        assert!(!in_range(Coordinate::new(11, 5), &bounds));
        assert!(!in_range(Coordinate::new(-1, 5), &bounds));
        assert!(!in_range(Coordinate::new(5, 21), &bounds));
        assert!(!in_range(Coordinate::new(5, -1), &bounds));
    }

    #[test]
    fn swapped_corners_describe_the_same_region() {
        let normal = bbox((-10, -20), (10, 20));
        let swapped_both = bbox((10, 20), (-10, -20));
        let swapped_lat = bbox((10, -20), (-10, 20));
        let swapped_lng = bbox((-10, 20), (10, -20));

        for lat in [-11, -10, 0, 10, 11] {
            for lng in [-21, -20, 0, 20, 21] {
                let p = Coordinate::new(lat, lng);
                let expected = in_range(p, &normal);
                assert_eq!(in_range(p, &swapped_both), expected);
                assert_eq!(in_range(p, &swapped_lat), expected);
                assert_eq!(in_range(p, &swapped_lng), expected);
            }
        }
    }

    #[test]
    fn degenerate_rectangle_contains_only_its_point() {
        let bounds = bbox((3, 4), (3, 4));
        assert!(in_range(Coordinate::new(3, 4), &bounds));
        assert!(!in_range(Coordinate::new(3, 5), &bounds));
    }

    #[test]
    fn distance_to_self_is_zero() {
        for p in [
            Coordinate::new(0, 0),
            Coordinate::new(407_838_351, -746_143_763),
            Coordinate::new(-900_000_000, 1_800_000_000),
        ] {
            assert_eq!(distance(p, p), 0);
        }
    }

    #[test]
    fn one_degree_of_longitude_on_the_equator() {
        // 6_371_000 * pi / 180 = 111_194.92...
        let d = distance(Coordinate::new(0, 0), Coordinate::new(0, 10_000_000));
        assert_eq!(d, 111_194);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Coordinate::new(407_838_351, -746_143_763);
        let b = Coordinate::new(408_122_808, -743_999_179);
        assert_eq!(distance(a, b), distance(b, a));
        assert!(distance(a, b) > 0);
    }

    #[test]
    fn antipodal_points_stay_finite() {
        let d = distance(Coordinate::new(0, 0), Coordinate::new(0, 1_800_000_000));
        // Half the circumference: 6_371_000 * pi = 20_015_086.79...
        assert_eq!(d, 20_015_086);
    }
}
