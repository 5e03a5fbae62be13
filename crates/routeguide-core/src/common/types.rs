//! # Coordinates and Bounding Boxes
//!
//! Domain value types that sit between the generated protobuf messages and
//! the service logic.
//!
//! Latitudes and longitudes are carried as degrees multiplied by
//! [`COORD_FACTOR`] and stored in `i32`. Keeping them as integers means two
//! coordinates are equal exactly when both components are equal, with no
//! floating-point tolerance involved.
//!
//! ## Missing points
//!
//! Message fields in proto3 are optional, so a `Feature`, `RouteNote` or
//! `Rectangle` may arrive without a `Point`. Such a point reads as
//! [`Coordinate::default`], i.e. `(0, 0)`, which is the same value a proto3
//! reader observes for an absent message.

use crate::proto::{Point, Rectangle};
use serde::{Deserialize, Deserializer};

/// Scale applied to degrees before they are stored as integers.
pub const COORD_FACTOR: f64 = 1e7;

/// A latitude/longitude pair in degrees × 10^7.
///
/// `Copy`, `Eq` and `Hash` so it can be used directly as a map key. When
/// read from JSON, a missing or `null` component is zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(default)]
pub struct Coordinate {
    #[serde(deserialize_with = "null_as_default")]
    pub latitude: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub longitude: i32,
}

/// Reads `null` as the type's default value.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl Coordinate {
    pub const fn new(latitude: i32, longitude: i32) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Reads an optional protobuf point, treating `None` as `(0, 0)`.
    pub fn from_point(point: Option<&Point>) -> Self {
        point.map(Self::from).unwrap_or_default()
    }

    pub fn latitude_degrees(self) -> f64 {
        f64::from(self.latitude) / COORD_FACTOR
    }

    pub fn longitude_degrees(self) -> f64 {
        f64::from(self.longitude) / COORD_FACTOR
    }
}

impl From<&Point> for Coordinate {
    fn from(point: &Point) -> Self {
        Self::new(point.latitude, point.longitude)
    }
}

impl From<Point> for Coordinate {
    fn from(point: Point) -> Self {
        Self::from(&point)
    }
}

impl From<Coordinate> for Point {
    fn from(coord: Coordinate) -> Self {
        Point {
            latitude: coord.latitude,
            longitude: coord.longitude,
        }
    }
}

/// An axis-aligned region given by two opposite corners.
///
/// `lo` and `hi` are kept as received; nothing guarantees `lo` is the
/// south-west corner. Containment normalizes each axis independently (see
/// [`crate::geo::in_range`]).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoundingBox {
    pub lo: Coordinate,
    pub hi: Coordinate,
}

impl BoundingBox {
    pub const fn new(lo: Coordinate, hi: Coordinate) -> Self {
        Self { lo, hi }
    }

    /// Inclusive `(min, max)` latitude range.
    pub fn latitude_span(&self) -> (i32, i32) {
        min_max(self.lo.latitude, self.hi.latitude)
    }

    /// Inclusive `(min, max)` longitude range.
    pub fn longitude_span(&self) -> (i32, i32) {
        min_max(self.lo.longitude, self.hi.longitude)
    }
}

impl From<&Rectangle> for BoundingBox {
    fn from(rect: &Rectangle) -> Self {
        Self::new(
            Coordinate::from_point(rect.lo.as_ref()),
            Coordinate::from_point(rect.hi.as_ref()),
        )
    }
}

const fn min_max(a: i32, b: i32) -> (i32, i32) {
    if a <= b { (a, b) } else { (b, a) }
}
