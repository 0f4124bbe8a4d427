//! ---
//! herd_section: "11-simulation"
//! herd_subsection: "geometry"
//! herd_type: "source"
//! herd_scope: "code"
//! herd_description: "Distance, bearing and geofence containment helpers."
//! herd_version: "v0.1.0"
//! herd_owner: "tbd"
//! ---
//! Two distance approximations are provided.
//!
//! * [`degree_distance`] is the flat Euclidean distance in raw degrees. It is
//!   cheap but only proportional to real distance for small regions (well under
//!   2 km) and ignores that a degree of longitude shrinks with latitude.
//! * [`haversine_m`] is the great-circle distance in metres and is the
//!   authoritative containment test.
use herd_common::Coordinate;
use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Length of one degree of latitude, used to express degree radii in metres.
pub const METERS_PER_DEGREE: f64 = 111_320.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Move `step_deg` degrees along `heading_deg` (0 = north, 90 = east).
    ///
    /// The longitude component is scaled by `1 / cos(latitude)` so a step has
    /// roughly the same ground length in every direction.
    pub fn offset(&self, step_deg: f64, heading_deg: f64) -> Self {
        let heading = heading_deg.to_radians();
        let lat_scale = self.latitude.to_radians().cos().max(1e-6);
        Self {
            latitude: self.latitude + step_deg * heading.cos(),
            longitude: self.longitude + step_deg * heading.sin() / lat_scale,
        }
    }

    /// Point `fraction` of the way from `self` to `target`.
    pub fn toward(&self, target: &GeoPoint, fraction: f64) -> Self {
        Self {
            latitude: self.latitude + (target.latitude - self.latitude) * fraction,
            longitude: self.longitude + (target.longitude - self.longitude) * fraction,
        }
    }
}

impl From<Coordinate> for GeoPoint {
    fn from(value: Coordinate) -> Self {
        Self::new(value.latitude, value.longitude)
    }
}

/// Great-circle distance in metres.
pub fn haversine_m(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lng = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_M * c
}

/// Initial forward azimuth from `from` to `to`, in degrees `[0, 360)`.
pub fn bearing_deg(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lng = (to.longitude - from.longitude).to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Flat Euclidean distance in degrees. See the module docs for its limits.
pub fn degree_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    (a.latitude - b.latitude).hypot(a.longitude - b.longitude)
}

pub fn degrees_to_meters(degrees: f64) -> f64 {
    degrees * METERS_PER_DEGREE
}

/// Circular containment check against a metre radius.
pub fn within_radius_m(point: &GeoPoint, center: &GeoPoint, radius_m: f64) -> bool {
    haversine_m(point, center) <= radius_m
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundsCorners {
    pub northwest: GeoPoint,
    pub northeast: GeoPoint,
    pub southeast: GeoPoint,
    pub southwest: GeoPoint,
}

/// Rectangle enclosing a circular grazing area, plus its metre dimensions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeofenceBounds {
    pub center: GeoPoint,
    pub radius_deg: f64,
    pub radius_m: f64,
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub corners: BoundsCorners,
    pub width_m: f64,
    pub height_m: f64,
}

impl GeofenceBounds {
    pub fn around(center: GeoPoint, radius_deg: f64) -> Self {
        let north = center.latitude + radius_deg;
        let south = center.latitude - radius_deg;
        let east = center.longitude + radius_deg;
        let west = center.longitude - radius_deg;
        let corners = BoundsCorners {
            northwest: GeoPoint::new(north, west),
            northeast: GeoPoint::new(north, east),
            southeast: GeoPoint::new(south, east),
            southwest: GeoPoint::new(south, west),
        };
        let width_m = haversine_m(
            &GeoPoint::new(center.latitude, west),
            &GeoPoint::new(center.latitude, east),
        );
        let height_m = haversine_m(
            &GeoPoint::new(south, center.longitude),
            &GeoPoint::new(north, center.longitude),
        );
        Self {
            center,
            radius_deg,
            radius_m: degrees_to_meters(radius_deg),
            north,
            south,
            east,
            west,
            corners,
            width_m,
            height_m,
        }
    }

    /// Authoritative containment: haversine distance to the center against `radius_m`.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        within_radius_m(point, &self.center, self.radius_m)
    }

    /// Degree-rectangle check; only an approximation of [`Self::contains`].
    pub fn within_rectangle(&self, point: &GeoPoint) -> bool {
        (self.south..=self.north).contains(&point.latitude)
            && (self.west..=self.east).contains(&point.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTER: GeoPoint = GeoPoint::new(-33.0167, -58.5167);

    #[test]
    fn haversine_of_identical_points_is_zero() {
        assert_eq!(haversine_m(&CENTER, &CENTER), 0.0);
        let pole = GeoPoint::new(90.0, 0.0);
        assert_eq!(haversine_m(&pole, &pole), 0.0);
    }

    #[test]
    fn haversine_is_symmetric() {
        let other = GeoPoint::new(-32.9, -58.7);
        let ab = haversine_m(&CENTER, &other);
        let ba = haversine_m(&other, &CENTER);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let a = GeoPoint::new(10.0, 20.0);
        let b = GeoPoint::new(11.0, 20.0);
        let d = haversine_m(&a, &b);
        assert!((d - 111_320.0).abs() / 111_320.0 < 0.01, "got {d}");
    }

    #[test]
    fn bearing_cardinal_directions() {
        let origin = GeoPoint::new(0.0, 0.0);
        assert!((bearing_deg(&origin, &GeoPoint::new(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((bearing_deg(&origin, &GeoPoint::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((bearing_deg(&origin, &GeoPoint::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((bearing_deg(&origin, &GeoPoint::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn offset_follows_heading() {
        let north = CENTER.offset(0.001, 0.0);
        assert!((north.latitude - (CENTER.latitude + 0.001)).abs() < 1e-12);
        assert!((north.longitude - CENTER.longitude).abs() < 1e-12);

        let east = CENTER.offset(0.001, 90.0);
        assert!(east.longitude > CENTER.longitude);
        assert!((east.latitude - CENTER.latitude).abs() < 1e-12);
        // Ground distance is comparable in both directions.
        let dn = haversine_m(&CENTER, &north);
        let de = haversine_m(&CENTER, &east);
        assert!((dn - de).abs() / dn < 0.01);
    }

    #[test]
    fn toward_moves_fraction_of_the_way() {
        let start = GeoPoint::new(-33.0, -58.5);
        let mid = start.toward(&CENTER, 0.5);
        assert!((mid.latitude - (-33.00835)).abs() < 1e-9);
        assert!(haversine_m(&mid, &CENTER) < haversine_m(&start, &CENTER));
    }

    #[test]
    fn bounds_match_radius() {
        let bounds = GeofenceBounds::around(CENTER, 0.007);
        assert!((bounds.north - (-33.0097)).abs() < 1e-9);
        assert!((bounds.south - (-33.0237)).abs() < 1e-9);
        assert!((bounds.east - (-58.5097)).abs() < 1e-9);
        assert!((bounds.west - (-58.5237)).abs() < 1e-9);
        assert_eq!(bounds.corners.northwest, GeoPoint::new(bounds.north, bounds.west));
        assert!((bounds.radius_m - 779.24).abs() < 0.01);
        // One degree of longitude is shorter than one of latitude away from the equator.
        assert!(bounds.width_m < bounds.height_m);
        assert!((bounds.height_m - 1556.7).abs() < 1.0);
    }

    #[test]
    fn circle_is_authoritative_over_rectangle() {
        let bounds = GeofenceBounds::around(CENTER, 0.007);
        assert!(bounds.contains(&CENTER));
        // The rectangle corner is inside the rectangle but outside the circle.
        let corner = bounds.corners.northeast;
        assert!(bounds.within_rectangle(&corner));
        assert!(!bounds.contains(&corner));
    }

    #[test]
    fn degree_distance_is_flat() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(3.0, 4.0);
        assert!((degree_distance(&a, &b) - 5.0).abs() < 1e-12);
    }
}
