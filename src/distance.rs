//! Great-circle geometry between [`GeoPoint`]s. All distances are in meters.

use geo::{Bearing, Destination, Distance, Haversine, Point};

use crate::model::GeoPoint;

/// Haversine distance in meters over the mean Earth radius.
pub fn distance(a: GeoPoint, b: GeoPoint) -> f64 {
    Haversine::distance(Point::from(a), Point::from(b))
}

/// Initial bearing from `a` towards `b`, in degrees clockwise from north within [0, 360).
pub fn bearing(a: GeoPoint, b: GeoPoint) -> f64 {
    let x = Haversine::bearing(Point::from(a), Point::from(b));
    x.rem_euclid(360.0)
}

/// Box around `center` reaching `radius` meters in each cardinal direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// The box never crosses the antimeridian: a side that would wrap is pinned to ±180°,
    /// and a box reaching a pole spans every longitude.
    pub fn around(center: GeoPoint, radius: f64) -> Self {
        let c = Point::from(center);
        let north_pole = Haversine::distance(c, Point::new(c.x(), 90.0));
        let south_pole = Haversine::distance(c, Point::new(c.x(), -90.0));
        if radius >= north_pole || radius >= south_pole {
            let south = Haversine::destination(c, 180.0, radius);
            let north = Haversine::destination(c, 0.0, radius);
            return Self {
                min_lat: if radius >= south_pole { -90.0 } else { south.y() },
                min_lon: -180.0,
                max_lat: if radius >= north_pole { 90.0 } else { north.y() },
                max_lon: 180.0,
            };
        }

        let north = Haversine::destination(c, 0.0, radius);
        let east = Haversine::destination(c, 90.0, radius);
        let south = Haversine::destination(c, 180.0, radius);
        let west = Haversine::destination(c, 270.0, radius);

        let mut min_lon = west.x();
        if min_lon > center.lon() || min_lon < -180.0 {
            min_lon = -180.0;
        }
        let mut max_lon = east.x();
        if max_lon < center.lon() || max_lon > 180.0 {
            max_lon = 180.0;
        }

        Self {
            min_lat: south.y(),
            min_lon,
            max_lat: north.y(),
            max_lon,
        }
    }

    pub fn contains(&self, p: GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&p.lat())
            && (self.min_lon..=self.max_lon).contains(&p.lon())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint::new(lat, lon).unwrap()
    }

    #[test]
    fn identity() {
        for x in [p(0.0, 0.0), p(-33.9318, 18.628), p(89.9, -179.9)] {
            assert_eq!(distance(x, x), 0.0);
        }
    }

    #[test]
    fn symmetric() {
        let pairs = [
            (p(-33.9318, 18.628), p(-33.932, 18.6282)),
            (p(40.7128, -74.006), p(51.5074, -0.1278)),
            (p(0.0, 179.5), p(0.0, -179.5)),
        ];
        for (a, b) in pairs {
            assert!((distance(a, b) - distance(b, a)).abs() < 1e-6);
        }
    }

    #[test]
    fn triangle_inequality() {
        let a = p(-33.9249, 18.4241);
        let b = p(-33.918, 18.4292);
        let c = p(-26.2041, 28.0473);
        assert!(distance(a, c) <= distance(a, b) + distance(b, c) + 1e-6);
        assert!(distance(a, b) <= distance(a, c) + distance(c, b) + 1e-6);
    }

    #[test]
    fn known_distances() {
        // one degree along a meridian
        let d = distance(p(0.0, 0.0), p(1.0, 0.0));
        assert!((d - 111_195.0).abs() < 5.0, "{d}");

        // New York to London, roughly 5570 km
        let d = distance(p(40.7128, -74.006), p(51.5074, -0.1278));
        assert!((d - 5_570_000.0).abs() < 15_000.0, "{d}");

        // antimeridian crossing stays short
        let d = distance(p(0.0, 179.5), p(0.0, -179.5));
        assert!((d - 111_195.0).abs() < 5.0, "{d}");
    }

    #[test]
    fn bearings() {
        let origin = p(0.0, 0.0);
        assert!((bearing(origin, p(1.0, 0.0)) - 0.0).abs() < 1e-6);
        assert!((bearing(origin, p(0.0, 1.0)) - 90.0).abs() < 1e-6);
        assert!((bearing(origin, p(-1.0, 0.0)) - 180.0).abs() < 1e-6);
        assert!((bearing(origin, p(0.0, -1.0)) - 270.0).abs() < 1e-6);
    }

    #[test]
    fn bounding_box() {
        let center = p(-33.9318, 18.628);
        let b = BoundingBox::around(center, 10_000.0);
        assert!(b.contains(center));
        assert!(b.min_lat < center.lat() && center.lat() < b.max_lat);
        assert!(b.min_lon < center.lon() && center.lon() < b.max_lon);
        // ~0.09 degrees of latitude per 10 km
        assert!((b.max_lat - b.min_lat - 0.18).abs() < 0.01);
        assert!(!b.contains(p(-33.5, 18.628)));
    }

    #[test]
    fn bounding_box_at_antimeridian() {
        let east = p(0.0, 179.99);
        let b = BoundingBox::around(east, 10_000.0);
        assert!(b.contains(east));
        assert!(b.min_lon < b.max_lon);
        assert!(b.min_lon < 179.99);
        assert_eq!(b.max_lon, 180.0);

        let west = p(0.0, -179.99);
        let b = BoundingBox::around(west, 10_000.0);
        assert!(b.contains(west));
        assert_eq!(b.min_lon, -180.0);
        assert!(b.max_lon > -179.99);
    }

    #[test]
    fn bounding_box_over_pole() {
        let center = p(89.99, 30.0);
        let b = BoundingBox::around(center, 10_000.0);
        assert!(b.contains(center));
        assert_eq!(b.max_lat, 90.0);
        assert_eq!((b.min_lon, b.max_lon), (-180.0, 180.0));
        assert!(b.contains(p(89.995, -150.0)));
        assert!(b.min_lat < 89.99);
    }
}
