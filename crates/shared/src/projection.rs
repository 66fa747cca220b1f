//! Spherical Web-Mercator (EPSG:3857), the projection the map image was
//! rendered in. Pixels are linear in this system, not in degrees.

use std::f64::consts::FRAC_PI_2;

use crate::models::GeoPoint;

/// Sphere radius used by EPSG:3857, in meters.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Latitude beyond which the projection diverges.
pub const MAX_LATITUDE: f64 = 85.051_128_78;

/// Projected coordinates in meters (x = easting, y = northing).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    pub x: f64,
    pub y: f64,
}

pub fn forward(geo: GeoPoint) -> Projected {
    let x = EARTH_RADIUS_M * geo.lon.to_radians();
    let y = EARTH_RADIUS_M * (0.5 * (FRAC_PI_2 + geo.lat.to_radians())).tan().ln();
    Projected { x, y }
}

pub fn inverse(p: Projected) -> GeoPoint {
    let lon = (p.x / EARTH_RADIUS_M).to_degrees();
    let lat = (2.0 * (p.y / EARTH_RADIUS_M).exp().atan() - FRAC_PI_2).to_degrees();
    GeoPoint::new(lon, lat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_projects_to_zero() {
        let p = forward(GeoPoint::new(0.0, 0.0));
        assert!(p.x.abs() < 1e-9);
        assert!(p.y.abs() < 1e-9);
    }

    #[test]
    fn test_known_value_paris() {
        // Paris, cross-checked against EPSG:3857 tooling.
        let p = forward(GeoPoint::new(2.3522, 48.8566));
        assert!((p.x - 261_845.7).abs() < 1.0);
        assert!((p.y - 6_250_564.3).abs() < 5.0);
    }

    #[test]
    fn test_inverse_undoes_forward() {
        let geo = GeoPoint::new(9.678657, 41.296552);
        let back = inverse(forward(geo));
        assert!((back.lon - geo.lon).abs() < 1e-9);
        assert!((back.lat - geo.lat).abs() < 1e-9);
    }

    #[test]
    fn test_northing_grows_faster_than_latitude() {
        // Conformal stretch: 10° near the pole spans more meters than at the equator.
        let low = forward(GeoPoint::new(0.0, 10.0)).y - forward(GeoPoint::new(0.0, 0.0)).y;
        let high = forward(GeoPoint::new(0.0, 60.0)).y - forward(GeoPoint::new(0.0, 50.0)).y;
        assert!(high > low * 1.4);
    }
}
