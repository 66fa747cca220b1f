//! Calibrated map image.
//!
//! The map image is a Web-Mercator rendering whose pixel extremes are pinned
//! to known longitudes/latitudes (`GeoBounds`). Pixel positions are scaled
//! linearly in projected meters and only then turned back into degrees, so
//! the conversion stays exact across the whole image.
use tracing::debug;

use crate::error::GeoError;
use crate::models::{GameConfig, GeoBounds, GeoPoint, PixelPoint, Space};
use crate::point::Coordinates;
use crate::projection::{self, Projected, MAX_LATITUDE};

// Projection round-off must not push an exact pixel edge to the previous pixel.
const PIXEL_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq)]
pub struct MapCalibration {
    map_width: u32,
    map_height: u32,
    window_offset_x: i32,
    window_offset_y: i32,
    bounds: GeoBounds,
    // Projected images of the two calibrated corners.
    origin: Projected,
    far_corner: Projected,
}

impl MapCalibration {
    pub fn new(
        map_width: u32,
        map_height: u32,
        window_offset: (i32, i32),
        bounds: GeoBounds,
    ) -> Result<Self, GeoError> {
        if map_width == 0 || map_height == 0 {
            return Err(GeoError::InvalidCalibration(format!(
                "map size must be positive, got {}x{}",
                map_width, map_height
            )));
        }
        let values = [bounds.lon_min, bounds.lon_max, bounds.lat_min, bounds.lat_max];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(GeoError::InvalidCalibration(
                "bounds must be finite".to_string(),
            ));
        }
        if bounds.lon_min == bounds.lon_max || bounds.lat_min == bounds.lat_max {
            return Err(GeoError::InvalidCalibration(format!(
                "degenerate bounds {:?}",
                bounds
            )));
        }
        for lat in [bounds.lat_min, bounds.lat_max] {
            if lat.abs() >= MAX_LATITUDE {
                return Err(GeoError::InvalidCalibration(format!(
                    "latitude {} outside the projection domain",
                    lat
                )));
            }
        }

        let calibration = Self {
            map_width,
            map_height,
            window_offset_x: window_offset.0,
            window_offset_y: window_offset.1,
            bounds,
            origin: projection::forward(bounds.origin()),
            far_corner: projection::forward(bounds.far_corner()),
        };
        debug!(
            map_width,
            map_height,
            offset_x = window_offset.0,
            offset_y = window_offset.1,
            orientation = ?bounds.y_orientation(),
            "map calibration ready"
        );
        Ok(calibration)
    }

    pub fn from_config(config: &GameConfig) -> Result<Self, GeoError> {
        Self::new(
            config.map_width,
            config.map_height,
            config.map_window_offset(),
            config.bounds,
        )
    }

    pub fn map_width(&self) -> u32 {
        self.map_width
    }

    pub fn map_height(&self) -> u32 {
        self.map_height
    }

    pub fn window_offset(&self) -> (i32, i32) {
        (self.window_offset_x, self.window_offset_y)
    }

    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    /// Projected meters per map pixel along x and y. The y scale is negative
    /// for a north-up map.
    pub fn meters_per_pixel(&self) -> (f64, f64) {
        (
            (self.far_corner.x - self.origin.x) / self.map_width as f64,
            (self.far_corner.y - self.origin.y) / self.map_height as f64,
        )
    }

    /// Inclusive of the far edge so the calibrated corner itself is on the map.
    pub fn contains_map_pixel(&self, p: PixelPoint) -> bool {
        p.x >= 0.0
            && p.y >= 0.0
            && p.x <= self.map_width as f64
            && p.y <= self.map_height as f64
    }

    pub fn map_to_window(&self, p: PixelPoint) -> PixelPoint {
        p.offset(self.window_offset_x as f64, self.window_offset_y as f64)
    }

    pub fn window_to_map(&self, p: PixelPoint) -> PixelPoint {
        p.offset(-(self.window_offset_x as f64), -(self.window_offset_y as f64))
    }

    /// Map pixel -> geographic.
    pub fn to_geographic(&self, coords: Coordinates) -> Result<GeoPoint, GeoError> {
        let Coordinates::MapPixel(p) = coords else {
            return Err(GeoError::InvalidSpace {
                expected: Space::MapPixel,
                actual: coords.space(),
            });
        };
        self.check_bounds(p)?;

        let (scale_x, scale_y) = self.meters_per_pixel();
        let projected = Projected {
            x: self.origin.x + p.x * scale_x,
            y: self.origin.y + p.y * scale_y,
        };
        Ok(projection::inverse(projected))
    }

    /// Geographic -> map pixel, floored to whole pixels.
    pub fn to_map_pixel(&self, coords: Coordinates) -> Result<PixelPoint, GeoError> {
        let Coordinates::Geographic(geo) = coords else {
            return Err(GeoError::InvalidSpace {
                expected: Space::Geographic,
                actual: coords.space(),
            });
        };

        let projected = projection::forward(geo);
        let frac_x = (projected.x - self.origin.x) / (self.far_corner.x - self.origin.x);
        let frac_y = (projected.y - self.origin.y) / (self.far_corner.y - self.origin.y);
        let p = PixelPoint::new(
            (frac_x * self.map_width as f64 + PIXEL_EPSILON).floor(),
            (frac_y * self.map_height as f64 + PIXEL_EPSILON).floor(),
        );
        self.check_bounds(p)?;
        Ok(p)
    }

    fn check_bounds(&self, p: PixelPoint) -> Result<(), GeoError> {
        if self.contains_map_pixel(p) {
            Ok(())
        } else {
            Err(GeoError::OutOfBoundsCoordinate {
                x: p.x,
                y: p.y,
                width: self.map_width,
                height: self.map_height,
            })
        }
    }
}
