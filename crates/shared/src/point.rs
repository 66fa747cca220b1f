//! A single point on the map that can move between pixel and geographic
//! space.
//!
//! The coordinates carry their space in the enum tag, so a pixel pair can
//! never be read as a longitude/latitude pair. The window-pixel position is
//! computed once and cached: a point converted to geographic space and back
//! still reports the exact pixel the player clicked.

use std::sync::Arc;

use tracing::warn;

use crate::calc;
use crate::calibration::MapCalibration;
use crate::error::GeoError;
use crate::models::{Color, GeoPoint, MarkerExtent, MarkerLabel, PixelPoint, Rect, Space};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coordinates {
    MapPixel(PixelPoint),
    WindowPixel(PixelPoint),
    Geographic(GeoPoint),
}

impl Coordinates {
    pub fn space(&self) -> Space {
        match self {
            Coordinates::MapPixel(_) => Space::MapPixel,
            Coordinates::WindowPixel(_) => Space::WindowPixel,
            Coordinates::Geographic(_) => Space::Geographic,
        }
    }

    pub fn is_pixel(&self) -> bool {
        !matches!(self, Coordinates::Geographic(_))
    }
}

#[derive(Debug, Clone)]
pub struct CoordinatePoint {
    coords: Coordinates,
    /// Filled the first time a pixel position is known, never overwritten.
    cached_window_pixel: Option<PixelPoint>,
    label: Option<MarkerLabel>,
    marker_extent: Option<MarkerExtent>,
    calibration: Option<Arc<MapCalibration>>,
}

impl CoordinatePoint {
    /// Unbound point. Conversions fail with `MissingCalibration` until
    /// [`CoordinatePoint::bind`] is called.
    pub fn new(coords: Coordinates) -> Self {
        let cached_window_pixel = match coords {
            Coordinates::WindowPixel(p) => Some(p),
            _ => None,
        };
        Self {
            coords,
            cached_window_pixel,
            label: None,
            marker_extent: None,
            calibration: None,
        }
    }

    /// Player click, in window pixels.
    pub fn from_click(calibration: Arc<MapCalibration>, x: f64, y: f64) -> Self {
        Self::new(Coordinates::WindowPixel(PixelPoint::new(x, y))).bind(calibration)
    }

    /// City record, in degrees.
    pub fn from_geographic(calibration: Arc<MapCalibration>, lon: f64, lat: f64) -> Self {
        Self::new(Coordinates::Geographic(GeoPoint::new(lon, lat))).bind(calibration)
    }

    pub fn bind(mut self, calibration: Arc<MapCalibration>) -> Self {
        self.calibration = Some(calibration);
        self
    }

    pub fn coords(&self) -> Coordinates {
        self.coords
    }

    pub fn space(&self) -> Space {
        self.coords.space()
    }

    pub fn cached_window_pixel(&self) -> Option<PixelPoint> {
        self.cached_window_pixel
    }

    pub fn label(&self) -> Option<&MarkerLabel> {
        self.label.as_ref()
    }

    pub fn marker_extent(&self) -> Option<MarkerExtent> {
        self.marker_extent
    }

    pub fn geographic(&self) -> Option<GeoPoint> {
        match self.coords {
            Coordinates::Geographic(g) => Some(g),
            _ => None,
        }
    }

    pub fn attach_marker(&mut self, extent: MarkerExtent) {
        self.marker_extent = Some(extent);
    }

    pub fn attach_label(&mut self, text: impl Into<String>, color: Color) {
        self.label = Some(MarkerLabel {
            text: text.into(),
            color,
        });
    }

    fn calibration(&self) -> Result<&MapCalibration, GeoError> {
        self.calibration.as_deref().ok_or(GeoError::MissingCalibration)
    }

    /// Convert to geographic space. A point already there is left alone.
    pub fn pixel_to_geographic(&mut self) -> Result<(), GeoError> {
        let map_pixel = match self.coords {
            Coordinates::Geographic(_) => {
                warn!("point is already geographic, conversion skipped");
                return Ok(());
            }
            Coordinates::MapPixel(p) => p,
            Coordinates::WindowPixel(p) => self.calibration()?.window_to_map(p),
        };
        let (geo, window) = {
            let calibration = self.calibration()?;
            (
                calibration.to_geographic(Coordinates::MapPixel(map_pixel))?,
                calibration.map_to_window(map_pixel),
            )
        };
        self.cached_window_pixel.get_or_insert(window);
        self.coords = Coordinates::Geographic(geo);
        Ok(())
    }

    /// Convert to map-pixel space. A point already in pixels is left alone.
    pub fn geographic_to_pixel(&mut self) -> Result<(), GeoError> {
        let Coordinates::Geographic(geo) = self.coords else {
            warn!(space = %self.space(), "point is already in pixels, conversion skipped");
            return Ok(());
        };
        let (map_pixel, window) = {
            let calibration = self.calibration()?;
            let map_pixel = calibration.to_map_pixel(Coordinates::Geographic(geo))?;
            (map_pixel, calibration.map_to_window(map_pixel))
        };
        self.cached_window_pixel.get_or_insert(window);
        self.coords = Coordinates::MapPixel(map_pixel);
        Ok(())
    }

    /// Idempotent conversion into `target`. Unlike the two directed
    /// conversions this never logs: being there already is the normal case.
    pub fn ensure_space(&mut self, target: Space) -> Result<(), GeoError> {
        if self.space() == target {
            return Ok(());
        }
        match target {
            Space::Geographic => self.pixel_to_geographic(),
            Space::MapPixel => match self.coords {
                Coordinates::WindowPixel(p) => {
                    let map_pixel = self.calibration()?.window_to_map(p);
                    self.coords = Coordinates::MapPixel(map_pixel);
                    Ok(())
                }
                _ => self.geographic_to_pixel(),
            },
            Space::WindowPixel => {
                if !self.coords.is_pixel() {
                    self.geographic_to_pixel()?;
                }
                if let Coordinates::MapPixel(p) = self.coords {
                    let window = self.calibration()?.map_to_window(p);
                    self.cached_window_pixel.get_or_insert(window);
                    self.coords = Coordinates::WindowPixel(window);
                }
                Ok(())
            }
        }
    }

    /// Window-pixel position for rendering.
    ///
    /// Served from the cache when possible. A geographic point without a
    /// cached position has it resolved on the spot, with a warning.
    pub fn window_pixel(&mut self) -> Result<PixelPoint, GeoError> {
        if let Some(p) = self.cached_window_pixel {
            return Ok(p);
        }
        if !self.coords.is_pixel() {
            warn!("resolving pixel position of a geographic point before use");
        }
        self.cache_window_pixel()
    }

    /// Fill the window-pixel cache if it is empty and return it.
    ///
    /// The point keeps its current space: a geographic point keeps its exact
    /// degrees and only gains a pixel view.
    pub fn cache_window_pixel(&mut self) -> Result<PixelPoint, GeoError> {
        if let Some(p) = self.cached_window_pixel {
            return Ok(p);
        }
        let window = match self.coords {
            Coordinates::WindowPixel(p) => p,
            Coordinates::MapPixel(p) => self.calibration()?.map_to_window(p),
            Coordinates::Geographic(geo) => {
                let calibration = self.calibration()?;
                let map_pixel = calibration.to_map_pixel(Coordinates::Geographic(geo))?;
                calibration.map_to_window(map_pixel)
            }
        };
        self.cached_window_pixel = Some(window);
        Ok(window)
    }

    /// Marker box in window pixels, tip at the point.
    pub fn marker_rect(&mut self) -> Result<Option<Rect>, GeoError> {
        let Some(extent) = self.marker_extent else {
            return Ok(None);
        };
        let tip = self.window_pixel()?;
        Ok(Some(Rect::from_mid_bottom(tip, extent.width, extent.height)))
    }

    /// Great-circle distance in km. Both points must be geographic.
    pub fn distance_to(&self, other: &CoordinatePoint) -> Result<f64, GeoError> {
        let (Coordinates::Geographic(a), Coordinates::Geographic(b)) = (self.coords, other.coords)
        else {
            let actual = if self.coords.is_pixel() {
                self.space()
            } else {
                other.space()
            };
            return Err(GeoError::InvalidSpace {
                expected: Space::Geographic,
                actual,
            });
        };
        Ok(calc::haversine_km(a, b))
    }
}
