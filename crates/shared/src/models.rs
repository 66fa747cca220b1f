use serde::{Deserialize, Serialize};

/// Coordinate space a point is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Space {
    /// Origin at the map image's top-left corner.
    MapPixel,
    /// Origin at the window's top-left corner (map pixel + window offset).
    WindowPixel,
    /// Longitude/latitude in degrees (WGS84).
    Geographic,
}

impl std::fmt::Display for Space {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Space::MapPixel => write!(f, "map pixel"),
            Space::WindowPixel => write!(f, "window pixel"),
            Space::Geographic => write!(f, "geographic"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn midpoint(self, other: PixelPoint) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Longitude first, latitude second, everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Which way latitude runs down the pixel rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YOrientation {
    /// Latitude decreases as the pixel row grows (ordinary north-up map).
    NorthUp,
    SouthUp,
}

/// Geographic values at the pixel extremes of the map.
///
/// `lon_min`/`lat_min` are the values at pixel 0 and `lon_max`/`lat_max` the
/// values at the last pixel column/row. They are *not* required to be
/// ordered: the shipped north-up map has `lat_min > lat_max` because pixel
/// rows grow southwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoBounds {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl GeoBounds {
    /// Build north-up bounds from the four edges of the map.
    pub fn from_edges(west: f64, east: f64, north: f64, south: f64) -> Self {
        Self {
            lon_min: west,
            lon_max: east,
            lat_min: north,
            lat_max: south,
        }
    }

    pub fn y_orientation(&self) -> YOrientation {
        if self.lat_min >= self.lat_max {
            YOrientation::NorthUp
        } else {
            YOrientation::SouthUp
        }
    }

    /// Geographic point at the top-left pixel.
    pub fn origin(&self) -> GeoPoint {
        GeoPoint::new(self.lon_min, self.lat_min)
    }

    /// Geographic point at the bottom-right pixel.
    pub fn far_corner(&self) -> GeoPoint {
        GeoPoint::new(self.lon_max, self.lat_max)
    }
}

impl Default for GeoBounds {
    fn default() -> Self {
        Self {
            lon_min: -4.88788,
            lon_max: 9.678657,
            lat_min: 51.173938,
            lat_max: 41.296552,
        }
    }
}

/// Pixel size of a marker image as drawn on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarkerExtent {
    pub width: f64,
    pub height: f64,
}

impl MarkerExtent {
    /// Marker sized relative to the map, keeping the source image aspect.
    ///
    /// `aspect` is the source image height divided by its width.
    pub fn scaled_to_map(map_width: u32, map_height: u32, ratio: f64, aspect: f64) -> Self {
        Self {
            width: map_width as f64 * ratio,
            height: map_height as f64 * ratio * aspect,
        }
    }
}

/// Axis-aligned box in window pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Box whose mid-bottom edge sits on `tip`.
    pub fn from_mid_bottom(tip: PixelPoint, width: f64, height: f64) -> Self {
        Self {
            left: tip.x - width / 2.0,
            top: tip.y - height,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255 };

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Text shown next to a marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerLabel {
    pub text: String,
    pub color: Color,
}

/// One entry of the precomputed city shortlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
}

/// Static game configuration, built once at startup and passed explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub map_width: u32,
    pub map_height: u32,
    pub bounds: GeoBounds,
    pub max_score: u32,
    pub half_score_distance_km: f64,
    /// Marker width as a fraction of the map width.
    pub marker_map_ratio: f64,
    /// Marker image height / width.
    pub marker_aspect: f64,
    /// Render-loop concern, exposed to the renderer only.
    pub max_fps: u32,
    pub rounds_per_game: u32,
    pub label_offset: f64,
    pub label_font_size: f64,
}

impl GameConfig {
    /// The map is anchored to the bottom-right of the window; the band left
    /// above it holds the HUD.
    pub fn map_window_offset(&self) -> (i32, i32) {
        (
            self.window_width as i32 - self.map_width as i32,
            self.window_height as i32 - self.map_height as i32,
        )
    }

    pub fn marker_extent(&self) -> MarkerExtent {
        MarkerExtent::scaled_to_map(
            self.map_width,
            self.map_height,
            self.marker_map_ratio,
            self.marker_aspect,
        )
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 840,
            map_width: 800,
            map_height: 800,
            bounds: GeoBounds::default(),
            max_score: 1000,
            half_score_distance_km: 200.0,
            marker_map_ratio: 0.03,
            marker_aspect: 1.5,
            max_fps: 60,
            rounds_per_game: 10,
            label_offset: 10.0,
            label_font_size: 30.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bounds_are_north_up() {
        assert_eq!(GeoBounds::default().y_orientation(), YOrientation::NorthUp);
    }

    #[test]
    fn test_from_edges_is_north_up() {
        let b = GeoBounds::from_edges(-5.0, 10.0, 51.0, 41.0);
        assert_eq!(b.y_orientation(), YOrientation::NorthUp);
        assert_eq!(b.origin(), GeoPoint::new(-5.0, 51.0));
        assert_eq!(b.far_corner(), GeoPoint::new(10.0, 41.0));
    }

    #[test]
    fn test_south_up_orientation() {
        let b = GeoBounds {
            lon_min: -5.0,
            lon_max: 10.0,
            lat_min: 41.0,
            lat_max: 51.0,
        };
        assert_eq!(b.y_orientation(), YOrientation::SouthUp);
    }

    #[test]
    fn test_map_window_offset_default() {
        assert_eq!(GameConfig::default().map_window_offset(), (0, 40));
    }

    #[test]
    fn test_marker_extent_from_ratio() {
        let extent = GameConfig::default().marker_extent();
        assert!((extent.width - 24.0).abs() < 1e-9);
        assert!((extent.height - 36.0).abs() < 1e-9);
    }

    #[test]
    fn test_rect_from_mid_bottom() {
        let r = Rect::from_mid_bottom(PixelPoint::new(100.0, 200.0), 20.0, 30.0);
        assert!((r.left - 90.0).abs() < 1e-9);
        assert!((r.top - 170.0).abs() < 1e-9);
        assert!((r.bottom() - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(Color { r: 169, g: 169, b: 169 }.to_hex(), "#a9a9a9");
        assert_eq!(Color::WHITE.to_hex(), "#ffffff");
    }

    #[test]
    fn test_game_config_partial_json_uses_defaults() {
        let cfg: GameConfig =
            serde_json::from_str(r#"{ "maxScore": 500, "bounds": { "lonMin": 0.0, "lonMax": 1.0, "latMin": 2.0, "latMax": 1.0 } }"#)
                .unwrap();
        assert_eq!(cfg.max_score, 500);
        assert_eq!(cfg.map_width, 800);
        assert!((cfg.bounds.lon_max - 1.0).abs() < 1e-12);
    }
}
