//! Error taxonomy for coordinate conversion and label placement.

use thiserror::Error;

use crate::models::Space;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    /// The operation needs a point in `expected` but it was given one in `actual`.
    #[error("invalid coordinate space: expected {expected}, got {actual}")]
    InvalidSpace { expected: Space, actual: Space },

    #[error("point is not bound to a map calibration")]
    MissingCalibration,

    #[error("marker extent missing on the {0} point")]
    MissingMarkerExtent(&'static str),

    #[error("coordinate ({x}, {y}) lies outside the map ({width}x{height})")]
    OutOfBoundsCoordinate {
        x: f64,
        y: f64,
        width: u32,
        height: u32,
    },

    /// Startup validation of the calibration failed. Fatal.
    #[error("invalid map calibration: {0}")]
    InvalidCalibration(String),

    /// Startup validation of the score curve failed. Fatal.
    #[error("invalid scoring parameters: {0}")]
    InvalidScoring(String),
}

impl GeoError {
    /// Whether the round can continue after this error (overlay skipped).
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            GeoError::InvalidCalibration(_) | GeoError::InvalidScoring(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_space_display() {
        let e = GeoError::InvalidSpace {
            expected: Space::Geographic,
            actual: Space::MapPixel,
        };
        let msg = e.to_string();
        assert!(msg.contains("geographic"));
        assert!(msg.contains("map pixel"));
    }

    #[test]
    fn test_out_of_bounds_display() {
        let e = GeoError::OutOfBoundsCoordinate {
            x: 900.0,
            y: 10.0,
            width: 800,
            height: 800,
        };
        assert!(e.to_string().contains("800x800"));
    }

    #[test]
    fn test_only_calibration_errors_are_fatal() {
        assert!(!GeoError::InvalidCalibration("zero width".into()).is_recoverable());
        assert!(!GeoError::InvalidScoring("zero half distance".into()).is_recoverable());
        assert!(GeoError::MissingCalibration.is_recoverable());
        assert!(GeoError::MissingMarkerExtent("guess").is_recoverable());
    }
}
