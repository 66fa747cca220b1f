use serde::{Deserialize, Serialize};

use crate::error::GeoError;
use crate::models::{GameConfig, GeoPoint};

/// Mean Earth radius in km. Spherical model, same approximation level as
/// the map projection itself.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Parameters of the exponential score curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringParams {
    /// Score for a perfect guess.
    pub max_score: u32,
    /// Distance at which the score drops to half of `max_score`.
    pub half_score_distance_km: f64,
}

impl ScoringParams {
    /// The half-score distance must be positive and finite, otherwise every
    /// score collapses to 0.
    pub fn new(max_score: u32, half_score_distance_km: f64) -> Result<Self, GeoError> {
        if !(half_score_distance_km.is_finite() && half_score_distance_km > 0.0) {
            return Err(GeoError::InvalidScoring(format!(
                "half score distance must be a positive number of km, got {}",
                half_score_distance_km
            )));
        }
        Ok(Self {
            max_score,
            half_score_distance_km,
        })
    }

    pub fn from_config(config: &GameConfig) -> Result<Self, GeoError> {
        Self::new(config.max_score, config.half_score_distance_km)
    }

    pub fn score(&self, distance_km: f64) -> u32 {
        score(distance_km, self.max_score, self.half_score_distance_km)
    }
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            max_score: 1000,
            half_score_distance_km: 200.0,
        }
    }
}

/// Great-circle distance in km between two (lon, lat) points, in degrees.
pub fn haversine_distance_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let lat1 = lat1.to_radians();
    let lon1 = lon1.to_radians();
    let lat2 = lat2.to_radians();
    let lon2 = lon2.to_radians();

    let dlon = lon2 - lon1;
    let dlat = lat2 - lat1;
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    haversine_distance_km(a.lon, a.lat, b.lon, b.lat)
}

/// `max_score * exp(B * d)` with `B = ln(0.5) / half_score_distance_km`,
/// truncated to an integer. Not clamped: far guesses truncate to 0.
pub fn score(distance_km: f64, max_score: u32, half_score_distance_km: f64) -> u32 {
    let b = 0.5_f64.ln() / half_score_distance_km;
    (max_score as f64 * (b * distance_km).exp()).floor() as u32
}

/// Round a distance to one decimal, the precision shown to the player.
pub fn round_distance_km(distance_km: f64) -> f64 {
    (distance_km * 10.0).round() / 10.0
}
