//! One guess: target city + player click -> distance, score, label layout.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calc::{self, ScoringParams};
use crate::calibration::MapCalibration;
use crate::error::GeoError;
use crate::models::{City, Color, GameConfig, GeoPoint, MarkerExtent, PixelPoint, Space};
use crate::placement::{GuessLine, LabelLayout, PlacementConfig, TextMeasure};
use crate::point::CoordinatePoint;

/// Everything a round needs that does not change between rounds.
#[derive(Debug, Clone)]
pub struct RoundContext {
    calibration: Arc<MapCalibration>,
    scoring: ScoringParams,
    placement: PlacementConfig,
    marker: MarkerExtent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundOutcome {
    pub score: u32,
    /// Rounded to 0.1 km, the value the score is computed from.
    pub distance_km: f64,
    pub guess: GeoPoint,
    pub target: GeoPoint,
    pub guess_pixel: PixelPoint,
    pub target_pixel: PixelPoint,
    pub guess_label: String,
    pub target_label: String,
    pub marker: MarkerExtent,
    /// `None` when placement failed; the markers and line can still be drawn.
    pub labels: Option<LabelLayout>,
    pub placement_error: Option<String>,
}

impl RoundContext {
    /// Fails on an invalid calibration or score curve, both fatal at startup.
    pub fn from_config(config: &GameConfig) -> Result<Self, GeoError> {
        let calibration = Arc::new(MapCalibration::from_config(config)?);
        Ok(Self::new(
            calibration,
            ScoringParams::from_config(config)?,
            PlacementConfig::from_config(config),
            config.marker_extent(),
        ))
    }

    pub fn new(
        calibration: Arc<MapCalibration>,
        scoring: ScoringParams,
        placement: PlacementConfig,
        marker: MarkerExtent,
    ) -> Self {
        Self {
            calibration,
            scoring,
            placement,
            marker,
        }
    }

    pub fn calibration(&self) -> &Arc<MapCalibration> {
        &self.calibration
    }

    pub fn scoring(&self) -> ScoringParams {
        self.scoring
    }

    pub fn placement(&self) -> &PlacementConfig {
        &self.placement
    }

    /// Target marker for a city, with its pixel position resolved.
    pub fn target_point(&self, city: &City) -> Result<CoordinatePoint, GeoError> {
        let mut point =
            CoordinatePoint::from_geographic(self.calibration.clone(), city.longitude, city.latitude);
        point.cache_window_pixel()?;
        point.attach_marker(self.marker);
        point.attach_label(city.name.clone(), Color::WHITE);
        Ok(point)
    }

    /// Guess marker for a click in window pixels, converted to degrees.
    pub fn guess_point(&self, x: f64, y: f64) -> Result<CoordinatePoint, GeoError> {
        let mut point = CoordinatePoint::from_click(self.calibration.clone(), x, y);
        point.pixel_to_geographic()?;
        point.attach_marker(self.marker);
        Ok(point)
    }

    /// Score the guess. Conversion errors abort the round; placement errors
    /// only drop the labels.
    pub fn evaluate(
        &self,
        guess: &mut CoordinatePoint,
        target: &mut CoordinatePoint,
        measure: &dyn TextMeasure,
    ) -> Result<RoundOutcome, GeoError> {
        guess.ensure_space(Space::Geographic)?;
        target.ensure_space(Space::Geographic)?;

        let distance_km = calc::round_distance_km(guess.distance_to(target)?);
        let score = self.scoring.score(distance_km);
        guess.attach_label(format!("{} km = {} pts", distance_km, score), Color::WHITE);

        let guess_geo = guess.geographic().ok_or(GeoError::InvalidSpace {
            expected: Space::Geographic,
            actual: guess.space(),
        })?;
        let target_geo = target.geographic().ok_or(GeoError::InvalidSpace {
            expected: Space::Geographic,
            actual: target.space(),
        })?;

        let (labels, placement_error) =
            match GuessLine::new(guess, target, score, distance_km, &self.placement, measure) {
                Ok(line) => (Some(line.into_label_layout()), None),
                Err(e) if e.is_recoverable() => {
                    warn!(error = %e, "skipping guess labels for this round");
                    (None, Some(e.to_string()))
                }
                Err(e) => return Err(e),
            };

        let outcome = RoundOutcome {
            score,
            distance_km,
            guess: guess_geo,
            target: target_geo,
            guess_pixel: guess.window_pixel()?,
            target_pixel: target.window_pixel()?,
            guess_label: guess.label().map(|l| l.text.clone()).unwrap_or_default(),
            target_label: target.label().map(|l| l.text.clone()).unwrap_or_default(),
            marker: self.marker,
            labels,
            placement_error,
        };
        info!(
            score,
            distance_km,
            target = %outcome.target_label,
            "round evaluated"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::{FixedFontMeasure, PlacementBranch};
    use crate::point::Coordinates;

    const MEASURE: FixedFontMeasure = FixedFontMeasure { font_size: 30.0 };

    fn context() -> RoundContext {
        RoundContext::from_config(&GameConfig::default()).unwrap()
    }

    fn paris() -> City {
        City {
            name: "Paris".to_string(),
            longitude: 2.3522,
            latitude: 48.8566,
        }
    }

    #[test]
    fn test_fatal_calibration_error() {
        let config = GameConfig {
            map_width: 0,
            ..GameConfig::default()
        };
        let err = RoundContext::from_config(&config).unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_zero_half_score_distance_is_fatal() {
        let config = GameConfig {
            half_score_distance_km: 0.0,
            ..GameConfig::default()
        };
        let err = RoundContext::from_config(&config).unwrap_err();
        assert!(matches!(err, GeoError::InvalidScoring(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_target_point_keeps_exact_degrees() {
        let ctx = context();
        let target = ctx.target_point(&paris()).unwrap();
        assert_eq!(target.geographic(), Some(GeoPoint::new(2.3522, 48.8566)));
        assert!(target.cached_window_pixel().is_some());
        assert_eq!(target.label().unwrap().text, "Paris");
    }

    #[test]
    fn test_guess_on_target_scores_max_and_stacks_labels() {
        let ctx = context();
        let mut target = ctx.target_point(&paris()).unwrap();
        let click = target.cached_window_pixel().unwrap();
        let mut guess = ctx.guess_point(click.x, click.y).unwrap();

        let outcome = ctx.evaluate(&mut guess, &mut target, &MEASURE).unwrap();
        assert!(outcome.distance_km < 3.0, "got {}", outcome.distance_km);
        assert!(outcome.score > 985);
        let labels = outcome.labels.unwrap();
        assert_eq!(labels.branch, PlacementBranch::Close);
        assert!(outcome.guess_label.ends_with(&format!("= {} pts", outcome.score)));
        assert_eq!(outcome.target_label, "Paris");
    }

    #[test]
    fn test_corner_to_corner_uses_angled_labels() {
        let ctx = context();
        let cal = ctx.calibration().clone();

        let corner = |x: f64, y: f64| {
            cal.to_geographic(Coordinates::MapPixel(PixelPoint::new(x, y)))
                .unwrap()
        };
        let top_left = corner(0.0, 0.0);
        let bottom_right = corner(800.0, 800.0);

        let mut guess = ctx.guess_point(0.0, 40.0).unwrap();
        let mut target = ctx
            .target_point(&City {
                name: "corner".to_string(),
                longitude: bottom_right.lon,
                latitude: bottom_right.lat,
            })
            .unwrap();

        let outcome = ctx.evaluate(&mut guess, &mut target, &MEASURE).unwrap();
        let expected = calc::haversine_km(top_left, bottom_right);
        assert!((outcome.distance_km - expected).abs() <= 0.05);
        assert!(outcome.score < 700);
        assert_eq!(outcome.labels.unwrap().branch, PlacementBranch::Angled);
    }

    #[test]
    fn test_missing_marker_skips_labels_only() {
        let ctx = context();
        let mut target = ctx.target_point(&paris()).unwrap();
        let mut guess = CoordinatePoint::from_click(ctx.calibration().clone(), 100.0, 300.0);
        guess.pixel_to_geographic().unwrap();

        let outcome = ctx.evaluate(&mut guess, &mut target, &MEASURE).unwrap();
        assert!(outcome.labels.is_none());
        assert!(outcome.placement_error.unwrap().contains("guess"));
        assert!(outcome.score > 0);
    }

    #[test]
    fn test_click_in_top_band_is_rejected() {
        let ctx = context();
        let err = ctx.guess_point(400.0, 20.0).unwrap_err();
        assert!(matches!(err, GeoError::OutOfBoundsCoordinate { .. }));
    }

    #[test]
    fn test_distance_is_rounded_before_scoring() {
        let ctx = context();
        let mut target = ctx.target_point(&paris()).unwrap();
        let mut guess = ctx.guess_point(100.0, 700.0).unwrap();
        let outcome = ctx.evaluate(&mut guess, &mut target, &MEASURE).unwrap();
        assert!(((outcome.distance_km * 10.0).round() - outcome.distance_km * 10.0).abs() < 1e-6);
        assert_eq!(outcome.score, ctx.scoring().score(outcome.distance_km));
    }
}
