//! Where to draw the score and distance labels of a guess.
//!
//! Two layouts:
//!
//! ```text
//!   close (score > 700 or < 100 km)        angled (everything else)
//!
//!        v  v                                    /
//!      1000 pts                          score  /
//!      12.3 km                                 /  dist
//!                                             /
//! ```
//!
//! Close markers leave no room along the line, so the labels are stacked
//! horizontally under the markers, or over them when the markers sit in the
//! bottom tenth of the window. Otherwise the labels are rotated to follow the
//! line, one on each side of it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GeoError;
use crate::models::{GameConfig, PixelPoint, Rect};
use crate::point::CoordinatePoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Anchor {
    /// `position` is the middle of the label's top edge.
    MidTop,
    /// `position` is the middle of the label's bottom edge.
    MidBottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementBranch {
    Close,
    Angled,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelSize {
    pub width: f64,
    pub height: f64,
}

/// Text metrics come from whoever renders the labels.
pub trait TextMeasure {
    fn measure(&self, text: &str) -> LabelSize;
}

/// Estimate for a proportional font at a fixed pixel size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedFontMeasure {
    pub font_size: f64,
}

impl TextMeasure for FixedFontMeasure {
    fn measure(&self, text: &str) -> LabelSize {
        LabelSize {
            width: text.chars().count() as f64 * self.font_size * 0.55,
            height: self.font_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementConfig {
    pub window_height: f64,
    /// Gap in pixels between labels, markers and the line.
    pub offset: f64,
    /// Scores strictly above this count as close.
    pub close_score: u32,
    /// Distances strictly below this count as close.
    pub close_distance_km: f64,
    /// Markers whose lowest edge reaches this fraction of the window height
    /// get their labels stacked above instead of below.
    pub bottom_band_ratio: f64,
}

impl PlacementConfig {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            window_height: config.window_height as f64,
            offset: config.label_offset,
            ..Self::default()
        }
    }

    pub fn is_close(&self, score: u32, distance_km: f64) -> bool {
        score > self.close_score || distance_km < self.close_distance_km
    }
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            window_height: 840.0,
            offset: 10.0,
            close_score: 700,
            close_distance_km: 100.0,
            bottom_band_ratio: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelPlacement {
    pub text: String,
    pub position: PixelPoint,
    pub anchor: Anchor,
    /// Degrees, counter-clockwise positive on screen.
    pub rotation_degrees: f64,
    pub size: LabelSize,
}

impl LabelPlacement {
    /// Top edge of an unrotated label.
    pub fn top(&self) -> f64 {
        match self.anchor {
            Anchor::MidTop => self.position.y,
            Anchor::MidBottom => self.position.y - self.size.height,
        }
    }

    /// Bottom edge of an unrotated label.
    pub fn bottom(&self) -> f64 {
        self.top() + self.size.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelLayout {
    pub branch: PlacementBranch,
    pub score: LabelPlacement,
    pub distance: LabelPlacement,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Slope {
    Finite(f64),
    /// Both ends share the same pixel column.
    Vertical,
}

impl Slope {
    pub fn between(from: PixelPoint, to: PixelPoint) -> Self {
        if from.x == to.x {
            Slope::Vertical
        } else {
            Slope::Finite((to.y - from.y) / (to.x - from.x))
        }
    }

    /// Angle of the line against the x axis, in degrees (screen y grows down).
    pub fn angle_degrees(&self) -> f64 {
        match self {
            Slope::Finite(s) => s.atan().to_degrees(),
            Slope::Vertical => 90.0,
        }
    }

    fn is_non_negative(&self) -> bool {
        match self {
            Slope::Finite(s) => *s >= 0.0,
            Slope::Vertical => true,
        }
    }
}

pub fn score_text(score: u32) -> String {
    format!("{} pts", score)
}

pub fn distance_text(distance_km: f64) -> String {
    format!("{:.1} km", distance_km)
}

/// Pixel end of the guess line together with its marker box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineEndpoint {
    pub pixel: PixelPoint,
    pub marker: Rect,
}

impl LineEndpoint {
    fn resolve(point: &mut CoordinatePoint, role: &'static str) -> Result<Self, GeoError> {
        if point.marker_extent().is_none() {
            return Err(GeoError::MissingMarkerExtent(role));
        }
        let pixel = point.window_pixel()?;
        let marker = point
            .marker_rect()?
            .ok_or(GeoError::MissingMarkerExtent(role))?;
        Ok(Self { pixel, marker })
    }
}

/// The segment from the guess to the target and its label layout.
#[derive(Debug, Clone, PartialEq)]
pub struct GuessLine {
    guess: LineEndpoint,
    target: LineEndpoint,
    score: u32,
    distance_km: f64,
    slope: Slope,
    angle_degrees: f64,
    label_layout: LabelLayout,
}

impl GuessLine {
    /// Points still in geographic space are converted to pixels on the way,
    /// with a warning. Fails with `MissingMarkerExtent` when either point has
    /// no marker attached.
    pub fn new(
        guess: &mut CoordinatePoint,
        target: &mut CoordinatePoint,
        score: u32,
        distance_km: f64,
        config: &PlacementConfig,
        measure: &dyn TextMeasure,
    ) -> Result<Self, GeoError> {
        let guess = LineEndpoint::resolve(guess, "guess")?;
        let target = LineEndpoint::resolve(target, "target")?;

        let slope = Slope::between(guess.pixel, target.pixel);
        let angle_degrees = slope.angle_degrees();

        let score_label = score_text(score);
        let distance_label = distance_text(distance_km);
        let labels = (
            (score_label.as_str(), measure.measure(&score_label)),
            (distance_label.as_str(), measure.measure(&distance_label)),
        );

        let label_layout = if config.is_close(score, distance_km) {
            place_close(&guess, &target, labels, config)
        } else {
            place_angled(&guess, &target, slope, labels, config)
        };
        debug!(
            score,
            distance_km,
            branch = ?label_layout.branch,
            angle = angle_degrees,
            "guess line labels placed"
        );

        Ok(Self {
            guess,
            target,
            score,
            distance_km,
            slope,
            angle_degrees,
            label_layout,
        })
    }

    pub fn guess(&self) -> &LineEndpoint {
        &self.guess
    }

    pub fn target(&self) -> &LineEndpoint {
        &self.target
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn slope(&self) -> Slope {
        self.slope
    }

    pub fn angle_degrees(&self) -> f64 {
        self.angle_degrees
    }

    pub fn midpoint(&self) -> PixelPoint {
        self.guess.pixel.midpoint(self.target.pixel)
    }

    pub fn label_layout(&self) -> &LabelLayout {
        &self.label_layout
    }

    pub fn into_label_layout(self) -> LabelLayout {
        self.label_layout
    }
}

type Labels<'a> = ((&'a str, LabelSize), (&'a str, LabelSize));

fn place_close(
    guess: &LineEndpoint,
    target: &LineEndpoint,
    ((score_text, score_size), (distance_text, distance_size)): Labels<'_>,
    config: &PlacementConfig,
) -> LabelLayout {
    let mid_x = guess.pixel.midpoint(target.pixel).x;
    let lowest = guess.marker.bottom().max(target.marker.bottom());
    let label = |text: &str, y: f64, anchor: Anchor, size: LabelSize| LabelPlacement {
        text: text.to_string(),
        position: PixelPoint::new(mid_x, y),
        anchor,
        rotation_degrees: 0.0,
        size,
    };

    let (score, distance) = if lowest >= config.bottom_band_ratio * config.window_height {
        // Stack upwards: markers, gap, distance, gap, score.
        let highest = guess.marker.top.min(target.marker.top);
        let distance = label(
            distance_text,
            highest - config.offset,
            Anchor::MidBottom,
            distance_size,
        );
        let score = label(
            score_text,
            distance.top() - config.offset,
            Anchor::MidBottom,
            score_size,
        );
        (score, distance)
    } else {
        let score = label(score_text, lowest + config.offset, Anchor::MidTop, score_size);
        let distance = label(
            distance_text,
            score.bottom() + config.offset,
            Anchor::MidTop,
            distance_size,
        );
        (score, distance)
    };

    LabelLayout {
        branch: PlacementBranch::Close,
        score,
        distance,
    }
}

fn place_angled(
    guess: &LineEndpoint,
    target: &LineEndpoint,
    slope: Slope,
    ((score_text, score_size), (distance_text, distance_size)): Labels<'_>,
    config: &PlacementConfig,
) -> LabelLayout {
    let mid = guess.pixel.midpoint(target.pixel);
    let angle = slope.angle_degrees();
    let rotation_degrees = if slope.is_non_negative() { -angle } else { angle };

    // Normal of the line pointing to smaller y, or to +x for vertical lines.
    let theta = angle.to_radians();
    let (up_x, up_y) = (theta.sin(), -theta.cos());

    // Score goes on the text's up side for non-negative slopes, below otherwise.
    let side = if slope.is_non_negative() { 1.0 } else { -1.0 };
    let (score_anchor, distance_anchor) = if side > 0.0 {
        (Anchor::MidBottom, Anchor::MidTop)
    } else {
        (Anchor::MidTop, Anchor::MidBottom)
    };
    let shift = side * config.offset;

    LabelLayout {
        branch: PlacementBranch::Angled,
        score: LabelPlacement {
            text: score_text.to_string(),
            position: mid.offset(up_x * shift, up_y * shift),
            anchor: score_anchor,
            rotation_degrees,
            size: score_size,
        },
        distance: LabelPlacement {
            text: distance_text.to_string(),
            position: mid.offset(-up_x * shift, -up_y * shift),
            anchor: distance_anchor,
            rotation_degrees,
            size: distance_size,
        },
    }
}
