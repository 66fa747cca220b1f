use std::sync::Arc;

use async_graphql::{Context, EmptyMutation, EmptySubscription, Enum, InputObject, Object, SimpleObject};
use geogame_shared::{
    models::{City, Color, GameConfig, PixelPoint},
    placement::{Anchor, FixedFontMeasure, LabelLayout, LabelPlacement, PlacementBranch},
    round::{RoundContext, RoundOutcome},
};

use crate::assets::Assets;

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
pub enum GqlAnchor {
    MidTop,
    MidBottom,
}

impl From<Anchor> for GqlAnchor {
    fn from(a: Anchor) -> Self {
        match a {
            Anchor::MidTop => GqlAnchor::MidTop,
            Anchor::MidBottom => GqlAnchor::MidBottom,
        }
    }
}

#[derive(Enum, Copy, Clone, Eq, PartialEq)]
pub enum GqlPlacementBranch {
    Close,
    Angled,
}

impl From<PlacementBranch> for GqlPlacementBranch {
    fn from(b: PlacementBranch) -> Self {
        match b {
            PlacementBranch::Close => GqlPlacementBranch::Close,
            PlacementBranch::Angled => GqlPlacementBranch::Angled,
        }
    }
}

// GraphQL output types

#[derive(SimpleObject, Clone, Copy)]
pub struct GqlPixel {
    pub x: f64,
    pub y: f64,
}

impl From<PixelPoint> for GqlPixel {
    fn from(p: PixelPoint) -> Self {
        GqlPixel { x: p.x, y: p.y }
    }
}

#[derive(SimpleObject)]
pub struct GqlBounds {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

#[derive(SimpleObject)]
pub struct GqlGameConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub map_width: u32,
    pub map_height: u32,
    pub map_offset: GqlPixel,
    pub bounds: GqlBounds,
    pub max_score: u32,
    pub half_score_distance_km: f64,
    pub marker_width: f64,
    pub marker_height: f64,
    pub max_fps: u32,
    pub rounds_per_game: u32,
    pub label_font_size: f64,
}

impl From<&GameConfig> for GqlGameConfig {
    fn from(c: &GameConfig) -> Self {
        let (offset_x, offset_y) = c.map_window_offset();
        let marker = c.marker_extent();
        GqlGameConfig {
            window_width: c.window_width,
            window_height: c.window_height,
            map_width: c.map_width,
            map_height: c.map_height,
            map_offset: GqlPixel {
                x: offset_x as f64,
                y: offset_y as f64,
            },
            bounds: GqlBounds {
                lon_min: c.bounds.lon_min,
                lon_max: c.bounds.lon_max,
                lat_min: c.bounds.lat_min,
                lat_max: c.bounds.lat_max,
            },
            max_score: c.max_score,
            half_score_distance_km: c.half_score_distance_km,
            marker_width: marker.width,
            marker_height: marker.height,
            max_fps: c.max_fps,
            rounds_per_game: c.rounds_per_game,
            label_font_size: c.label_font_size,
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlCity {
    pub name: String,
    pub longitude: f64,
    pub latitude: f64,
    /// Window pixel of the city's marker tip.
    pub pixel: GqlPixel,
}

#[derive(SimpleObject)]
pub struct GqlLabel {
    pub text: String,
    pub position: GqlPixel,
    pub anchor: GqlAnchor,
    pub rotation_degrees: f64,
    pub width: f64,
    pub height: f64,
}

impl From<LabelPlacement> for GqlLabel {
    fn from(l: LabelPlacement) -> Self {
        GqlLabel {
            text: l.text,
            position: l.position.into(),
            anchor: l.anchor.into(),
            rotation_degrees: l.rotation_degrees,
            width: l.size.width,
            height: l.size.height,
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlLabelLayout {
    pub branch: GqlPlacementBranch,
    pub score: GqlLabel,
    pub distance: GqlLabel,
}

impl From<LabelLayout> for GqlLabelLayout {
    fn from(l: LabelLayout) -> Self {
        GqlLabelLayout {
            branch: l.branch.into(),
            score: l.score.into(),
            distance: l.distance.into(),
        }
    }
}

#[derive(SimpleObject)]
pub struct GqlMarker {
    pub longitude: f64,
    pub latitude: f64,
    pub pixel: GqlPixel,
    pub label: String,
    pub label_color: String,
}

#[derive(SimpleObject)]
pub struct GqlRoundResult {
    pub score: u32,
    pub distance_km: f64,
    pub guess: GqlMarker,
    pub target: GqlMarker,
    pub marker_width: f64,
    pub marker_height: f64,
    pub labels: Option<GqlLabelLayout>,
    pub placement_error: Option<String>,
}

impl From<RoundOutcome> for GqlRoundResult {
    fn from(o: RoundOutcome) -> Self {
        let label_color = Color::WHITE.to_hex();
        GqlRoundResult {
            score: o.score,
            distance_km: o.distance_km,
            guess: GqlMarker {
                longitude: o.guess.lon,
                latitude: o.guess.lat,
                pixel: o.guess_pixel.into(),
                label: o.guess_label,
                label_color: label_color.clone(),
            },
            target: GqlMarker {
                longitude: o.target.lon,
                latitude: o.target.lat,
                pixel: o.target_pixel.into(),
                label: o.target_label,
                label_color,
            },
            marker_width: o.marker.width,
            marker_height: o.marker.height,
            labels: o.labels.map(Into::into),
            placement_error: o.placement_error,
        }
    }
}

// Input types

#[derive(InputObject)]
pub struct GuessInput {
    pub city_name: String,
    /// Click position in window pixels.
    pub x: f64,
    pub y: f64,
}

fn locate(round: &RoundContext, city: &City) -> async_graphql::Result<GqlCity> {
    let target = round
        .target_point(city)
        .map_err(|e| async_graphql::Error::new(format!("{}: {}", city.name, e)))?;
    let pixel = target
        .cached_window_pixel()
        .ok_or_else(|| async_graphql::Error::new("target pixel not resolved"))?;
    Ok(GqlCity {
        name: city.name.clone(),
        longitude: city.longitude,
        latitude: city.latitude,
        pixel: pixel.into(),
    })
}

// Query root

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn config(&self, ctx: &Context<'_>) -> async_graphql::Result<GqlGameConfig> {
        let assets = ctx.data::<Arc<Assets>>()?;
        Ok(GqlGameConfig::from(&assets.config))
    }

    async fn city_names(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<String>> {
        let assets = ctx.data::<Arc<Assets>>()?;
        Ok(assets.cities.all().iter().map(|c| c.name.clone()).collect())
    }

    /// A random city from the shortlist, for the next round.
    async fn sample_city(&self, ctx: &Context<'_>) -> async_graphql::Result<GqlCity> {
        let assets = ctx.data::<Arc<Assets>>()?;
        let round = ctx.data::<Arc<RoundContext>>()?;
        locate(round, assets.cities.sample_city())
    }

    async fn locate_city(
        &self,
        ctx: &Context<'_>,
        name: String,
    ) -> async_graphql::Result<Option<GqlCity>> {
        let assets = ctx.data::<Arc<Assets>>()?;
        let round = ctx.data::<Arc<RoundContext>>()?;
        assets
            .cities
            .find_city(&name)
            .map(|city| locate(round, city))
            .transpose()
    }

    /// Score a click against the named city. A click outside the map is an
    /// error; a label placement failure is reported in `placementError`.
    async fn evaluate_guess(
        &self,
        ctx: &Context<'_>,
        input: GuessInput,
    ) -> async_graphql::Result<GqlRoundResult> {
        let assets = ctx.data::<Arc<Assets>>()?;
        let round = ctx.data::<Arc<RoundContext>>()?;
        let measure = ctx.data::<FixedFontMeasure>()?;

        let city = assets.cities.find_city(&input.city_name).ok_or_else(|| {
            async_graphql::Error::new(format!("Unknown city: {}", input.city_name))
        })?;

        let mut target = round
            .target_point(city)
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        let mut guess = round
            .guess_point(input.x, input.y)
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        let outcome = round
            .evaluate(&mut guess, &mut target, measure)
            .map_err(|e| async_graphql::Error::new(e.to_string()))?;
        Ok(outcome.into())
    }
}

pub type Schema = async_graphql::Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub fn build_schema(assets: Arc<Assets>, round: Arc<RoundContext>) -> Schema {
    let measure = FixedFontMeasure {
        font_size: assets.config.label_font_size,
    };
    async_graphql::Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(assets)
        .data(round)
        .data(measure)
        .finish()
}
