use std::path::Path;

use geogame_shared::models::{City, GameConfig};
use rand::Rng;
use serde::de::DeserializeOwned;

use crate::error::AppError;

pub struct Assets {
    pub config: GameConfig,
    pub cities: CityPool,
}

impl Assets {
    /// Reads `game.json` and `cities.json` from `assets_dir`. A missing
    /// `game.json` falls back to the built-in defaults; the city list is
    /// required and must not be empty.
    pub fn load(assets_dir: &Path) -> Result<Self, AppError> {
        let config_path = assets_dir.join("game.json");
        let config: GameConfig = if config_path.exists() {
            read_json(assets_dir, "game.json")?
        } else {
            tracing::info!(path = %config_path.display(), "No game config, using defaults");
            GameConfig::default()
        };

        let cities: Vec<City> = read_json(assets_dir, "cities.json")?;
        let cities = CityPool::new(cities)?;

        tracing::info!(
            cities = cities.len(),
            map_width = config.map_width,
            map_height = config.map_height,
            "Loaded game assets"
        );

        Ok(Assets { config, cities })
    }
}

fn read_json<T: DeserializeOwned>(dir: &Path, file: &'static str) -> Result<T, AppError> {
    let path = dir.join(file);
    let data = std::fs::read_to_string(&path).map_err(|source| AppError::Io {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| AppError::Parse { file, source })
}

/// The shortlist of cities a round can ask for.
#[derive(Debug, Clone)]
pub struct CityPool {
    cities: Vec<City>,
}

impl CityPool {
    pub fn new(cities: Vec<City>) -> Result<Self, AppError> {
        if cities.is_empty() {
            return Err(AppError::NoCities);
        }
        Ok(Self { cities })
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn all(&self) -> &[City] {
        &self.cities
    }

    /// Uniformly random city. The pool is never empty.
    pub fn sample_city(&self) -> &City {
        let mut rng = rand::thread_rng();
        let index = rng.gen_range(0..self.cities.len());
        &self.cities[index]
    }

    /// Case-insensitive lookup by city name.
    pub fn find_city(&self, name: &str) -> Option<&City> {
        self.cities
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name.trim()))
    }
}
