use std::path::PathBuf;

use geogame_shared::error::GeoError;
use thiserror::Error;

/// Startup failures. Any of these stops the server before it binds.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {file}: {source}")]
    Parse {
        file: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("city list is empty")]
    NoCities,

    #[error(transparent)]
    Calibration(#[from] GeoError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
