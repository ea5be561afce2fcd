//! Tile catalogs for the quantum grid solver: directions, tile definitions,
//! pairwise connections and the file formats they are loaded from.

use thiserror::Error;

pub mod catalog;
pub mod direction;
pub mod formats;
pub mod loader;
pub mod types;

pub use catalog::TileCatalog;
pub use direction::{Direction, DirectionLayout, Offset, Topology};
pub use types::{AssetHandle, CatalogError, Connection, TileDefinition, TileId};

/// Errors that can occur while loading a tile catalog from a file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error reading file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse catalog format (e.g., RON/JSON): {0}")]
    ParseError(String),
    #[error("Invalid catalog data: {0}")]
    InvalidData(String),
    #[error("Unsupported catalog file extension: {0}")]
    UnsupportedFormat(String),
    #[error("Feature not enabled: {0}")]
    FeatureNotEnabled(String),
}

impl From<CatalogError> for LoadError {
    fn from(error: CatalogError) -> Self {
        Self::InvalidData(error.to_string())
    }
}
