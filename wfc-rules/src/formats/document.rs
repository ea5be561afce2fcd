//! Serde shape shared by every text catalog format.

use crate::direction::{Direction, Topology};
use crate::types::{AssetHandle, TileDefinition};
use crate::{LoadError, TileCatalog};
use serde::{Deserialize, Serialize};

/// One tile entry. Its topology is always the document topology.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileEntry {
    /// The unique identifier name for the tile used in connection definitions.
    pub name: String,
    /// The weight associated with this tile, influencing its selection probability.
    #[serde(default = "default_weight")]
    pub weight: u32,
    #[serde(default)]
    pub asset: Option<AssetHandle>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

const fn default_weight() -> u32 {
    1
}

const fn default_enabled() -> bool {
    true
}

/// Top-level structure of a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDocument {
    pub topology: Topology,
    /// A list defining all available tiles.
    pub tiles: Vec<TileEntry>,
    /// Each tuple reads `(from, to, directions)`: `to` may sit in every listed
    /// direction of `from`.
    #[serde(default)]
    pub connections: Vec<(String, String, Vec<Direction>)>,
}

impl CatalogDocument {
    /// Validates the document and builds the catalog it describes.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::InvalidData` for an empty tile list, duplicate
    /// names, zero weights, or connections naming unknown tiles.
    pub fn into_catalog(self) -> Result<TileCatalog, LoadError> {
        if self.tiles.is_empty() {
            return Err(LoadError::InvalidData("No tiles defined.".to_owned()));
        }
        let mut catalog = TileCatalog::new(self.topology);
        for entry in self.tiles {
            catalog.add_tile(TileDefinition {
                name: entry.name,
                topology: self.topology,
                asset: entry.asset,
                weight: entry.weight,
                enabled: entry.enabled,
            })?;
        }

        let lookup = |name: &str| {
            catalog
                .tile_id(name)
                .ok_or_else(|| LoadError::InvalidData(format!("Unknown tile: {name}")))
        };
        let mut resolved = Vec::with_capacity(self.connections.len());
        for (from_name, to_name, directions) in &self.connections {
            resolved.push((lookup(from_name)?, lookup(to_name)?, directions));
        }

        let valid = self.topology.valid_directions();
        for (from, to, directions) in resolved {
            for &direction in directions {
                if !valid.contains(&direction) {
                    log::warn!(
                        "Direction {direction} is not used by {} grids; connection {from} -> {to} keeps it but no grid will read it.",
                        self.topology
                    );
                }
                catalog.connect(from, to, direction)?;
            }
        }
        Ok(catalog)
    }
}
