//! The tile catalog: every tile type a grid may use, plus the connections
//! between each pair of them.

use crate::direction::{Direction, Topology};
use crate::types::{AssetHandle, CatalogError, Connection, TileDefinition, TileId};
use log::{debug, warn};
use std::collections::HashMap;

/// Key of a connection: the pair with the smaller id first.
fn pair_key(a: TileId, b: TileId) -> (TileId, TileId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Ordered set of tile definitions for one grid topology, with one
/// [`Connection`] per unordered pair.
///
/// Pairs nobody connected are treated as "never adjacent".
#[derive(Debug, Clone, Default)]
pub struct TileCatalog {
    topology: Topology,
    tiles: Vec<TileDefinition>,
    names: HashMap<String, TileId>,
    connections: HashMap<(TileId, TileId), Connection>,
}

impl TileCatalog {
    /// Creates an empty catalog for grids of `topology`.
    pub fn new(topology: Topology) -> Self {
        Self {
            topology,
            ..Self::default()
        }
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Adds a tile and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::DuplicateName` if a tile with the same name exists,
    /// or `CatalogError::NonPositiveWeight` if the weight is 0.
    pub fn add_tile(&mut self, tile: TileDefinition) -> Result<TileId, CatalogError> {
        if self.names.contains_key(&tile.name) {
            return Err(CatalogError::DuplicateName(tile.name));
        }
        if tile.weight == 0 {
            return Err(CatalogError::NonPositiveWeight(tile.name));
        }
        if tile.topology != self.topology {
            warn!(
                "Tile '{}' is a {} tile but the catalog is {}; it will never be offered to a grid.",
                tile.name, tile.topology, self.topology
            );
        }
        let id = TileId(self.tiles.len());
        self.names.insert(tile.name.clone(), id);
        self.tiles.push(tile);
        Ok(id)
    }

    pub fn tile(&self, id: TileId) -> Option<&TileDefinition> {
        self.tiles.get(id.0)
    }

    pub fn tiles(&self) -> &[TileDefinition] {
        &self.tiles
    }

    /// Looks a tile up by name.
    pub fn tile_id(&self, name: &str) -> Option<TileId> {
        self.names.get(name).copied()
    }

    fn tile_mut(&mut self, id: TileId) -> Result<&mut TileDefinition, CatalogError> {
        self.tiles
            .get_mut(id.0)
            .ok_or_else(|| CatalogError::UnknownTile(id.to_string()))
    }

    /// # Errors
    ///
    /// Returns `CatalogError::UnknownTile` if `id` is not in the catalog.
    pub fn set_enabled(&mut self, id: TileId, enabled: bool) -> Result<(), CatalogError> {
        self.tile_mut(id)?.enabled = enabled;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CatalogError::UnknownTile` for a foreign id and
    /// `CatalogError::NonPositiveWeight` for a weight of 0.
    pub fn set_weight(&mut self, id: TileId, weight: u32) -> Result<(), CatalogError> {
        let tile = self.tile_mut(id)?;
        if weight == 0 {
            return Err(CatalogError::NonPositiveWeight(tile.name.clone()));
        }
        tile.weight = weight;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `CatalogError::UnknownTile` if `id` is not in the catalog.
    pub fn set_asset(&mut self, id: TileId, asset: Option<AssetHandle>) -> Result<(), CatalogError> {
        self.tile_mut(id)?.asset = asset;
        Ok(())
    }

    /// The connection between `a` and `b`, if one was ever written.
    pub fn connection(&self, a: TileId, b: TileId) -> Option<&Connection> {
        self.connections.get(&pair_key(a, b))
    }

    /// Every connection that involves `tile`.
    pub fn connections_of(&self, tile: TileId) -> impl Iterator<Item = &Connection> + '_ {
        self.connections
            .values()
            .filter(move |connection| connection.contains(tile))
    }

    /// Sets whether `to` may sit in `direction` of `from`.
    ///
    /// The reverse fact (`from` in the opposite direction of `to`) is the same
    /// flag and does not need to be written separately.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownTile` if either tile is not in the catalog.
    pub fn set_connection(
        &mut self,
        from: TileId,
        to: TileId,
        direction: Direction,
        allowed: bool,
    ) -> Result<(), CatalogError> {
        for id in [from, to] {
            if self.tile(id).is_none() {
                return Err(CatalogError::UnknownTile(id.to_string()));
            }
        }
        let key = pair_key(from, to);
        self.connections
            .entry(key)
            .or_insert_with(|| Connection::new(key.0, key.1))
            .set(from, direction, allowed)
    }

    /// Shorthand for [`Self::set_connection`] with `allowed = true`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownTile` if either tile is not in the catalog.
    pub fn connect(
        &mut self,
        from: TileId,
        to: TileId,
        direction: Direction,
    ) -> Result<(), CatalogError> {
        self.set_connection(from, to, direction, true)
    }

    /// Connects `from` and `to` along every direction of the catalog topology.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownTile` if either tile is not in the catalog.
    pub fn connect_all_sides(&mut self, from: TileId, to: TileId) -> Result<(), CatalogError> {
        for &direction in self.topology.valid_directions() {
            self.set_connection(from, to, direction, true)?;
        }
        Ok(())
    }

    /// Whether `to` may sit in `direction` of `from`.
    pub fn allows(&self, from: TileId, to: TileId, direction: Direction) -> bool {
        self.connection(from, to)
            .is_some_and(|connection| connection.allows(from, direction))
    }

    /// Tiles a grid of this catalog should actually use, in catalog order.
    ///
    /// A tile qualifies when it is enabled, authored for the catalog topology,
    /// and has at least one enabled direction towards some enabled tile.
    pub fn enabled_and_valid_tiles(&self) -> Vec<TileId> {
        let is_candidate = |id: TileId| {
            self.tile(id)
                .is_some_and(|tile| tile.enabled && tile.topology == self.topology)
        };
        let valid: Vec<TileId> = (0..self.tiles.len())
            .map(TileId)
            .filter(|&id| is_candidate(id))
            .filter(|&id| {
                self.connections_of(id).any(|connection| {
                    connection.any() && connection.other(id).is_some_and(is_candidate)
                })
            })
            .collect();
        debug!(
            "{} of {} tiles are enabled and valid for {}",
            valid.len(),
            self.tiles.len(),
            self.topology
        );
        valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_with(names: &[&str]) -> (TileCatalog, Vec<TileId>) {
        let mut catalog = TileCatalog::new(Topology::Square2d);
        let ids = names
            .iter()
            .map(|name| {
                catalog
                    .add_tile(TileDefinition::new(*name, Topology::Square2d))
                    .unwrap()
            })
            .collect();
        (catalog, ids)
    }

    #[test]
    fn test_add_tile_rejects_duplicates_and_zero_weight() {
        let (mut catalog, _) = catalog_with(&["grass"]);
        assert_eq!(
            catalog.add_tile(TileDefinition::new("grass", Topology::Square2d)),
            Err(CatalogError::DuplicateName("grass".to_string()))
        );
        assert_eq!(
            catalog.add_tile(TileDefinition::new("sand", Topology::Square2d).with_weight(0)),
            Err(CatalogError::NonPositiveWeight("sand".to_string()))
        );
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn test_connection_is_shared_by_both_orders() {
        let (mut catalog, ids) = catalog_with(&["a", "b"]);
        catalog.connect(ids[1], ids[0], Direction::Right).unwrap();

        assert!(catalog.allows(ids[1], ids[0], Direction::Right));
        assert!(catalog.allows(ids[0], ids[1], Direction::Left));
        assert!(!catalog.allows(ids[0], ids[1], Direction::Right));
        assert!(std::ptr::eq(
            catalog.connection(ids[0], ids[1]).unwrap(),
            catalog.connection(ids[1], ids[0]).unwrap()
        ));
    }

    #[test]
    fn test_unknown_tile_in_connection() {
        let (mut catalog, ids) = catalog_with(&["a"]);
        assert!(catalog.connect(ids[0], TileId(9), Direction::Up).is_err());
    }

    #[test]
    fn test_enabled_and_valid_filters() {
        let mut catalog = TileCatalog::new(Topology::Square2d);
        let a = catalog.add_tile(TileDefinition::new("a", Topology::Square2d)).unwrap();
        let lonely = catalog.add_tile(TileDefinition::new("lonely", Topology::Square2d)).unwrap();
        let off = catalog
            .add_tile(TileDefinition::new("off", Topology::Square2d).disabled())
            .unwrap();
        let hex = catalog.add_tile(TileDefinition::new("hex", Topology::Hexagon2d)).unwrap();
        let b = catalog.add_tile(TileDefinition::new("b", Topology::Square2d)).unwrap();

        catalog.connect_all_sides(a, a).unwrap();
        catalog.connect(b, a, Direction::Up).unwrap();
        // Only connected to tiles that are themselves filtered out.
        catalog.connect(lonely, off, Direction::Up).unwrap();
        catalog.connect(lonely, hex, Direction::Up).unwrap();
        catalog.connect_all_sides(off, off).unwrap();
        catalog.connect_all_sides(hex, hex).unwrap();

        assert_eq!(catalog.enabled_and_valid_tiles(), vec![a, b]);

        catalog.set_enabled(off, true).unwrap();
        assert_eq!(catalog.enabled_and_valid_tiles(), vec![a, lonely, off, b]);
    }

    #[test]
    fn test_set_weight() {
        let (mut catalog, ids) = catalog_with(&["a"]);
        catalog.set_weight(ids[0], 7).unwrap();
        assert_eq!(catalog.tile(ids[0]).unwrap().weight, 7);
        assert!(catalog.set_weight(ids[0], 0).is_err());
        assert!(catalog.set_weight(TileId(4), 3).is_err());
    }

    #[test]
    fn test_set_asset() {
        let (mut catalog, ids) = catalog_with(&["a"]);
        catalog.set_asset(ids[0], Some(AssetHandle::new("a.prefab"))).unwrap();
        assert_eq!(
            catalog.tile(ids[0]).unwrap().asset,
            Some(AssetHandle::new("a.prefab"))
        );
        assert!(catalog.set_asset(TileId(2), None).is_err());
    }
}
