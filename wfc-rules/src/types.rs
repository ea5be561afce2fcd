use crate::direction::{Direction, Topology};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Represents a unique identifier for a tile.
///
/// Index of the tile inside its [`crate::TileCatalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileId(pub usize);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Opaque reference to whatever a renderer places for a tile (a prefab path,
/// a sprite name, a glyph).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct AssetHandle(pub String);

impl AssetHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Errors that can occur while building or editing a tile catalog.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Two tiles were given the same name.
    #[error("Duplicate tile name: {0}")]
    DuplicateName(String),
    /// A tile id or name does not belong to the catalog.
    #[error("Unknown tile: {0}")]
    UnknownTile(String),
    /// Weights must be > 0.
    #[error("Tile weights must be positive. Found weight 0 for tile {0}")]
    NonPositiveWeight(String),
}

/// One placeable tile type.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileDefinition {
    /// Unique name, used to refer to the tile from rule files.
    pub name: String,
    /// Cell shape this tile is authored for.
    pub topology: Topology,
    /// What the renderer should place for this tile.
    #[cfg_attr(feature = "serde", serde(default))]
    pub asset: Option<AssetHandle>,
    /// Relative selection weight. Higher weight means higher probability of being chosen.
    #[cfg_attr(feature = "serde", serde(default = "default_weight"))]
    pub weight: u32,
    /// Disabled tiles never reach a solver.
    #[cfg_attr(feature = "serde", serde(default = "default_enabled"))]
    pub enabled: bool,
}

#[cfg(feature = "serde")]
const fn default_weight() -> u32 {
    1
}

#[cfg(feature = "serde")]
const fn default_enabled() -> bool {
    true
}

impl TileDefinition {
    /// An enabled tile with weight 1 and no asset.
    pub fn new(name: impl Into<String>, topology: Topology) -> Self {
        Self {
            name: name.into(),
            topology,
            asset: None,
            weight: 1,
            enabled: true,
        }
    }

    #[must_use]
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    #[must_use]
    pub fn with_asset(mut self, asset: impl Into<String>) -> Self {
        self.asset = Some(AssetHandle::new(asset));
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Which tiles may touch each other, and along which sides, for one unordered
/// pair of tiles.
///
/// A flag at slot `d` means "seen from tile one, tile two may sit in direction
/// `d`". The same fact read from tile two is the flag at `d.opposite()`, so
/// every read names the tile it looks from and the record never has to be
/// flipped in place.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Connection {
    tiles: (TileId, TileId),
    flags: [bool; Direction::COUNT],
}

impl Connection {
    /// A connection with every direction disabled.
    pub fn new(tile_one: TileId, tile_two: TileId) -> Self {
        Self {
            tiles: (tile_one, tile_two),
            flags: [false; Direction::COUNT],
        }
    }

    /// The pair in stored orientation.
    pub fn tiles(&self) -> (TileId, TileId) {
        self.tiles
    }

    pub fn contains(&self, tile: TileId) -> bool {
        self.tiles.0 == tile || self.tiles.1 == tile
    }

    /// The tile on the other end of the pair, seen from `from`.
    pub fn other(&self, from: TileId) -> Option<TileId> {
        if self.tiles.0 == from {
            Some(self.tiles.1)
        } else if self.tiles.1 == from {
            Some(self.tiles.0)
        } else {
            None
        }
    }

    /// All flags as seen from `from`.
    ///
    /// Returns `None` if `from` is not part of the pair.
    pub fn flags_from(&self, from: TileId) -> Option<[bool; Direction::COUNT]> {
        if self.tiles.0 == from {
            Some(self.flags)
        } else if self.tiles.1 == from {
            Some(Self::flipped(&self.flags))
        } else {
            None
        }
    }

    /// Whether the other tile may sit in `direction` of `from`.
    pub fn allows(&self, from: TileId, direction: Direction) -> bool {
        let slot = if self.tiles.0 == from {
            direction
        } else if self.tiles.1 == from {
            direction.opposite()
        } else {
            return false;
        };
        self.flags[slot.index()]
    }

    /// Enables or disables `direction` as seen from `from`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::UnknownTile` if `from` is not part of the pair.
    pub fn set(
        &mut self,
        from: TileId,
        direction: Direction,
        allowed: bool,
    ) -> Result<(), CatalogError> {
        let slot = if self.tiles.0 == from {
            direction
        } else if self.tiles.1 == from {
            direction.opposite()
        } else {
            return Err(CatalogError::UnknownTile(from.to_string()));
        };
        self.flags[slot.index()] = allowed;
        // A self pair reads its flags from both ends.
        if self.tiles.0 == self.tiles.1 {
            self.flags[slot.opposite().index()] = allowed;
        }
        Ok(())
    }

    /// True if any direction is enabled.
    pub fn any(&self) -> bool {
        self.flags.iter().any(|&flag| flag)
    }

    /// A copy stored with `toward` as tile one. Every flag moves to the slot of
    /// its opposite direction when the order of the pair changes.
    ///
    /// Returns `None` if `toward` is not part of the pair.
    pub fn reoriented(&self, toward: TileId) -> Option<Self> {
        if self.tiles.0 == toward {
            return Some(self.clone());
        }
        if self.tiles.1 != toward {
            return None;
        }
        Some(Self {
            tiles: (self.tiles.1, self.tiles.0),
            flags: Self::flipped(&self.flags),
        })
    }

    fn flipped(flags: &[bool; Direction::COUNT]) -> [bool; Direction::COUNT] {
        let mut flipped = [false; Direction::COUNT];
        for direction in Direction::ALL {
            flipped[direction.opposite().index()] = flags[direction.index()];
        }
        flipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: TileId = TileId(0);
    const B: TileId = TileId(1);

    #[test]
    fn test_flags_read_from_both_ends() {
        let mut connection = Connection::new(A, B);
        connection.set(A, Direction::Right, true).unwrap();

        assert!(connection.allows(A, Direction::Right));
        assert!(!connection.allows(A, Direction::Left));
        assert!(connection.allows(B, Direction::Left));
        assert!(!connection.allows(B, Direction::Right));
    }

    #[test]
    fn test_set_from_second_tile() {
        let mut connection = Connection::new(A, B);
        connection.set(B, Direction::Above, true).unwrap();
        assert!(connection.allows(A, Direction::Below));
        assert!(connection.flags_from(B).unwrap()[Direction::Above.index()]);
    }

    #[test]
    fn test_set_rejects_foreign_tile() {
        let mut connection = Connection::new(A, B);
        assert!(connection.set(TileId(7), Direction::Up, true).is_err());
        assert!(!connection.any());
    }

    #[test]
    fn test_self_pair_is_symmetric() {
        let mut connection = Connection::new(A, A);
        connection.set(A, Direction::Up, true).unwrap();
        assert!(connection.allows(A, Direction::Up));
        assert!(connection.allows(A, Direction::Down));
    }

    #[test]
    fn test_reoriented_swaps_pair_and_flags() {
        let mut connection = Connection::new(A, B);
        connection.set(A, Direction::HexRightUp, true).unwrap();

        let flipped = connection.reoriented(B).unwrap();
        assert_eq!(flipped.tiles(), (B, A));
        assert!(flipped.flags_from(B).unwrap()[Direction::HexLeftDown.index()]);
        // Reading through either orientation agrees.
        for direction in Direction::ALL {
            assert_eq!(
                connection.allows(B, direction),
                flipped.allows(B, direction)
            );
        }
        assert!(connection.reoriented(TileId(3)).is_none());
    }

    #[test]
    fn test_other() {
        let connection = Connection::new(A, B);
        assert_eq!(connection.other(A), Some(B));
        assert_eq!(connection.other(B), Some(A));
        assert_eq!(connection.other(TileId(5)), None);
    }
}
