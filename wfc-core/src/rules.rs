use crate::{StateId, WfcError, MAX_STATES};
use log::debug;
use wfc_rules::{Direction, DirectionLayout, TileCatalog, TileId};

/// Compatible neighbour states of every state in every direction of a grid.
///
/// `compatible(s, d)` lists, sorted, the states that may sit in compact
/// direction `d` of state `s`. Built once per run and read-only afterwards; a
/// catalog edit requires building a new table and a new grid.
#[derive(Debug, Clone)]
pub struct AdjacencyTable {
    layout: DirectionLayout,
    state_count: usize,
    /// Indexing: `state * layout.len() + direction`.
    dependencies: Vec<Vec<StateId>>,
}

impl AdjacencyTable {
    /// Builds the table for `tiles` (state `i` is `tiles[i]`) over the
    /// directions of `layout`.
    ///
    /// # Errors
    ///
    /// * `WfcError::EmptyCatalog` if `tiles` is empty.
    /// * `WfcError::TooManyTiles` if there are no ids left for "no tile".
    /// * `WfcError::Configuration` if the layout has no directions.
    pub fn build(
        catalog: &TileCatalog,
        tiles: &[TileId],
        layout: DirectionLayout,
    ) -> Result<Self, WfcError> {
        if tiles.is_empty() {
            return Err(WfcError::EmptyCatalog);
        }
        if tiles.len() >= MAX_STATES {
            return Err(WfcError::TooManyTiles(tiles.len()));
        }
        if layout.is_empty() {
            return Err(WfcError::Configuration(format!(
                "topology {} has no directions",
                catalog.topology()
            )));
        }

        let directions = layout.len();
        let mut dependencies = vec![Vec::new(); tiles.len() * directions];
        for (from_state, &from_tile) in tiles.iter().enumerate() {
            for (to_state, &to_tile) in tiles.iter().enumerate() {
                let Some(flags) = catalog
                    .connection(from_tile, to_tile)
                    .and_then(|connection| connection.reoriented(from_tile))
                    .and_then(|connection| connection.flags_from(from_tile))
                else {
                    continue;
                };
                for (slot, direction) in layout.directions().iter().enumerate() {
                    if flags[direction.index()] {
                        // to_state < tiles.len() < MAX_STATES, so it fits.
                        dependencies[from_state * directions + slot].push(to_state as StateId);
                    }
                }
            }
        }

        debug!(
            "Built adjacency table: {} states x {} directions, {} allowed pairs",
            tiles.len(),
            directions,
            dependencies.iter().map(Vec::len).sum::<usize>()
        );
        Ok(Self {
            layout,
            state_count: tiles.len(),
            dependencies,
        })
    }

    pub fn layout(&self) -> &DirectionLayout {
        &self.layout
    }

    pub fn state_count(&self) -> usize {
        self.state_count
    }

    /// Number of directions in the layout.
    pub fn direction_count(&self) -> usize {
        self.layout.len()
    }

    /// Sorted states allowed in compact direction `direction` of `state`.
    #[inline]
    pub fn compatible(&self, state: StateId, direction: usize) -> &[StateId] {
        self.dependencies
            .get(usize::from(state) * self.layout.len() + direction)
            .map_or(&[], Vec::as_slice)
    }

    /// Whether `neighbor` may sit in compact direction `direction` of `state`.
    pub fn allows(&self, state: StateId, neighbor: StateId, direction: usize) -> bool {
        self.compatible(state, direction)
            .binary_search(&neighbor)
            .is_ok()
    }

    /// Compact index of `direction` in this table, if the topology has it.
    pub fn slot_of(&self, direction: Direction) -> Option<usize> {
        self.layout
            .directions()
            .iter()
            .position(|candidate| *candidate == direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wfc_rules::{TileDefinition, Topology};

    fn two_tiles() -> (TileCatalog, Vec<TileId>) {
        let mut catalog = TileCatalog::new(Topology::Square3d);
        let a = catalog
            .add_tile(TileDefinition::new("a", Topology::Square3d))
            .unwrap();
        let b = catalog
            .add_tile(TileDefinition::new("b", Topology::Square3d))
            .unwrap();
        (catalog, vec![a, b])
    }

    #[test]
    fn test_build_reads_both_orientations() {
        let (mut catalog, tiles) = two_tiles();
        // Stored with b as tile one.
        catalog.connect(tiles[1], tiles[0], Direction::Above).unwrap();
        let table = AdjacencyTable::build(
            &catalog,
            &tiles,
            DirectionLayout::for_topology(Topology::Square3d),
        )
        .unwrap();

        let above = table.slot_of(Direction::Above).unwrap();
        let below = table.slot_of(Direction::Below).unwrap();
        assert_eq!(table.compatible(1, above), &[0]);
        assert_eq!(table.compatible(0, below), &[1]);
        assert!(table.compatible(0, above).is_empty());
        assert!(table.allows(0, 1, below));
        assert!(!table.allows(1, 0, below));
    }

    #[test]
    fn test_dependencies_are_sorted() {
        let (mut catalog, tiles) = two_tiles();
        for &to in tiles.iter().rev() {
            catalog.connect(tiles[0], to, Direction::Right).unwrap();
        }
        let table = AdjacencyTable::build(
            &catalog,
            &tiles,
            DirectionLayout::for_topology(Topology::Square3d),
        )
        .unwrap();
        let right = table.slot_of(Direction::Right).unwrap();
        assert_eq!(table.compatible(0, right), &[0, 1]);
    }

    #[test]
    fn test_build_rejects_empty_tile_list() {
        let (catalog, _) = two_tiles();
        assert!(matches!(
            AdjacencyTable::build(
                &catalog,
                &[],
                DirectionLayout::for_topology(Topology::Square3d)
            ),
            Err(WfcError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_missing_topology_direction() {
        let (catalog, tiles) = two_tiles();
        let table = AdjacencyTable::build(
            &catalog,
            &tiles,
            DirectionLayout::for_topology(Topology::Square2d),
        )
        .unwrap();
        assert_eq!(table.direction_count(), 4);
        assert_eq!(table.slot_of(Direction::Above), None);
    }
}
