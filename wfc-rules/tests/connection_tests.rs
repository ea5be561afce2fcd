// wfc-rules/tests/connection_tests.rs

use proptest::prelude::*;
use wfc_rules::{Direction, TileCatalog, TileDefinition, TileId, Topology};

fn catalog_of(size: usize) -> TileCatalog {
    let mut catalog = TileCatalog::new(Topology::Hexagon3d);
    for index in 0..size {
        catalog
            .add_tile(TileDefinition::new(format!("t{index}"), Topology::Hexagon3d))
            .unwrap();
    }
    catalog
}

fn direction_strategy() -> impl Strategy<Value = Direction> {
    (0..Direction::COUNT).prop_map(|index| Direction::from_index(index).unwrap())
}

proptest! {
    /// Whatever is written, reading a pair from the other end through the
    /// opposite direction gives the same answer.
    #[test]
    fn prop_reverse_read_agrees(
        writes in prop::collection::vec(
            (0usize..4, 0usize..4, direction_strategy(), any::<bool>()),
            0..40,
        )
    ) {
        let mut catalog = catalog_of(4);
        for (from, to, direction, allowed) in writes {
            catalog
                .set_connection(TileId(from), TileId(to), direction, allowed)
                .unwrap();
        }
        for from in 0..4 {
            for to in 0..4 {
                for direction in Direction::ALL {
                    prop_assert_eq!(
                        catalog.allows(TileId(from), TileId(to), direction),
                        catalog.allows(TileId(to), TileId(from), direction.opposite())
                    );
                }
            }
        }
    }

    /// The last write to a fact wins, whichever end it was written from.
    #[test]
    fn prop_last_write_wins(
        from in 0usize..3,
        to in 0usize..3,
        direction in direction_strategy(),
        first in any::<bool>(),
        second in any::<bool>(),
        reversed in any::<bool>(),
    ) {
        let mut catalog = catalog_of(3);
        let (from, to) = (TileId(from), TileId(to));
        catalog.set_connection(from, to, direction, first).unwrap();
        if reversed {
            catalog.set_connection(to, from, direction.opposite(), second).unwrap();
        } else {
            catalog.set_connection(from, to, direction, second).unwrap();
        }
        prop_assert_eq!(catalog.allows(from, to, direction), second);
    }
}
