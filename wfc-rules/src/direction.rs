//! Adjacency directions and the grid topologies that select them.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One side of a tile.
///
/// The declaration order is significant: `index()` is used as the slot of a
/// direction inside every [`crate::Connection`] flag array, so new directions
/// may only ever be appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    Right,
    Left,
    Up,
    Down,
    HexRightUp,
    HexLeftUp,
    HexRightDown,
    HexLeftDown,
    Above,
    Below,
    DiagonalRightUp,
    DiagonalLeftUp,
    DiagonalRightDown,
    DiagonalLeftDown,
}

impl Direction {
    /// Number of directions in the catalog.
    pub const COUNT: usize = 14;

    /// Every direction, in slot order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Right,
        Self::Left,
        Self::Up,
        Self::Down,
        Self::HexRightUp,
        Self::HexLeftUp,
        Self::HexRightDown,
        Self::HexLeftDown,
        Self::Above,
        Self::Below,
        Self::DiagonalRightUp,
        Self::DiagonalLeftUp,
        Self::DiagonalRightDown,
        Self::DiagonalLeftDown,
    ];

    /// Slot of this direction in connection flag arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Direction stored in `index`, if any.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// The direction pointing back. Always an involution.
    pub const fn opposite(self) -> Self {
        match self {
            Self::Right => Self::Left,
            Self::Left => Self::Right,
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::HexRightUp => Self::HexLeftDown,
            Self::HexLeftDown => Self::HexRightUp,
            Self::HexLeftUp => Self::HexRightDown,
            Self::HexRightDown => Self::HexLeftUp,
            Self::Above => Self::Below,
            Self::Below => Self::Above,
            Self::DiagonalRightUp => Self::DiagonalLeftDown,
            Self::DiagonalLeftDown => Self::DiagonalRightUp,
            Self::DiagonalLeftUp => Self::DiagonalRightDown,
            Self::DiagonalRightDown => Self::DiagonalLeftUp,
        }
    }

    /// Snake-case name used in rule files and logs.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Right => "right",
            Self::Left => "left",
            Self::Up => "up",
            Self::Down => "down",
            Self::HexRightUp => "hex_right_up",
            Self::HexLeftUp => "hex_left_up",
            Self::HexRightDown => "hex_right_down",
            Self::HexLeftDown => "hex_left_down",
            Self::Above => "above",
            Self::Below => "below",
            Self::DiagonalRightUp => "diagonal_right_up",
            Self::DiagonalLeftUp => "diagonal_left_up",
            Self::DiagonalRightDown => "diagonal_right_down",
            Self::DiagonalLeftDown => "diagonal_left_down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|direction| direction.name() == s)
            .ok_or_else(|| format!("Invalid direction name: {s}"))
    }
}

/// Integer step from a grid position to its neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Offset {
    pub dx: i32,
    pub dy: i32,
    pub dz: i32,
}

impl Offset {
    pub const fn new(dx: i32, dy: i32, dz: i32) -> Self {
        Self { dx, dy, dz }
    }
}

/// Shape of the cells of a grid. Selects which directions exist and how far
/// each one steps.
///
/// Coordinates are `(x, y, z)` with X right/left, Y above/below and Z
/// forward/backward, so the 2D topologies live in the X/Z plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Topology {
    #[default]
    Square2d,
    Square3d,
    Hexagon2d,
    Hexagon3d,
}

impl Topology {
    /// Directions a tile of this topology has, sorted by slot.
    pub fn valid_directions(self) -> &'static [Direction] {
        use Direction::{
            Above, Below, Down, HexLeftDown, HexLeftUp, HexRightDown, HexRightUp, Left, Right, Up,
        };
        match self {
            Self::Square2d => &[Right, Left, Up, Down],
            Self::Square3d => &[Right, Left, Up, Down, Above, Below],
            Self::Hexagon2d => &[Up, Down, HexRightUp, HexLeftUp, HexRightDown, HexLeftDown],
            Self::Hexagon3d => &[
                Up,
                Down,
                HexRightUp,
                HexLeftUp,
                HexRightDown,
                HexLeftDown,
                Above,
                Below,
            ],
        }
    }

    /// Unit step of every direction from [`Self::valid_directions`], same order.
    ///
    /// Hexagonal grids step two rows for up/down so the diagonal neighbours
    /// can occupy the rows in between.
    pub fn unit_offsets(self) -> &'static [Offset] {
        const R: Offset = Offset::new(1, 0, 0);
        const L: Offset = Offset::new(-1, 0, 0);
        const F: Offset = Offset::new(0, 0, 1);
        const B: Offset = Offset::new(0, 0, -1);
        const ABOVE: Offset = Offset::new(0, 1, 0);
        const BELOW: Offset = Offset::new(0, -1, 0);
        const HEX_UP: Offset = Offset::new(0, 0, 2);
        const HEX_DOWN: Offset = Offset::new(0, 0, -2);
        const HEX_RU: Offset = Offset::new(1, 0, 1);
        const HEX_LU: Offset = Offset::new(-1, 0, 1);
        const HEX_RD: Offset = Offset::new(1, 0, -1);
        const HEX_LD: Offset = Offset::new(-1, 0, -1);
        match self {
            Self::Square2d => &[R, L, F, B],
            Self::Square3d => &[R, L, F, B, ABOVE, BELOW],
            Self::Hexagon2d => &[HEX_UP, HEX_DOWN, HEX_RU, HEX_LU, HEX_RD, HEX_LD],
            Self::Hexagon3d => &[HEX_UP, HEX_DOWN, HEX_RU, HEX_LU, HEX_RD, HEX_LD, ABOVE, BELOW],
        }
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Square2d => "square2d",
            Self::Square3d => "square3d",
            Self::Hexagon2d => "hexagon2d",
            Self::Hexagon3d => "hexagon3d",
        };
        f.write_str(name)
    }
}

impl FromStr for Topology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "square2d" => Ok(Self::Square2d),
            "square3d" => Ok(Self::Square3d),
            "hexagon2d" | "hex2d" => Ok(Self::Hexagon2d),
            "hexagon3d" | "hex3d" => Ok(Self::Hexagon3d),
            _ => Err(format!("Unknown topology: {s}")),
        }
    }
}

/// The directions of one grid, renumbered `0..len()`.
///
/// Solvers index their tables by these compact indices instead of
/// [`Direction::index`]. For each entry the layout also stores where its
/// opposite lives and the step to the neighbour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectionLayout {
    directions: Vec<Direction>,
    opposites: Vec<usize>,
    offsets: Vec<Offset>,
}

impl DirectionLayout {
    /// Builds the layout for `topology`.
    pub fn for_topology(topology: Topology) -> Self {
        let directions = topology.valid_directions().to_vec();
        let offsets = topology.unit_offsets().to_vec();
        let opposites = directions
            .iter()
            .enumerate()
            .map(|(index, direction)| {
                let opposite = direction.opposite();
                directions
                    .iter()
                    .position(|candidate| *candidate == opposite)
                    .unwrap_or_else(|| {
                        log::error!(
                            "Direction {direction} has no opposite in topology {topology}; pointing it at itself"
                        );
                        index
                    })
            })
            .collect();
        Self {
            directions,
            opposites,
            offsets,
        }
    }

    /// Number of directions in the layout.
    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }

    /// Catalog direction behind compact index `index`.
    pub fn direction(&self, index: usize) -> Direction {
        self.directions[index]
    }

    /// Compact index of the opposite of compact direction `index`.
    pub fn opposite(&self, index: usize) -> usize {
        self.opposites[index]
    }

    /// Step taken by compact direction `index`.
    pub fn offset(&self, index: usize) -> Offset {
        self.offsets[index]
    }

    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    pub fn offsets(&self) -> &[Offset] {
        &self.offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOPOLOGIES: [Topology; 4] = [
        Topology::Square2d,
        Topology::Square3d,
        Topology::Hexagon2d,
        Topology::Hexagon3d,
    ];

    #[test]
    fn test_opposite_is_involution() {
        for direction in Direction::ALL {
            assert_ne!(direction, direction.opposite());
            assert_eq!(direction, direction.opposite().opposite());
        }
    }

    #[test]
    fn test_index_matches_declaration_order() {
        for (slot, direction) in Direction::ALL.iter().enumerate() {
            assert_eq!(direction.index(), slot);
            assert_eq!(Direction::from_index(slot), Some(*direction));
        }
        assert_eq!(Direction::from_index(Direction::COUNT), None);
    }

    #[test]
    fn test_direction_names_round_trip() {
        for direction in Direction::ALL {
            assert_eq!(direction.name().parse::<Direction>(), Ok(direction));
        }
        assert!("sideways".parse::<Direction>().is_err());
    }

    #[test]
    fn test_offsets_align_with_directions() {
        for topology in TOPOLOGIES {
            assert_eq!(
                topology.valid_directions().len(),
                topology.unit_offsets().len(),
                "{topology} tables differ in length"
            );
        }
    }

    #[test]
    fn test_layout_opposites_cancel_offsets() {
        for topology in TOPOLOGIES {
            let layout = DirectionLayout::for_topology(topology);
            assert!(!layout.is_empty());
            for index in 0..layout.len() {
                let opposite = layout.opposite(index);
                assert_eq!(layout.direction(opposite), layout.direction(index).opposite());
                let a = layout.offset(index);
                let b = layout.offset(opposite);
                assert_eq!((a.dx + b.dx, a.dy + b.dy, a.dz + b.dz), (0, 0, 0));
            }
        }
    }

    #[test]
    fn test_hex_up_skips_a_row() {
        let layout = DirectionLayout::for_topology(Topology::Hexagon2d);
        let up = layout
            .directions()
            .iter()
            .position(|d| *d == Direction::Up)
            .unwrap();
        assert_eq!(layout.offset(up), Offset::new(0, 0, 2));
    }

    #[test]
    fn test_topology_parse() {
        assert_eq!("Hexagon3d".parse::<Topology>(), Ok(Topology::Hexagon3d));
        assert_eq!("square2d".parse::<Topology>(), Ok(Topology::Square2d));
        assert!("triangle".parse::<Topology>().is_err());
    }
}
