use crate::rules::AdjacencyTable;
use crate::{StateId, WfcError};
use bitvec::prelude::*;
use std::fmt;
use wfc_rules::Offset;

/// A position in a 3D grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct GridPos {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

impl GridPos {
    pub const fn new(x: usize, y: usize, z: usize) -> Self {
        Self { x, y, z }
    }
}

impl From<(usize, usize, usize)> for GridPos {
    fn from((x, y, z): (usize, usize, usize)) -> Self {
        Self { x, y, z }
    }
}

impl fmt::Display for GridPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Dense cuboid of values stored in one flat buffer, indexed
/// `x + y * width + z * width * height`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid<T> {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub(crate) data: Vec<T>,
}

impl<T: Clone + Default> Grid<T> {
    /// Creates a new grid with the given dimensions, initialized with default values.
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self::filled(width, height, depth, T::default())
    }
}

impl<T: Clone> Grid<T> {
    /// Creates a grid with every cell set to `value`.
    pub fn filled(width: usize, height: usize, depth: usize, value: T) -> Self {
        Self {
            width,
            height,
            depth,
            data: vec![value; width * height * depth],
        }
    }
}

impl<T> Grid<T> {
    /// Wraps an existing buffer. Returns `None` if its length does not match
    /// the dimensions.
    pub fn from_vec(width: usize, height: usize, depth: usize, data: Vec<T>) -> Option<Self> {
        (data.len() == width * height * depth).then_some(Self {
            width,
            height,
            depth,
            data,
        })
    }

    /// Total number of cells.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `(width, height, depth)`.
    pub fn dimensions(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }

    /// Returns an immutable reference to the element at the given coordinates,
    /// or None if the coordinates are out of bounds.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<&T> {
        self.index(x, y, z).and_then(|idx| self.data.get(idx))
    }

    /// Returns a mutable reference to the element at the given coordinates,
    /// or None if the coordinates are out of bounds.
    pub fn get_mut(&mut self, x: usize, y: usize, z: usize) -> Option<&mut T> {
        self.index(x, y, z)
            .and_then(move |idx| self.data.get_mut(idx))
    }

    pub fn get_at(&self, pos: GridPos) -> Option<&T> {
        self.get(pos.x, pos.y, pos.z)
    }

    /// Flat index of `pos`, or None if it lies outside the grid.
    pub fn index_of(&self, pos: GridPos) -> Option<usize> {
        self.index(pos.x, pos.y, pos.z)
    }

    /// Inverse of [`Self::index_of`] for an in-range index.
    pub fn position_of(&self, index: usize) -> GridPos {
        let layer = self.width * self.height;
        let z = index / layer;
        let rest = index % layer;
        GridPos::new(rest % self.width, rest / self.width, z)
    }

    /// Flat index of the cell one `offset` away from `index`, if it exists.
    pub fn neighbor(&self, index: usize, offset: Offset) -> Option<usize> {
        let pos = self.position_of(index);
        let step = |value: usize, delta: i32, limit: usize| {
            let moved = value.checked_add_signed(isize::try_from(delta).ok()?)?;
            (moved < limit).then_some(moved)
        };
        let x = step(pos.x, offset.dx, self.width)?;
        let y = step(pos.y, offset.dy, self.height)?;
        let z = step(pos.z, offset.dz, self.depth)?;
        self.index(x, y, z)
    }

    /// Every position in index order.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        (0..self.data.len()).map(|index| self.position_of(index))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Calculates the 1D index for the given 3D coordinates.
    /// Returns None if the coordinates are out of bounds.
    fn index(&self, x: usize, y: usize, z: usize) -> Option<usize> {
        if x < self.width && y < self.height && z < self.depth {
            Some(z * self.width * self.height + y * self.width + x)
        } else {
            None
        }
    }
}

/// Which positions of a grid take part in solving. Cells outside the mask are
/// never read or written and count as out of bounds for their neighbours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnabledMask {
    width: usize,
    height: usize,
    depth: usize,
    bits: BitVec,
}

impl EnabledMask {
    /// A mask with every position enabled.
    pub fn filled(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
            bits: bitvec![1; width * height * depth],
        }
    }

    /// Builds a mask from `f(position)`.
    pub fn from_fn(
        width: usize,
        height: usize,
        depth: usize,
        mut f: impl FnMut(GridPos) -> bool,
    ) -> Self {
        let shape: Grid<()> = Grid::filled(width, height, depth, ());
        let bits = shape.positions().map(&mut f).collect();
        Self {
            width,
            height,
            depth,
            bits,
        }
    }

    /// Builds a mask from nested rows indexed `[z][y][x]`.
    ///
    /// # Errors
    ///
    /// * `WfcError::EmptyMask` if any dimension is zero.
    /// * `WfcError::MalformedMask` if the rows are ragged.
    pub fn from_nested(layers: &[Vec<Vec<bool>>]) -> Result<Self, WfcError> {
        let depth = layers.len();
        let height = layers.first().map_or(0, Vec::len);
        let width = layers
            .first()
            .and_then(|layer| layer.first())
            .map_or(0, Vec::len);
        if depth == 0 || height == 0 || width == 0 {
            return Err(WfcError::EmptyMask);
        }

        let mut bits = BitVec::with_capacity(width * height * depth);
        for (z, layer) in layers.iter().enumerate() {
            if layer.len() != height {
                return Err(WfcError::MalformedMask(format!(
                    "layer {z} has {} rows, expected {height}",
                    layer.len()
                )));
            }
            for (y, row) in layer.iter().enumerate() {
                if row.len() != width {
                    return Err(WfcError::MalformedMask(format!(
                        "row {y} of layer {z} has {} cells, expected {width}",
                        row.len()
                    )));
                }
                bits.extend(row.iter().copied());
            }
        }
        Ok(Self {
            width,
            height,
            depth,
            bits,
        })
    }

    pub fn dimensions(&self) -> (usize, usize, usize) {
        (self.width, self.height, self.depth)
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Whether `pos` is inside the grid and enabled.
    pub fn is_enabled(&self, pos: GridPos) -> bool {
        pos.x < self.width
            && pos.y < self.height
            && pos.z < self.depth
            && self.bits[pos.z * self.width * self.height + pos.y * self.width + pos.x]
    }

    /// Enables or disables `pos`. Out-of-range positions are ignored.
    pub fn set(&mut self, pos: GridPos, enabled: bool) {
        if pos.x < self.width && pos.y < self.height && pos.z < self.depth {
            let index = pos.z * self.width * self.height + pos.y * self.width + pos.x;
            self.bits.set(index, enabled);
        }
    }

    pub fn enabled_count(&self) -> usize {
        self.bits.count_ones()
    }

    pub(crate) fn bits(&self) -> &BitSlice {
        &self.bits
    }
}

/// Remaining candidate states of every cell, plus the count of enabled cells
/// not yet collapsed.
///
/// Cells outside the mask hold an empty list and are never touched.
#[derive(Debug, Clone)]
pub struct PossibilityGrid {
    cells: Grid<Vec<StateId>>,
    enabled: BitVec,
    remaining: usize,
}

impl PossibilityGrid {
    /// Every enabled cell starts with all `state_count` states.
    pub fn new(mask: &EnabledMask, state_count: usize) -> Self {
        let (width, height, depth) = mask.dimensions();
        let all: Vec<StateId> = (0..state_count)
            .filter_map(|state| StateId::try_from(state).ok())
            .collect();
        let data = mask
            .bits()
            .iter()
            .map(|enabled| if *enabled { all.clone() } else { Vec::new() })
            .collect();
        let remaining = if all.len() > 1 {
            mask.enabled_count()
        } else {
            0
        };
        Self {
            cells: Grid {
                width,
                height,
                depth,
                data,
            },
            enabled: mask.bits().to_bitvec(),
            remaining,
        }
    }

    pub fn dimensions(&self) -> (usize, usize, usize) {
        self.cells.dimensions()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Enabled cells with more than one candidate left.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub(crate) fn set_remaining(&mut self, remaining: usize) {
        debug_assert_eq!(
            remaining, self.remaining,
            "restored counter disagrees with the cells"
        );
        self.remaining = remaining;
    }

    pub fn is_enabled(&self, index: usize) -> bool {
        self.enabled.get(index).is_some_and(|bit| *bit)
    }

    pub fn index_of(&self, pos: GridPos) -> Option<usize> {
        self.cells.index_of(pos)
    }

    pub fn position_of(&self, index: usize) -> GridPos {
        self.cells.position_of(index)
    }

    /// Candidate states of the cell at `index`, sorted ascending.
    pub fn states(&self, index: usize) -> &[StateId] {
        &self.cells.data[index]
    }

    /// Candidates at `pos`, or None outside the mask.
    pub fn states_at(&self, pos: GridPos) -> Option<&[StateId]> {
        let index = self.index_of(pos)?;
        self.is_enabled(index).then(|| self.states(index))
    }

    /// Swaps in a new candidate list and returns the old one, keeping the
    /// uncollapsed counter in step.
    pub(crate) fn replace_states(&mut self, index: usize, states: Vec<StateId>) -> Vec<StateId> {
        let was_open = self.cells.data[index].len() > 1;
        let is_open = states.len() > 1;
        let old = std::mem::replace(&mut self.cells.data[index], states);
        match (was_open, is_open) {
            (true, false) => self.remaining -= 1,
            (false, true) => self.remaining += 1,
            _ => {}
        }
        old
    }

    /// Flat indices of all enabled cells, ascending.
    pub fn enabled_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.enabled.iter_ones()
    }

    /// Enabled neighbours of `index`, one per direction of the table layout
    /// that lands inside the grid.
    pub fn enabled_neighbors<'a>(
        &'a self,
        index: usize,
        table: &'a AdjacencyTable,
    ) -> impl Iterator<Item = (usize, usize)> + 'a {
        table
            .layout()
            .offsets()
            .iter()
            .enumerate()
            .filter_map(move |(direction, offset)| {
                self.cells
                    .neighbor(index, *offset)
                    .filter(|neighbor| self.is_enabled(*neighbor))
                    .map(|neighbor| (direction, neighbor))
            })
    }

    /// One state per cell: the single candidate of a collapsed cell, `empty`
    /// anywhere else.
    pub fn collapsed_states(&self, empty: StateId) -> Grid<StateId> {
        let data = self
            .cells
            .data
            .iter()
            .enumerate()
            .map(|(index, states)| match states.as_slice() {
                [state] if self.is_enabled(index) => *state,
                _ => empty,
            })
            .collect();
        Grid {
            width: self.cells.width,
            height: self.cells.height,
            depth: self.cells.depth,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        let grid: Grid<u8> = Grid::new(3, 4, 5);
        for index in 0..grid.len() {
            let pos = grid.position_of(index);
            assert_eq!(grid.index_of(pos), Some(index));
        }
        assert_eq!(grid.index_of(GridPos::new(3, 0, 0)), None);
    }

    #[test]
    fn test_neighbor_bounds() {
        let grid: Grid<u8> = Grid::new(2, 2, 3);
        let origin = grid.index_of(GridPos::new(0, 0, 0)).unwrap();
        assert_eq!(grid.neighbor(origin, Offset::new(-1, 0, 0)), None);
        assert_eq!(
            grid.neighbor(origin, Offset::new(1, 1, 2)),
            grid.index_of(GridPos::new(1, 1, 2))
        );
        assert_eq!(grid.neighbor(origin, Offset::new(0, 0, 3)), None);
    }

    #[test]
    fn test_mask_from_nested_ragged() {
        let ragged = vec![vec![vec![true, true], vec![true]]];
        assert!(matches!(
            EnabledMask::from_nested(&ragged),
            Err(WfcError::MalformedMask(_))
        ));
        let uneven_layers = vec![vec![vec![true]], vec![vec![true], vec![true]]];
        assert!(matches!(
            EnabledMask::from_nested(&uneven_layers),
            Err(WfcError::MalformedMask(_))
        ));
        assert!(matches!(
            EnabledMask::from_nested(&[]),
            Err(WfcError::EmptyMask)
        ));
    }

    #[test]
    fn test_mask_from_nested_layout() {
        // Indexed [z][y][x].
        let mask = EnabledMask::from_nested(&[
            vec![vec![true, false, true]],
            vec![vec![false, false, true]],
        ])
        .unwrap();
        assert_eq!(mask.dimensions(), (3, 1, 2));
        assert!(mask.is_enabled(GridPos::new(2, 0, 1)));
        assert!(!mask.is_enabled(GridPos::new(0, 0, 1)));
        assert!(!mask.is_enabled(GridPos::new(5, 0, 0)));
        assert_eq!(mask.enabled_count(), 3);
    }

    #[test]
    fn test_possibility_grid_counter_follows_replacements() {
        let mask = EnabledMask::from_fn(3, 1, 1, |pos| pos.x != 1);
        let mut grid = PossibilityGrid::new(&mask, 3);
        assert_eq!(grid.remaining(), 2);
        assert!(grid.states_at(GridPos::new(1, 0, 0)).is_none());

        grid.replace_states(0, vec![2]);
        assert_eq!(grid.remaining(), 1);
        grid.replace_states(0, vec![0, 2]);
        assert_eq!(grid.remaining(), 2);

        let collapsed = grid.collapsed_states(3);
        assert_eq!(collapsed.as_slice(), &[3, 3, 3]);
    }
}
