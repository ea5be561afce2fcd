//! Constraint propagation logic and traits.

use crate::grid::{GridPos, PossibilityGrid};
use crate::rollback::RollbackRing;
use crate::rules::AdjacencyTable;
use std::fmt::Debug;

pub mod cpu;

pub use cpu::CpuConstraintPropagator;

/// Outcome of a propagation sweep.
///
/// A contradiction is an expected result during search, not an error: the
/// collapse driver answers it with a rollback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum ArcState {
    /// Every candidate of every enabled cell is supported by each neighbour.
    Consistent,
    /// The cell at this position would have been left without candidates.
    /// Its candidates were not changed.
    Contradiction(GridPos),
}

impl ArcState {
    pub fn is_consistent(self) -> bool {
        matches!(self, Self::Consistent)
    }
}

/// Trait defining the interface for a constraint propagation algorithm.
///
/// Implementors keep a worklist of cells to re-check and narrow the
/// `PossibilityGrid` until every remaining candidate is supported.
pub trait ConstraintPropagator: Debug {
    /// Schedules the cell at `index` for a re-check.
    fn enqueue(&mut self, index: usize);

    /// Drops every scheduled cell.
    fn clear(&mut self);

    /// Runs until the worklist is empty or a contradiction is found.
    ///
    /// # Arguments
    ///
    /// * `grid` - The possibility grid to narrow in place.
    /// * `table` - Allowed neighbour states per state and direction.
    /// * `history` - Receives the pre-change candidates of every cell the sweep
    ///   modifies.
    ///
    /// On a contradiction the worklist is cleared.
    fn propagate(
        &mut self,
        grid: &mut PossibilityGrid,
        table: &AdjacencyTable,
        history: &mut RollbackRing,
    ) -> ArcState;

    /// Schedules every enabled neighbour of `index`.
    fn enqueue_neighbors(&mut self, grid: &PossibilityGrid, table: &AdjacencyTable, index: usize) {
        for (_, neighbor) in grid.enabled_neighbors(index, table) {
            self.enqueue(neighbor);
        }
    }
}
