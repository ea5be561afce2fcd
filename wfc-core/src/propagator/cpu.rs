use crate::{
    grid::PossibilityGrid,
    propagator::{ArcState, ConstraintPropagator},
    rollback::RollbackRing,
    rules::AdjacencyTable,
    StateId,
};
use bitvec::prelude::*;
use log::trace;
use std::collections::VecDeque;

/// AC-3 style propagator running on the calling thread.
///
/// A cell is narrowed to the states that every enabled neighbour can support;
/// when that changes it, all of its neighbours are scheduled in turn. The
/// worklist never holds the same cell twice.
#[derive(Debug, Clone, Default)]
pub struct CpuConstraintPropagator {
    queue: VecDeque<usize>,
    queued: BitVec,
    /// States allowed by every direction seen so far.
    allowed: BitVec,
    /// States supported by the neighbour under inspection.
    supported: BitVec,
}

impl CpuConstraintPropagator {
    /// Creates a propagator for grids of `cell_count` cells and `state_count` states.
    pub fn new(cell_count: usize, state_count: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            queued: bitvec![0; cell_count],
            allowed: bitvec![0; state_count],
            supported: bitvec![0; state_count],
        }
    }

    /// Number of cells waiting for a re-check.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// The candidates of `index` that survive every neighbour, or None if
    /// nothing changes.
    fn narrowed(
        &mut self,
        grid: &PossibilityGrid,
        table: &AdjacencyTable,
        index: usize,
    ) -> Option<Vec<StateId>> {
        let current = grid.states(index);
        self.allowed.fill(false);
        for &state in current {
            self.allowed.set(usize::from(state), true);
        }

        for (direction, neighbor) in grid.enabled_neighbors(index, table) {
            // Seen from the neighbour, this cell lies in the opposite direction.
            let back = table.layout().opposite(direction);
            self.supported.fill(false);
            for &neighbor_state in grid.states(neighbor) {
                for &state in table.compatible(neighbor_state, back) {
                    self.supported.set(usize::from(state), true);
                }
            }
            let mut survivors = 0;
            for &state in current {
                let slot = usize::from(state);
                if self.allowed[slot] && !self.supported[slot] {
                    self.allowed.set(slot, false);
                } else if self.allowed[slot] {
                    survivors += 1;
                }
            }
            if survivors == 0 {
                return Some(Vec::new());
            }
        }

        let next: Vec<StateId> = current
            .iter()
            .copied()
            .filter(|state| self.allowed[usize::from(*state)])
            .collect();
        (next.len() != current.len()).then_some(next)
    }
}

impl ConstraintPropagator for CpuConstraintPropagator {
    fn enqueue(&mut self, index: usize) {
        if index >= self.queued.len() {
            self.queued.resize(index + 1, false);
        }
        if !self.queued[index] {
            self.queued.set(index, true);
            self.queue.push_back(index);
        }
    }

    fn clear(&mut self) {
        self.queue.clear();
        self.queued.fill(false);
    }

    fn propagate(
        &mut self,
        grid: &mut PossibilityGrid,
        table: &AdjacencyTable,
        history: &mut RollbackRing,
    ) -> ArcState {
        if self.allowed.len() < table.state_count() {
            self.allowed.resize(table.state_count(), false);
            self.supported.resize(table.state_count(), false);
        }

        while let Some(index) = self.queue.pop_front() {
            self.queued.set(index, false);
            if !grid.is_enabled(index) {
                continue;
            }
            let Some(next) = self.narrowed(grid, table, index) else {
                continue;
            };
            if next.is_empty() {
                let pos = grid.position_of(index);
                trace!("Contradiction at {pos}");
                self.clear();
                return ArcState::Contradiction(pos);
            }

            let before = grid.replace_states(index, next);
            history.record(index, &before);
            self.enqueue_neighbors(grid, table, index);
        }
        ArcState::Consistent
    }
}
