//! Bounded backtracking for the collapse driver.
//!
//! The ring keeps the last `depth` checkpoints. A checkpoint is opened before
//! each collapse decision and holds, for every cell changed since it opened,
//! the candidates the cell had at that moment (first write wins). Opening a
//! new checkpoint when the ring is full evicts the oldest one, so search can
//! never back up further than `depth` decisions.

use crate::grid::PossibilityGrid;
use crate::propagator::{ArcState, ConstraintPropagator};
use crate::rules::AdjacencyTable;
use crate::StateId;
use log::debug;

#[derive(Debug, Clone, Default)]
struct Checkpoint {
    /// Uncollapsed-cell counter when the checkpoint opened.
    remaining: usize,
    /// Indexed by cell. `None` means unchanged since the checkpoint opened.
    snapshots: Vec<Option<Vec<StateId>>>,
    /// Cells with a snapshot, so restoring does not scan the whole grid.
    touched: Vec<usize>,
    /// The collapse decision taken inside this checkpoint.
    decision: Option<(usize, StateId)>,
    /// Decisions already proven to fail from this checkpoint's state.
    eliminated: Vec<(usize, StateId)>,
}

impl Checkpoint {
    fn reset(&mut self, remaining: usize) {
        for index in self.touched.drain(..) {
            self.snapshots[index] = None;
        }
        self.remaining = remaining;
        self.decision = None;
        self.eliminated.clear();
    }

    /// Puts every changed cell back and returns the grid to how it was when
    /// the checkpoint opened.
    fn restore(&mut self, grid: &mut PossibilityGrid) {
        for index in self.touched.drain(..) {
            if let Some(states) = self.snapshots[index].take() {
                grid.replace_states(index, states);
            }
        }
        grid.set_remaining(self.remaining);
    }
}

/// Drop-out stack of rollback checkpoints with a rotating top.
#[derive(Debug, Clone)]
pub struct RollbackRing {
    checkpoints: Vec<Checkpoint>,
    top: usize,
    active: usize,
}

impl RollbackRing {
    /// A ring of `depth` checkpoints for a grid of `cell_count` cells.
    /// A depth of 0 disables rollback.
    pub fn new(depth: usize, cell_count: usize) -> Self {
        let checkpoints = (0..depth)
            .map(|_| Checkpoint {
                snapshots: vec![None; cell_count],
                ..Checkpoint::default()
            })
            .collect();
        Self {
            checkpoints,
            top: 0,
            active: 0,
        }
    }

    /// A ring that records nothing and can never roll back.
    pub fn disabled() -> Self {
        Self::new(0, 0)
    }

    pub fn depth(&self) -> usize {
        self.checkpoints.len()
    }

    pub fn is_enabled(&self) -> bool {
        !self.checkpoints.is_empty()
    }

    /// Checkpoints that can still be rolled back to.
    pub fn active(&self) -> usize {
        self.active
    }

    /// Opens a fresh checkpoint on top, evicting the oldest one if the ring is full.
    pub fn advance(&mut self, remaining: usize) {
        let depth = self.depth();
        if depth == 0 {
            return;
        }
        self.top = (self.top + 1) % depth;
        self.active = (self.active + 1).min(depth);
        self.checkpoints[self.top].reset(remaining);
    }

    /// Remembers `before` as the candidates of `index` at the current
    /// checkpoint, unless the cell already has a snapshot there.
    pub fn record(&mut self, index: usize, before: &[StateId]) {
        if self.active == 0 {
            return;
        }
        let checkpoint = &mut self.checkpoints[self.top];
        if let Some(slot) = checkpoint.snapshots.get_mut(index) {
            if slot.is_none() {
                *slot = Some(before.to_vec());
                checkpoint.touched.push(index);
            }
        }
    }

    /// Remembers that `state` was chosen for `index` at the current checkpoint.
    pub fn record_decision(&mut self, index: usize, state: StateId) {
        if self.active > 0 {
            self.checkpoints[self.top].decision = Some((index, state));
        }
    }

    fn discard_top(&mut self) {
        let depth = self.depth();
        self.active -= 1;
        self.top = (self.top + depth - 1) % depth;
    }

    /// Backs up after a contradiction until some checkpoint yields a
    /// consistent grid again.
    ///
    /// At each checkpoint the grid is restored to the state it had when the
    /// checkpoint opened, the decision taken there is added to the states
    /// ruled out for it, and propagation re-runs without them. A checkpoint
    /// without a decision, one whose exclusions empty a cell, or one whose
    /// re-run still contradicts is discarded in favour of the one below.
    ///
    /// Returns false once no checkpoint is left. The grid is then partially
    /// collapsed.
    pub fn recover<P: ConstraintPropagator>(
        &mut self,
        grid: &mut PossibilityGrid,
        propagator: &mut P,
        table: &AdjacencyTable,
    ) -> bool {
        propagator.clear();
        while self.active > 0 {
            let top = self.top;
            self.checkpoints[top].restore(grid);
            let checkpoint = &mut self.checkpoints[top];
            if let Some(decision) = checkpoint.decision.take() {
                checkpoint.eliminated.push(decision);
            }
            let eliminated = checkpoint.eliminated.clone();

            if !eliminated.is_empty() && self.exclude(grid, propagator, table, &eliminated) {
                match propagator.propagate(grid, table, self) {
                    ArcState::Consistent => {
                        debug!(
                            "Rolled back to checkpoint {top} with {} excluded decision(s), {} checkpoint(s) left",
                            eliminated.len(),
                            self.active
                        );
                        return true;
                    }
                    ArcState::Contradiction(pos) => {
                        debug!("Checkpoint {top} still contradicts at {pos}; discarding it");
                    }
                }
            } else {
                debug!("Checkpoint {top} has no decision left to exclude; discarding it");
            }

            propagator.clear();
            self.checkpoints[top].restore(grid);
            self.discard_top();
        }
        false
    }

    /// Removes every excluded state from its cell and schedules the
    /// neighbours. Returns false if a cell would be left empty.
    fn exclude<P: ConstraintPropagator>(
        &mut self,
        grid: &mut PossibilityGrid,
        propagator: &mut P,
        table: &AdjacencyTable,
        eliminated: &[(usize, StateId)],
    ) -> bool {
        for &(index, state) in eliminated {
            let current = grid.states(index);
            let Ok(slot) = current.binary_search(&state) else {
                continue;
            };
            if current.len() == 1 {
                return false;
            }
            let mut next = current.to_vec();
            next.remove(slot);
            let before = grid.replace_states(index, next);
            self.record(index, &before);
            propagator.enqueue_neighbors(grid, table, index);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::EnabledMask;

    #[test]
    fn test_first_write_wins() {
        let mut grid = PossibilityGrid::new(&EnabledMask::filled(2, 1, 1), 3);
        let mut ring = RollbackRing::new(2, grid.len());
        ring.advance(grid.remaining());

        let before = grid.replace_states(0, vec![0, 1]);
        ring.record(0, &before);
        let before = grid.replace_states(0, vec![1]);
        ring.record(0, &before);
        assert_eq!(grid.remaining(), 1);

        ring.checkpoints[ring.top].restore(&mut grid);
        assert_eq!(grid.states(0), &[0, 1, 2]);
        assert_eq!(grid.remaining(), 2);
    }

    #[test]
    fn test_ring_drops_oldest() {
        let mut ring = RollbackRing::new(2, 1);
        for _ in 0..5 {
            ring.advance(0);
        }
        assert_eq!(ring.active(), 2);
        ring.discard_top();
        ring.discard_top();
        assert_eq!(ring.active(), 0);
    }

    #[test]
    fn test_disabled_ring_records_nothing() {
        let mut ring = RollbackRing::disabled();
        ring.advance(3);
        ring.record(0, &[1, 2]);
        ring.record_decision(0, 1);
        assert!(!ring.is_enabled());
        assert_eq!(ring.active(), 0);
    }
}
