use crate::entropy::{EntropyCalculator, SelectionStrategy};
use crate::grid::PossibilityGrid;
use crate::StateId;
use float_ord::FloatOrd;
use log::warn;
use rand::Rng;

/// CPU implementation of the `EntropyCalculator` trait.
#[derive(Debug, Clone)]
pub struct CpuEntropyCalculator {
    /// Weight of every state, indexed by state id.
    weights: Vec<u32>,
    strategy: SelectionStrategy,
    /// The weights of all states together overflow `u32`.
    saturated: bool,
}

impl CpuEntropyCalculator {
    pub fn new(weights: Vec<u32>, strategy: SelectionStrategy) -> Self {
        let saturated = weights
            .iter()
            .try_fold(0u32, |total, &weight| total.checked_add(weight))
            .is_none();
        if saturated {
            warn!(
                "Combined weight of {} states exceeds {}; selection will be biased",
                weights.len(),
                u32::MAX
            );
        }
        Self {
            weights,
            strategy,
            saturated,
        }
    }

    /// Whether candidate weight sums may be clamped at `u32::MAX`.
    pub fn is_saturated(&self) -> bool {
        self.saturated
    }

    pub fn strategy(&self) -> SelectionStrategy {
        self.strategy
    }

    fn weight(&self, state: StateId) -> u32 {
        self.weights.get(usize::from(state)).copied().unwrap_or(0)
    }

    /// Sum of candidate weights, saturating at `u32::MAX`.
    fn total_weight(&self, states: &[StateId]) -> u32 {
        states
            .iter()
            .fold(0u32, |total, &state| total.saturating_add(self.weight(state)))
    }

    /// Every uncollapsed enabled cell scoring equal to the best `key`, where
    /// lower keys rank better.
    fn best_cells<K: Ord>(
        grid: &PossibilityGrid,
        mut key: impl FnMut(&[StateId]) -> K,
    ) -> Vec<usize> {
        let mut best: Option<K> = None;
        let mut cells = Vec::new();
        for index in grid.enabled_indices() {
            let states = grid.states(index);
            if states.len() < 2 {
                continue;
            }
            let score = key(states);
            match &best {
                Some(current) if score > *current => {}
                Some(current) if score == *current => cells.push(index),
                _ => {
                    best = Some(score);
                    cells.clear();
                    cells.push(index);
                }
            }
        }
        cells
    }
}

impl EntropyCalculator for CpuEntropyCalculator {
    fn cell_entropy(&self, states: &[StateId]) -> f64 {
        let total = f64::from(self.total_weight(states));
        if states.len() < 2 || total <= 0.0 {
            return 0.0;
        }
        let entropy: f64 = states
            .iter()
            .map(|&state| f64::from(self.weight(state)) / total)
            .filter(|p| *p > 0.0)
            .map(|p| -p * p.ln())
            .sum();
        entropy.max(0.0)
    }

    fn select_cell<R: Rng + ?Sized>(&self, grid: &PossibilityGrid, rng: &mut R) -> Option<usize> {
        let ties = match self.strategy {
            SelectionStrategy::MinimumEntropy => {
                Self::best_cells(grid, |states| FloatOrd(self.cell_entropy(states)))
            }
            SelectionStrategy::MaximumCandidates => {
                Self::best_cells(grid, |states| std::cmp::Reverse(states.len()))
            }
        };
        if ties.is_empty() {
            return None;
        }
        Some(ties[rng.gen_range(0..ties.len())])
    }

    fn pick_state<R: Rng + ?Sized>(&self, states: &[StateId], rng: &mut R) -> Option<StateId> {
        let total = f64::from(self.total_weight(states));
        let mut draw: f64 = rng.gen();
        if total > 0.0 {
            for &state in states {
                draw -= f64::from(self.weight(state)) / total;
                if draw <= 0.0 {
                    return Some(state);
                }
            }
        }
        // Rounding can leave a sliver of the draw unspent.
        states.last().copied()
    }
}
