use crate::grid::PossibilityGrid;
use crate::StateId;
use rand::Rng;

pub mod cpu;

pub use cpu::CpuEntropyCalculator;

/// How the next cell to collapse is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectionStrategy {
    /// Cells tied for the lowest Shannon entropy of their candidate weights.
    #[default]
    MinimumEntropy,
    /// Cells tied for the most candidates.
    MaximumCandidates,
}

/// Cell selection and weighted state choice for the collapse driver.
pub trait EntropyCalculator {
    /// Shannon entropy `-Σ p ln p` of a candidate list, with `p` taken from
    /// the candidates' weights.
    #[must_use]
    fn cell_entropy(&self, states: &[StateId]) -> f64;

    /// Index of an uncollapsed enabled cell to collapse next, chosen uniformly
    /// among the cells ranked best. None if every cell is collapsed.
    fn select_cell<R: Rng + ?Sized>(&self, grid: &PossibilityGrid, rng: &mut R) -> Option<usize>;

    /// One of `states`, drawn in proportion to weight. None only for an empty list.
    fn pick_state<R: Rng + ?Sized>(&self, states: &[StateId], rng: &mut R) -> Option<StateId>;
}
