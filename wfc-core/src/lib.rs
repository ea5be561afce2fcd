//! Core library for the quantum grid solver: a Wave Function Collapse engine
//! with arc-consistency propagation and bounded rollback.
//! Defines the fundamental data structures and the collapse driver.

use thiserror::Error;
use wfc_rules::CatalogError;

/// Entropy calculation and cell selection.
pub mod entropy;
/// Generic 3D grid structures, the enabled-position mask and the possibility grid.
pub mod grid;
/// Constraint propagation logic and traits.
pub mod propagator;
/// The renderer collaborator interface.
pub mod drawable;
/// The solver itself: construction, pre-collapse mutation and the collapse driver.
pub mod quantum_grid;
/// Drop-out ring of rollback checkpoints.
pub mod rollback;
/// Adjacency table built from a tile catalog.
pub mod rules;

pub use crate::drawable::GridDrawable;
pub use crate::entropy::{CpuEntropyCalculator, EntropyCalculator, SelectionStrategy};
pub use crate::grid::{EnabledMask, Grid, GridPos, PossibilityGrid};
pub use crate::propagator::{ArcState, ConstraintPropagator, CpuConstraintPropagator};
pub use crate::quantum_grid::{CollapseStatus, QuantumGrid, QuantumGridBuilder};
pub use crate::rollback::RollbackRing;
pub use crate::rules::AdjacencyTable;

/// Dense id of a tile inside one solver run.
pub type StateId = u16;

/// Largest number of tile types one grid can hold. One id is kept back for
/// "no tile".
pub const MAX_STATES: usize = StateId::MAX as usize;

/// Errors that can occur while building or running a quantum grid.
#[derive(Error, Debug)]
pub enum WfcError {
    /// An error related to invalid configuration (e.g., an empty direction layout).
    #[error("Configuration error: {0}")]
    Configuration(String),
    /// The catalog has no enabled and valid tile types.
    #[error("No enabled and valid tile types in the catalog")]
    EmptyCatalog,
    /// More tile types than state ids.
    #[error("Too many tile types: {0} (at most {max})", max = MAX_STATES - 1)]
    TooManyTiles(usize),
    /// No renderer was supplied to the builder.
    #[error("No drawable was supplied; a grid cannot be built without one")]
    MissingDrawable,
    /// The enabled-position mask is not a cuboid.
    #[error("Malformed mask: {0}")]
    MalformedMask(String),
    /// The mask has no cells, or none of them is enabled.
    #[error("The mask has no enabled positions")]
    EmptyMask,
    /// The first consistency sweep emptied a cell.
    #[error("Initial constraints are unsatisfiable: contradiction at {0}")]
    InitialContradiction(GridPos),
    /// Candidates can only be edited before the first collapse.
    #[error("The grid has already started collapsing")]
    CollapseAlreadyStarted,
    /// Rollback ran out of checkpoints.
    #[error("Collapse failed with {remaining} cells left to collapse")]
    CollapseFailed {
        /// Cells that were still uncollapsed when the search gave up.
        remaining: usize,
    },
    /// An error reported by the tile catalog.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),
}
