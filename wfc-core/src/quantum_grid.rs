use crate::{
    drawable::GridDrawable,
    entropy::{CpuEntropyCalculator, EntropyCalculator, SelectionStrategy},
    grid::{EnabledMask, Grid, GridPos, PossibilityGrid},
    propagator::{ArcState, ConstraintPropagator, CpuConstraintPropagator},
    rollback::RollbackRing,
    rules::AdjacencyTable,
    StateId, WfcError, MAX_STATES,
};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{SystemTime, UNIX_EPOCH};
use wfc_rules::{AssetHandle, CatalogError, DirectionLayout, TileCatalog, TileId};

/// Where a grid is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CollapseStatus {
    /// Built; candidates may still be edited.
    #[default]
    NotStarted,
    Collapsing,
    /// Every enabled cell holds one state and the result went to the drawable.
    Succeeded,
    /// Rollback was exhausted, or the grid was already inconsistent.
    Failed,
}

/// Builder for [`QuantumGrid`].
///
/// Defaults: seed 0 (taken from the clock), rollback depth 1, minimum-entropy
/// selection, initial consistency sweep enabled.
pub struct QuantumGridBuilder<'a, D> {
    catalog: &'a TileCatalog,
    mask: EnabledMask,
    drawable: Option<D>,
    seed: u64,
    rollback_depth: usize,
    strategy: SelectionStrategy,
    skip_initial_check: bool,
}

impl<'a, D: GridDrawable> QuantumGridBuilder<'a, D> {
    /// Starts a grid over the enabled positions of `mask`, using the enabled
    /// and valid tiles of `catalog`.
    pub fn new(catalog: &'a TileCatalog, mask: EnabledMask) -> Self {
        Self {
            catalog,
            mask,
            drawable: None,
            seed: 0,
            rollback_depth: 1,
            strategy: SelectionStrategy::default(),
            skip_initial_check: false,
        }
    }

    /// Sets the seed for the random number generator. 0 derives one from the clock.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets how many decisions can be undone. 0 disables rollback.
    #[must_use]
    pub fn rollback_depth(mut self, depth: usize) -> Self {
        self.rollback_depth = depth;
        self
    }

    /// Chooses between minimum-entropy and maximum-candidate selection.
    #[must_use]
    pub fn use_entropy(mut self, enabled: bool) -> Self {
        self.strategy = if enabled {
            SelectionStrategy::MinimumEntropy
        } else {
            SelectionStrategy::MaximumCandidates
        };
        self
    }

    #[must_use]
    pub fn selection_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Skips the arc-consistency sweep run at construction.
    #[must_use]
    pub fn skip_initial_check(mut self, skip: bool) -> Self {
        self.skip_initial_check = skip;
        self
    }

    /// Sets the consumer of the finished grid. Required.
    #[must_use]
    pub fn drawable(mut self, drawable: D) -> Self {
        self.drawable = Some(drawable);
        self
    }

    /// Validates the inputs, builds the adjacency table and, unless skipped,
    /// makes the grid arc-consistent.
    ///
    /// # Errors
    ///
    /// * `WfcError::MissingDrawable` if no drawable was set.
    /// * `WfcError::EmptyMask` if the mask has no enabled position.
    /// * `WfcError::EmptyCatalog` / `WfcError::TooManyTiles` for the tile count.
    /// * `WfcError::Configuration` if the topology has no directions.
    /// * `WfcError::InitialContradiction` if the first sweep empties a cell.
    pub fn build(self) -> Result<QuantumGrid<D>, WfcError> {
        self.try_build().map_err(|e| {
            error!("Cannot build quantum grid: {e}");
            e
        })
    }

    fn try_build(self) -> Result<QuantumGrid<D>, WfcError> {
        let drawable = self.drawable.ok_or(WfcError::MissingDrawable)?;
        if self.mask.enabled_count() == 0 {
            return Err(WfcError::EmptyMask);
        }

        let tiles = self.catalog.enabled_and_valid_tiles();
        if tiles.is_empty() {
            return Err(WfcError::EmptyCatalog);
        }
        if tiles.len() >= MAX_STATES {
            return Err(WfcError::TooManyTiles(tiles.len()));
        }
        let definitions = tiles
            .iter()
            .map(|&id| {
                self.catalog
                    .tile(id)
                    .ok_or_else(|| CatalogError::UnknownTile(id.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let weights = definitions.iter().map(|tile| tile.weight).collect();
        let mut assets: Vec<Option<AssetHandle>> =
            definitions.iter().map(|tile| tile.asset.clone()).collect();
        assets.push(None);

        let layout = DirectionLayout::for_topology(self.catalog.topology());
        let table = AdjacencyTable::build(self.catalog, &tiles, layout)?;

        let seed = if self.seed == 0 {
            clock_seed()
        } else {
            self.seed
        };
        let mut grid = PossibilityGrid::new(&self.mask, tiles.len());
        let mut propagator = CpuConstraintPropagator::new(grid.len(), tiles.len());
        let mut rollback = RollbackRing::new(self.rollback_depth, grid.len());

        if self.skip_initial_check {
            debug!("Skipping initial consistency sweep");
        } else {
            for index in grid.enabled_indices().collect::<Vec<_>>() {
                propagator.enqueue(index);
            }
            if let ArcState::Contradiction(pos) =
                propagator.propagate(&mut grid, &table, &mut rollback)
            {
                return Err(WfcError::InitialContradiction(pos));
            }
        }

        let (width, height, depth) = self.mask.dimensions();
        info!(
            "Quantum grid ready: {width}x{height}x{depth}, {} enabled cells, {} states, {} to collapse, seed {seed}, rollback depth {}",
            self.mask.enabled_count(),
            tiles.len(),
            grid.remaining(),
            self.rollback_depth
        );
        Ok(QuantumGrid {
            tiles,
            assets,
            table,
            grid,
            propagator,
            entropy: CpuEntropyCalculator::new(weights, self.strategy),
            rollback,
            rng: StdRng::seed_from_u64(seed),
            seed,
            status: CollapseStatus::NotStarted,
            contradiction: None,
            drawable,
        })
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(1, |elapsed| {
            elapsed
                .as_secs()
                .wrapping_mul(1_000_000_000)
                .wrapping_add(u64::from(elapsed.subsec_nanos()))
        })
        .max(1)
}

#[derive(Debug, Clone, Copy)]
enum Edit {
    Keep,
    Remove,
}

/// A 3D grid of cells collapsed to tile states under adjacency constraints,
/// with bounded backtracking.
///
/// Single-threaded: one call to [`Self::collapse`] runs to completion on the
/// caller's thread.
pub struct QuantumGrid<D> {
    /// State id -> catalog tile, ascending.
    tiles: Vec<TileId>,
    /// State id -> asset; the extra last entry is the "no tile" id.
    assets: Vec<Option<AssetHandle>>,
    table: AdjacencyTable,
    grid: PossibilityGrid,
    propagator: CpuConstraintPropagator,
    entropy: CpuEntropyCalculator,
    rollback: RollbackRing,
    rng: StdRng,
    seed: u64,
    status: CollapseStatus,
    /// Set when a pre-collapse edit left the grid inconsistent.
    contradiction: Option<GridPos>,
    drawable: D,
}

impl<D: GridDrawable> QuantumGrid<D> {
    /// Creates a new builder for a grid over `mask`.
    pub fn builder(catalog: &TileCatalog, mask: EnabledMask) -> QuantumGridBuilder<'_, D> {
        QuantumGridBuilder::new(catalog, mask)
    }

    /// `(width, height, depth)`.
    pub fn dimensions(&self) -> (usize, usize, usize) {
        self.grid.dimensions()
    }

    /// Candidate states at `pos`, or None outside the mask.
    pub fn states_left(&self, pos: GridPos) -> Option<&[StateId]> {
        self.grid.states_at(pos)
    }

    /// Enabled cells that still have more than one candidate.
    pub fn remaining_to_collapse(&self) -> usize {
        self.grid.remaining()
    }

    /// Number of states; also the id written for "no tile".
    pub fn state_count(&self) -> usize {
        self.tiles.len()
    }

    /// The id written for cells without a tile.
    pub fn empty_state(&self) -> StateId {
        // Checked against MAX_STATES at build time.
        self.tiles.len() as StateId
    }

    pub fn state_for_tile(&self, tile: TileId) -> Option<StateId> {
        self.tiles
            .binary_search(&tile)
            .ok()
            .and_then(|state| StateId::try_from(state).ok())
    }

    pub fn tile_for_state(&self, state: StateId) -> Option<TileId> {
        self.tiles.get(usize::from(state)).copied()
    }

    /// Asset of every state, followed by `None` for the empty state.
    pub fn assets(&self) -> &[Option<AssetHandle>] {
        &self.assets
    }

    pub fn adjacency(&self) -> &AdjacencyTable {
        &self.table
    }

    pub fn status(&self) -> CollapseStatus {
        self.status
    }

    /// The seed actually used, after deriving one from the clock if needed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether every candidate of every enabled cell is supported by each
    /// enabled neighbour, and no enabled cell is empty.
    pub fn check_arc_consistency(&self) -> bool {
        self.grid.enabled_indices().all(|index| {
            let states = self.grid.states(index);
            !states.is_empty()
                && self
                    .grid
                    .enabled_neighbors(index, &self.table)
                    .all(|(direction, neighbor)| {
                        let theirs = self.grid.states(neighbor);
                        states.iter().all(|&state| {
                            theirs
                                .iter()
                                .any(|&other| self.table.allows(state, other, direction))
                        })
                    })
        })
    }

    /// One state per cell, [`Self::empty_state`] where the cell is outside the
    /// mask or not collapsed.
    pub fn collapsed_states(&self) -> Grid<StateId> {
        self.grid.collapsed_states(self.empty_state())
    }

    pub fn drawable(&self) -> &D {
        &self.drawable
    }

    pub fn drawable_mut(&mut self) -> &mut D {
        &mut self.drawable
    }

    pub fn into_drawable(self) -> D {
        self.drawable
    }

    /// Asks the drawable to render what it was sent.
    ///
    /// # Errors
    ///
    /// Whatever the drawable reports.
    pub fn draw(&mut self) -> Result<(), D::Error> {
        self.drawable.draw_tiles()
    }

    /// Narrows every position to the given tiles.
    ///
    /// Positions outside the mask, and positions that would be left without
    /// candidates, are skipped with a warning. Tiles that are not states of
    /// this grid, and repeated tiles, are ignored with a warning. One
    /// propagation sweep follows.
    ///
    /// # Errors
    ///
    /// `WfcError::CollapseAlreadyStarted` once [`Self::collapse`] has been called.
    pub fn set_tiles(&mut self, positions: &[GridPos], tiles: &[TileId]) -> Result<ArcState, WfcError> {
        self.edit(positions, tiles, Edit::Keep)
    }

    /// Single-tile form of [`Self::set_tiles`].
    ///
    /// # Errors
    ///
    /// `WfcError::CollapseAlreadyStarted` once [`Self::collapse`] has been called.
    pub fn set_tile(&mut self, positions: &[GridPos], tile: TileId) -> Result<ArcState, WfcError> {
        self.edit(positions, &[tile], Edit::Keep)
    }

    /// Removes the given tiles from every position, with the same skipping
    /// rules as [`Self::set_tiles`].
    ///
    /// # Errors
    ///
    /// `WfcError::CollapseAlreadyStarted` once [`Self::collapse`] has been called.
    pub fn remove_states_from_tiles(
        &mut self,
        positions: &[GridPos],
        tiles: &[TileId],
    ) -> Result<ArcState, WfcError> {
        self.edit(positions, tiles, Edit::Remove)
    }

    /// Single-tile form of [`Self::remove_states_from_tiles`].
    ///
    /// # Errors
    ///
    /// `WfcError::CollapseAlreadyStarted` once [`Self::collapse`] has been called.
    pub fn remove_state_from_tiles(
        &mut self,
        positions: &[GridPos],
        tile: TileId,
    ) -> Result<ArcState, WfcError> {
        self.edit(positions, &[tile], Edit::Remove)
    }

    fn current_arc_state(&self) -> ArcState {
        self.contradiction
            .map_or(ArcState::Consistent, ArcState::Contradiction)
    }

    /// Sorted, deduplicated states of `tiles`.
    fn states_of(&self, tiles: &[TileId]) -> Vec<StateId> {
        let mut states: Vec<StateId> = Vec::with_capacity(tiles.len());
        for &tile in tiles {
            match self.state_for_tile(tile) {
                None => warn!("Tile {tile} is not an enabled and valid tile of this grid; ignored"),
                Some(state) if states.contains(&state) => {
                    warn!("Tile {tile} was given more than once; ignored");
                }
                Some(state) => states.push(state),
            }
        }
        states.sort_unstable();
        states
    }

    fn edit(&mut self, positions: &[GridPos], tiles: &[TileId], mode: Edit) -> Result<ArcState, WfcError> {
        if self.status != CollapseStatus::NotStarted {
            return Err(WfcError::CollapseAlreadyStarted);
        }
        let targets = self.states_of(tiles);
        if targets.is_empty() {
            warn!("No usable tiles given; candidates left unchanged");
            return Ok(self.current_arc_state());
        }

        let mut changed = 0usize;
        for &pos in positions {
            let Some(index) = self
                .grid
                .index_of(pos)
                .filter(|index| self.grid.is_enabled(*index))
            else {
                warn!("Position {pos} is outside the enabled mask; skipped");
                continue;
            };
            let current = self.grid.states(index);
            let next: Vec<StateId> = current
                .iter()
                .copied()
                .filter(|state| {
                    let listed = targets.binary_search(state).is_ok();
                    match mode {
                        Edit::Keep => listed,
                        Edit::Remove => !listed,
                    }
                })
                .collect();
            if next.is_empty() {
                warn!("Editing {pos} would leave it without candidates; skipped");
                continue;
            }
            if next.len() == current.len() {
                continue;
            }
            self.grid.replace_states(index, next);
            self.propagator
                .enqueue_neighbors(&self.grid, &self.table, index);
            changed += 1;
        }

        if changed == 0 {
            return Ok(self.current_arc_state());
        }
        debug!("Edited {changed} cell(s); propagating");
        let state = self
            .propagator
            .propagate(&mut self.grid, &self.table, &mut self.rollback);
        if let ArcState::Contradiction(pos) = state {
            warn!("Edit left the grid inconsistent at {pos}; the grid cannot be collapsed");
            self.contradiction.get_or_insert(pos);
        }
        // An earlier contradiction still blocks the collapse.
        Ok(self.current_arc_state())
    }

    /// Collapses every enabled cell to one state and sends the result to the
    /// drawable.
    ///
    /// Each step picks a cell, draws a state for it by weight and propagates.
    /// A contradiction rolls back to the latest usable checkpoint; the
    /// decision that led there is never retried from the same state.
    ///
    /// # Errors
    ///
    /// * `WfcError::CollapseAlreadyStarted` if called a second time.
    /// * `WfcError::CollapseFailed` if rollback is exhausted or an earlier edit
    ///   left the grid inconsistent. The grid is then partially collapsed.
    pub fn collapse(&mut self) -> Result<(), WfcError> {
        if self.status != CollapseStatus::NotStarted {
            return Err(WfcError::CollapseAlreadyStarted);
        }
        if let Some(pos) = self.contradiction {
            error!("Grid is inconsistent at {pos}; refusing to collapse");
            return Err(self.fail());
        }
        self.status = CollapseStatus::Collapsing;
        info!(
            "Collapsing {} cells with {:?} selection",
            self.grid.remaining(),
            self.entropy.strategy()
        );

        let mut steps = 0u64;
        let mut rollbacks = 0u64;
        self.rollback.advance(self.grid.remaining());
        while self.grid.remaining() > 0 {
            let Some(index) = self.entropy.select_cell(&self.grid, &mut self.rng) else {
                error!(
                    "{} cells left to collapse but none has candidates to choose from",
                    self.grid.remaining()
                );
                return Err(self.fail());
            };
            let Some(chosen) = self
                .entropy
                .pick_state(self.grid.states(index), &mut self.rng)
            else {
                return Err(self.fail());
            };

            let before = self.grid.replace_states(index, vec![chosen]);
            self.rollback.record(index, &before);
            self.rollback.record_decision(index, chosen);
            self.propagator
                .enqueue_neighbors(&self.grid, &self.table, index);
            steps += 1;

            match self
                .propagator
                .propagate(&mut self.grid, &self.table, &mut self.rollback)
            {
                ArcState::Consistent => self.rollback.advance(self.grid.remaining()),
                ArcState::Contradiction(pos) => {
                    debug!(
                        "Step {steps}: state {chosen} at {} led to a contradiction at {pos}",
                        self.grid.position_of(index)
                    );
                    if !self
                        .rollback
                        .recover(&mut self.grid, &mut self.propagator, &self.table)
                    {
                        warn!("Rollback exhausted after {steps} steps and {rollbacks} rollbacks");
                        return Err(self.fail());
                    }
                    rollbacks += 1;
                }
            }
        }

        self.status = CollapseStatus::Succeeded;
        info!("Collapse finished in {steps} steps with {rollbacks} rollbacks");
        let states = self.collapsed_states();
        self.drawable.send_tiles(states, self.assets.clone());
        Ok(())
    }

    fn fail(&mut self) -> WfcError {
        self.status = CollapseStatus::Failed;
        WfcError::CollapseFailed {
            remaining: self.grid.remaining(),
        }
    }
}
