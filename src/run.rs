//! One end-to-end run: load a catalog, build a grid, apply the command-line
//! edits, collapse and draw.

use crate::config::AppConfig;
use crate::error::AppError;
use crate::output::{RenderTarget, TextDrawable};
use log::{info, warn};
use std::path::Path;
use wfc_core::{ArcState, CollapseStatus, EnabledMask, GridPos, QuantumGrid, SelectionStrategy};
use wfc_rules::loader::load_from_file;
use wfc_rules::{AssetHandle, TileCatalog, TileId};

/// What a finished run reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// The seed actually used, so a run can be repeated.
    pub seed: u64,
    pub dimensions: (usize, usize, usize),
    pub states: usize,
    pub status: CollapseStatus,
}

/// Loads the catalog and gives every tile without an asset its own name as
/// asset, so the text renderer always has a glyph.
///
/// # Errors
///
/// Whatever loading the catalog reports.
pub fn load_catalog(path: &Path) -> Result<TileCatalog, AppError> {
    let mut catalog = load_from_file(path)?;
    let unnamed: Vec<(TileId, String)> = catalog
        .tiles()
        .iter()
        .enumerate()
        .filter(|(_, tile)| tile.asset.is_none())
        .map(|(index, tile)| (TileId(index), tile.name.clone()))
        .collect();
    for (id, name) in unnamed {
        catalog.set_asset(id, Some(AssetHandle::new(name)))?;
    }
    Ok(catalog)
}

fn tile_named(catalog: &TileCatalog, name: &str) -> Result<TileId, AppError> {
    catalog
        .tile_id(name)
        .ok_or_else(|| AppError::UnknownTile(name.to_string()))
}

/// Positions on the four vertical faces of the grid, on every layer.
pub fn border_positions(width: usize, height: usize, depth: usize) -> Vec<GridPos> {
    let mut positions = Vec::new();
    for z in 0..depth {
        for y in 0..height {
            for x in 0..width {
                if x == 0 || z == 0 || x + 1 == width || z + 1 == depth {
                    positions.push(GridPos::new(x, y, z));
                }
            }
        }
    }
    positions
}

fn check_edit(state: ArcState, what: &str) -> Result<(), AppError> {
    match state {
        ArcState::Consistent => Ok(()),
        ArcState::Contradiction(pos) => Err(AppError::Unsatisfiable(format!(
            "{what} leaves no tile for the cell at {pos}"
        ))),
    }
}

/// Runs the solver once with `config`.
///
/// # Errors
///
/// * `AppError::Config` if no catalog is configured.
/// * `AppError::Load` if the catalog cannot be read.
/// * `AppError::UnknownTile` if a tile named in the config is not in the catalog.
/// * `AppError::Unsatisfiable` if the border or exclusions already contradict.
/// * `AppError::WfcCore` if the grid cannot be built or the collapse fails.
/// * Whatever the renderer reports.
pub fn run(config: &AppConfig) -> Result<RunSummary, AppError> {
    let path = config
        .catalog
        .as_deref()
        .ok_or_else(|| AppError::Config("No catalog configured".to_string()))?;
    info!("Loading catalog from {}", path.display());
    let catalog = load_catalog(path)?;
    info!(
        "Catalog loaded: {} tiles for {} grids",
        catalog.len(),
        catalog.topology()
    );

    let border = config
        .border_tile
        .as_deref()
        .map(|name| tile_named(&catalog, name))
        .transpose()?;
    let excluded = config
        .excluded_tiles
        .iter()
        .map(|name| tile_named(&catalog, name))
        .collect::<Result<Vec<_>, _>>()?;

    let target = config
        .output
        .clone()
        .map_or(RenderTarget::Stdout, RenderTarget::File);
    let strategy = if config.use_entropy {
        SelectionStrategy::MinimumEntropy
    } else {
        SelectionStrategy::MaximumCandidates
    };
    let mask = EnabledMask::filled(config.width, config.height, config.depth);
    let mut grid = QuantumGrid::builder(&catalog, mask)
        .seed(config.seed)
        .rollback_depth(config.rollback_depth)
        .selection_strategy(strategy)
        .skip_initial_check(config.skip_initial_check)
        .drawable(TextDrawable::new(target, config.color))
        .build()?;
    info!("Using seed {}", grid.seed());

    if let Some(tile) = border {
        let positions = border_positions(config.width, config.height, config.depth);
        check_edit(grid.set_tile(&positions, tile)?, "The border tile")?;
    }
    if !excluded.is_empty() {
        let (width, height, depth) = grid.dimensions();
        let everywhere: Vec<GridPos> = wfc_core::Grid::<()>::filled(width, height, depth, ())
            .positions()
            .collect();
        check_edit(
            grid.remove_states_from_tiles(&everywhere, &excluded)?,
            "Excluding tiles",
        )?;
    }

    if let Err(e) = grid.collapse() {
        warn!("Collapse did not finish; nothing will be drawn");
        return Err(e.into());
    }
    grid.draw()?;

    Ok(RunSummary {
        seed: grid.seed(),
        dimensions: grid.dimensions(),
        states: grid.state_count(),
        status: grid.status(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_border_positions() {
        let positions = border_positions(3, 1, 3);
        assert_eq!(positions.len(), 8);
        assert!(!positions.contains(&GridPos::new(1, 0, 1)));

        // Every layer gets its own ring.
        assert_eq!(border_positions(3, 2, 3).len(), 16);
        // Thin grids are all border.
        assert_eq!(border_positions(2, 1, 2).len(), 4);
    }

    #[test]
    fn test_load_catalog_names_missing_assets() {
        let mut file = tempfile::Builder::new().suffix(".ron").tempfile().unwrap();
        write!(
            file,
            r##"(
                topology: Square2d,
                tiles: [(name: "grass"), (name: "rock", asset: Some("#"))],
                connections: [("grass", "rock", [right])],
            )"##
        )
        .unwrap();

        let catalog = load_catalog(file.path()).unwrap();
        let grass = catalog.tile_id("grass").unwrap();
        let rock = catalog.tile_id("rock").unwrap();
        assert_eq!(
            catalog.tile(grass).unwrap().asset,
            Some(AssetHandle::new("grass"))
        );
        assert_eq!(catalog.tile(rock).unwrap().asset, Some(AssetHandle::new("#")));
    }

    #[test]
    fn test_catalog_errors_convert() {
        let mut catalog = TileCatalog::new(wfc_rules::Topology::Square2d);
        let error: AppError = catalog
            .set_asset(TileId(3), None)
            .map_err(AppError::from)
            .unwrap_err();
        assert!(matches!(error, AppError::Catalog(_)));
    }

    #[test]
    fn test_check_edit() {
        assert!(check_edit(ArcState::Consistent, "x").is_ok());
        assert!(matches!(
            check_edit(ArcState::Contradiction(GridPos::new(0, 0, 0)), "x"),
            Err(AppError::Unsatisfiable(_))
        ));
    }
}
