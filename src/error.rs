use thiserror::Error;
use wfc_core::WfcError;
use wfc_rules::{CatalogError, LoadError};

/// Everything the command-line front end can fail with.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Catalog Error: {0}")]
    Load(#[from] LoadError),

    #[error("Catalog Error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("WFC Core Error: {0}")]
    WfcCore(#[from] WfcError),

    /// A tile named on the command line is not in the catalog.
    #[error("Unknown tile: {0}")]
    UnknownTile(String),

    /// The pre-collapse edits already made the grid inconsistent.
    #[error("Constraints are unsatisfiable: {0}")]
    Unsatisfiable(String),

    #[error("Render Error: {0}")]
    Render(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
