//! Command-line and file configuration.
//!
//! Values are layered, later layers winning: built-in defaults, an optional
//! TOML file, `QUANTUM_FORGE_*` environment variables, then command-line flags.

use crate::error::AppError;
use clap::{Parser, ValueEnum};
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Prefix of the environment variables read into the configuration.
pub const ENV_PREFIX: &str = "QUANTUM_FORGE_";

/// Log level applied to every module unless `RUST_LOG` says otherwise.
#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GlobalLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Fully resolved settings for one run.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Tile catalog file (`.ron` or `.json`).
    pub catalog: Option<PathBuf>,
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    /// 0 derives a seed from the clock.
    pub seed: u64,
    /// Decisions that can be undone; 0 disables rollback.
    pub rollback_depth: usize,
    pub use_entropy: bool,
    pub skip_initial_check: bool,
    /// Tile pinned to every cell on the X/Z border before collapsing.
    pub border_tile: Option<String>,
    /// Tiles removed from every cell before collapsing.
    pub excluded_tiles: Vec<String>,
    /// Where the rendered grid goes; stdout if unset.
    pub output: Option<PathBuf>,
    pub color: bool,
    pub log_level: GlobalLogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: None,
            width: 10,
            height: 1,
            depth: 10,
            seed: 0,
            rollback_depth: 1,
            use_entropy: true,
            skip_initial_check: false,
            border_tile: None,
            excluded_tiles: Vec::new(),
            output: None,
            color: true,
            log_level: GlobalLogLevel::Info,
        }
    }
}

/// Command-line flags. Anything left unset falls through to the file,
/// environment and defaults.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Collapses a 3D grid of tiles under adjacency constraints", long_about = None)]
pub struct Cli {
    /// Path to the tile catalog (RON or JSON).
    #[arg(short, long, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// TOML file with default settings.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Width of the output grid (X).
    #[arg(long)]
    pub width: Option<usize>,

    /// Height of the output grid (Y, the vertical axis).
    #[arg(long)]
    pub height: Option<usize>,

    /// Depth of the output grid (Z).
    #[arg(long)]
    pub depth: Option<usize>,

    /// Seed for the random number generator; 0 uses the clock.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of decisions rollback can undo; 0 disables it.
    #[arg(long)]
    pub rollback_depth: Option<usize>,

    /// Pick cells with the most candidates instead of the lowest entropy.
    #[arg(long)]
    pub no_entropy: bool,

    /// Skip the consistency sweep when the grid is built.
    #[arg(long)]
    pub skip_initial_check: bool,

    /// Tile name to place on every border cell.
    #[arg(long, value_name = "TILE")]
    pub border_tile: Option<String>,

    /// Tile name to remove from the whole grid. Repeatable.
    #[arg(long = "exclude", value_name = "TILE")]
    pub excluded_tiles: Vec<String>,

    /// Write the rendered grid to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Disable coloured output.
    #[arg(long)]
    pub no_color: bool,

    /// Global log level.
    #[arg(long, value_enum)]
    pub log_level: Option<GlobalLogLevel>,
}

/// The flags that were actually given, shaped like `AppConfig`.
#[derive(Serialize, Default)]
struct CliOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    catalog: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    depth: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rollback_depth: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    use_entropy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    skip_initial_check: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    border_tile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    excluded_tiles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_level: Option<GlobalLogLevel>,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            catalog: self.catalog.clone(),
            width: self.width,
            height: self.height,
            depth: self.depth,
            seed: self.seed,
            rollback_depth: self.rollback_depth,
            use_entropy: self.no_entropy.then_some(false),
            skip_initial_check: self.skip_initial_check.then_some(true),
            border_tile: self.border_tile.clone(),
            excluded_tiles: (!self.excluded_tiles.is_empty()).then(|| self.excluded_tiles.clone()),
            output: self.output.clone(),
            color: self.no_color.then_some(false),
            log_level: self.log_level,
        }
    }

    /// Merges every configuration layer into an `AppConfig`.
    ///
    /// # Errors
    ///
    /// `AppError::Config` if a layer cannot be read or a value has the wrong type,
    /// or if the merged settings are unusable.
    pub fn resolve(&self) -> Result<AppConfig, AppError> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
        if let Some(path) = &self.config {
            if !path.exists() {
                return Err(AppError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }
        let config: AppConfig = figment
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Serialized::defaults(self.overrides()))
            .extract()
            .map_err(|e| AppError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

impl AppConfig {
    /// Checks the settings that no layer can be trusted to get right.
    ///
    /// # Errors
    ///
    /// `AppError::Config` for a missing catalog or a zero dimension.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.catalog.is_none() {
            return Err(AppError::Config(
                "No catalog given (use --catalog, the config file or QUANTUM_FORGE_CATALOG)"
                    .to_string(),
            ));
        }
        if self.width == 0 || self.height == 0 || self.depth == 0 {
            return Err(AppError::Config(format!(
                "Grid dimensions must be positive, got {}x{}x{}",
                self.width, self.height, self.depth
            )));
        }
        Ok(())
    }
}
