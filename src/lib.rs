//! Command-line front end for the quantum grid solver.

pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod run;

use clap::Parser;
use config::Cli;

/// Parses the command line, sets up logging and runs the solver once.
///
/// # Errors
///
/// Any configuration, loading, solving or rendering error.
pub fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.resolve()?;
    logging::init_logger(config.log_level);
    if !config.color {
        colored::control::set_override(false);
    }

    log::info!("Quantum Forge starting");
    log::debug!("Resolved config: {config:?}");

    let summary = run::run(&config)?;
    log::info!(
        "Collapsed a {:?} grid over {} states (seed {}): {:?}",
        summary.dimensions,
        summary.states,
        summary.seed,
        summary.status
    );
    Ok(())
}
