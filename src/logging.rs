//! Logging setup for the application.

use crate::config::GlobalLogLevel;
use env_logger::{Builder, Env};
use log::LevelFilter;

impl From<GlobalLogLevel> for LevelFilter {
    fn from(level: GlobalLogLevel) -> Self {
        match level {
            GlobalLogLevel::Trace => Self::Trace,
            GlobalLogLevel::Debug => Self::Debug,
            GlobalLogLevel::Info => Self::Info,
            GlobalLogLevel::Warn => Self::Warn,
            GlobalLogLevel::Error => Self::Error,
        }
    }
}

/// Initializes the global logger.
///
/// `level` applies to every module. Directives in `RUST_LOG` are parsed
/// afterwards, so a per-module entry there (`RUST_LOG=wfc_core=trace`) still
/// takes effect. Calling this twice is harmless; the second call only logs.
pub fn init_logger(level: GlobalLogLevel) {
    let mut builder = Builder::new();
    builder.filter_level(level.into());
    builder.parse_env(Env::default());

    if builder.try_init().is_err() {
        log::debug!("Logger already initialized; keeping the existing one");
        return;
    }
    log::debug!("Logger initialized with global log level: {level:?}");
}
