// sanitas/src/logger.rs
//! Logger setup for the CLI. Logs go to stderr so stdout stays clean JSON.

use env_logger::{Env, Target};
use log::LevelFilter;

/// Maps the global flags to a level override. `None` leaves `RUST_LOG` in charge.
pub fn level_for(quiet: bool, debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Off)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}

/// Initializes `env_logger`, defaulting to `warn` when `RUST_LOG` is unset.
/// Calling it twice is harmless.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.target(Target::Stderr).format_timestamp(None).try_init().ok();
}
