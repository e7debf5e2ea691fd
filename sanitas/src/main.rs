// sanitas/src/main.rs
//! Sanitas entry point.

use anyhow::Result;
use clap::Parser;

use sanitas::cli::{Cli, Commands};
use sanitas::commands::{rules, sanitize};
use sanitas::logger;

fn main() -> Result<()> {
    let args = Cli::parse();
    logger::init_logger(logger::level_for(args.quiet, args.debug));

    match args.command {
        Commands::Sanitize(cmd) => sanitize::run_sanitize(&cmd),
        Commands::Rules(cmd) => rules::run_rules(&cmd),
    }
}
