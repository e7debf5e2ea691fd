// sanitas/src/commands/mod.rs
//! Command implementations, one module per subcommand.

pub mod rules;
pub mod sanitize;
