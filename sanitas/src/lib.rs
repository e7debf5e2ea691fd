// sanitas/src/lib.rs
//! # Sanitas CLI Application
//!
//! Command-line front end for `sanitas-core`: loads a YAML schema, sanitizes
//! JSON documents against one of its classes, and prints resolved rule lists.

pub mod cli;
pub mod commands;
pub mod constraints;
pub mod logger;
