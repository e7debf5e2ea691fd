// sanitas-core/src/engines/mod.rs
//! The sanitization engine and the custom-rule pipeline it drives.
//!
//! `sanitizer` walks an object's resolved rules and applies them in place;
//! `pipeline` composes the constraint registrations of a custom-rule class.
//!
//! # License
//! MIT OR Apache-2.0

pub mod pipeline;
pub mod sanitizer;
