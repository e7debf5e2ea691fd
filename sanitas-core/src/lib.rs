// sanitas-core/src/lib.rs
//! # Sanitas Core Library
//!
//! `sanitas-core` provides declarative, per-field sanitization of object
//! instances. Rules are recorded against classes in a [`MetadataRegistry`],
//! resolved through the class hierarchy at sanitization time, and applied in
//! place by a [`Sanitizer`].
//!
//! ## Modules
//!
//! * `metadata`: Class hierarchy, rule records and the registry that resolves them.
//! * `value`: The dynamic [`Value`] model and class instances ([`Object`]).
//! * `sanitizers`: The pure transforms behind every built-in rule kind.
//! * `validators`: String predicates the transforms rely on.
//! * `engine`: Defines the [`SanitizerConstraint`] trait for custom rules.
//! * `container`: Resolution of custom-rule classes into live instances.
//! * `engines`: The sanitization engine and the custom-rule pipeline.
//! * `config`: YAML schemas declaring classes and their field rules.
//! * `headless`: One-shot sanitization of JSON documents against a schema.
//!
//! ## Public API
//!
//! **Registration**
//!
//! * [`MetadataRegistry::define_class`]: Declares a class and its parent.
//! * [`MetadataRegistry::register_rule`]: Records a built-in or nested rule.
//! * [`MetadataRegistry::register_custom_rule`]: Records a rule backed by a constraint class.
//! * [`MetadataRegistry::register_constraint_class`]: Registers a [`SanitizerConstraint`] type.
//!
//! **Sanitization**
//!
//! * [`Sanitizer::sanitize`]: Sanitizes an object in place.
//! * [`Sanitizer::sanitize_async`]: The same, as a future resolving with the object.
//! * [`ConstraintResolver::use_container`]: Plugs in a user [`Container`].
//!
//! **Schemas & Headless Mode**
//!
//! * [`SchemaConfig::load_from_file`]: Loads and validates a YAML schema.
//! * [`headless_sanitize_json`]: Sanitizes a JSON document in a single call.
//!
//! ## Usage Example
//!
//! ```rust
//! use sanitas_core::{MetadataRegistry, Object, RuleKind, SanitizationOptions, Sanitizer, Value};
//!
//! fn main() -> Result<(), sanitas_core::SanitasError> {
//!     let mut registry = MetadataRegistry::new();
//!     let user = registry.define_class("User", None)?;
//!     registry.register_rule(RuleKind::Trim, user, "name", vec![], SanitizationOptions::default())?;
//!     registry.register_rule(RuleKind::ToInt, user, "age", vec![], SanitizationOptions::default())?;
//!
//!     let sanitizer = Sanitizer::new(registry);
//!     let mut object = Object::new(user).with("name", "  Ada ").with("age", "36");
//!     sanitizer.sanitize(&mut object)?;
//!
//!     assert_eq!(object.get("name"), Some(&Value::from("Ada")));
//!     assert_eq!(object.get("age"), Some(&Value::Number(36.0)));
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Registration and sanitization return [`SanitasError`]. Schema loading and
//! the headless wrappers use `anyhow::Error` with context.
//!
//! ---
//! License: MIT OR Apache-2.0

pub mod config;
pub mod container;
pub mod debug_log;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod headless;
pub mod metadata;
pub mod sanitizers;
pub mod validators;
pub mod value;

/// Re-exports the schema types used to declare classes in YAML.
pub use config::{ClassConfig, FieldRule, SchemaConfig, Shape};

/// Re-exports the custom error type for clear error reporting.
pub use errors::SanitasError;

/// Re-exports the custom-rule trait and the context handed to it.
pub use engine::{SanitizationArguments, SanitizerConstraint};

pub use container::{ConstraintResolver, Container, ContainerOptions, DefaultContainer};

pub use engines::pipeline::ConstraintPipeline;
pub use engines::sanitizer::Sanitizer;

/// Re-exports the registry and the records it stores.
pub use metadata::{
    ClassRef,
    ConstraintRegistration,
    ConstraintType,
    MetadataRegistry,
    RuleKind,
    RuleRecord,
    SanitizationOptions,
    ROOT_CLASS_NAME,
};

pub use value::{Object, Value};

/// Re-exports types and functions for one-shot, non-interactive use.
pub use headless::{headless_sanitize_json, JsonSanitizer};

pub use debug_log::redact_sensitive;
