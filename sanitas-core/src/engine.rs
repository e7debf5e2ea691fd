// sanitas-core/src/engine.rs
//! Defines the `SanitizerConstraint` trait and the context handed to it.
//!
//! Custom sanitization logic plugs into the engine through this trait. A type
//! implementing it is registered as a custom-rule class
//! ([`crate::MetadataRegistry::register_constraint_class`]), resolved into an
//! instance at sanitization time ([`crate::container::ConstraintResolver`]), and
//! then called for every field that declares it.
//!
//! License: MIT OR APACHE 2.0

use anyhow::Result;

use crate::value::{Object, Value};

/// Everything a custom rule can see about the value it is sanitizing.
#[derive(Debug, Clone, Copy)]
pub struct SanitizationArguments<'a> {
    /// The value as it was before the first stage of the pipeline ran.
    pub value: &'a Value,
    /// Constraints declared alongside the rule, passed through verbatim.
    pub constraints: &'a [Value],
    /// Display name of the class being sanitized.
    pub target_name: &'a str,
    /// The object that owns the property.
    pub object: &'a Object,
    /// Name of the property being sanitized.
    pub property: &'a str,
}

/// A user-supplied sanitization step.
///
/// When several constraint classes are registered under the same identity,
/// each stage receives the previous stage's output as `value` while
/// `args.value` keeps the original.
pub trait SanitizerConstraint: Send + Sync {
    fn sanitize(&self, value: Value, args: &SanitizationArguments<'_>) -> Result<Value>;
}

impl<F> SanitizerConstraint for F
where
    F: Fn(Value, &SanitizationArguments<'_>) -> Result<Value> + Send + Sync,
{
    fn sanitize(&self, value: Value, args: &SanitizationArguments<'_>) -> Result<Value> {
        self(value, args)
    }
}
