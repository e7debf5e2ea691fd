//! errors.rs - Custom error types for the sanitas-core library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

use crate::metadata::{ClassRef, RuleKind};

/// This enum represents all possible error types in the `sanitas-core` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SanitasError {
    #[error("Wrong sanitization type is supplied {0}")]
    UnknownRuleKind(String),

    #[error("Wrong sanitization type is supplied {kind} for value {value}")]
    WrongSanitizationType { kind: RuleKind, value: String },

    #[error("Class {0} is not defined in this registry")]
    UnknownClass(ClassRef),

    #[error("Rule on property '{0}' has kind 'customSanitization' but names no constraint class")]
    MissingConstraintClass(String),

    #[error("Failed to apply '{kind}' sanitization: {message}")]
    Transform { kind: RuleKind, message: String },

    #[error("Failed to resolve sanitizer constraint '{name}': {source}")]
    Resolver {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Container returned no instance for sanitizer constraint '{0}'")]
    UnresolvedConstraint(String),

    #[error("Sanitizer constraint '{name}' failed on property '{property}': {source}")]
    ConstraintFailed {
        name: String,
        property: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),
}

impl SanitasError {
    pub(crate) fn transform(kind: RuleKind, message: impl Into<String>) -> Self {
        SanitasError::Transform { kind, message: message.into() }
    }
}
