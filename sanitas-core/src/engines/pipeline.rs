// sanitas-core/src/engines/pipeline.rs
//! Composition of custom-rule classes into an ordered pipeline.
//!
//! Every constraint registration that shares the rule's custom-rule class
//! becomes one stage, in registration order. Stages are folded left to right:
//! each receives the previous stage's output, while the context keeps the
//! value the pipeline started from.

use std::sync::Arc;

use log::debug;

use crate::container::ConstraintResolver;
use crate::engine::{SanitizationArguments, SanitizerConstraint};
use crate::errors::SanitasError;
use crate::metadata::{ConstraintRegistration, ConstraintType, MetadataRegistry};
use crate::value::Value;

struct Stage<'r> {
    registration: &'r ConstraintRegistration,
    instance: Arc<dyn SanitizerConstraint>,
}

pub struct ConstraintPipeline<'r> {
    stages: Vec<Stage<'r>>,
}

impl<'r> ConstraintPipeline<'r> {
    /// Resolves every registration of `rule_class` into a live stage.
    pub fn resolve(
        registry: &'r MetadataRegistry,
        resolver: &ConstraintResolver,
        rule_class: ConstraintType,
    ) -> Result<Self, SanitasError> {
        let stages = registry
            .lookup_constraints(rule_class)
            .into_iter()
            .map(|registration| {
                if registration.is_async {
                    // The engine is synchronous; async registrations run inline.
                    debug!("Constraint '{}' is flagged async and runs synchronously.", registration.name);
                }
                let instance = resolver
                    .resolve(registration.rule_class)?
                    .ok_or_else(|| SanitasError::UnresolvedConstraint(registration.name.clone()))?;
                Ok(Stage { registration, instance })
            })
            .collect::<Result<Vec<_>, SanitasError>>()?;

        if stages.is_empty() {
            debug!("No constraint registered for '{}'; values pass through.", rule_class.short_name());
        }
        Ok(Self { stages })
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Folds `value` through every stage.
    pub fn run(&self, value: Value, args: &SanitizationArguments<'_>) -> Result<Value, SanitasError> {
        self.stages.iter().try_fold(value, |acc, stage| {
            stage
                .instance
                .sanitize(acc, args)
                .map_err(|source| SanitasError::ConstraintFailed {
                    name: stage.registration.name.clone(),
                    property: args.property.to_string(),
                    source,
                })
        })
    }
}
