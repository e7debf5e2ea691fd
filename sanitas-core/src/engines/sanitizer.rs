// sanitas-core/src/engines/sanitizer.rs
//! The sanitization engine: resolves the rules of an object's class and applies
//! them to the object's fields in place.
//! License: MIT OR APACHE 2.0

use std::sync::Arc;

use log::{debug, log_enabled, Level};

use crate::container::ConstraintResolver;
use crate::debug_log::log_rule_applied_debug;
use crate::engine::SanitizationArguments;
use crate::engines::pipeline::ConstraintPipeline;
use crate::errors::SanitasError;
use crate::metadata::{MetadataRegistry, RuleKind, RuleRecord};
use crate::sanitizers::transforms;
use crate::value::{Object, Value};

const LOG_TARGET: &str = "sanitas_core::engine";

#[derive(Debug)]
pub struct Sanitizer {
    registry: Arc<MetadataRegistry>,
    resolver: ConstraintResolver,
}

impl Sanitizer {
    /// Freezes `registry` and pairs it with a resolver that only uses default
    /// construction.
    pub fn new(registry: MetadataRegistry) -> Self {
        Self::with_resolver(registry, ConstraintResolver::new())
    }

    pub fn with_resolver(registry: MetadataRegistry, resolver: ConstraintResolver) -> Self {
        Self::from_shared(Arc::new(registry), resolver)
    }

    pub fn from_shared(registry: Arc<MetadataRegistry>, resolver: ConstraintResolver) -> Self {
        Self { registry, resolver }
    }

    pub fn registry(&self) -> &MetadataRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &ConstraintResolver {
        &self.resolver
    }

    /// Applies every rule that resolves for the object's class, in order.
    ///
    /// Rules whose property is absent or falsy when sanitization starts are
    /// skipped. Errors abort the run; rules already applied stay applied.
    pub fn sanitize(&self, object: &mut Object) -> Result<(), SanitasError> {
        let registry = Arc::clone(&self.registry);
        let target_name = registry.class_name(object.class()).unwrap_or_default();

        let rules: Vec<&RuleRecord> = registry
            .lookup(object.class())
            .into_iter()
            .filter(|rule| object.get(rule.property_name()).is_some_and(Value::is_truthy))
            .collect();

        debug!(target: LOG_TARGET, "Sanitizing {} with {} applicable rule(s).", target_name, rules.len());

        for rule in rules {
            match rule.kind() {
                RuleKind::Nested => self.apply_nested(object, rule)?,
                RuleKind::Custom => self.apply_custom(object, rule, target_name)?,
                kind => self.map_field(object, rule, target_name, |value, _| {
                    transforms::apply(kind, value, rule.first_constraint())
                })?,
            }
        }
        Ok(())
    }

    /// Same as [`Sanitizer::sanitize`], resolving with the object. Nothing is
    /// awaited, constraints flagged async included.
    pub async fn sanitize_async(&self, mut object: Object) -> Result<Object, SanitasError> {
        self.sanitize(&mut object)?;
        Ok(object)
    }

    /// Recurses into a value reached through a nested rule: every object found
    /// directly in it, or as an element of an array or set, or as a map value,
    /// is sanitized. Other values are left alone.
    pub fn sanitize_nested(&self, value: &mut Value) -> Result<(), SanitasError> {
        match value {
            Value::Array(items) | Value::Set(items) => {
                for item in items.iter_mut() {
                    if let Value::Object(object) = item {
                        self.sanitize(object)?;
                    }
                }
            }
            Value::Map(map) => {
                for item in map.values_mut() {
                    if let Value::Object(object) = item {
                        self.sanitize(object)?;
                    }
                }
            }
            Value::Object(object) => self.sanitize(object)?,
            _ => {}
        }
        Ok(())
    }

    fn apply_nested(&self, object: &mut Object, rule: &RuleRecord) -> Result<(), SanitasError> {
        let Some(value) = object.get_mut(rule.property_name()) else {
            return Ok(());
        };
        if !rule.each() {
            return self.sanitize_nested(value);
        }
        match value {
            Value::Array(items) => items.iter_mut().try_for_each(|item| self.sanitize_nested(item)),
            _ => Ok(()),
        }
    }

    fn apply_custom(&self, object: &mut Object, rule: &RuleRecord, target_name: &str) -> Result<(), SanitasError> {
        let rule_class = rule
            .custom_rule_class()
            .ok_or_else(|| SanitasError::MissingConstraintClass(rule.property_name().to_string()))?;

        let mut pipeline: Option<ConstraintPipeline<'_>> = None;
        self.map_field(object, rule, target_name, |value, owner| {
            if pipeline.is_none() {
                pipeline = Some(ConstraintPipeline::resolve(&self.registry, &self.resolver, rule_class)?);
            }
            let args = SanitizationArguments {
                value: &value,
                constraints: rule.constraints(),
                target_name,
                object: owner,
                property: rule.property_name(),
            };
            match &pipeline {
                Some(p) => p.run(value.clone(), &args),
                None => Ok(value.clone()),
            }
        })
    }

    /// Reads the field, passes it (or each element, for `each` rules on an
    /// array) through `f`, and writes the result back. `each` rules leave
    /// non-array values untouched.
    fn map_field<F>(&self, object: &mut Object, rule: &RuleRecord, target_name: &str, mut f: F) -> Result<(), SanitasError>
    where
        F: FnMut(Value, &Object) -> Result<Value, SanitasError>,
    {
        let property = rule.property_name();
        let Some(current) = object.get(property).cloned() else {
            return Ok(());
        };
        let before = log_enabled!(target: LOG_TARGET, Level::Debug).then(|| current.clone());

        let owner: &Object = object;
        let sanitized = if rule.each() {
            match current {
                Value::Array(items) => Value::Array(
                    items
                        .into_iter()
                        .map(|item| f(item, owner))
                        .collect::<Result<Vec<_>, _>>()?,
                ),
                other => {
                    debug!(
                        target: LOG_TARGET,
                        "{}.{}: '{}' expects an array for each-element rules, got {}; left unchanged.",
                        target_name,
                        property,
                        rule.kind(),
                        other.type_name()
                    );
                    return Ok(());
                }
            }
        } else {
            f(current, owner)?
        };

        if let Some(before) = before {
            log_rule_applied_debug(target_name, property, rule.kind(), &before, &sanitized);
        }
        object.set(property, sanitized);
        Ok(())
    }
}
