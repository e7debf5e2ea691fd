// sanitas-core/src/container.rs
//! Resolution of custom-rule classes into live instances.
//!
//! A [`ConstraintResolver`] asks an optional user [`Container`] first and falls
//! back to the [`DefaultContainer`], which builds one instance per class from
//! `Default` and memoizes it. The two fallback modes are independent:
//!
//! * `fallback`: the user container returned no instance.
//! * `fallback_on_errors`: the user container returned an error.
//!
//! A user container that returns no instance without `fallback` set yields
//! `Ok(None)` from [`ConstraintResolver::resolve`]; it is not defaulted.
//!
//! License: MIT OR Apache-2.0

use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use log::{debug, warn};

use crate::engine::SanitizerConstraint;
use crate::errors::SanitasError;
use crate::metadata::ConstraintType;

/// A user-supplied source of constraint instances.
pub trait Container: Send + Sync {
    fn get(&self, rule_class: ConstraintType) -> anyhow::Result<Option<Arc<dyn SanitizerConstraint>>>;
}

/// Fallback behaviour applied to a user container.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerOptions {
    pub fallback: bool,
    pub fallback_on_errors: bool,
}

/// Builds each constraint class once and hands out the shared instance.
#[derive(Default)]
pub struct DefaultContainer {
    instances: RwLock<HashMap<TypeId, Arc<dyn SanitizerConstraint>>>,
}

impl DefaultContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, rule_class: ConstraintType) -> Arc<dyn SanitizerConstraint> {
        {
            let instances = self.instances.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(instance) = instances.get(&rule_class.type_id()) {
                return Arc::clone(instance);
            }
        }

        let mut instances = self.instances.write().unwrap_or_else(PoisonError::into_inner);
        let instance = instances.entry(rule_class.type_id()).or_insert_with(|| {
            debug!("Constructing default instance of '{}'", rule_class.short_name());
            rule_class.construct()
        });
        Arc::clone(instance)
    }

    pub fn len(&self) -> usize {
        self.instances.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for DefaultContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultContainer").field("instances", &self.len()).finish()
    }
}

#[derive(Default)]
pub struct ConstraintResolver {
    user: Option<Arc<dyn Container>>,
    options: ContainerOptions,
    default: DefaultContainer,
}

impl ConstraintResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(container: Arc<dyn Container>, options: ContainerOptions) -> Self {
        let mut resolver = Self::new();
        resolver.use_container(container, options);
        resolver
    }

    /// Installs a user container, replacing any previous one.
    pub fn use_container(&mut self, container: Arc<dyn Container>, options: ContainerOptions) {
        self.user = Some(container);
        self.options = options;
    }

    pub fn options(&self) -> ContainerOptions {
        self.options
    }

    pub fn resolve(
        &self,
        rule_class: ConstraintType,
    ) -> Result<Option<Arc<dyn SanitizerConstraint>>, SanitasError> {
        if let Some(user) = &self.user {
            match user.get(rule_class) {
                Ok(Some(instance)) => return Ok(Some(instance)),
                Ok(None) if !self.options.fallback => return Ok(None),
                Ok(None) => {
                    debug!(
                        "Container returned nothing for '{}', using default construction.",
                        rule_class.short_name()
                    );
                }
                Err(source) if !self.options.fallback_on_errors => {
                    return Err(SanitasError::Resolver { name: rule_class.short_name().to_string(), source });
                }
                Err(e) => {
                    warn!(
                        "Container failed for '{}' ({}), using default construction.",
                        rule_class.short_name(),
                        e
                    );
                }
            }
        }

        Ok(Some(self.default.get(rule_class)))
    }
}

impl fmt::Debug for ConstraintResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintResolver")
            .field("user", &self.user.is_some())
            .field("options", &self.options)
            .field("default", &self.default)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SanitizationArguments;
    use crate::value::Value;
    use anyhow::anyhow;

    #[derive(Default)]
    struct Upper;

    impl SanitizerConstraint for Upper {
        fn sanitize(&self, value: Value, _args: &SanitizationArguments<'_>) -> anyhow::Result<Value> {
            Ok(match value {
                Value::String(s) => Value::String(s.to_uppercase()),
                other => other,
            })
        }
    }

    struct Empty;

    impl Container for Empty {
        fn get(&self, _: ConstraintType) -> anyhow::Result<Option<Arc<dyn SanitizerConstraint>>> {
            Ok(None)
        }
    }

    struct Failing;

    impl Container for Failing {
        fn get(&self, _: ConstraintType) -> anyhow::Result<Option<Arc<dyn SanitizerConstraint>>> {
            Err(anyhow!("container is down"))
        }
    }

    #[test]
    fn test_default_container_memoizes() {
        let resolver = ConstraintResolver::new();
        let ty = ConstraintType::of::<Upper>();
        let first = resolver.resolve(ty).unwrap().unwrap();
        let second = resolver.resolve(ty).unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_empty_container_without_fallback_returns_none() {
        let resolver = ConstraintResolver::with_container(Arc::new(Empty), ContainerOptions::default());
        assert!(resolver.resolve(ConstraintType::of::<Upper>()).unwrap().is_none());
    }

    #[test]
    fn test_empty_container_with_fallback_defaults() {
        let options = ContainerOptions { fallback: true, fallback_on_errors: false };
        let resolver = ConstraintResolver::with_container(Arc::new(Empty), options);
        assert!(resolver.resolve(ConstraintType::of::<Upper>()).unwrap().is_some());
    }

    #[test]
    fn test_failing_container_propagates_unless_configured() {
        let resolver = ConstraintResolver::with_container(Arc::new(Failing), ContainerOptions::default());
        let err = resolver.resolve(ConstraintType::of::<Upper>()).err().unwrap();
        assert!(matches!(err, SanitasError::Resolver { ref name, .. } if name == "Upper"));

        // `fallback` alone does not cover errors.
        let options = ContainerOptions { fallback: true, fallback_on_errors: false };
        let resolver = ConstraintResolver::with_container(Arc::new(Failing), options);
        assert!(resolver.resolve(ConstraintType::of::<Upper>()).is_err());

        let options = ContainerOptions { fallback: false, fallback_on_errors: true };
        let resolver = ConstraintResolver::with_container(Arc::new(Failing), options);
        assert!(resolver.resolve(ConstraintType::of::<Upper>()).unwrap().is_some());
    }
}
