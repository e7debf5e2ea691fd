// sanitas-core/tests/resolver_integration_tests.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, Result};

use sanitas_core::{
    ConstraintResolver, ConstraintType, Container, ContainerOptions, MetadataRegistry, Object, SanitasError,
    SanitizationArguments, SanitizationOptions, Sanitizer, SanitizerConstraint, Value,
};

/// Prefixes string values with its tag. The default instance uses `default`.
struct Tagger {
    tag: String,
}

impl Default for Tagger {
    fn default() -> Self {
        Self { tag: "default".to_string() }
    }
}

impl SanitizerConstraint for Tagger {
    fn sanitize(&self, value: Value, _args: &SanitizationArguments<'_>) -> anyhow::Result<Value> {
        Ok(Value::String(format!("{}:{}", self.tag, value.to_js_string())))
    }
}

enum Behaviour {
    Provide,
    Nothing,
    Fail,
}

struct TestContainer {
    behaviour: Behaviour,
    calls: AtomicUsize,
}

impl TestContainer {
    fn new(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self { behaviour, calls: AtomicUsize::new(0) })
    }
}

impl Container for TestContainer {
    fn get(&self, _rule_class: ConstraintType) -> anyhow::Result<Option<Arc<dyn SanitizerConstraint>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.behaviour {
            Behaviour::Provide => Ok(Some(Arc::new(Tagger { tag: "container".to_string() }))),
            Behaviour::Nothing => Ok(None),
            Behaviour::Fail => Err(anyhow!("container unavailable")),
        }
    }
}

fn sanitizer_with(container: Option<Arc<TestContainer>>, options: ContainerOptions) -> Result<(Sanitizer, Object)> {
    let mut registry = MetadataRegistry::new();
    let post = registry.define_class("Post", None)?;
    let tagger = registry.register_constraint_class::<Tagger>(None, false);
    registry.register_custom_rule(post, "text", tagger, vec![], SanitizationOptions::default())?;

    let mut resolver = ConstraintResolver::new();
    if let Some(container) = container {
        resolver.use_container(container, options);
    }
    Ok((Sanitizer::with_resolver(registry, resolver), Object::new(post).with("text", "hi")))
}

#[test]
fn test_default_construction_without_container() -> Result<()> {
    let (sanitizer, mut object) = sanitizer_with(None, ContainerOptions::default())?;
    sanitizer.sanitize(&mut object)?;
    assert_eq!(object.get("text"), Some(&Value::from("default:hi")));
    Ok(())
}

#[test]
fn test_user_container_instance_wins() -> Result<()> {
    let container = TestContainer::new(Behaviour::Provide);
    let (sanitizer, mut object) = sanitizer_with(Some(Arc::clone(&container)), ContainerOptions::default())?;
    sanitizer.sanitize(&mut object)?;
    assert_eq!(object.get("text"), Some(&Value::from("container:hi")));
    assert_eq!(container.calls.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_container_returning_nothing_without_fallback_is_unresolved() -> Result<()> {
    let container = TestContainer::new(Behaviour::Nothing);
    let (sanitizer, mut object) = sanitizer_with(Some(container), ContainerOptions::default())?;
    let err = sanitizer.sanitize(&mut object).unwrap_err();
    assert!(matches!(err, SanitasError::UnresolvedConstraint(ref name) if name == "Tagger"));
    assert_eq!(object.get("text"), Some(&Value::from("hi")));
    Ok(())
}

#[test]
fn test_container_returning_nothing_with_fallback_defaults() -> Result<()> {
    let container = TestContainer::new(Behaviour::Nothing);
    let options = ContainerOptions { fallback: true, fallback_on_errors: false };
    let (sanitizer, mut object) = sanitizer_with(Some(container), options)?;
    sanitizer.sanitize(&mut object)?;
    assert_eq!(object.get("text"), Some(&Value::from("default:hi")));
    Ok(())
}

#[test]
fn test_container_error_propagates_without_fallback_on_errors() -> Result<()> {
    let container = TestContainer::new(Behaviour::Fail);
    let options = ContainerOptions { fallback: true, fallback_on_errors: false };
    let (sanitizer, mut object) = sanitizer_with(Some(container), options)?;
    let err = sanitizer.sanitize(&mut object).unwrap_err();
    assert!(matches!(err, SanitasError::Resolver { .. }));
    assert!(err.to_string().contains("container unavailable"));
    Ok(())
}

#[test]
fn test_container_error_with_fallback_on_errors_defaults() -> Result<()> {
    let container = TestContainer::new(Behaviour::Fail);
    let options = ContainerOptions { fallback: false, fallback_on_errors: true };
    let (sanitizer, mut object) = sanitizer_with(Some(container), options)?;
    sanitizer.sanitize(&mut object)?;
    assert_eq!(object.get("text"), Some(&Value::from("default:hi")));
    Ok(())
}

#[test]
fn test_default_instances_are_reused_across_runs() -> Result<()> {
    let resolver = ConstraintResolver::new();
    let ty = ConstraintType::of::<Tagger>();
    let first = resolver.resolve(ty)?.ok_or_else(|| anyhow!("no instance"))?;
    let second = resolver.resolve(ty)?.ok_or_else(|| anyhow!("no instance"))?;
    assert!(Arc::ptr_eq(&first, &second));
    Ok(())
}
