// sanitas/src/constraints.rs
//! Custom constraints the CLI registers for schemas to use by name.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::{Context, Result, anyhow};
use log::debug;
use regex::Regex;

use sanitas_core::{MetadataRegistry, SanitizationArguments, SanitizerConstraint, Value};

/// Name schemas use for [`ReplaceConstraint`].
pub const REPLACE: &str = "replace";

/// Regex replace-all on string values. Constraints: `[pattern, replacement]`;
/// the replacement may use `$1`-style group references and defaults to `""`.
#[derive(Default)]
pub struct ReplaceConstraint {
    compiled: RwLock<HashMap<String, Arc<Regex>>>,
}

impl ReplaceConstraint {
    fn regex(&self, pattern: &str) -> Result<Arc<Regex>> {
        if let Some(regex) = self.compiled.read().unwrap_or_else(PoisonError::into_inner).get(pattern) {
            return Ok(Arc::clone(regex));
        }
        let regex = Arc::new(
            Regex::new(pattern).with_context(|| format!("Invalid pattern for '{}': {}", REPLACE, pattern))?,
        );
        debug!("Compiled '{}' pattern: {}", REPLACE, pattern);
        self.compiled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pattern.to_string(), Arc::clone(&regex));
        Ok(regex)
    }
}

impl SanitizerConstraint for ReplaceConstraint {
    fn sanitize(&self, value: Value, args: &SanitizationArguments<'_>) -> Result<Value> {
        let text = match value {
            Value::String(text) => text,
            other => return Ok(other),
        };
        let pattern = args
            .constraints
            .first()
            .and_then(Value::as_str)
            .ok_or_else(|| anyhow!("'{}' on '{}' needs a pattern as its first constraint", REPLACE, args.property))?;
        let replacement = args.constraints.get(1).map(Value::to_js_string).unwrap_or_default();

        let regex = self.regex(pattern)?;
        Ok(Value::String(regex.replace_all(&text, replacement.as_str()).into_owned()))
    }
}

/// A registry holding every constraint the CLI ships.
pub fn stock_registry() -> MetadataRegistry {
    let mut registry = MetadataRegistry::new();
    registry.register_constraint_class::<ReplaceConstraint>(Some(REPLACE), false);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use sanitas_core::Object;

    fn run(constraints: &[Value], input: Value) -> Result<Value> {
        let registry = stock_registry();
        let object = Object::new(registry.object_class());
        let args = SanitizationArguments {
            value: &input,
            constraints,
            target_name: "Object",
            object: &object,
            property: "text",
        };
        ReplaceConstraint::default().sanitize(input.clone(), &args)
    }

    #[test]
    fn test_replace_all_occurrences() -> Result<()> {
        let out = run(&[Value::from("o"), Value::from("w")], Value::from("Hello world"))?;
        assert_eq!(out, Value::from("Hellw wwrld"));
        Ok(())
    }

    #[test]
    fn test_group_references_and_default_replacement() -> Result<()> {
        let out = run(&[Value::from(r"(\w+)@(\w+)"), Value::from("$2 at $1")], Value::from("me@home"))?;
        assert_eq!(out, Value::from("home at me"));
        let out = run(&[Value::from(r"\d")], Value::from("a1b2"))?;
        assert_eq!(out, Value::from("ab"));
        Ok(())
    }

    #[test]
    fn test_non_strings_pass_through_and_bad_patterns_fail() {
        assert_eq!(run(&[Value::from("x")], Value::Number(3.0)).unwrap(), Value::Number(3.0));
        assert!(run(&[], Value::from("x")).is_err());
        assert!(run(&[Value::from("(")], Value::from("x")).is_err());
    }

    #[test]
    fn test_stock_registry_names_replace() {
        let registry = stock_registry();
        assert!(registry.find_constraint(REPLACE).is_some());
    }
}
