// File: sanitas-core/src/headless.rs

//! `headless.rs`
//! Convenience wrappers for sanitizing JSON documents without building objects
//! by hand.
//!
//! A [`JsonSanitizer`] binds a [`SchemaConfig`] to a sanitizer. JSON objects are
//! materialized into [`Object`]s of the requested class; the `class`/`shape`
//! hints of `nested` rules decide which sub-documents become typed objects.

use anyhow::{anyhow, bail, Result};
use indexmap::IndexMap;
use log::debug;

use crate::config::{SchemaConfig, Shape};
use crate::container::ConstraintResolver;
use crate::engines::sanitizer::Sanitizer;
use crate::metadata::{ClassRef, MetadataRegistry, RuleKind};
use crate::value::{Object, Value};

pub struct JsonSanitizer {
    schema: SchemaConfig,
    classes: IndexMap<String, ClassRef>,
    sanitizer: Sanitizer,
}

impl JsonSanitizer {
    /// Registers `schema` into `registry` and freezes the result.
    ///
    /// Constraint classes referenced by `custom` rules must already be registered
    /// in `registry`.
    pub fn new(schema: SchemaConfig, registry: MetadataRegistry) -> Result<Self> {
        Self::with_resolver(schema, registry, ConstraintResolver::new())
    }

    pub fn with_resolver(schema: SchemaConfig, mut registry: MetadataRegistry, resolver: ConstraintResolver) -> Result<Self> {
        let classes = schema.register_into(&mut registry)?;
        Ok(Self { schema, classes, sanitizer: Sanitizer::with_resolver(registry, resolver) })
    }

    pub fn sanitizer(&self) -> &Sanitizer {
        &self.sanitizer
    }

    pub fn schema(&self) -> &SchemaConfig {
        &self.schema
    }

    pub fn class_ref(&self, name: &str) -> Option<ClassRef> {
        self.classes.get(name).copied()
    }

    /// Builds an object of `class_name` from a JSON object.
    pub fn materialize(&self, class_name: &str, json: serde_json::Value) -> Result<Object> {
        let class = self
            .class_ref(class_name)
            .ok_or_else(|| anyhow!("Class '{}' is not declared in the schema", class_name))?;
        let fields = match json {
            serde_json::Value::Object(fields) => fields,
            other => bail!("Expected a JSON object for class '{}', got {}", class_name, json_type(&other)),
        };

        let mut object = Object::new(class);
        for (field, value) in fields {
            let value = match self.nested_hint(class_name, &field) {
                Some((nested_class, shape)) => self.materialize_nested(nested_class, shape, value)?,
                None => Value::from_json(value),
            };
            object.set(&field, value);
        }
        Ok(object)
    }

    /// Sanitizes a JSON object, or each object of a JSON array, as `class_name`.
    pub fn sanitize_json(&self, class_name: &str, json: serde_json::Value) -> Result<serde_json::Value> {
        match json {
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(|item| self.sanitize_json(class_name, item))
                .collect::<Result<Vec<_>>>()
                .map(serde_json::Value::Array),
            other => {
                let mut object = self.materialize(class_name, other)?;
                self.sanitizer.sanitize(&mut object)?;
                debug!("Sanitized one '{}' document.", class_name);
                Ok(object.to_json())
            }
        }
    }

    /// Nearest `nested` rule with a class hint for `field`, own class first.
    fn nested_hint<'a>(&'a self, class_name: &str, field: &str) -> Option<(&'a str, Shape)> {
        self.schema.lineage(class_name).into_iter().find_map(|class| {
            class.fields.get(field)?.iter().find_map(|rule| match (&rule.kind, &rule.class) {
                (RuleKind::Nested, Some(nested)) => Some((nested.as_str(), rule.shape)),
                _ => None,
            })
        })
    }

    fn materialize_nested(&self, class_name: &str, shape: Shape, json: serde_json::Value) -> Result<Value> {
        let value = match (shape, json) {
            (Shape::Single, json @ serde_json::Value::Object(_)) => Value::Object(self.materialize(class_name, json)?),
            (Shape::Array, serde_json::Value::Array(items)) => Value::Array(self.materialize_items(class_name, items)?),
            (Shape::Set, serde_json::Value::Array(items)) => Value::Set(self.materialize_items(class_name, items)?),
            (Shape::Map, serde_json::Value::Object(entries)) => Value::Map(
                entries
                    .into_iter()
                    .map(|(key, entry)| Ok((key, self.materialize_element(class_name, entry)?)))
                    .collect::<Result<IndexMap<_, _>>>()?,
            ),
            (_, other) => Value::from_json(other),
        };
        Ok(value)
    }

    fn materialize_items(&self, class_name: &str, items: Vec<serde_json::Value>) -> Result<Vec<Value>> {
        items.into_iter().map(|item| self.materialize_element(class_name, item)).collect()
    }

    fn materialize_element(&self, class_name: &str, json: serde_json::Value) -> Result<Value> {
        match json {
            json @ serde_json::Value::Object(_) => Ok(Value::Object(self.materialize(class_name, json)?)),
            other => Ok(Value::from_json(other)),
        }
    }
}

fn json_type(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Sanitizes one JSON document in a single call.
///
/// # Arguments
///
/// * `schema` - The class declarations and their field rules.
/// * `registry` - A registry holding the constraint classes `custom` rules name.
/// * `class_name` - The schema class the document is an instance of.
/// * `json` - The document, an object or an array of objects.
pub fn headless_sanitize_json(
    schema: SchemaConfig,
    registry: MetadataRegistry,
    class_name: &str,
    json: serde_json::Value,
) -> Result<serde_json::Value> {
    JsonSanitizer::new(schema, registry)?.sanitize_json(class_name, json)
}
