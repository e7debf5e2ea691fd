//! Schema configuration for `sanitas-core`.
//!
//! A schema declares classes, their parents and the ordered sanitization rules of
//! each field, in YAML. This module handles deserialization, validation and the
//! translation of a schema into [`MetadataRegistry`] registrations.
//!
//! License: MIT OR Apache-2.0

use std::collections::HashSet;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::metadata::{ClassRef, MetadataRegistry, RuleKind, SanitizationOptions};
use crate::value::Value;

/// Container shape of a nested field, used when turning JSON into objects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// A single object.
    #[default]
    Single,
    /// A JSON array of objects.
    Array,
    /// A JSON array of objects held as a set.
    Set,
    /// A JSON object whose values are objects.
    Map,
}

/// One rule on one field.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FieldRule {
    /// Rule kind, by its camelCase name (`toInt`) or snake_case alias (`to_int`).
    pub kind: RuleKind,
    /// Arguments of the rule. Built-in kinds read the first entry only.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<serde_json::Value>,
    /// Apply element-wise to array values.
    #[serde(default)]
    pub each: bool,
    /// Name of the registered constraint class, for `custom` rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
    /// Class of the nested objects, for `nested` rules.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default)]
    pub shape: Shape,
}

impl FieldRule {
    pub fn new(kind: RuleKind) -> Self {
        Self { kind, constraints: Vec::new(), each: false, constraint: None, class: None, shape: Shape::Single }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ClassConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    /// Field name to rules, in application order.
    #[serde(default)]
    pub fields: IndexMap<String, Vec<FieldRule>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub classes: Vec<ClassConfig>,
}

impl SchemaConfig {
    /// Loads and validates a schema from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading schema from: {}", path.display());
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read schema file {}", path.display()))?;
        let schema: SchemaConfig = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse schema file {}", path.display()))?;

        schema.validate()?;
        info!("Loaded {} classes from schema file {}.", schema.classes.len(), path.display());
        Ok(schema)
    }

    pub fn load_from_str(text: &str) -> Result<Self> {
        let schema: SchemaConfig = serde_yml::from_str(text).context("Failed to parse schema")?;
        schema.validate()?;
        debug!("Loaded {} classes from inline schema.", schema.classes.len());
        Ok(schema)
    }

    pub fn find_class(&self, name: &str) -> Option<&ClassConfig> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// The class followed by its schema ancestors, nearest first.
    pub fn lineage<'a>(&'a self, name: &str) -> Vec<&'a ClassConfig> {
        let mut lineage = Vec::new();
        let mut next = self.find_class(name);
        while let Some(class) = next {
            if lineage.iter().any(|seen: &&ClassConfig| seen.name == class.name) {
                break;
            }
            lineage.push(class);
            next = class.extends.as_deref().and_then(|parent| self.find_class(parent));
        }
        lineage
    }

    /// Checks the whole schema and reports every problem at once.
    pub fn validate(&self) -> Result<()> {
        let all_names: HashSet<&str> = self.classes.iter().map(|c| c.name.as_str()).collect();
        let mut declared: HashSet<&str> = HashSet::new();
        let mut errors = Vec::new();

        for class in &self.classes {
            if class.name.is_empty() {
                errors.push("A class has an empty `name` field.".to_string());
            } else if declared.contains(class.name.as_str()) {
                errors.push(format!("Duplicate class name found: '{}'.", class.name));
            }

            if let Some(parent) = &class.extends {
                if !declared.contains(parent.as_str()) {
                    errors.push(format!(
                        "Class '{}' extends '{}', which is not declared before it.",
                        class.name, parent
                    ));
                }
            }

            for (field, rules) in &class.fields {
                if field.is_empty() {
                    errors.push(format!("Class '{}' has a field with an empty name.", class.name));
                }
                for rule in rules {
                    validate_field_rule(&class.name, field, rule, &all_names, &mut errors);
                }
            }

            declared.insert(class.name.as_str());
        }

        if !errors.is_empty() {
            let full_error_message = format!("Schema validation failed:\n{}", errors.join("\n"));
            Err(anyhow!(full_error_message))
        } else {
            Ok(())
        }
    }

    /// Defines every class in `registry` and registers its field rules.
    ///
    /// Custom rules are bound by name to constraint classes already registered in
    /// `registry`. Returns the class handles by name, in schema order.
    pub fn register_into(&self, registry: &mut MetadataRegistry) -> Result<IndexMap<String, ClassRef>> {
        let mut classes: IndexMap<String, ClassRef> = IndexMap::new();

        for class in &self.classes {
            let parent = match &class.extends {
                Some(parent) => Some(
                    *classes
                        .get(parent)
                        .ok_or_else(|| anyhow!("Class '{}' extends unknown class '{}'", class.name, parent))?,
                ),
                None => None,
            };
            let class_ref = registry.define_class(&class.name, parent)?;

            for (field, rules) in &class.fields {
                for rule in rules {
                    register_field_rule(registry, class_ref, &class.name, field, rule)?;
                }
            }
            classes.insert(class.name.clone(), class_ref);
        }

        debug!("Registered {} schema classes.", classes.len());
        Ok(classes)
    }
}

fn validate_field_rule(
    class: &str,
    field: &str,
    rule: &FieldRule,
    known_classes: &HashSet<&str>,
    errors: &mut Vec<String>,
) {
    match rule.kind {
        RuleKind::Custom => {
            if rule.constraint.as_deref().map_or(true, str::is_empty) {
                errors.push(format!(
                    "Field '{}.{}': 'customSanitization' rules must name a `constraint`.",
                    class, field
                ));
            }
        }
        RuleKind::Nested => match &rule.class {
            Some(nested) if !known_classes.contains(nested.as_str()) => {
                errors.push(format!(
                    "Field '{}.{}': nested class '{}' is not declared in the schema.",
                    class, field, nested
                ));
            }
            Some(_) => {}
            None => warn!(
                "Field '{}.{}' is nested but names no `class`; its objects stay plain maps.",
                class, field
            ),
        },
        kind => {
            if rule.constraint.is_some() || rule.class.is_some() {
                warn!("Field '{}.{}': `constraint`/`class` are ignored for '{}' rules.", class, field, kind);
            }
        }
    }
}

fn register_field_rule(
    registry: &mut MetadataRegistry,
    target: ClassRef,
    class: &str,
    field: &str,
    rule: &FieldRule,
) -> Result<()> {
    let constraints: Vec<Value> = rule.constraints.iter().cloned().map(Value::from_json).collect();
    let options = SanitizationOptions { each: rule.each };

    if rule.kind == RuleKind::Custom {
        let name = rule.constraint.as_deref().unwrap_or_default();
        let rule_class = registry
            .find_constraint(name)
            .map(|registration| registration.rule_class)
            .ok_or_else(|| anyhow!("Field '{}.{}' uses unknown constraint '{}'", class, field, name))?;
        registry.register_custom_rule(target, field, rule_class, constraints, options)?;
    } else {
        registry.register_rule(rule.kind, target, field, constraints, options)?;
    }
    Ok(())
}
