// sanitas-core/src/metadata/registry.rs
//! The metadata registry: an append-only store of rule records and constraint
//! registrations, plus the class graph used to resolve inherited rules.
//!
//! Registration happens through `&mut self` and lookups through `&self`, so once
//! a registry has been handed to a [`crate::Sanitizer`] it can no longer change.
//!
//! License: MIT OR Apache-2.0

use indexmap::IndexMap;
use log::debug;

use crate::engine::SanitizerConstraint;
use crate::errors::SanitasError;
use crate::metadata::hierarchy::{Ancestors, ClassHierarchy};
use crate::metadata::rule::{
    ConstraintRegistration, ConstraintType, RuleKind, RuleRecord, SanitizationOptions,
};
use crate::metadata::ClassRef;
use crate::value::Value;

#[derive(Debug, Default)]
pub struct MetadataRegistry {
    classes: ClassHierarchy,
    rules: Vec<RuleRecord>,
    constraints: Vec<ConstraintRegistration>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Class graph

    pub fn define_class(&mut self, name: &str, parent: Option<ClassRef>) -> Result<ClassRef, SanitasError> {
        let class = self.classes.define(name, parent)?;
        debug!("Defined class '{}' as {} (parent: {:?})", name, class, self.classes.parent_of(class));
        Ok(class)
    }

    /// The implicit root class every class ultimately extends.
    pub fn object_class(&self) -> ClassRef {
        self.classes.root()
    }

    pub fn class_name(&self, class: ClassRef) -> Option<&str> {
        self.classes.name(class)
    }

    pub fn parent_of(&self, class: ClassRef) -> Option<ClassRef> {
        self.classes.parent_of(class)
    }

    pub fn ancestors(&self, class: ClassRef) -> Ancestors<'_> {
        self.classes.ancestors(class)
    }

    pub fn find_class(&self, name: &str) -> Option<ClassRef> {
        self.classes.find(name)
    }

    pub fn contains_class(&self, class: ClassRef) -> bool {
        self.classes.contains(class)
    }

    // Write phase

    pub fn register(&mut self, rule: RuleRecord) -> Result<(), SanitasError> {
        if !self.classes.contains(rule.target()) {
            return Err(SanitasError::UnknownClass(rule.target()));
        }
        debug!(
            "Registered '{}' on {}.{} (each: {})",
            rule.kind(),
            self.class_name(rule.target()).unwrap_or_default(),
            rule.property_name(),
            rule.each()
        );
        self.rules.push(rule);
        Ok(())
    }

    pub fn register_rule(
        &mut self,
        kind: RuleKind,
        target: ClassRef,
        property_name: &str,
        constraints: Vec<Value>,
        options: SanitizationOptions,
    ) -> Result<(), SanitasError> {
        let rule = RuleRecord::new(kind, target, property_name, constraints, options)?;
        self.register(rule)
    }

    pub fn register_custom_rule(
        &mut self,
        target: ClassRef,
        property_name: &str,
        rule_class: ConstraintType,
        constraints: Vec<Value>,
        options: SanitizationOptions,
    ) -> Result<(), SanitasError> {
        self.register(RuleRecord::custom(target, property_name, rule_class, constraints, options))
    }

    pub fn register_constraint(&mut self, registration: ConstraintRegistration) {
        debug!(
            "Registered sanitizer constraint '{}' (async: {})",
            registration.name, registration.is_async
        );
        self.constraints.push(registration);
    }

    /// Registers `T` as a custom-rule class and returns its identity. The name
    /// defaults to the short type name.
    pub fn register_constraint_class<T>(&mut self, name: Option<&str>, is_async: bool) -> ConstraintType
    where
        T: SanitizerConstraint + Default + 'static,
    {
        let rule_class = ConstraintType::of::<T>();
        let mut registration = ConstraintRegistration::new(rule_class).asynchronous(is_async);
        if let Some(name) = name {
            registration = registration.named(name);
        }
        self.register_constraint(registration);
        rule_class
    }

    // Read phase

    pub fn has_sanitization_metadata(&self) -> bool {
        !self.rules.is_empty()
    }

    pub fn rules(&self) -> &[RuleRecord] {
        &self.rules
    }

    pub fn constraints(&self) -> &[ConstraintRegistration] {
        &self.constraints
    }

    /// Rules that apply to instances of `target`.
    ///
    /// Own rules come first in registration order, then rules declared on any
    /// ancestor in registration order, minus those whose `(property, kind)` pair
    /// the own set already declares. Unknown classes resolve to nothing.
    pub fn lookup(&self, target: ClassRef) -> Vec<&RuleRecord> {
        if !self.classes.contains(target) {
            return Vec::new();
        }

        let own: Vec<&RuleRecord> = self.rules.iter().filter(|r| r.target() == target).collect();

        let inherited = self.rules.iter().filter(|r| {
            r.target() != target
                && self.classes.is_ancestor(r.target(), target)
                && !own
                    .iter()
                    .any(|o| o.property_name() == r.property_name() && o.kind() == r.kind())
        });

        let mut resolved = own.clone();
        resolved.extend(inherited);
        resolved
    }

    /// Registrations for one custom-rule class, by exact identity.
    pub fn lookup_constraints(&self, rule_class: ConstraintType) -> Vec<&ConstraintRegistration> {
        self.constraints.iter().filter(|c| c.rule_class == rule_class).collect()
    }

    /// First registration carrying `name`.
    pub fn find_constraint(&self, name: &str) -> Option<&ConstraintRegistration> {
        self.constraints.iter().find(|c| c.name == name)
    }

    /// Groups rules by property name, keeping first-seen property order and the
    /// rule order within each property.
    pub fn group_by_property_name<'a>(rules: &[&'a RuleRecord]) -> IndexMap<&'a str, Vec<&'a RuleRecord>> {
        let mut grouped: IndexMap<&'a str, Vec<&'a RuleRecord>> = IndexMap::new();
        for rule in rules {
            grouped.entry(rule.property_name()).or_default().push(*rule);
        }
        grouped
    }
}
