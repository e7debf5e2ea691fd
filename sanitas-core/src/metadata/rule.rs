// sanitas-core/src/metadata/rule.rs
//! Rule records, rule kinds and constraint registrations.
//!
//! License: MIT OR Apache-2.0

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::engine::SanitizerConstraint;
use crate::errors::SanitasError;
use crate::metadata::ClassRef;
use crate::value::Value;

/// The closed set of sanitization operations a rule can declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Blacklist,
    Escape,
    Ltrim,
    NormalizeEmail,
    Rtrim,
    StripLow,
    ToBoolean,
    ToDate,
    ToFloat,
    ToInt,
    ToString,
    Trim,
    Whitelist,
    ToLowerCase,
    ToUpperCase,
    Custom,
    Nested,
}

impl RuleKind {
    pub const ALL: [RuleKind; 17] = [
        RuleKind::Blacklist,
        RuleKind::Escape,
        RuleKind::Ltrim,
        RuleKind::NormalizeEmail,
        RuleKind::Rtrim,
        RuleKind::StripLow,
        RuleKind::ToBoolean,
        RuleKind::ToDate,
        RuleKind::ToFloat,
        RuleKind::ToInt,
        RuleKind::ToString,
        RuleKind::Trim,
        RuleKind::Whitelist,
        RuleKind::ToLowerCase,
        RuleKind::ToUpperCase,
        RuleKind::Custom,
        RuleKind::Nested,
    ];

    /// Canonical identifier, as written in schemas and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleKind::Blacklist => "blacklist",
            RuleKind::Escape => "escape",
            RuleKind::Ltrim => "ltrim",
            RuleKind::NormalizeEmail => "normalizeEmail",
            RuleKind::Rtrim => "rtrim",
            RuleKind::StripLow => "stripLow",
            RuleKind::ToBoolean => "toBoolean",
            RuleKind::ToDate => "toDate",
            RuleKind::ToFloat => "toFloat",
            RuleKind::ToInt => "toInt",
            RuleKind::ToString => "toString",
            RuleKind::Trim => "trim",
            RuleKind::Whitelist => "whitelist",
            RuleKind::ToLowerCase => "toLowerCase",
            RuleKind::ToUpperCase => "toUpperCase",
            RuleKind::Custom => "customSanitization",
            RuleKind::Nested => "nestedSanitization",
        }
    }

    fn alias(&self) -> &'static str {
        match self {
            RuleKind::NormalizeEmail => "normalize_email",
            RuleKind::StripLow => "strip_low",
            RuleKind::ToBoolean => "to_boolean",
            RuleKind::ToDate => "to_date",
            RuleKind::ToFloat => "to_float",
            RuleKind::ToInt => "to_int",
            RuleKind::ToString => "to_string",
            RuleKind::ToLowerCase => "to_lower_case",
            RuleKind::ToUpperCase => "to_upper_case",
            RuleKind::Custom => "custom",
            RuleKind::Nested => "nested",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = SanitasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s || k.alias() == s)
            .ok_or_else(|| SanitasError::UnknownRuleKind(s.to_string()))
    }
}

impl Serialize for RuleKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RuleKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Options accepted by every rule declaration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SanitizationOptions {
    /// The value is a sequence and each item must be sanitized.
    pub each: bool,
}

impl SanitizationOptions {
    pub fn each() -> Self {
        Self { each: true }
    }
}

/// Identity of a custom-rule class.
///
/// Equality and hashing use the Rust type identity; the constructor is what the
/// default container falls back to.
#[derive(Clone, Copy)]
pub struct ConstraintType {
    id: TypeId,
    type_name: &'static str,
    construct: fn() -> Arc<dyn SanitizerConstraint>,
}

impl ConstraintType {
    pub fn of<T>() -> Self
    where
        T: SanitizerConstraint + Default + 'static,
    {
        fn build<T: SanitizerConstraint + Default + 'static>() -> Arc<dyn SanitizerConstraint> {
            Arc::new(T::default())
        }
        Self {
            id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            construct: build::<T>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// The unqualified type name, e.g. `LetterReplacer`.
    pub fn short_name(&self) -> &'static str {
        let base = self.type_name.split('<').next().unwrap_or(self.type_name);
        base.rsplit("::").next().unwrap_or(base)
    }

    pub(crate) fn construct(&self) -> Arc<dyn SanitizerConstraint> {
        (self.construct)()
    }
}

impl PartialEq for ConstraintType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConstraintType {}

impl Hash for ConstraintType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ConstraintType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ConstraintType").field(&self.type_name).finish()
    }
}

/// One registered custom-rule class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintRegistration {
    pub rule_class: ConstraintType,
    pub name: String,
    pub is_async: bool,
}

impl ConstraintRegistration {
    /// Registration with the default name, the short type name of the class.
    pub fn new(rule_class: ConstraintType) -> Self {
        Self { name: rule_class.short_name().to_string(), rule_class, is_async: false }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn asynchronous(mut self, is_async: bool) -> Self {
        self.is_async = is_async;
        self
    }
}

/// One declared sanitization on one property of one class. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleRecord {
    kind: RuleKind,
    target: ClassRef,
    property_name: String,
    constraints: Vec<Value>,
    each: bool,
    custom_rule_class: Option<ConstraintType>,
}

impl RuleRecord {
    /// Builds a built-in or nested rule. `RuleKind::Custom` must go through
    /// [`RuleRecord::custom`].
    pub fn new(
        kind: RuleKind,
        target: ClassRef,
        property_name: impl Into<String>,
        constraints: Vec<Value>,
        options: SanitizationOptions,
    ) -> Result<Self, SanitasError> {
        let property_name = property_name.into();
        if kind == RuleKind::Custom {
            return Err(SanitasError::MissingConstraintClass(property_name));
        }
        Ok(Self { kind, target, property_name, constraints, each: options.each, custom_rule_class: None })
    }

    pub fn custom(
        target: ClassRef,
        property_name: impl Into<String>,
        rule_class: ConstraintType,
        constraints: Vec<Value>,
        options: SanitizationOptions,
    ) -> Self {
        Self {
            kind: RuleKind::Custom,
            target,
            property_name: property_name.into(),
            constraints,
            each: options.each,
            custom_rule_class: Some(rule_class),
        }
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn target(&self) -> ClassRef {
        self.target
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn constraints(&self) -> &[Value] {
        &self.constraints
    }

    /// First constraint, the slot every built-in kind reads its argument from.
    pub fn first_constraint(&self) -> Option<&Value> {
        self.constraints.first()
    }

    pub fn each(&self) -> bool {
        self.each
    }

    pub fn custom_rule_class(&self) -> Option<ConstraintType> {
        self.custom_rule_class
    }
}
