// sanitas-core/src/metadata/mod.rs
//! Declarative sanitization metadata: class identities, rule records and the
//! registry that resolves them, inherited rules included.

pub mod hierarchy;
pub mod registry;
pub mod rule;

pub use hierarchy::{ClassHierarchy, ClassRef, ROOT_CLASS_NAME};
pub use registry::MetadataRegistry;
pub use rule::{ConstraintRegistration, ConstraintType, RuleKind, RuleRecord, SanitizationOptions};
