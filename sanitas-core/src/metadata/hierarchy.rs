// sanitas-core/src/metadata/hierarchy.rs
//! Class identities and the parent graph used for rule inheritance.
//!
//! Classes are minted by a registry and identified by handle, never by name.
//! Each hierarchy owns a root class `Object`; a class defined without an explicit
//! parent extends it.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::errors::SanitasError;

static NEXT_HIERARCHY_ID: AtomicU32 = AtomicU32::new(1);

/// Name of the implicit root class every hierarchy starts with.
pub const ROOT_CLASS_NAME: &str = "Object";

/// Opaque handle to a class defined in one [`ClassHierarchy`].
///
/// Two handles are equal only if they were minted by the same hierarchy for the
/// same definition, so distinct classes sharing a name stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassRef {
    hierarchy: u32,
    index: u32,
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.hierarchy, self.index)
    }
}

#[derive(Debug, Clone)]
struct ClassEntry {
    name: String,
    parent: Option<ClassRef>,
}

/// Append-only class graph. Parent edges are recorded at definition time.
#[derive(Debug)]
pub struct ClassHierarchy {
    id: u32,
    classes: Vec<ClassEntry>,
}

impl Default for ClassHierarchy {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassHierarchy {
    pub fn new() -> Self {
        let id = NEXT_HIERARCHY_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            id,
            classes: vec![ClassEntry { name: ROOT_CLASS_NAME.to_string(), parent: None }],
        }
    }

    /// The implicit root class.
    pub fn root(&self) -> ClassRef {
        ClassRef { hierarchy: self.id, index: 0 }
    }

    /// Defines a new class. `None` as parent means the class extends the root.
    pub fn define(&mut self, name: &str, parent: Option<ClassRef>) -> Result<ClassRef, SanitasError> {
        let parent = match parent {
            Some(p) if self.contains(p) => p,
            Some(p) => return Err(SanitasError::UnknownClass(p)),
            None => self.root(),
        };
        let index = u32::try_from(self.classes.len())
            .map_err(|_| anyhow::anyhow!("class hierarchy is full"))?;
        self.classes.push(ClassEntry { name: name.to_string(), parent: Some(parent) });
        Ok(ClassRef { hierarchy: self.id, index })
    }

    pub fn contains(&self, class: ClassRef) -> bool {
        class.hierarchy == self.id && (class.index as usize) < self.classes.len()
    }

    fn entry(&self, class: ClassRef) -> Option<&ClassEntry> {
        if class.hierarchy != self.id {
            return None;
        }
        self.classes.get(class.index as usize)
    }

    pub fn name(&self, class: ClassRef) -> Option<&str> {
        self.entry(class).map(|e| e.name.as_str())
    }

    pub fn parent_of(&self, class: ClassRef) -> Option<ClassRef> {
        self.entry(class).and_then(|e| e.parent)
    }

    /// Walks the parent chain of `class`, nearest ancestor first. The class
    /// itself is not yielded.
    pub fn ancestors(&self, class: ClassRef) -> Ancestors<'_> {
        Ancestors { hierarchy: self, next: self.parent_of(class) }
    }

    /// True when `ancestor` appears strictly above `class` in its parent chain.
    pub fn is_ancestor(&self, ancestor: ClassRef, class: ClassRef) -> bool {
        self.ancestors(class).any(|a| a == ancestor)
    }

    /// First class defined under `name`. Names are not unique; this is a
    /// convenience for configuration layers, not an identity lookup.
    pub fn find(&self, name: &str) -> Option<ClassRef> {
        self.classes
            .iter()
            .position(|e| e.name == name)
            .map(|index| ClassRef { hierarchy: self.id, index: index as u32 })
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Iterator over a class's ancestors.
pub struct Ancestors<'a> {
    hierarchy: &'a ClassHierarchy,
    next: Option<ClassRef>,
}

impl Iterator for Ancestors<'_> {
    type Item = ClassRef;

    fn next(&mut self) -> Option<ClassRef> {
        let current = self.next?;
        self.next = self.hierarchy.parent_of(current);
        Some(current)
    }
}
