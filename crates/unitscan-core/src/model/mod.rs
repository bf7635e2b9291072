//! Read-only program model consumed by discovery.
//!
//! A [`Unit`] is one compiled module: an identity, a namespace tree of
//! [`TypeDescriptor`]s, dependency references and unit-level annotations.
//! Nothing in this crate mutates a unit after it is built; everything is
//! shared through `Arc`.

mod descriptor;
mod program;

pub use descriptor::{TypeDescriptor, TypeDescriptorBuilder, TypeKind, TypeModifiers, TypeRef};
pub use program::{Program, ProgramModel};

use std::fmt;
use std::sync::Arc;

/// Stable identity of a unit: name plus version.
///
/// Equality and hashing cover both parts, so two loads of the same
/// name/version denote the same unit.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId {
    name: Arc<str>,
    version: Arc<str>,
}

impl UnitId {
    pub fn new(name: impl Into<Arc<str>>, version: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// A unit id with no version component.
    pub fn unversioned(name: impl Into<Arc<str>>) -> Self {
        Self::new(name, "")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// True when the name is empty or whitespace, which no real unit has.
    pub fn is_empty(&self) -> bool {
        self.name.trim().is_empty()
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}@{}", self.name, self.version)
        }
    }
}

impl fmt::Debug for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitId({self})")
    }
}

/// Marker attached to a unit or a type.
///
/// Only the declaring type's qualified name is inspected by discovery;
/// arguments are carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Annotation {
    name: String,
    arguments: Vec<String>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    pub fn with_argument(mut self, argument: impl Into<String>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    /// Qualified name of the annotation's declaring type.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last `.`-separated segment of the declaring name.
    pub fn simple_name(&self) -> &str {
        simple_name_of(&self.name)
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }
}

pub(crate) fn simple_name_of(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// One level of a unit's declaration tree.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    name: String,
    namespaces: Vec<Arc<Namespace>>,
    types: Vec<TypeRef>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespaces: Vec::new(),
            types: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespaces(&self) -> &[Arc<Namespace>] {
        &self.namespaces
    }

    /// Types declared directly in this namespace (not nested types).
    pub fn types(&self) -> &[TypeRef] {
        &self.types
    }

    /// Place `ty` under the namespace path `segments`, creating levels as needed.
    fn insert(&mut self, segments: &[&str], ty: TypeRef) {
        match segments.split_first() {
            None => self.types.push(ty),
            Some((head, rest)) => {
                let position = self.namespaces.iter().position(|ns| ns.name == *head);
                let child = match position {
                    Some(index) => &mut self.namespaces[index],
                    None => {
                        self.namespaces.push(Arc::new(Namespace::new(*head)));
                        let last = self.namespaces.len() - 1;
                        &mut self.namespaces[last]
                    }
                };
                Arc::make_mut(child).insert(rest, ty);
            }
        }
    }
}

/// A compiled module.
#[derive(Debug)]
pub struct Unit {
    id: UnitId,
    root: Arc<Namespace>,
    dependencies: Vec<UnitId>,
    annotations: Vec<Annotation>,
}

impl Unit {
    pub fn builder(id: UnitId) -> UnitBuilder {
        UnitBuilder {
            id,
            root: Namespace::new(""),
            dependencies: Vec::new(),
            annotations: Vec::new(),
        }
    }

    pub fn id(&self) -> &UnitId {
        &self.id
    }

    /// The global namespace.
    pub fn root_namespace(&self) -> &Arc<Namespace> {
        &self.root
    }

    /// Direct dependency references, in declaration order.
    pub fn dependencies(&self) -> &[UnitId] {
        &self.dependencies
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Ordinal match on the annotation's qualified name.
    pub fn has_annotation(&self, qualified_name: &str) -> bool {
        self.annotations.iter().any(|a| a.name() == qualified_name)
    }
}

/// Builder returned by [`Unit::builder`].
pub struct UnitBuilder {
    id: UnitId,
    root: Namespace,
    dependencies: Vec<UnitId>,
    annotations: Vec<Annotation>,
}

impl UnitBuilder {
    /// Add a top-level type under the namespace it declares.
    pub fn with_type(mut self, ty: TypeRef) -> Self {
        let namespace = ty.namespace().to_string();
        let segments: Vec<&str> = namespace.split('.').filter(|s| !s.is_empty()).collect();
        self.root.insert(&segments, ty);
        self
    }

    pub fn depends_on(mut self, dependency: UnitId) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn build(self) -> Unit {
        Unit {
            id: self.id,
            root: Arc::new(self.root),
            dependencies: self.dependencies,
            annotations: self.annotations,
        }
    }
}
