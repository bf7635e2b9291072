use bitflags::bitflags;
use std::fmt;
use std::sync::Arc;

use super::{Annotation, UnitId};

/// Shared handle to a type declaration.
pub type TypeRef = Arc<TypeDescriptor>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
    Record,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeModifiers: u8 {
        const ABSTRACT = 1 << 0;
        const SEALED = 1 << 1;
        const STATIC = 1 << 2;
        const PARTIAL = 1 << 3;
    }
}

/// A declared type within a unit.
///
/// Base and capability references point at other descriptors, possibly
/// owned by other units. The owning unit is referenced by id only.
pub struct TypeDescriptor {
    unit: UnitId,
    namespace: String,
    name: String,
    qualified_name: String,
    kind: TypeKind,
    modifiers: TypeModifiers,
    base: Option<TypeRef>,
    capabilities: Vec<TypeRef>,
    annotations: Vec<Annotation>,
    nested: Vec<TypeRef>,
}

impl TypeDescriptor {
    /// Start a class declaration named `name` in `namespace` of `unit`.
    pub fn builder(unit: &UnitId, namespace: &str, name: &str) -> TypeDescriptorBuilder {
        TypeDescriptorBuilder {
            unit: unit.clone(),
            namespace: namespace.to_string(),
            containing: Vec::new(),
            name: name.to_string(),
            kind: TypeKind::Class,
            modifiers: TypeModifiers::empty(),
            base: None,
            capabilities: Vec::new(),
            annotations: Vec::new(),
            nested: Vec::new(),
        }
    }

    pub fn unit(&self) -> &UnitId {
        &self.unit
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `Namespace.Outer.Name`, or just the containing path when the namespace is global.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn modifiers(&self) -> TypeModifiers {
        self.modifiers
    }

    /// Interfaces are abstract by definition.
    pub fn is_abstract(&self) -> bool {
        self.kind == TypeKind::Interface || self.modifiers.contains(TypeModifiers::ABSTRACT)
    }

    pub fn base(&self) -> Option<&TypeRef> {
        self.base.as_ref()
    }

    /// Interfaces this type declares directly.
    pub fn capabilities(&self) -> &[TypeRef] {
        &self.capabilities
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn nested_types(&self) -> &[TypeRef] {
        &self.nested
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.qualified_name)
            .field("unit", &self.unit)
            .field("kind", &self.kind)
            .field("modifiers", &self.modifiers)
            .field("base", &self.base.as_ref().map(|b| b.qualified_name()))
            .finish()
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name)
    }
}

pub struct TypeDescriptorBuilder {
    unit: UnitId,
    namespace: String,
    containing: Vec<String>,
    name: String,
    kind: TypeKind,
    modifiers: TypeModifiers,
    base: Option<TypeRef>,
    capabilities: Vec<TypeRef>,
    annotations: Vec<Annotation>,
    nested: Vec<TypeRef>,
}

impl TypeDescriptorBuilder {
    pub fn kind(mut self, kind: TypeKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn interface(self) -> Self {
        self.kind(TypeKind::Interface)
    }

    pub fn modifiers(mut self, modifiers: TypeModifiers) -> Self {
        self.modifiers |= modifiers;
        self
    }

    pub fn abstract_(self) -> Self {
        self.modifiers(TypeModifiers::ABSTRACT)
    }

    /// Mark this as nested inside `outer` (outermost first when called repeatedly).
    pub fn within(mut self, outer: &str) -> Self {
        self.containing.push(outer.to_string());
        self
    }

    pub fn base(mut self, base: TypeRef) -> Self {
        self.base = Some(base);
        self
    }

    pub fn implements(mut self, capability: TypeRef) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn nested(mut self, nested: TypeRef) -> Self {
        self.nested.push(nested);
        self
    }

    pub fn build(self) -> TypeRef {
        let qualified_name = std::iter::once(self.namespace.as_str())
            .chain(self.containing.iter().map(String::as_str))
            .chain(std::iter::once(self.name.as_str()))
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join(".");

        Arc::new(TypeDescriptor {
            unit: self.unit,
            namespace: self.namespace,
            name: self.name,
            qualified_name,
            kind: self.kind,
            modifiers: self.modifiers,
            base: self.base,
            capabilities: self.capabilities,
            annotations: self.annotations,
            nested: self.nested,
        })
    }
}
