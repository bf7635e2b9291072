//! Structural predicates over type descriptors.
//!
//! All matchers are pure. Type comparisons go through [`SymbolIdentity`],
//! so a base type handed in by the caller matches even when it is a
//! different instance of the same declaration.

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;

use super::identity::{Compared, KeyComparer, SymbolIdentity};
use crate::model::{TypeDescriptor, TypeRef};

/// Conventional suffix of annotation type names, optional in name lookups.
pub const ANNOTATION_SUFFIX: &str = "Attribute";

type SymbolSet = IndexSet<Compared<TypeRef, SymbolIdentity>, FxBuildHasher>;

fn same_symbol(a: &TypeDescriptor, b: &TypeDescriptor) -> bool {
    <SymbolIdentity as KeyComparer<TypeDescriptor>>::equals(a, b)
}

/// Iterator over the base-type chain, nearest first, excluding `ty` itself.
///
/// Stops early if the chain loops back on a type it already produced.
pub fn base_chain(ty: &TypeDescriptor) -> BaseChain {
    BaseChain {
        next: ty.base().cloned(),
        seen: SymbolSet::default(),
    }
}

pub struct BaseChain {
    next: Option<TypeRef>,
    seen: SymbolSet,
}

impl Iterator for BaseChain {
    type Item = TypeRef;

    fn next(&mut self) -> Option<TypeRef> {
        let current = self.next.take()?;
        if !self.seen.insert(Compared::new(current.clone())) {
            return None;
        }
        self.next = current.base().cloned();
        Some(current)
    }
}

/// Every capability `ty` conforms to: its own, those of each base type, and
/// those inherited by the capabilities themselves. Deduplicated, first
/// occurrence order.
pub fn all_capabilities(ty: &TypeDescriptor) -> Vec<TypeRef> {
    let mut direct: Vec<TypeRef> = ty.capabilities().to_vec();
    for base in base_chain(ty) {
        direct.extend(base.capabilities().iter().cloned());
    }

    let mut found = SymbolSet::default();
    let mut pending: Vec<TypeRef> = direct.into_iter().rev().collect();
    while let Some(capability) = pending.pop() {
        if found.insert(Compared::new(capability.clone())) {
            pending.extend(capability.capabilities().iter().rev().cloned());
        }
    }

    found.into_iter().map(Compared::into_inner).collect()
}

/// True when `candidate` is a concrete proper subtype of `base`.
///
/// The base chain is followed to any depth; capabilities are checked
/// against the flattened set from [`all_capabilities`]. Abstract
/// candidates (including interfaces) never match.
pub fn derives_from(candidate: &TypeDescriptor, base: &TypeDescriptor) -> bool {
    if candidate.is_abstract() || same_symbol(candidate, base) {
        return false;
    }
    inherits_from(candidate, base)
}

/// Raw subtype relation: `base` is in the base chain or the capability set.
/// Ignores abstractness.
pub fn inherits_from(candidate: &TypeDescriptor, base: &TypeDescriptor) -> bool {
    base_chain(candidate).any(|ancestor| same_symbol(&ancestor, base))
        || all_capabilities(candidate)
            .iter()
            .any(|capability| same_symbol(capability, base))
}

/// Exact, case-sensitive match on the annotation type's qualified name.
pub fn has_annotation(candidate: &TypeDescriptor, annotation_type: &TypeDescriptor) -> bool {
    let wanted = annotation_type.qualified_name();
    candidate.annotations().iter().any(|a| a.name() == wanted)
}

/// Loose name lookup on an annotation's simple name: case-insensitive
/// (Unicode lowercase mapping), and `name` may omit the `Attribute`
/// suffix. Simple names never contain `.`, so a dotted `name` matches
/// nothing.
pub fn has_annotation_named(candidate: &TypeDescriptor, name: &str) -> bool {
    let wanted = name.to_lowercase();
    let suffix = ANNOTATION_SUFFIX.to_lowercase();
    candidate.annotations().iter().any(|annotation| {
        let actual = annotation.simple_name().to_lowercase();
        actual == wanted || actual.strip_suffix(suffix.as_str()) == Some(wanted.as_str())
    })
}
