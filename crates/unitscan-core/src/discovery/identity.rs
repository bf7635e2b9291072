//! Equality strategies for cache keys and result deduplication.
//!
//! Type descriptors are rebuilt on every incremental pass, so two handles
//! for "the same" type are usually different allocations. Keys therefore
//! compare through a [`KeyComparer`] instead of pointer identity.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use crate::model::{TypeDescriptor, TypeRef};

/// Pluggable equality and hashing for `T`.
///
/// `equals(a, b)` must imply equal hashes.
pub trait KeyComparer<T: ?Sized> {
    fn equals(a: &T, b: &T) -> bool;
    fn hash<H: Hasher>(value: &T, state: &mut H);
}

/// Same qualified name declared by the same unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolIdentity;

impl KeyComparer<TypeDescriptor> for SymbolIdentity {
    fn equals(a: &TypeDescriptor, b: &TypeDescriptor) -> bool {
        a.qualified_name() == b.qualified_name() && a.unit() == b.unit()
    }

    fn hash<H: Hasher>(value: &TypeDescriptor, state: &mut H) {
        value.qualified_name().hash(state);
        value.unit().hash(state);
    }
}

impl KeyComparer<TypeRef> for SymbolIdentity {
    fn equals(a: &TypeRef, b: &TypeRef) -> bool {
        <Self as KeyComparer<TypeDescriptor>>::equals(a, b)
    }

    fn hash<H: Hasher>(value: &TypeRef, state: &mut H) {
        <Self as KeyComparer<TypeDescriptor>>::hash(value, state)
    }
}

/// Case-insensitive string comparison using Unicode lowercase mapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreCase;

fn folded(value: &str) -> impl Iterator<Item = char> + '_ {
    value.chars().flat_map(char::to_lowercase)
}

impl<S: AsRef<str> + ?Sized> KeyComparer<S> for IgnoreCase {
    fn equals(a: &S, b: &S) -> bool {
        folded(a.as_ref()).eq(folded(b.as_ref()))
    }

    fn hash<H: Hasher>(value: &S, state: &mut H) {
        for c in folded(value.as_ref()) {
            state.write_u32(c as u32);
        }
        state.write_u8(0xff);
    }
}

/// Every value is equal; for queries whose only key component is the root.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitOnly;

impl<T> KeyComparer<T> for UnitOnly {
    fn equals(_: &T, _: &T) -> bool {
        true
    }

    fn hash<H: Hasher>(_: &T, _: &mut H) {}
}

/// `T` wrapped so that `Eq`/`Hash` go through comparer `C`.
pub struct Compared<T, C> {
    value: T,
    _comparer: PhantomData<fn() -> C>,
}

impl<T, C> Compared<T, C> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            _comparer: PhantomData,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Clone, C> Clone for Compared<T, C> {
    fn clone(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl<T: fmt::Debug, C> fmt::Debug for Compared<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl<T, C: KeyComparer<T>> PartialEq for Compared<T, C> {
    fn eq(&self, other: &Self) -> bool {
        C::equals(&self.value, &other.value)
    }
}

impl<T, C: KeyComparer<T>> Eq for Compared<T, C> {}

impl<T, C: KeyComparer<T>> Hash for Compared<T, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        C::hash(&self.value, state)
    }
}
