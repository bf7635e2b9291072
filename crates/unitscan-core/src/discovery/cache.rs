//! Memoization of discovery query results.
//!
//! One [`QueryCache`] exists per query kind, keyed by the query parameter
//! (compared through a [`KeyComparer`]) and the root unit. Entries are
//! never invalidated; a new discovery session starts with empty caches.
//!
//! # Thread Safety
//!
//! `get_or_compute` probes under a read lock, computes with no lock held,
//! then inserts under a write lock. Two threads missing on the same key
//! may both compute, but only the first insert is kept and both callers
//! get that stored entry back.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

use super::identity::{Compared, KeyComparer};
use crate::error::Result;
use crate::model::{TypeRef, UnitId};

/// Which query a cache serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKind {
    AllTypes,
    DerivedTypes,
    AnnotatedTypes,
    AnnotationName,
}

/// `(kind, parameter, root)` with the parameter compared through `C`.
pub struct CacheKey<P, C> {
    kind: QueryKind,
    parameter: Compared<P, C>,
    root: UnitId,
}

impl<P, C> CacheKey<P, C> {
    pub fn new(kind: QueryKind, parameter: P, root: UnitId) -> Self {
        Self {
            kind,
            parameter: Compared::new(parameter),
            root,
        }
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    pub fn parameter(&self) -> &P {
        self.parameter.get()
    }

    pub fn root(&self) -> &UnitId {
        &self.root
    }
}

impl<P, C: KeyComparer<P>> PartialEq for CacheKey<P, C> {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.root == other.root && self.parameter == other.parameter
    }
}

impl<P, C: KeyComparer<P>> Eq for CacheKey<P, C> {}

impl<P, C: KeyComparer<P>> Hash for CacheKey<P, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.root.hash(state);
        self.parameter.hash(state);
    }
}

impl<P: fmt::Debug, C> fmt::Debug for CacheKey<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheKey")
            .field("kind", &self.kind)
            .field("parameter", self.parameter.get())
            .field("root", &self.root)
            .finish()
    }
}

/// Immutable query result shared by every caller.
#[derive(Clone)]
pub struct CacheEntry(Arc<[TypeRef]>);

impl CacheEntry {
    pub fn new(types: Vec<TypeRef>) -> Self {
        CacheEntry(types.into())
    }

    pub fn types(&self) -> &[TypeRef] {
        &self.0
    }

    /// True when both handles share the same stored result.
    pub fn ptr_eq(&self, other: &CacheEntry) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn qualified_names(&self) -> Vec<&str> {
        self.0.iter().map(|ty| ty.qualified_name()).collect()
    }
}

impl Deref for CacheEntry {
    type Target = [TypeRef];

    fn deref(&self) -> &[TypeRef] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a CacheEntry {
    type Item = &'a TypeRef;
    type IntoIter = std::slice::Iter<'a, TypeRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Debug for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.qualified_names()).finish()
    }
}

/// Cache statistics for monitoring effectiveness
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

impl CacheStats {
    /// Calculate cache hit rate as a fraction (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn merge(self, other: CacheStats) -> CacheStats {
        CacheStats {
            hits: self.hits + other.hits,
            misses: self.misses + other.misses,
            entries: self.entries + other.entries,
        }
    }
}

/// Concurrent get-or-compute map for one query kind.
pub struct QueryCache<P, C> {
    kind: QueryKind,
    entries: RwLock<FxHashMap<CacheKey<P, C>, CacheEntry>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<P, C: KeyComparer<P>> QueryCache<P, C> {
    pub fn new(kind: QueryKind) -> Self {
        Self {
            kind,
            entries: RwLock::new(FxHashMap::default()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    /// Probe without computing.
    pub fn get(&self, parameter: P, root: &UnitId) -> Option<CacheEntry> {
        let key = CacheKey::new(self.kind, parameter, root.clone());
        let entries = self.entries.read();
        entries.get(&key).cloned()
    }

    /// Return the stored entry for `(parameter, root)`, computing it on a miss.
    ///
    /// A failed computation stores nothing, so a cancelled query can be
    /// retried later.
    pub fn get_or_compute<F>(&self, parameter: P, root: &UnitId, compute: F) -> Result<CacheEntry>
    where
        F: FnOnce() -> Result<Vec<TypeRef>>,
    {
        let key = CacheKey::new(self.kind, parameter, root.clone());

        if let Some(entry) = self.entries.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(kind = ?self.kind, root = %root, "query cache hit");
            return Ok(entry.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(kind = ?self.kind, root = %root, "query cache miss");

        let computed = CacheEntry::new(compute()?);

        let mut entries = self.entries.write();
        let stored = entries.entry(key).or_insert(computed);
        Ok(stored.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}

impl<P, C> fmt::Debug for QueryCache<P, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryCache")
            .field("kind", &self.kind)
            .field("entries", &self.entries.read().len())
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::identity::{IgnoreCase, SymbolIdentity, UnitOnly};
    use crate::error::DiscoveryError;
    use crate::model::TypeDescriptor;
    use std::cell::Cell;

    fn ty(unit: &UnitId, name: &str) -> TypeRef {
        TypeDescriptor::builder(unit, "App", name).build()
    }

    #[test]
    fn test_get_or_compute_memoizes() {
        let root = UnitId::unversioned("App");
        let cache: QueryCache<(), UnitOnly> = QueryCache::new(QueryKind::AllTypes);
        let calls = Cell::new(0);

        let first = cache
            .get_or_compute((), &root, || {
                calls.set(calls.get() + 1);
                Ok(vec![ty(&root, "A"), ty(&root, "B")])
            })
            .unwrap();
        let second = cache
            .get_or_compute((), &root, || {
                calls.set(calls.get() + 1);
                Ok(Vec::new())
            })
            .unwrap();

        assert_eq!(calls.get(), 1);
        assert!(first.ptr_eq(&second));
        assert_eq!(second.qualified_names(), vec!["App.A", "App.B"]);
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                entries: 1
            }
        );
    }

    #[test]
    fn test_symbol_parameter_ignores_instance_identity() {
        let root = UnitId::unversioned("App");
        let cache: QueryCache<TypeRef, SymbolIdentity> = QueryCache::new(QueryKind::DerivedTypes);

        let shape_pass_one = ty(&root, "Shape");
        let shape_pass_two = ty(&root, "Shape");

        cache
            .get_or_compute(shape_pass_one, &root, || Ok(vec![ty(&root, "Circle")]))
            .unwrap();

        let hit = cache.get(shape_pass_two, &root);
        assert_eq!(hit.map(|e| e.len()), Some(1));
    }

    #[test]
    fn test_roots_are_separate_keys() {
        let app = UnitId::unversioned("App");
        let tool = UnitId::unversioned("Tool");
        let cache: QueryCache<String, IgnoreCase> =
            QueryCache::new(QueryKind::AnnotationName);

        cache
            .get_or_compute("Service".to_string(), &app, || Ok(vec![ty(&app, "A")]))
            .unwrap();

        assert!(cache.get("service".to_string(), &app).is_some());
        assert!(cache.get("Service".to_string(), &tool).is_none());
    }

    #[test]
    fn test_failed_compute_is_not_stored() {
        let root = UnitId::unversioned("App");
        let cache: QueryCache<(), UnitOnly> = QueryCache::new(QueryKind::AllTypes);

        let err = cache
            .get_or_compute((), &root, || Err(DiscoveryError::Cancelled))
            .unwrap_err();
        assert_eq!(err, DiscoveryError::Cancelled);
        assert!(cache.is_empty());

        let entry = cache
            .get_or_compute((), &root, || Ok(vec![ty(&root, "A")]))
            .unwrap();
        assert_eq!(entry.len(), 1);
    }

    #[test]
    fn test_hit_rate() {
        let stats = CacheStats {
            hits: 3,
            misses: 1,
            entries: 1,
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(CacheStats::default().hit_rate(), 0.0);
    }
}
