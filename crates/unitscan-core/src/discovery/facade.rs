use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;
use tracing::debug;

use super::cache::{CacheEntry, CacheStats, QueryCache, QueryKind};
use super::gate::OptInGate;
use super::identity::{Compared, IgnoreCase, SymbolIdentity, UnitOnly};
use super::predicates;
use super::walker::{GraphWalker, TypeWalk};
use crate::cancel::CancellationToken;
use crate::config::DiscoveryConfig;
use crate::error::{DiscoveryError, Result};
use crate::model::{ProgramModel, TypeDescriptor, TypeRef, Unit, UnitId};

/// Public entry point for one discovery session.
///
/// A session is tied to one program model snapshot (one build pass).
/// Results are memoized for the lifetime of the session and never
/// invalidated; create a new `TypeDiscovery` for the next pass.
///
/// Every query returns types deduplicated by symbol identity. Order follows
/// the walk and is stable for a fixed model, but is not part of the contract.
pub struct TypeDiscovery<M> {
    model: M,
    gate: OptInGate,
    all_types: QueryCache<(), UnitOnly>,
    derived: QueryCache<TypeRef, SymbolIdentity>,
    annotated: QueryCache<TypeRef, SymbolIdentity>,
    named: QueryCache<Arc<str>, IgnoreCase>,
}

impl<M: ProgramModel> TypeDiscovery<M> {
    pub fn new(model: M, config: &DiscoveryConfig) -> Self {
        Self {
            model,
            gate: OptInGate::from_config(config),
            all_types: QueryCache::new(QueryKind::AllTypes),
            derived: QueryCache::new(QueryKind::DerivedTypes),
            annotated: QueryCache::new(QueryKind::AnnotatedTypes),
            named: QueryCache::new(QueryKind::AnnotationName),
        }
    }

    pub fn with_default_config(model: M) -> Self {
        Self::new(model, &DiscoveryConfig::default())
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn gate(&self) -> &OptInGate {
        &self.gate
    }

    /// Whether queries rooted at `root` may cross into dependencies.
    pub fn is_cross_unit_discovery_enabled(&self, root: &UnitId) -> Result<bool> {
        let unit = self.resolve_root(root)?;
        Ok(self.gate.is_cross_unit_discovery_enabled(&unit))
    }

    /// Uncached lazy walk over every type reachable from `root`.
    pub fn enumerate_all_types(
        &self,
        root: &UnitId,
        cancel: &CancellationToken,
    ) -> Result<TypeWalk<'_, M>> {
        GraphWalker::new(&self.model, &self.gate).enumerate_all_types(root, cancel)
    }

    /// Every type reachable from `root`, memoized.
    pub fn find_all_types(&self, root: &UnitId, cancel: &CancellationToken) -> Result<CacheEntry> {
        validate_root(root)?;
        self.all_types
            .get_or_compute((), root, || self.collect_matching(root, cancel, |_| true))
    }

    /// Concrete types deriving from or implementing `base`, memoized.
    ///
    /// `base` itself and abstract types are never included.
    pub fn find_derived_types(
        &self,
        root: &UnitId,
        base: &TypeRef,
        cancel: &CancellationToken,
    ) -> Result<CacheEntry> {
        validate_root(root)?;
        validate_type(base, "base")?;
        self.derived.get_or_compute(base.clone(), root, || {
            self.collect_matching(root, cancel, |candidate| {
                predicates::derives_from(candidate, base)
            })
        })
    }

    /// Types carrying an annotation whose declaring name is exactly
    /// `annotation_type`'s qualified name, memoized.
    pub fn find_types_with_annotation(
        &self,
        root: &UnitId,
        annotation_type: &TypeRef,
        cancel: &CancellationToken,
    ) -> Result<CacheEntry> {
        validate_root(root)?;
        validate_type(annotation_type, "annotation_type")?;
        self.annotated
            .get_or_compute(annotation_type.clone(), root, || {
                self.collect_matching(root, cancel, |candidate| {
                    predicates::has_annotation(candidate, annotation_type)
                })
            })
    }

    /// Types carrying an annotation matched loosely by name, memoized.
    ///
    /// See [`predicates::has_annotation_named`] for the matching rules.
    pub fn find_types_with_annotation_name(
        &self,
        root: &UnitId,
        name: &str,
        cancel: &CancellationToken,
    ) -> Result<CacheEntry> {
        validate_root(root)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(DiscoveryError::invalid("name", "annotation name is empty"));
        }
        self.named.get_or_compute(Arc::from(name), root, || {
            self.collect_matching(root, cancel, |candidate| {
                predicates::has_annotation_named(candidate, name)
            })
        })
    }

    /// Combined statistics of all query caches.
    pub fn cache_stats(&self) -> CacheStats {
        self.all_types
            .stats()
            .merge(self.derived.stats())
            .merge(self.annotated.stats())
            .merge(self.named.stats())
    }

    fn resolve_root(&self, root: &UnitId) -> Result<Arc<Unit>> {
        validate_root(root)?;
        self.model
            .unit(root)
            .ok_or_else(|| DiscoveryError::UnknownUnit(root.clone()))
    }

    /// Walk from `root` and keep matching types, deduplicated.
    fn collect_matching<F>(
        &self,
        root: &UnitId,
        cancel: &CancellationToken,
        matches: F,
    ) -> Result<Vec<TypeRef>>
    where
        F: Fn(&TypeDescriptor) -> bool,
    {
        let unit = self.resolve_root(root)?;
        let cross_unit = self.gate.is_cross_unit_discovery_enabled(&unit);
        let mut walk = GraphWalker::new(&self.model, &self.gate).walk(unit, cross_unit, cancel);

        let mut found: IndexSet<Compared<TypeRef, SymbolIdentity>, FxBuildHasher> =
            IndexSet::default();
        for ty in walk.by_ref() {
            let ty = ty?;
            if matches(&ty) {
                found.insert(Compared::new(ty));
            }
        }

        debug!(
            root = %root,
            units_visited = walk.units_visited(),
            matched = found.len(),
            "discovery walk finished"
        );
        Ok(found.into_iter().map(Compared::into_inner).collect())
    }
}

fn validate_root(root: &UnitId) -> Result<()> {
    if root.is_empty() {
        return Err(DiscoveryError::invalid("root", "unit name is empty"));
    }
    Ok(())
}

fn validate_type(ty: &TypeDescriptor, name: &'static str) -> Result<()> {
    if ty.qualified_name().trim().is_empty() {
        return Err(DiscoveryError::invalid(name, "type has no qualified name"));
    }
    Ok(())
}

impl<M> std::fmt::Debug for TypeDiscovery<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeDiscovery")
            .field("gate", &self.gate)
            .field("all_types", &self.all_types)
            .field("derived", &self.derived)
            .field("annotated", &self.annotated)
            .field("named", &self.named)
            .finish()
    }
}
