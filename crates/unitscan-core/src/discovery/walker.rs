//! Dependency graph walk producing every reachable type declaration.
//!
//! The walk is depth-first over units with an explicit worklist, and
//! depth-first over each unit's declaration tree with an explicit stack,
//! so neither deep dependency chains nor deeply nested types grow the
//! call stack. A seen-set keyed by [`UnitId`] makes cycles and diamonds
//! harmless: each unit is resolved and enumerated at most once.
//!
//! Enumeration order is deterministic for a fixed model but callers must
//! not rely on it.

use rustc_hash::FxHashSet;
use std::sync::Arc;
use tracing::{debug, trace};

use super::gate::OptInGate;
use crate::cancel::CancellationToken;
use crate::error::{DiscoveryError, Result};
use crate::model::{Namespace, ProgramModel, TypeRef, Unit, UnitId};

/// Restartable walker; every call to [`GraphWalker::walk`] starts fresh.
pub struct GraphWalker<'a, M: ?Sized> {
    model: &'a M,
    gate: &'a OptInGate,
}

impl<'a, M: ProgramModel + ?Sized> GraphWalker<'a, M> {
    pub fn new(model: &'a M, gate: &'a OptInGate) -> Self {
        Self { model, gate }
    }

    /// Resolve `root` and start a walk from it.
    pub fn enumerate_all_types(
        &self,
        root: &UnitId,
        cancel: &CancellationToken,
    ) -> Result<TypeWalk<'a, M>> {
        if root.is_empty() {
            return Err(DiscoveryError::invalid("root", "unit name is empty"));
        }
        let unit = self
            .model
            .unit(root)
            .ok_or_else(|| DiscoveryError::UnknownUnit(root.clone()))?;
        let cross_unit = self.gate.is_cross_unit_discovery_enabled(&unit);
        Ok(self.walk(unit, cross_unit, cancel))
    }

    /// Walk from an already resolved root. With `cross_unit` off only the
    /// root's own declarations are produced.
    pub fn walk(
        &self,
        root: Arc<Unit>,
        cross_unit: bool,
        cancel: &CancellationToken,
    ) -> TypeWalk<'a, M> {
        let mut seen = FxHashSet::default();
        seen.insert(root.id().clone());

        TypeWalk {
            model: self.model,
            gate: self.gate,
            cross_unit,
            cancel: cancel.clone(),
            worklist: vec![root],
            seen,
            declarations: Vec::new(),
            current: None,
            units_visited: 0,
            done: false,
        }
    }
}

enum Declaration {
    Namespace(Arc<Namespace>),
    Type(TypeRef),
}

/// Lazy iterator over the types of a walk.
///
/// Yields `Err(Cancelled)` once if the token fires, then ends.
pub struct TypeWalk<'a, M: ?Sized> {
    model: &'a M,
    gate: &'a OptInGate,
    cross_unit: bool,
    cancel: CancellationToken,
    /// Units accepted for visiting, resolved and gated.
    worklist: Vec<Arc<Unit>>,
    /// Units already queued or rejected.
    seen: FxHashSet<UnitId>,
    /// Pending declarations of the unit being enumerated.
    declarations: Vec<Declaration>,
    current: Option<Arc<Unit>>,
    units_visited: usize,
    done: bool,
}

impl<'a, M: ProgramModel + ?Sized> TypeWalk<'a, M> {
    /// Units whose declarations have been (or are being) enumerated.
    pub fn units_visited(&self) -> usize {
        self.units_visited
    }

    fn queue_dependencies(&mut self, unit: &Unit) {
        // Reverse so the first declared dependency is visited first.
        for dependency in unit.dependencies().iter().rev() {
            if !self.seen.insert(dependency.clone()) {
                continue;
            }
            let Some(resolved) = self.model.unit(dependency) else {
                debug!(from = %unit.id(), dependency = %dependency, "unresolved dependency skipped");
                continue;
            };
            if self.gate.can_traverse_into(&resolved) {
                trace!(dependency = %dependency, "queued dependency");
                self.worklist.push(resolved);
            } else {
                trace!(dependency = %dependency, marker = self.gate.marker(), "dependency not opted in");
            }
        }
    }

    fn enter(&mut self, unit: Arc<Unit>) {
        self.units_visited += 1;
        trace!(unit = %unit.id(), "visiting unit");
        self.declarations
            .push(Declaration::Namespace(unit.root_namespace().clone()));
        self.current = Some(unit);
    }
}

impl<'a, M: ProgramModel + ?Sized> Iterator for TypeWalk<'a, M> {
    type Item = Result<TypeRef>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            match self.declarations.pop() {
                Some(Declaration::Namespace(namespace)) => {
                    for child in namespace.namespaces().iter().rev() {
                        self.declarations.push(Declaration::Namespace(child.clone()));
                    }
                    for ty in namespace.types().iter().rev() {
                        self.declarations.push(Declaration::Type(ty.clone()));
                    }
                }
                Some(Declaration::Type(ty)) => {
                    for nested in ty.nested_types().iter().rev() {
                        self.declarations.push(Declaration::Type(nested.clone()));
                    }
                    return Some(Ok(ty));
                }
                None => {
                    if let Some(finished) = self.current.take() {
                        if self.cross_unit {
                            self.queue_dependencies(&finished);
                        }
                    }

                    let next = self.worklist.pop()?;
                    if self.cancel.is_cancelled() {
                        debug!(units_visited = self.units_visited, "type walk cancelled");
                        self.done = true;
                        self.worklist.clear();
                        return Some(Err(DiscoveryError::Cancelled));
                    }
                    self.enter(next);
                }
            }
        }
    }
}
