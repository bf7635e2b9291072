use rustc_hash::FxHashMap;
use std::sync::Arc;

use super::{Unit, UnitId};

/// Access to the units of one compilation.
///
/// Implementations must be cheap to query repeatedly and safe to share
/// across threads; discovery never mutates what it gets back.
pub trait ProgramModel: Send + Sync {
    /// Look up a unit by identity. `None` for references the model cannot resolve.
    fn unit(&self, id: &UnitId) -> Option<Arc<Unit>>;
}

impl<M: ProgramModel + ?Sized> ProgramModel for Arc<M> {
    fn unit(&self, id: &UnitId) -> Option<Arc<Unit>> {
        (**self).unit(id)
    }
}

impl<M: ProgramModel + ?Sized> ProgramModel for &M {
    fn unit(&self, id: &UnitId) -> Option<Arc<Unit>> {
        (**self).unit(id)
    }
}

/// In-memory program model keyed by unit identity.
#[derive(Debug, Clone, Default)]
pub struct Program {
    units: FxHashMap<UnitId, Arc<Unit>>,
}

impl Program {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a unit, returning the shared handle.
    pub fn insert(&mut self, unit: Unit) -> Arc<Unit> {
        let unit = Arc::new(unit);
        self.units.insert(unit.id().clone(), unit.clone());
        unit
    }

    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.insert(unit);
        self
    }

    pub fn units(&self) -> impl Iterator<Item = &Arc<Unit>> {
        self.units.values()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl ProgramModel for Program {
    fn unit(&self, id: &UnitId) -> Option<Arc<Unit>> {
        self.units.get(id).cloned()
    }
}
