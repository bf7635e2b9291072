//! Instrumented program model.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use unitscan_core::{Program, ProgramModel, Unit, UnitId};

/// Wraps a [`Program`] and counts every unit lookup the walker performs.
///
/// The walker resolves each unit it touches exactly once per walk, so a
/// count that does not move across two queries means the second query
/// never walked the graph.
#[derive(Debug, Default)]
pub struct CountingProgram {
    inner: Program,
    lookups: AtomicUsize,
    per_unit: Mutex<FxHashMap<UnitId, usize>>,
}

impl CountingProgram {
    pub fn new(inner: Program) -> Self {
        Self {
            inner,
            lookups: AtomicUsize::new(0),
            per_unit: Mutex::new(FxHashMap::default()),
        }
    }

    /// Total lookups since creation or the last reset.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn lookups_of(&self, id: &UnitId) -> usize {
        self.per_unit.lock().get(id).copied().unwrap_or(0)
    }

    pub fn reset(&self) {
        self.lookups.store(0, Ordering::SeqCst);
        self.per_unit.lock().clear();
    }

    pub fn inner(&self) -> &Program {
        &self.inner
    }
}

impl ProgramModel for CountingProgram {
    fn unit(&self, id: &UnitId) -> Option<Arc<Unit>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        *self.per_unit.lock().entry(id.clone()).or_insert(0) += 1;
        self.inner.unit(id)
    }
}
