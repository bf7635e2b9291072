//! Per-build-pass lookup of discovery sessions by root unit.
//!
//! The registry is owned by whoever drives the build pass and handed to
//! the components that need discovery. It is populated once before any
//! query and read by many consumers afterwards. There is no process-wide
//! instance: unrelated sessions cannot see each other's caches.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

use super::facade::TypeDiscovery;
use crate::error::{DiscoveryError, Result};
use crate::model::{ProgramModel, UnitId};

pub struct DiscoveryRegistry<M> {
    sessions: RwLock<FxHashMap<UnitId, Arc<TypeDiscovery<M>>>>,
}

impl<M: ProgramModel> DiscoveryRegistry<M> {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(FxHashMap::default()),
        }
    }

    /// Register `session` for `root`, returning the session it replaced.
    pub fn register(
        &self,
        root: UnitId,
        session: Arc<TypeDiscovery<M>>,
    ) -> Result<Option<Arc<TypeDiscovery<M>>>> {
        if root.is_empty() {
            return Err(DiscoveryError::invalid("root", "unit name is empty"));
        }
        debug!(root = %root, "registered discovery session");
        Ok(self.sessions.write().insert(root, session))
    }

    /// Session for `root`, or [`DiscoveryError::NotAvailable`] when discovery
    /// is not active for it.
    pub fn get(&self, root: &UnitId) -> Result<Arc<TypeDiscovery<M>>> {
        let sessions = self.sessions.read();
        sessions
            .get(root)
            .cloned()
            .ok_or_else(|| DiscoveryError::NotAvailable(root.clone()))
    }

    pub fn remove(&self, root: &UnitId) -> Option<Arc<TypeDiscovery<M>>> {
        self.sessions.write().remove(root)
    }

    pub fn contains(&self, root: &UnitId) -> bool {
        self.sessions.read().contains_key(root)
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Drop every session, ending the build pass.
    pub fn clear(&self) {
        self.sessions.write().clear();
    }
}

impl<M: ProgramModel> Default for DiscoveryRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> std::fmt::Debug for DiscoveryRegistry<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sessions = self.sessions.read();
        f.debug_struct("DiscoveryRegistry")
            .field("roots", &sessions.keys().collect::<Vec<_>>())
            .finish()
    }
}
