//! Cross-unit type discovery.
//!
//! ```text
//! TypeDiscovery (facade)
//!  ├─> OptInGate      root override + per-dependency marker
//!  ├─> QueryCache     (kind, parameter, root) -> CacheEntry
//!  │    └─> on miss: GraphWalker -> predicates -> dedup
//!  └─> DiscoveryRegistry   root -> session, one per build pass
//! ```

pub mod cache;
pub mod facade;
pub mod gate;
pub mod identity;
pub mod predicates;
pub mod registry;
pub mod walker;

pub use cache::{CacheEntry, CacheKey, CacheStats, QueryCache, QueryKind};
pub use facade::TypeDiscovery;
pub use gate::OptInGate;
pub use identity::{Compared, IgnoreCase, KeyComparer, SymbolIdentity, UnitOnly};
pub use predicates::{
    all_capabilities, base_chain, derives_from, has_annotation, has_annotation_named,
    inherits_from, ANNOTATION_SUFFIX,
};
pub use registry::DiscoveryRegistry;
pub use walker::{GraphWalker, TypeWalk};
