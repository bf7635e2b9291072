//! Unitscan: type discovery across compiled units.
//!
//! Code generators running inside a compiler normally see only the unit
//! being compiled. This crate walks the unit's dependency graph, entering
//! only dependencies that opted in, and answers memoized structural
//! queries over the declarations it finds:
//!
//! - every reachable type
//! - concrete types deriving from a base type or implementing an interface
//! - types carrying an annotation, by exact type or by loose name
//!
//! # Usage
//!
//! ```
//! use unitscan_core::{CancellationToken, Program, TypeDescriptor, TypeDiscovery, Unit, UnitId};
//!
//! let app = UnitId::new("App", "1.0.0");
//! let shape = TypeDescriptor::builder(&app, "App", "Shape").build();
//! let circle = TypeDescriptor::builder(&app, "App", "Circle")
//!     .base(shape.clone())
//!     .build();
//! let program = Program::new().with_unit(
//!     Unit::builder(app.clone()).with_type(shape.clone()).with_type(circle).build(),
//! );
//!
//! let discovery = TypeDiscovery::with_default_config(program);
//! let derived = discovery
//!     .find_derived_types(&app, &shape, &CancellationToken::none())
//!     .unwrap();
//! assert_eq!(derived.qualified_names(), vec!["App.Circle"]);
//! ```

pub mod cancel;
pub mod config;
pub mod discovery;
pub mod error;
pub mod model;

pub use cancel::CancellationToken;
pub use config::{CrossUnitSetting, DiscoveryConfig, DEFAULT_OPT_IN_MARKER};
pub use discovery::{CacheEntry, CacheStats, DiscoveryRegistry, OptInGate, TypeDiscovery};
pub use error::{DiscoveryError, Result};
pub use model::{
    Annotation, Namespace, Program, ProgramModel, TypeDescriptor, TypeKind, TypeModifiers,
    TypeRef, Unit, UnitBuilder, UnitId,
};
