//! Test utilities and fixtures for Unitscan
//!
//! Provides program-model fixtures shared by the integration tests and
//! benches, plus an instrumented model that records unit lookups.

pub mod counting;
pub mod fixtures;

pub use counting::CountingProgram;
pub use fixtures::{
    build_graph, chain_fixture, cycle_fixture, layered_fixture, marked_unit, shapes_fixture,
    LayeredFixture, ShapesFixture, UnitSpec,
};

use tracing_subscriber::EnvFilter;

/// Install a test-friendly tracing subscriber once.
///
/// Honors `RUST_LOG`; repeated calls from many tests are harmless.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
