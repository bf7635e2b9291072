//! Opt-in gating for cross-unit traversal.
//!
//! Two independent checks decide how far a walk goes:
//!
//! ```text
//! root override (config)      -> may the walk leave the root at all?
//! dependency marker (per unit) -> may the walk enter this dependency?
//! ```
//!
//! The root itself is always scanned; gates only apply to crossing into
//! a dependency.

use tracing::debug;

use crate::config::{CrossUnitSetting, DiscoveryConfig};
use crate::model::Unit;

#[derive(Debug, Clone)]
pub struct OptInGate {
    setting: CrossUnitSetting,
    marker: String,
}

impl OptInGate {
    pub fn new(setting: CrossUnitSetting, marker: impl Into<String>) -> Self {
        Self {
            setting,
            marker: marker.into(),
        }
    }

    pub fn from_config(config: &DiscoveryConfig) -> Self {
        Self::new(
            config.enable_cross_unit_discovery,
            config.opt_in_marker.clone(),
        )
    }

    pub fn setting(&self) -> CrossUnitSetting {
        self.setting
    }

    /// Qualified name of the marker a dependency must carry.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Whether a walk rooted at `root` may leave it. Only an explicit
    /// disable turns this off.
    pub fn is_cross_unit_discovery_enabled(&self, root: &Unit) -> bool {
        let enabled = self.setting.is_enabled();
        debug!(
            root = %root.id(),
            setting = ?self.setting,
            enabled,
            "cross-unit discovery gate"
        );
        enabled
    }

    /// Whether `unit` consented to being scanned as a dependency.
    pub fn can_traverse_into(&self, unit: &Unit) -> bool {
        unit.has_annotation(&self.marker)
    }
}

impl Default for OptInGate {
    fn default() -> Self {
        Self::from_config(&DiscoveryConfig::default())
    }
}
