//! Discovery configuration sourced from build properties.
//!
//! The only behavioral switch is the root-level cross-unit override. It is
//! an opt-out: anything other than an explicit `false`/`0` leaves discovery
//! enabled, and malformed values degrade to that default instead of failing.

use serde::Deserialize;
use tracing::debug;

/// Build property that toggles cross-unit discovery.
pub const ENABLE_CROSS_UNIT_DISCOVERY: &str = "EnableCrossUnitDiscovery";

/// Build property that overrides the opt-in marker name.
pub const OPT_IN_MARKER_PROPERTY: &str = "DiscoveryOptInMarker";

/// Prefix used when build properties are forwarded through analyzer config files.
pub const BUILD_PROPERTY_PREFIX: &str = "build_property.";

/// Qualified name of the unit-level annotation a dependency carries to consent to scanning.
pub const DEFAULT_OPT_IN_MARKER: &str = "Unitscan.DiscoverableUnitAttribute";

/// Tri-state root-level override.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "RawSetting")]
pub enum CrossUnitSetting {
    /// No value was supplied; behaves as enabled.
    #[default]
    Unset,
    Enabled,
    Disabled,
}

impl CrossUnitSetting {
    /// Parse a raw property value.
    ///
    /// Empty or whitespace-only input is `Unset`. `false` (any ASCII case)
    /// and `0` are `Disabled`. Every other value, including garbage, is
    /// `Enabled`.
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim();
        if value.is_empty() {
            CrossUnitSetting::Unset
        } else if value.eq_ignore_ascii_case("false") || value == "0" {
            CrossUnitSetting::Disabled
        } else {
            if !value.eq_ignore_ascii_case("true") && value != "1" {
                debug!(
                    value,
                    "unrecognised {} value, keeping cross-unit discovery enabled",
                    ENABLE_CROSS_UNIT_DISCOVERY
                );
            }
            CrossUnitSetting::Enabled
        }
    }

    pub fn is_enabled(self) -> bool {
        !matches!(self, CrossUnitSetting::Disabled)
    }
}

/// Accepts the shapes a property value can take in JSON build metadata.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawSetting {
    Missing,
    Flag(bool),
    Number(i64),
    Text(String),
}

impl From<RawSetting> for CrossUnitSetting {
    fn from(raw: RawSetting) -> Self {
        match raw {
            RawSetting::Missing => CrossUnitSetting::Unset,
            RawSetting::Flag(true) => CrossUnitSetting::Enabled,
            RawSetting::Flag(false) => CrossUnitSetting::Disabled,
            RawSetting::Number(0) => CrossUnitSetting::Disabled,
            RawSetting::Number(_) => CrossUnitSetting::Enabled,
            RawSetting::Text(text) => CrossUnitSetting::parse(&text),
        }
    }
}

/// Configuration for one discovery session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct DiscoveryConfig {
    pub enable_cross_unit_discovery: CrossUnitSetting,
    #[serde(alias = "DiscoveryOptInMarker")]
    pub opt_in_marker: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            enable_cross_unit_discovery: CrossUnitSetting::Unset,
            opt_in_marker: DEFAULT_OPT_IN_MARKER.to_string(),
        }
    }
}

impl DiscoveryConfig {
    /// Build a config from `(key, value)` build properties.
    ///
    /// Keys match ASCII case-insensitively, with or without the
    /// `build_property.` prefix. Unknown keys are ignored; the last
    /// occurrence of a known key wins.
    pub fn from_build_properties<I, K, V>(properties: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = DiscoveryConfig::default();

        for (key, value) in properties {
            let key = strip_build_prefix(key.as_ref().trim());
            let value = value.as_ref();

            if key.eq_ignore_ascii_case(ENABLE_CROSS_UNIT_DISCOVERY) {
                config.enable_cross_unit_discovery = CrossUnitSetting::parse(value);
            } else if key.eq_ignore_ascii_case(OPT_IN_MARKER_PROPERTY) {
                let marker = value.trim();
                if !marker.is_empty() {
                    config.opt_in_marker = marker.to_string();
                }
            }
        }

        config
    }

    pub fn with_cross_unit_discovery(mut self, setting: CrossUnitSetting) -> Self {
        self.enable_cross_unit_discovery = setting;
        self
    }

    pub fn with_opt_in_marker(mut self, marker: impl Into<String>) -> Self {
        self.opt_in_marker = marker.into();
        self
    }
}

fn strip_build_prefix(key: &str) -> &str {
    match key.get(..BUILD_PROPERTY_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(BUILD_PROPERTY_PREFIX) => {
            &key[BUILD_PROPERTY_PREFIX.len()..]
        }
        _ => key,
    }
}
