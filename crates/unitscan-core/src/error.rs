use thiserror::Error;

use crate::model::UnitId;

/// Errors surfaced by discovery queries and the registry.
///
/// "Nothing matched" is never an error: queries return an empty entry.
/// These variants only describe inputs that cannot be answered at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument {
        name: &'static str,
        reason: &'static str,
    },

    #[error("unit `{0}` is not part of the program model")]
    UnknownUnit(UnitId),

    #[error("type discovery is not available for unit `{0}`")]
    NotAvailable(UnitId),

    #[error("type discovery was cancelled")]
    Cancelled,
}

impl DiscoveryError {
    pub(crate) fn invalid(name: &'static str, reason: &'static str) -> Self {
        DiscoveryError::InvalidArgument { name, reason }
    }

    /// True for the registry's "discovery not active for this root" signal.
    pub fn is_not_available(&self) -> bool {
        matches!(self, DiscoveryError::NotAvailable(_))
    }
}

pub type Result<T> = std::result::Result<T, DiscoveryError>;
