//! Error taxonomy for the persistence engine.
//!
//! Validation happens before any cell is enumerated, so an `Err` never comes
//! with partial output.

use std::fmt;

/// Error type shared by every engine entry point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PersistenceError {
    /// Rank outside `[1, 4]`, empty axis, non-finite value, `maxdim` out of range.
    InvalidInput { reason: String },
    /// A construction or strategy name that does not exist.
    UnsupportedConfiguration { reason: String },
    /// The engine contradicted itself (strategies disagree, death before birth).
    InternalConsistency { reason: String },
}

impl PersistenceError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    pub(crate) fn unsupported(reason: impl Into<String>) -> Self {
        Self::UnsupportedConfiguration {
            reason: reason.into(),
        }
    }

    pub(crate) fn inconsistent(reason: impl Into<String>) -> Self {
        Self::InternalConsistency {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput { reason } => write!(f, "invalid input: {reason}"),
            Self::UnsupportedConfiguration { reason } => {
                write!(f, "unsupported configuration: {reason}")
            }
            Self::InternalConsistency { reason } => {
                write!(f, "internal consistency error: {reason}")
            }
        }
    }
}

impl std::error::Error for PersistenceError {}
