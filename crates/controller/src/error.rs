//! Controller Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use crate::controller::Phase;
use derive_more::{Display, Error};

/// A controller error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for controller operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The host's cache storage refused an operation.
    #[display("cache storage error: {_0}")]
    Storage(#[error(not(source))] String),
    /// Request can never be stored (non-GET, or a URL outside the origin).
    #[display("unsupported request: {_0}")]
    UnsupportedRequest(#[error(not(source))] String),
    /// Network-level failure; no response was produced at all.
    #[display("network error: {_0}")]
    Network(#[error(not(source))] String),
    /// The install batch failed as a whole and nothing was stored.
    #[display("install failed, no assets were cached")]
    InstallBatch,
    /// A response arrived, but not a successful one.
    #[display("unsuccessful response for {_0}: HTTP {_1}")]
    BadResponse(#[error(not(source))] String, #[error(not(source))] u16),
    /// The lifecycle event isn't valid in the controller's current phase.
    #[display("cannot handle {event} while {phase}")]
    InvalidState { phase: Phase, event: &'static str },
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Storage(_) | Self::Network(_) | Self::InstallBatch => true,
            Self::BadResponse(_, status) => *status >= 500,
            Self::UnsupportedRequest(_) | Self::InvalidState { .. } => false,
        }
    }
}
