//! Manifest Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A manifest error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for manifest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The file defining the asset packs does not exist.
    #[display("pack definition source not found: {}", _0.display())]
    PackSourceMissing(#[error(not(source))] PathBuf),
    /// The file defining the asset packs exists but could not be read.
    #[display("unable to read pack definition source: {}", _0.display())]
    PackSourceUnreadable(#[error(not(source))] PathBuf),
    /// The pack definitions could not be located in the source text.
    #[display("invalid pack definition source: {_0}")]
    PackSourceInvalid(#[error(not(source))] String),
    /// A serialized manifest doesn't agree with itself.
    #[display("inconsistent manifest: {_0}")]
    Inconsistent(#[error(not(source))] String),
    #[display("embedded template not found: {_0}")]
    TemplateNotFound(#[error(not(source))] String),
    #[display("unable to render artifact template")]
    Template,
    #[display("unable to (de)serialize manifest")]
    Serialization,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PackSourceUnreadable(_))
    }
}
