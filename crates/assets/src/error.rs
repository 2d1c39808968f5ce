//! Asset Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// An asset scanning error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for asset scanning operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// A missing category directory is deliberately absent from this list: it
/// scans as an empty category.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Access denied while listing a category directory
    #[display("permission denied: {}", _0.display())]
    PermissionDenied(#[error(not(source))] PathBuf),
    /// The category path exists but is a regular file
    #[display("not a directory: {}", _0.display())]
    NotADirectory(#[error(not(source))] PathBuf),
    /// Voice identifiers become a path segment, so separators are rejected
    #[display("invalid voice identifier: {_0:?}")]
    InvalidVoiceId(#[error(not(source))] String),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
}
impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
