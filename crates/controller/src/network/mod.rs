//! Network traits and implementations.

mod local;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::local::DirectoryNetwork;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockNetwork;
use crate::error::Result;
use crate::http::{Request, Response};
use async_trait::async_trait;
use std::sync::Arc;

pub type NetworkHandle = Arc<dyn Network + Send + Sync>;

/// Whatever the host uses to reach the origin.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform a single request.
    ///
    /// Any HTTP status is a successful fetch; only failures to produce a
    /// response at all are errors
    /// ([`Network`](crate::error::ErrorKind::Network)).
    async fn fetch(&self, request: &Request) -> Result<Response>;
}
