//! Cache storage traits and implementations.
//!
//! The host runtime owns a namespace of named cache stores shared by every
//! controller version. [`CacheStorage`] is that namespace and [`CacheStore`]
//! a single store inside it. Per-key writes and per-store deletes are atomic;
//! nothing else is.

#[cfg(any(test, feature = "mock"))]
mod flaky;
mod memory;

#[cfg(any(test, feature = "mock"))]
pub use self::flaky::FlakyCacheStorage;
pub use self::memory::{MemoryCacheStorage, MemoryCacheStore};
use crate::error::Result;
use crate::http::{Request, Response};
use async_trait::async_trait;
use std::sync::Arc;

pub type StorageHandle = Arc<dyn CacheStorage + Send + Sync>;
pub type StoreHandle = Arc<dyn CacheStore + Send + Sync>;

/// The host's namespace of named cache stores.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open the store with the given name, creating it if it doesn't exist.
    async fn open(&self, name: &str) -> Result<StoreHandle>;

    /// Names of every existing store, from every controller version and
    /// anything else sharing the namespace.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Delete a store and everything in it.
    ///
    /// Returns `false` if no store by that name existed.
    async fn delete(&self, name: &str) -> Result<bool>;
}

/// A single named store mapping requests to responses.
#[async_trait]
pub trait CacheStore: Send + Sync {
    fn name(&self) -> &str;

    /// Exact-match lookup on method and URL.
    async fn lookup(&self, request: &Request) -> Result<Option<Response>>;

    /// Store one pair, replacing any previous response for the request.
    async fn put(&self, request: &Request, response: Response) -> Result<()>;

    /// Store every pair or none of them.
    async fn put_all(&self, entries: Vec<(Request, Response)>) -> Result<()>;
}
