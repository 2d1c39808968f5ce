//! Failure-injecting storage decorator for testing.

use super::{CacheStorage, CacheStore, StorageHandle, StoreHandle};
use crate::error::{ErrorKind, Result};
use crate::http::{Request, Response};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Faults {
    keys: bool,
    lookup: bool,
    put: bool,
    delete: BTreeSet<String>,
}

/// Wraps another [`CacheStorage`] and fails selected operations.
///
/// Everything not marked as failing is passed through to the inner storage,
/// so the effects of operations that did succeed remain observable there.
pub struct FlakyCacheStorage {
    inner: StorageHandle,
    faults: Faults,
}
impl FlakyCacheStorage {
    pub fn new(inner: StorageHandle) -> Self {
        Self { inner, faults: Faults::default() }
    }

    pub fn failing_keys(mut self) -> Self {
        self.faults.keys = true;
        self
    }

    pub fn failing_lookups(mut self) -> Self {
        self.faults.lookup = true;
        self
    }

    pub fn failing_puts(mut self) -> Self {
        self.faults.put = true;
        self
    }

    pub fn failing_delete(mut self, name: impl Into<String>) -> Self {
        self.faults.delete.insert(name.into());
        self
    }
}

#[async_trait]
impl CacheStorage for FlakyCacheStorage {
    async fn open(&self, name: &str) -> Result<StoreHandle> {
        let inner = self.inner.open(name).await?;
        let store: StoreHandle = Arc::new(FlakyCacheStore { inner, lookup: self.faults.lookup, put: self.faults.put });
        Ok(store)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        if self.faults.keys {
            exn::bail!(ErrorKind::Storage("injected keys failure".to_string()));
        }
        self.inner.keys().await
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        if self.faults.delete.contains(name) {
            exn::bail!(ErrorKind::Storage(format!("injected delete failure for {name}")));
        }
        self.inner.delete(name).await
    }
}

struct FlakyCacheStore {
    inner: StoreHandle,
    lookup: bool,
    put: bool,
}

#[async_trait]
impl CacheStore for FlakyCacheStore {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn lookup(&self, request: &Request) -> Result<Option<Response>> {
        if self.lookup {
            exn::bail!(ErrorKind::Storage(format!("injected lookup failure for {request}")));
        }
        self.inner.lookup(request).await
    }

    async fn put(&self, request: &Request, response: Response) -> Result<()> {
        if self.put {
            exn::bail!(ErrorKind::Storage(format!("injected put failure for {request}")));
        }
        self.inner.put(request, response).await
    }

    async fn put_all(&self, entries: Vec<(Request, Response)>) -> Result<()> {
        if self.put {
            exn::bail!(ErrorKind::Storage("injected batch put failure".to_string()));
        }
        self.inner.put_all(entries).await
    }
}
