//! In-memory cache storage.

use super::{CacheStorage, CacheStore, StoreHandle};
use crate::error::{ErrorKind, Result};
use crate::http::{Method, Request, Response};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory cache storage.
///
/// Stores live in a [`BTreeMap`] behind a [`RwLock`], so
/// [`keys()`](CacheStorage::keys) is always sorted and every trait method
/// works on `&self`. Used by `flagpack verify` and throughout the tests.
///
/// # Examples
///
/// ```
/// use flagpack_controller::http::{Request, Response};
/// use flagpack_controller::storage::{CacheStorage, CacheStore, MemoryCacheStorage};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let storage = MemoryCacheStorage::with_stores(["flag-game-1.0.0"]);
/// let store = storage.open("flag-game-2.0.0").await?;
/// store.put(&Request::get("./app.js"), Response::basic(200, "...")).await?;
/// assert_eq!(storage.keys().await?, vec!["flag-game-1.0.0", "flag-game-2.0.0"]);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MemoryCacheStorage {
    stores: RwLock<BTreeMap<String, Arc<MemoryCacheStore>>>,
}
impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create storage pre-populated with empty stores.
    pub fn with_stores(names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let stores = names
            .into_iter()
            .map(Into::into)
            .map(|name: String| (name.clone(), Arc::new(MemoryCacheStore::new(name))))
            .collect();
        Self { stores: RwLock::new(stores) }
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> Result<StoreHandle> {
        let mut guard = self.stores.write().await;
        let store: StoreHandle =
            guard.entry(name.to_string()).or_insert_with(|| Arc::new(MemoryCacheStore::new(name))).clone();
        Ok(store)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.stores.read().await.keys().cloned().collect())
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        Ok(self.stores.write().await.remove(name).is_some())
    }
}

/// A single in-memory store.
pub struct MemoryCacheStore {
    name: String,
    entries: RwLock<HashMap<Request, Response>>,
}
impl MemoryCacheStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), entries: RwLock::new(HashMap::new()) }
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn check(request: &Request) -> Result<()> {
        if request.method != Method::Get {
            exn::bail!(ErrorKind::UnsupportedRequest(request.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, request: &Request) -> Result<Option<Response>> {
        Ok(self.entries.read().await.get(request).cloned())
    }

    async fn put(&self, request: &Request, response: Response) -> Result<()> {
        Self::check(request)?;
        self.entries.write().await.insert(request.clone(), response);
        Ok(())
    }

    async fn put_all(&self, entries: Vec<(Request, Response)>) -> Result<()> {
        // Validate everything before taking the lock so a bad entry leaves the store untouched.
        for (request, _) in &entries {
            Self::check(request)?;
        }
        self.entries.write().await.extend(entries);
        Ok(())
    }
}
