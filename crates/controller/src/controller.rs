//! The cache lifecycle state machine.
//!
//! ```text
//! Parsed ──install──▶ Installing ──ok──▶ Installed ──activate──▶ Activating ──▶ Activated
//!                          │
//!                          └──error──▶ Redundant
//! ```
//!
//! A controller is created for exactly one manifest and never changes it. The
//! host drives it with three lifecycle events, either through the typed
//! methods or through [`Controller::dispatch`].

use crate::error::{ErrorKind, Result};
use crate::http::{Request, Response};
use crate::network::{Network, NetworkHandle};
use crate::storage::{CacheStorage, CacheStore, StorageHandle};
use derive_more::Display;
use exn::ResultExt;
use flagpack_manifest::{AssetManifest, CacheIdentifier, EvictionPolicy};
use futures::future::{BoxFuture, join_all, try_join_all};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::instrument;

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created, nothing has happened yet.
    #[display("parsed")]
    Parsed,
    #[display("installing")]
    Installing,
    /// Every manifest URL is stored; waiting to take over.
    #[display("installed")]
    Installed,
    #[display("activating")]
    Activating,
    /// Serving fetches from its own cache store.
    #[display("activated")]
    Activated,
    /// Install failed. The controller will never serve anything.
    #[display("redundant")]
    Redundant,
}

/// Everything a controller instance is configured with.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub manifest: Arc<AssetManifest>,
    pub eviction: EvictionPolicy,
}
impl ControllerConfig {
    pub fn new(manifest: AssetManifest) -> Self {
        Self { manifest: Arc::new(manifest), eviction: EvictionPolicy::default() }
    }

    pub fn with_eviction(mut self, eviction: EvictionPolicy) -> Self {
        self.eviction = eviction;
        self
    }

    pub fn cache(&self) -> &CacheIdentifier {
        self.manifest.cache()
    }
}

/// Lifecycle signals delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Install,
    Activate,
    Fetch(Request),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Installed(Installation),
    Activated(Activation),
    Response(Response),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    pub cache: CacheIdentifier,
    /// Number of request/response pairs written.
    pub stored: usize,
    /// The controller asks to take over without waiting for existing consumers to go away.
    pub skip_waiting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    pub cache: CacheIdentifier,
    /// Stores that were deleted.
    pub evicted: Vec<String>,
    /// Stale stores whose deletion failed. They stay behind until the next activation.
    pub failed: Vec<String>,
    /// The controller claims every open consumer immediately.
    pub claimed: bool,
}

/// One version of the offline cache controller.
pub struct Controller {
    config: ControllerConfig,
    storage: StorageHandle,
    network: NetworkHandle,
    phase: RwLock<Phase>,
}
impl Controller {
    pub fn new(config: ControllerConfig, storage: StorageHandle, network: NetworkHandle) -> Self {
        Self { config, storage, network, phase: RwLock::new(Phase::Parsed) }
    }

    pub fn cache(&self) -> &CacheIdentifier {
        self.config.cache()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub async fn phase(&self) -> Phase {
        *self.phase.read().await
    }

    /// Move from `from` to `to`, or fail without changing anything.
    async fn advance(&self, from: Phase, to: Phase, event: &'static str) -> Result<()> {
        let mut phase = self.phase.write().await;
        if *phase != from {
            exn::bail!(ErrorKind::InvalidState { phase: *phase, event });
        }
        tracing::debug!(cache = %self.cache(), from = %from, to = %to, "Phase transition");
        *phase = to;
        Ok(())
    }

    /// Handle any lifecycle event.
    ///
    /// The returned future owns a handle to the controller, so the host can
    /// hold on to it (the equivalent of `waitUntil`/`respondWith`) for as
    /// long as it needs to.
    pub fn dispatch(self: &Arc<Self>, event: Event) -> BoxFuture<'static, Result<Outcome>> {
        let controller = Arc::clone(self);
        Box::pin(async move {
            match event {
                Event::Install => controller.install().await.map(Outcome::Installed),
                Event::Activate => controller.activate().await.map(Outcome::Activated),
                Event::Fetch(request) => controller.fetch(request).await.map(Outcome::Response),
            }
        })
    }

    /// Fetch every manifest URL and store all of them, or none.
    ///
    /// A network error or a non-2xx response for any single URL fails the
    /// whole batch and makes this controller [`Redundant`](Phase::Redundant).
    /// Whatever was active before stays authoritative.
    #[instrument(skip_all, fields(cache = %self.cache()))]
    pub async fn install(&self) -> Result<Installation> {
        self.advance(Phase::Parsed, Phase::Installing, "install").await?;
        match self.populate().await {
            Ok(stored) => {
                *self.phase.write().await = Phase::Installed;
                tracing::info!(stored, "Installed");
                Ok(Installation { cache: self.cache().clone(), stored, skip_waiting: true })
            },
            Err(err) => {
                *self.phase.write().await = Phase::Redundant;
                tracing::warn!(error = %err, "Install failed");
                Err(err)
            },
        }
    }

    async fn populate(&self) -> Result<usize> {
        let store = self.storage.open(self.cache().as_str()).await.or_raise(|| ErrorKind::InstallBatch)?;
        let fetches = self.config.manifest.urls().map(|url| self.fetch_for_install(Request::get(url)));
        let entries = try_join_all(fetches).await.or_raise(|| ErrorKind::InstallBatch)?;
        let stored = entries.len();
        store.put_all(entries).await.or_raise(|| ErrorKind::InstallBatch)?;
        Ok(stored)
    }

    async fn fetch_for_install(&self, request: Request) -> Result<(Request, Response)> {
        let response = self.network.fetch(&request).await?;
        if !response.is_ok() {
            exn::bail!(ErrorKind::BadResponse(request.url, response.status));
        }
        Ok((request, response))
    }

    /// Delete every stale store, then take control.
    ///
    /// Deletions run independently; one failing doesn't stop the others, nor
    /// the activation itself. If the store names can't be listed at all,
    /// nothing is evicted this time round.
    #[instrument(skip_all, fields(cache = %self.cache(), eviction = %self.config.eviction))]
    pub async fn activate(&self) -> Result<Activation> {
        self.advance(Phase::Installed, Phase::Activating, "activate").await?;
        let names = match self.storage.keys().await {
            Ok(names) => names,
            Err(err) => {
                tracing::warn!(error = %err, "Unable to list cache stores, skipping eviction");
                Vec::new()
            },
        };
        let stale: Vec<String> =
            names.into_iter().filter(|name| self.config.eviction.is_stale(name, self.cache())).collect();
        let deletions = stale.iter().map(|name| async move { (name, self.storage.delete(name).await) });

        let mut activation =
            Activation { cache: self.cache().clone(), evicted: Vec::new(), failed: Vec::new(), claimed: true };
        for (name, result) in join_all(deletions).await {
            match result {
                Ok(true) => activation.evicted.push(name.clone()),
                Ok(false) => tracing::debug!(store = %name, "Stale store already gone"),
                Err(err) => {
                    tracing::warn!(store = %name, error = %err, "Unable to delete stale store");
                    activation.failed.push(name.clone());
                },
            }
        }
        *self.phase.write().await = Phase::Activated;
        tracing::info!(evicted = activation.evicted.len(), failed = activation.failed.len(), "Activated");
        Ok(activation)
    }

    /// Serve a request cache-first.
    ///
    /// - Hit: the stored response, without touching the network.
    /// - Miss: exactly one network fetch. A cacheable response is copied into
    ///   the store before the original is returned; failing to store it is
    ///   logged and otherwise ignored.
    ///
    /// A failing cache lookup counts as a miss. Network errors are returned
    /// to the caller.
    #[instrument(skip_all, fields(cache = %self.cache(), request = %request))]
    pub async fn fetch(&self, request: Request) -> Result<Response> {
        let phase = self.phase().await;
        if phase != Phase::Activated {
            exn::bail!(ErrorKind::InvalidState { phase, event: "fetch" });
        }
        let store = self
            .storage
            .open(self.cache().as_str())
            .await
            .inspect_err(|err| tracing::warn!(error = %err, "Unable to open cache store"))
            .ok();
        if let Some(store) = &store {
            match store.lookup(&request).await {
                Ok(Some(response)) => {
                    tracing::trace!("Cache hit");
                    return Ok(response);
                },
                Ok(None) => tracing::trace!("Cache miss"),
                Err(err) => tracing::warn!(error = %err, "Cache lookup failed, treating as a miss"),
            }
        }

        let response = self.network.fetch(&request).await?;
        if response.is_cacheable()
            && let Some(store) = &store
            && let Err(err) = store.put(&request, response.clone()).await
        {
            tracing::warn!(error = %err, "Unable to cache response");
        }
        Ok(response)
    }
}
