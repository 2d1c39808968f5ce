//! Host-side controller registration.
//!
//! Plays the part of the hosting runtime: holds whichever controller is
//! currently active, rolls out new versions, and routes fetches.

use crate::controller::{Activation, Controller, ControllerConfig, Installation};
use crate::error::Result;
use crate::http::{Request, Response};
use crate::network::{Network, NetworkHandle};
use crate::storage::StorageHandle;
use flagpack_manifest::CacheIdentifier;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::instrument;

/// Result of a successful [`Registration::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Promotion {
    pub installation: Installation,
    pub activation: Activation,
    /// The cache the previous controller served from, if there was one.
    pub replaced: Option<CacheIdentifier>,
}

pub struct Registration {
    storage: StorageHandle,
    network: NetworkHandle,
    active: RwLock<Option<Arc<Controller>>>,
}
impl Registration {
    pub fn new(storage: StorageHandle, network: NetworkHandle) -> Self {
        Self { storage, network, active: RwLock::new(None) }
    }

    pub async fn active(&self) -> Option<Arc<Controller>> {
        self.active.read().await.clone()
    }

    pub async fn active_cache(&self) -> Option<CacheIdentifier> {
        self.active.read().await.as_ref().map(|controller| controller.cache().clone())
    }

    /// Install a new controller version and, only if that succeeds, activate
    /// it and route all subsequent fetches through it.
    ///
    /// On install failure the previously active controller (if any) keeps
    /// serving, and its cache store is untouched.
    #[instrument(skip_all, fields(cache = %config.cache()))]
    pub async fn update(&self, config: ControllerConfig) -> Result<Promotion> {
        let candidate = Arc::new(Controller::new(config, self.storage.clone(), self.network.clone()));
        let installation = candidate.install().await?;
        // Takes over right away; there's no waiting for existing consumers.
        let activation = candidate.activate().await?;
        let replaced = self.active.write().await.replace(candidate).map(|previous| previous.cache().clone());
        tracing::info!(replaced = ?replaced.as_ref().map(CacheIdentifier::as_str), "Controller promoted");
        Ok(Promotion { installation, activation, replaced })
    }

    /// Route a request through the active controller, or straight to the
    /// network when nothing is active yet.
    pub async fn fetch(&self, request: Request) -> Result<Response> {
        match self.active().await {
            Some(controller) => controller.fetch(request).await,
            None => self.network.fetch(&request).await,
        }
    }
}
