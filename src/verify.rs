//! Dry run of the install lifecycle against the local asset tree.

use crate::error::{ErrorKind, Result};
use crate::generate;
use flagpack_config::Config;
use flagpack_controller::http::Request;
use flagpack_controller::network::{DirectoryNetwork, Network};
use flagpack_controller::storage::MemoryCacheStorage;
use flagpack_controller::{ControllerConfig, Registration};
use flagpack_manifest::AssetManifest;
use std::sync::Arc;
use tracing::instrument;

/// Every URL the manifest lists that the tree can't serve with a 2xx.
async fn unavailable(network: &DirectoryNetwork, manifest: &AssetManifest) -> Vec<String> {
    let mut missing = Vec::new();
    for url in manifest.urls() {
        match network.fetch(&Request::get(url)).await {
            Ok(response) if response.is_ok() => {},
            Ok(response) => {
                tracing::warn!(url, status = response.status, "Asset unavailable");
                missing.push(url.to_string());
            },
            Err(err) => {
                tracing::warn!(url, error = %err, "Asset unavailable");
                missing.push(url.to_string());
            },
        }
    }
    missing
}

#[instrument(skip_all, fields(version = %config.version))]
pub async fn run(config: &Config) -> Result<()> {
    let manifest = generate::compile(config)?;
    let network = Arc::new(DirectoryNetwork::new(&config.root));

    // Find every failure up front; install alone stops at the first one.
    let missing = unavailable(&network, &manifest).await;
    if !missing.is_empty() {
        for url in &missing {
            println!("missing: {url}");
        }
        exn::bail!(ErrorKind::Verify(missing.len(), manifest.len()));
    }

    let registration = Registration::new(Arc::new(MemoryCacheStorage::new()), network);
    let promotion = match registration
        .update(ControllerConfig::new(manifest.clone()).with_eviction(config.eviction))
        .await
    {
        Ok(promotion) => promotion,
        Err(err) => {
            tracing::error!(error = ?err, "Install failed");
            exn::bail!(ErrorKind::Verify(manifest.len(), manifest.len()));
        },
    };
    println!("Verified {}: {} assets cached", promotion.installation.cache, promotion.installation.stored);
    Ok(())
}
