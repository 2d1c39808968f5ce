//! Offline cache lifecycle controller.
//!
//! A [`Controller`] is bound to one [`AssetManifest`](flagpack_manifest::AssetManifest)
//! and reacts to three lifecycle events from its host:
//!
//! - **install**: fetch every manifest URL into a cache store named after the
//!   manifest's version, all or nothing;
//! - **activate**: evict stale cache stores and take control;
//! - **fetch**: serve requests cache-first, falling back to the network and
//!   caching what's safe to cache.
//!
//! Storage and network are host-provided through the [`CacheStorage`](storage::CacheStorage)
//! and [`Network`](network::Network) traits. [`Registration`] drives
//! controllers the way a host runtime would.

mod controller;
pub mod error;
pub mod http;
pub mod network;
mod registration;
pub mod storage;

pub use crate::controller::{Activation, Controller, ControllerConfig, Event, Installation, Outcome, Phase};
pub use crate::registration::{Promotion, Registration};
