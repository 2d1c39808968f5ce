//! Manifest compilation.
//!
//! Turns a scanned asset tree and a version string into an
//! [`AssetManifest`], and renders that manifest into the artifact the host
//! runtime loads as its offline caching controller.
//!
//! # Example
//!
//! ```
//! use flagpack_assets::ScannedAssets;
//! use flagpack_manifest::{ArtifactRenderer, AssetManifest, EvictionPolicy, Format};
//!
//! let manifest = AssetManifest::compile(&ScannedAssets::default(), "2.1.0");
//! assert_eq!(manifest.cache().as_str(), "flag-game-2.1.0");
//!
//! let renderer = ArtifactRenderer::new(Format::ServiceWorker, EvictionPolicy::default()).unwrap();
//! let artifact = renderer.render(&manifest).unwrap();
//! assert!(artifact.starts_with("// Generated by flagpack."));
//! ```

mod artifact;
pub mod error;
mod manifest;
mod packs;
mod policy;

pub use crate::artifact::{ArtifactRenderer, Format};
pub use crate::manifest::{AssetManifest, CACHE_PREFIX, CacheIdentifier, DEFAULT_VERSION, SHELL_URLS};
pub use crate::packs::{Coverage, PackCodes};
pub use crate::policy::EvictionPolicy;
