use crate::error::{ErrorKind, Result};
use derive_more::Display;
use exn::ResultExt;
use flagpack_assets::{Category, ScannedAssets};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::instrument;

/// Every cache store created by the controller is named with this prefix.
pub const CACHE_PREFIX: &str = "flag-game-";
/// Version used when the caller doesn't supply one.
pub const DEFAULT_VERSION: &str = "2.1.0";
/// Application shell, always at the head of the core asset list.
pub const SHELL_URLS: [&str; 6] = ["./", "./index.html", "./styles.css", "./app.js", "./countries.js", "./manifest.json"];

/// Name of the cache store holding one manifest version.
///
/// Derived from the version string alone, verbatim. Two builds sharing a
/// version share a cache store, whatever their asset lists look like.
///
/// ```
/// use flagpack_manifest::CacheIdentifier;
/// assert_eq!(CacheIdentifier::for_version("3.0.0-rc1").as_str(), "flag-game-3.0.0-rc1");
/// ```
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheIdentifier(String);
impl CacheIdentifier {
    pub fn for_version(version: &str) -> Self {
        Self(format!("{CACHE_PREFIX}{version}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether a cache store name looks like one of ours (any version).
    pub fn is_owned(name: &str) -> bool {
        name.starts_with(CACHE_PREFIX)
    }
}
impl AsRef<str> for CacheIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The set of URLs a controller guarantees to have cached once its install
/// completes, split into three ordered lists.
///
/// Built once with [`compile`](Self::compile) and immutable afterwards. No
/// list contains the same URL twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetManifest {
    version: String,
    cache: CacheIdentifier,
    core_assets: Vec<String>,
    pack_assets: Vec<String>,
    country_audio_assets: Vec<String>,
}

impl AssetManifest {
    /// Compiles scanner output into a manifest.
    ///
    /// The version string is not validated. Identical inputs always produce
    /// an identical manifest.
    #[instrument(skip(assets), fields(voice = %assets.voice_id))]
    pub fn compile(assets: &ScannedAssets, version: &str) -> Self {
        let version = version.to_string();
        for category in assets.empty_categories() {
            // Could be a legitimately empty category, could be a half-synced
            // asset tree. Can't tell from here.
            tracing::warn!(category = %category, "No assets found for category");
        }
        let url = |category: Category, file: &str| format!("./{}/{}", category.directory(&assets.voice_id), file);

        let core = SHELL_URLS
            .iter()
            .map(|shell| shell.to_string())
            .chain(assets.icons.iter().map(|f| url(Category::Icons, f)))
            .chain(assets.images.iter().map(|f| url(Category::Images, f)))
            .chain(assets.root_audio.iter().map(|f| url(Category::RootAudio, f)))
            .chain(assets.voice.system.iter().map(|clip| url(Category::VoiceClips, &clip.file)))
            .chain(assets.voice.scores.iter().map(|clip| url(Category::VoiceClips, &clip.file)));
        let packs = assets.flags.iter().map(|f| url(Category::Flags, f));
        let countries = assets.voice.countries.iter().map(|clip| url(Category::VoiceClips, &clip.file));

        let manifest = Self {
            cache: CacheIdentifier::for_version(&version),
            version,
            core_assets: unique(core),
            pack_assets: unique(packs),
            country_audio_assets: unique(countries),
        };
        tracing::debug!(
            cache = %manifest.cache,
            core = manifest.core_assets.len(),
            packs = manifest.pack_assets.len(),
            countries = manifest.country_audio_assets.len(),
            "Manifest compiled"
        );
        manifest
    }

    /// Loads a manifest previously emitted as JSON, rejecting one whose cache
    /// identifier doesn't match its version or whose lists repeat a URL.
    pub fn from_json(json: &str) -> Result<Self> {
        let manifest: Self = serde_json::from_str(json).or_raise(|| ErrorKind::Serialization)?;
        if manifest.cache != CacheIdentifier::for_version(&manifest.version) {
            exn::bail!(ErrorKind::Inconsistent(format!(
                "cache `{}` does not belong to version `{}`",
                manifest.cache, manifest.version
            )));
        }
        for (list, urls) in [
            ("coreAssets", &manifest.core_assets),
            ("packAssets", &manifest.pack_assets),
            ("countryAudioAssets", &manifest.country_audio_assets),
        ] {
            if urls.iter().collect::<HashSet<_>>().len() != urls.len() {
                exn::bail!(ErrorKind::Inconsistent(format!("duplicate URL in {list}")));
            }
        }
        Ok(manifest)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).or_raise(|| ErrorKind::Serialization)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn cache(&self) -> &CacheIdentifier {
        &self.cache
    }

    pub fn core_assets(&self) -> &[String] {
        &self.core_assets
    }

    pub fn pack_assets(&self) -> &[String] {
        &self.pack_assets
    }

    pub fn country_audio_assets(&self) -> &[String] {
        &self.country_audio_assets
    }

    /// Every URL in install order: core, then packs, then country audio.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.core_assets
            .iter()
            .chain(&self.pack_assets)
            .chain(&self.country_audio_assets)
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.core_assets.len() + self.pack_assets.len() + self.country_audio_assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drops repeated URLs, keeping the first occurrence.
fn unique(urls: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter().filter(|url| seen.insert(url.clone())).collect()
}
