//! Static asset tree scanning.
//!
//! The asset tree has a fixed layout (see [`Category`]). Scanning is
//! read-only and deterministic: the same tree always produces the same,
//! sorted, [`ScannedAssets`].

mod category;
pub mod error;
mod scan;
mod voice;

pub use crate::category::{Category, Rule};
pub use crate::scan::scan_dir;
pub use crate::voice::{Phrase, SystemPhrase, VoiceClip, VoiceClips};
use crate::error::{ErrorKind, Result};
use std::path::{Path, PathBuf};
use tracing::instrument;

/// Voice used for the recorded phrases shipped with the game.
pub const DEFAULT_VOICE_ID: &str = "kPzsL2i3teMYv0FxEYQ6";

/// A project root plus the voice whose clips should be picked up.
#[derive(Debug, Clone)]
pub struct AssetTree {
    root: PathBuf,
    voice_id: String,
}
impl AssetTree {
    pub fn new(root: impl Into<PathBuf>, voice_id: impl Into<String>) -> Self {
        Self { root: root.into(), voice_id: voice_id.into() }
    }

    /// Lists one category, sorted by filename. Voice clips are returned
    /// unclassified.
    pub fn scan_category(&self, category: Category) -> Result<Vec<String>> {
        self.validate_voice_id()?;
        scan_dir(self.root.join(category.directory(&self.voice_id)), category.extension())
    }

    #[instrument(skip(self), fields(root = %self.root.display(), voice = %self.voice_id))]
    pub fn scan(&self) -> Result<ScannedAssets> {
        let assets = ScannedAssets {
            voice_id: self.voice_id.clone(),
            icons: self.scan_category(Category::Icons)?,
            images: self.scan_category(Category::Images)?,
            root_audio: self.scan_category(Category::RootAudio)?,
            voice: VoiceClips::classify(self.scan_category(Category::VoiceClips)?),
            flags: self.scan_category(Category::Flags)?,
        };
        tracing::debug!(
            icons = assets.icons.len(),
            images = assets.images.len(),
            root_audio = assets.root_audio.len(),
            voice_clips = assets.voice.len(),
            flags = assets.flags.len(),
            "Asset tree scanned"
        );
        Ok(assets)
    }

    fn validate_voice_id(&self) -> Result<()> {
        let id = self.voice_id.as_str();
        if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\', '\0']) {
            exn::bail!(ErrorKind::InvalidVoiceId(id.to_string()));
        }
        Ok(())
    }
}

/// Everything found in an [`AssetTree`], per category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScannedAssets {
    pub voice_id: String,
    pub icons: Vec<String>,
    pub images: Vec<String>,
    pub root_audio: Vec<String>,
    pub voice: VoiceClips,
    pub flags: Vec<String>,
}
impl ScannedAssets {
    /// Number of usable assets found for a category.
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Icons => self.icons.len(),
            Category::Images => self.images.len(),
            Category::RootAudio => self.root_audio.len(),
            Category::VoiceClips => self.voice.len(),
            Category::Flags => self.flags.len(),
        }
    }

    /// Categories that came back without a single asset.
    pub fn empty_categories(&self) -> Vec<Category> {
        Category::ALL.into_iter().filter(|c| self.count(*c) == 0).collect()
    }

    /// Flag codes (filename stems), in flag order.
    pub fn flag_codes(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().filter_map(|f| Path::new(f).file_stem().and_then(|s| s.to_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_scan_full_tree() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        for file in [
            "assets/icons/icon-512.png",
            "assets/icons/icon-192.png",
            "assets/audio/positive.mp3",
            "assets/audio/background.mp3",
            "assets/audio/v1/score_10.mp3",
            "assets/audio/v1/score_2.mp3",
            "assets/audio/v1/question.mp3",
            "assets/audio/v1/jp.mp3",
            "assets/audio/v2/fr.mp3",
            "assets/flags/jp.png",
            "assets/flags/fr.png",
        ] {
            write(root, file);
        }
        let assets = AssetTree::new(root, "v1").scan().unwrap();
        assert_eq!(assets.icons, vec!["icon-192.png", "icon-512.png"]);
        assert!(assets.images.is_empty());
        // The voice directory is a subdirectory and never part of root audio.
        assert_eq!(assets.root_audio, vec!["background.mp3", "positive.mp3"]);
        assert_eq!(assets.voice.scores.len(), 2);
        assert_eq!(assets.voice.country_codes().collect::<Vec<_>>(), vec!["jp"]);
        assert_eq!(assets.flag_codes().collect::<Vec<_>>(), vec!["fr", "jp"]);
        assert_eq!(assets.empty_categories(), vec![Category::Images]);
    }

    #[test]
    fn test_scan_empty_tree() {
        let temp_dir = tempfile::tempdir().unwrap();
        let assets = AssetTree::new(temp_dir.path(), DEFAULT_VOICE_ID).scan().unwrap();
        assert_eq!(assets.empty_categories(), Category::ALL.to_vec());
        assert_eq!(assets.voice_id, DEFAULT_VOICE_ID);
    }

    #[test]
    fn test_scan_is_deterministic() {
        let temp_dir = tempfile::tempdir().unwrap();
        for file in ["assets/flags/b.png", "assets/flags/a.png", "assets/flags/c.png"] {
            write(temp_dir.path(), file);
        }
        let tree = AssetTree::new(temp_dir.path(), "voice");
        assert_eq!(tree.scan().unwrap(), tree.scan().unwrap());
    }

    #[test]
    fn test_voice_id_cannot_escape() {
        let temp_dir = tempfile::tempdir().unwrap();
        for voice in ["", "..", "../../etc", "a/b"] {
            let err = AssetTree::new(temp_dir.path(), voice).scan().unwrap_err();
            assert!(matches!(&*err, ErrorKind::InvalidVoiceId(_)));
        }
    }
}
