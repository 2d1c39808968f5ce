//! Voice clip classification.
//!
//! Every file in the per-voice audio directory goes through exactly one
//! categorizing pass and lands in one of three closed buckets. Files that fit
//! none of them are kept aside as unrecognized instead of being assumed to be
//! country names, so a new kind of phrase shows up in the logs rather than in
//! the country audio list.

use derive_more::Display;
use std::path::Path;

const SCORE_PREFIX: &str = "score_";

/// Fixed phrases spoken by the game itself.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SystemPhrase {
    #[display("question")]
    Question,
    #[display("congrats")]
    Congrats,
}
impl SystemPhrase {
    pub const ALL: [SystemPhrase; 2] = [Self::Question, Self::Congrats];

    pub fn from_stem(stem: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|phrase| phrase.to_string() == stem)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Phrase {
    System(SystemPhrase),
    /// `score_<N>`, announcing a final score of `N`.
    Score(u32),
    /// A country name, keyed by its lowercase code (`fr`, `gb-sct`).
    Country(String),
}
impl Phrase {
    /// Classifies a voice clip filename, returning `None` if it doesn't fit
    /// any known phrase shape.
    ///
    /// ```
    /// use flagpack_assets::{Phrase, SystemPhrase};
    /// assert_eq!(Phrase::classify("score_10.mp3"), Some(Phrase::Score(10)));
    /// assert_eq!(Phrase::classify("question.mp3"), Some(Phrase::System(SystemPhrase::Question)));
    /// assert_eq!(Phrase::classify("fr.mp3"), Some(Phrase::Country("fr".to_string())));
    /// assert_eq!(Phrase::classify("try_again.mp3"), None);
    /// ```
    pub fn classify(file: &str) -> Option<Phrase> {
        let stem = Path::new(file).file_stem()?.to_str()?;
        if let Some(index) = stem.strip_prefix(SCORE_PREFIX) {
            // `u32::from_str` accepts a leading `+`, which isn't a score clip.
            if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            return index.parse().ok().map(Phrase::Score);
        }
        if let Some(phrase) = SystemPhrase::from_stem(stem) {
            return Some(Phrase::System(phrase));
        }
        is_country_code(stem).then(|| Phrase::Country(stem.to_string()))
    }
}

/// Two lowercase letters, optionally followed by a `-subdivision` suffix.
fn is_country_code(stem: &str) -> bool {
    let (base, subdivision) = match stem.split_once('-') {
        Some((base, subdivision)) => (base, Some(subdivision)),
        None => (stem, None),
    };
    base.len() == 2
        && base.bytes().all(|b| b.is_ascii_lowercase())
        && subdivision.is_none_or(|s| !s.is_empty() && s.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceClip {
    pub file: String,
    pub phrase: Phrase,
}

/// Voice clips of one voice, bucketed and ordered.
///
/// - `system` is ordered by filename.
/// - `scores` is ordered by the numeric index (`score_2` before `score_10`).
/// - `countries` is ordered by filename.
/// - `unrecognized` holds filenames that didn't classify, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceClips {
    pub system: Vec<VoiceClip>,
    pub scores: Vec<VoiceClip>,
    pub countries: Vec<VoiceClip>,
    pub unrecognized: Vec<String>,
}
impl VoiceClips {
    pub fn classify(files: impl IntoIterator<Item = String>) -> Self {
        let mut clips = Self::default();
        for file in files {
            match Phrase::classify(&file) {
                Some(phrase @ Phrase::System(_)) => clips.system.push(VoiceClip { file, phrase }),
                Some(phrase @ Phrase::Score(_)) => clips.scores.push(VoiceClip { file, phrase }),
                Some(phrase @ Phrase::Country(_)) => clips.countries.push(VoiceClip { file, phrase }),
                None => {
                    tracing::warn!(file = %file, "Unrecognized voice clip; excluded from the manifest");
                    clips.unrecognized.push(file);
                },
            }
        }
        clips.system.sort_by(|a, b| a.file.cmp(&b.file));
        clips.scores.sort_by(|a, b| a.score_index().cmp(&b.score_index()).then_with(|| a.file.cmp(&b.file)));
        clips.countries.sort_by(|a, b| a.file.cmp(&b.file));
        clips.unrecognized.sort();
        clips
    }

    /// Number of classified clips (unrecognized files excluded).
    pub fn len(&self) -> usize {
        self.system.len() + self.scores.len() + self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Country codes with a spoken name, in clip order.
    pub fn country_codes(&self) -> impl Iterator<Item = &str> {
        self.countries.iter().filter_map(|clip| match &clip.phrase {
            Phrase::Country(code) => Some(code.as_str()),
            _ => None,
        })
    }
}

impl VoiceClip {
    fn score_index(&self) -> Option<u32> {
        match self.phrase {
            Phrase::Score(index) => Some(index),
            _ => None,
        }
    }
}
