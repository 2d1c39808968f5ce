use derive_more::Display;

/// How filenames inside a category directory are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Every matching file is an asset in its own right.
    Plain,
    /// Files are voice clips and must be classified into a [`Phrase`](crate::Phrase).
    Phrases,
}

/// The fixed set of asset categories making up the static asset tree.
///
/// Directories are relative to the project root and always use forward
/// slashes, because they double as URL path segments in the manifest.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    #[display("icons")]
    Icons,
    #[display("images")]
    Images,
    #[display("root audio")]
    RootAudio,
    #[display("voice clips")]
    VoiceClips,
    #[display("flags")]
    Flags,
}

impl Category {
    pub const ALL: [Category; 5] = [Self::Icons, Self::Images, Self::RootAudio, Self::VoiceClips, Self::Flags];

    /// Directory holding this category, relative to the project root.
    pub fn directory(&self, voice_id: &str) -> String {
        match self {
            Self::Icons => "assets/icons".to_string(),
            Self::Images => "assets/images".to_string(),
            Self::RootAudio => "assets/audio".to_string(),
            Self::VoiceClips => format!("assets/audio/{voice_id}"),
            Self::Flags => "assets/flags".to_string(),
        }
    }

    /// File extension (without the leading dot) accepted in this category.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Icons | Self::Images | Self::Flags => "png",
            Self::RootAudio | Self::VoiceClips => "mp3",
        }
    }

    pub fn rule(&self) -> Rule {
        match self {
            Self::VoiceClips => Rule::Phrases,
            _ => Rule::Plain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Category::Icons, "assets/icons", "png")]
    #[case(Category::Images, "assets/images", "png")]
    #[case(Category::RootAudio, "assets/audio", "mp3")]
    #[case(Category::VoiceClips, "assets/audio/voice42", "mp3")]
    #[case(Category::Flags, "assets/flags", "png")]
    fn test_layout(#[case] category: Category, #[case] directory: &str, #[case] extension: &str) {
        assert_eq!(category.directory("voice42"), directory);
        assert_eq!(category.extension(), extension);
    }

    #[test]
    fn test_only_voice_clips_are_classified() {
        let phrased: Vec<_> = Category::ALL.into_iter().filter(|c| c.rule() == Rule::Phrases).collect();
        assert_eq!(phrased, vec![Category::VoiceClips]);
    }
}
