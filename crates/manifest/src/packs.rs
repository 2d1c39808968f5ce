//! Pack definitions.
//!
//! The game groups countries into packs inside `countries.js`. The generator
//! doesn't need the grouping, only the set of codes that any pack can ask
//! for, to check that the asset tree can actually serve every one of them.

use crate::error::{Error, ErrorKind, Result};
use exn::ResultExt;
use flagpack_assets::ScannedAssets;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

static PACKS_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)const\s+packs\s*=\s*\{(.*?)\};").unwrap());
static CODES_ARRAY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bcodes\s*:\s*\[([^\]]*)\]").unwrap());
static COUNTRY_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([a-z]{2}(?:-[a-z0-9]+)?)""#).unwrap());

/// Every country code referenced by at least one pack, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackCodes(BTreeSet<String>);

impl FromStr for PackCodes {
    type Err = Error;

    fn from_str(source: &str) -> std::result::Result<Self, Self::Err> {
        let Some(block) = PACKS_BLOCK.captures(source).and_then(|c| c.get(1)) else {
            exn::bail!(ErrorKind::PackSourceInvalid("no `const packs = { ... };` definition found".to_string()));
        };
        let codes = Self(
            CODES_ARRAY
                .captures_iter(block.as_str())
                .filter_map(|c| c.get(1))
                .flat_map(|array| COUNTRY_CODE.captures_iter(array.as_str()))
                .filter_map(|c| c.get(1))
                .map(|m| m.as_str().to_string())
                .collect(),
        );
        if codes.is_empty() {
            tracing::warn!("Pack definitions found, but no pack references a country code");
        }
        Ok(codes)
    }
}

impl PackCodes {
    /// Reads and parses the pack definition source.
    ///
    /// A missing file is reported as [`ErrorKind::PackSourceMissing`] so the
    /// caller can tell a wrong root apart from a broken file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = match std::fs::read_to_string(path) {
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                exn::bail!(ErrorKind::PackSourceMissing(path.to_path_buf()))
            },
            result => result.or_raise(|| ErrorKind::PackSourceUnreadable(path.to_path_buf()))?,
        };
        let codes: Self = source.parse()?;
        tracing::debug!(path = %path.display(), codes = codes.len(), "Pack definitions loaded");
        Ok(codes)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.0.contains(code)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Compares the pack codes against what the asset tree provides.
    pub fn coverage(&self, assets: &ScannedAssets) -> Coverage {
        let flags: BTreeSet<&str> = assets.flag_codes().collect();
        let audio: BTreeSet<&str> = assets.voice.country_codes().collect();
        Coverage {
            missing_flags: self.iter().filter(|code| !flags.contains(code)).map(str::to_string).collect(),
            missing_audio: self.iter().filter(|code| !audio.contains(code)).map(str::to_string).collect(),
        }
    }
}

/// Pack codes the asset tree cannot serve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Coverage {
    /// Codes without a flag image.
    pub missing_flags: Vec<String>,
    /// Codes without a spoken country name.
    pub missing_audio: Vec<String>,
}
impl Coverage {
    pub fn is_complete(&self) -> bool {
        self.missing_flags.is_empty() && self.missing_audio.is_empty()
    }
}
