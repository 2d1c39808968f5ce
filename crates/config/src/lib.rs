//! Layered configuration.
//!
//! Later layers override earlier ones:
//!
//! 1. built-in defaults;
//! 2. the user's `flagpack.toml` in the platform config directory;
//! 3. `flagpack.toml` in the working directory;
//! 4. a file given explicitly (`--config`), TOML, YAML or JSON by extension;
//! 5. `FLAGPACK_*` environment variables (`FLAGPACK_VOICE_ID`, ...);
//! 6. command-line [`Overrides`].

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format as _, Json, Serialized, Toml, Yaml};
use flagpack_assets::DEFAULT_VOICE_ID;
use flagpack_manifest::{DEFAULT_VERSION, EvictionPolicy, Format};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const FILE_NAME: &str = "flagpack.toml";
pub const ENV_PREFIX: &str = "FLAGPACK_";

/// Keys taken from the environment verbatim. The generic provider would parse
/// `FLAGPACK_VERSION=3` as an integer.
const RAW_ENV_KEYS: [&str; 5] = ["root", "version", "voice_id", "output", "pack_source"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project root containing `assets/` and the pack definitions.
    pub root: PathBuf,
    /// Release version; the cache identifier is derived from it.
    pub version: String,
    pub voice_id: String,
    /// Where the artifact is written, relative to `root` unless absolute.
    pub output: PathBuf,
    /// Pack definition source, relative to `root` unless absolute.
    pub pack_source: PathBuf,
    pub format: Format,
    pub eviction: EvictionPolicy,
    /// Treat unrecognized voice clips and pack codes without assets as errors.
    pub strict: bool,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            version: DEFAULT_VERSION.to_string(),
            voice_id: DEFAULT_VOICE_ID.to_string(),
            output: PathBuf::from("sw.js"),
            pack_source: PathBuf::from("countries.js"),
            format: Format::default(),
            eviction: EvictionPolicy::default(),
            strict: false,
        }
    }
}
impl Config {
    pub fn output_path(&self) -> PathBuf {
        self.root.join(&self.output)
    }

    pub fn pack_source_path(&self) -> PathBuf {
        self.root.join(&self.pack_source)
    }
}

/// Values set on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eviction: Option<EvictionPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

/// Assembles the configuration layers.
#[derive(Debug, Clone)]
pub struct Loader {
    /// Optional files, lowest priority first. Missing ones are skipped.
    files: Vec<PathBuf>,
    explicit: Option<PathBuf>,
    env_prefix: Option<String>,
    overrides: Overrides,
}
impl Default for Loader {
    fn default() -> Self {
        let files = user_config_path().into_iter().chain([PathBuf::from(FILE_NAME)]).collect();
        Self { files, explicit: None, env_prefix: Some(ENV_PREFIX.to_string()), overrides: Overrides::default() }
    }
}
impl Loader {
    /// No files, no environment; defaults plus whatever is added.
    pub fn empty() -> Self {
        Self { files: Vec::new(), explicit: None, env_prefix: None, overrides: Overrides::default() }
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// A file that must exist.
    pub fn with_explicit(mut self, path: impl Into<Option<PathBuf>>) -> Self {
        self.explicit = path.into();
        self
    }

    pub fn with_env(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn figment(&self) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        for path in &self.files {
            figment = merge_file(figment, path)?;
        }
        if let Some(path) = &self.explicit {
            if !path.is_file() {
                exn::bail!(ErrorKind::NotFound(path.clone()));
            }
            figment = merge_file(figment, path)?;
        }
        if let Some(prefix) = &self.env_prefix {
            figment = figment.merge(Env::prefixed(prefix).ignore(&RAW_ENV_KEYS));
            for key in RAW_ENV_KEYS {
                if let Ok(value) = std::env::var(format!("{prefix}{}", key.to_uppercase())) {
                    figment = figment.merge(Serialized::default(key, value));
                }
            }
        }
        Ok(figment.merge(Serialized::defaults(&self.overrides)))
    }

    pub fn load(&self) -> Result<Config> {
        let config: Config = self.figment()?.extract().or_raise(|| ErrorKind::Invalid)?;
        tracing::debug!(?config, "Configuration loaded");
        Ok(config)
    }
}

/// `flagpack.toml` in the platform's per-user configuration directory.
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "flagpack").map(|dirs| dirs.config_dir().join(FILE_NAME))
}

fn merge_file(figment: Figment, path: &Path) -> Result<Figment> {
    let figment = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => figment.merge(Toml::file(path)),
        Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
        Some("json") => figment.merge(Json::file(path)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(path.to_path_buf())),
    };
    Ok(figment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let config = Loader::empty().load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.version, "2.1.0");
        assert_eq!(config.voice_id, "kPzsL2i3teMYv0FxEYQ6");
        assert_eq!(config.output_path(), Path::new("./sw.js"));
        assert_eq!(config.pack_source_path(), Path::new("./countries.js"));
    }

    #[test]
    fn test_missing_optional_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Loader::empty().with_file(temp_dir.path().join(FILE_NAME)).load().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_explicit_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = Loader::empty().with_explicit(temp_dir.path().join("custom.toml")).load().unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[rstest]
    #[case("config.toml", "version = \"3.0.0\"\neviction = \"owned-prefix\"\n")]
    #[case("config.yaml", "version: \"3.0.0\"\neviction: owned-prefix\n")]
    #[case("config.json", r#"{"version": "3.0.0", "eviction": "owned-prefix"}"#)]
    fn test_explicit_formats(#[case] name: &str, #[case] contents: &str) {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        let config = Loader::empty().with_explicit(path).load().unwrap();
        assert_eq!(config.version, "3.0.0");
        assert_eq!(config.eviction, EvictionPolicy::OwnedPrefix);
        assert_eq!(config.format, Format::ServiceWorker);
    }

    #[test]
    fn test_unsupported_format() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.ini");
        std::fs::write(&path, "version=3").unwrap();
        let err = Loader::empty().with_explicit(path).load().unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsupportedFormat(_)));
    }

    #[test]
    fn test_layer_precedence() {
        let temp_dir = tempfile::tempdir().unwrap();
        let project = temp_dir.path().join(FILE_NAME);
        std::fs::write(&project, "version = \"1.0.0\"\nvoice_id = \"project\"\nstrict = true\n").unwrap();
        let explicit = temp_dir.path().join("release.toml");
        std::fs::write(&explicit, "version = \"2.0.0\"\n").unwrap();

        let overrides = Overrides { format: Some(Format::Json), ..Default::default() };
        let config =
            Loader::empty().with_file(&project).with_explicit(explicit).with_overrides(overrides).load().unwrap();
        assert_eq!(config.version, "2.0.0");
        assert_eq!(config.voice_id, "project");
        assert!(config.strict);
        assert_eq!(config.format, Format::Json);

        let overrides = Overrides { version: Some("9.9.9".to_string()), ..Default::default() };
        let config = Loader::empty().with_file(&project).with_overrides(overrides).load().unwrap();
        assert_eq!(config.version, "9.9.9");
    }

    #[rstest]
    #[case("3", "3")]
    #[case("2.0", "2.0")]
    #[case("2024-06-01", "2024-06-01")]
    #[case("true", "true")]
    fn test_env_version_is_verbatim(#[case] raw: &str, #[case] expected: &str) {
        Jail::expect_with(|jail| {
            jail.set_env("FLAGPACK_TEST_VERSION", raw);
            jail.set_env("FLAGPACK_TEST_VOICE_ID", "42");
            jail.set_env("FLAGPACK_TEST_STRICT", "true");
            let config = Loader::empty().with_env("FLAGPACK_TEST_").load().unwrap();
            assert_eq!(config.version, expected);
            assert_eq!(config.voice_id, "42");
            assert!(config.strict);
            Ok(())
        });
    }

    #[test]
    fn test_env_below_overrides() {
        Jail::expect_with(|jail| {
            jail.set_env("FLAGPACK_TEST_VERSION", "3");
            let overrides = Overrides { version: Some("4".to_string()), ..Default::default() };
            let config = Loader::empty().with_env("FLAGPACK_TEST_").with_overrides(overrides).load().unwrap();
            assert_eq!(config.version, "4");
            Ok(())
        });
    }

    #[test]
    fn test_invalid_value() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(FILE_NAME);
        std::fs::write(&path, "format = \"yaml\"\n").unwrap();
        let err = Loader::empty().with_file(path).load().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid));
    }

    #[test]
    fn test_relative_and_absolute_paths() {
        let config = Config {
            root: PathBuf::from("/srv/game"),
            output: PathBuf::from("/tmp/sw.js"),
            ..Default::default()
        };
        assert_eq!(config.output_path(), Path::new("/tmp/sw.js"));
        assert_eq!(config.pack_source_path(), Path::new("/srv/game/countries.js"));
    }
}
