use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use flagpack_assets::{AssetTree, ScannedAssets};
use flagpack_config::Config;
use flagpack_manifest::{ArtifactRenderer, AssetManifest, PackCodes};
use std::fs::Permissions;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::instrument;

/// Scan the tree and compile its manifest, applying the `strict` checks.
pub fn compile(config: &Config) -> Result<AssetManifest> {
    let packs = PackCodes::load(config.pack_source_path()).or_raise(|| ErrorKind::Packs)?;
    let assets = AssetTree::new(&config.root, &config.voice_id).scan().or_raise(|| ErrorKind::Scan)?;
    check(config, &packs, &assets)?;
    Ok(AssetManifest::compile(&assets, &config.version))
}

#[instrument(skip_all, fields(version = %config.version, format = %config.format))]
pub fn run(config: &Config, dry_run: bool) -> Result<()> {
    let manifest = compile(config)?;
    let artifact = ArtifactRenderer::new(config.format, config.eviction)
        .and_then(|renderer| renderer.render(&manifest))
        .or_raise(|| ErrorKind::Render)?;

    if dry_run {
        print!("{artifact}");
        return Ok(());
    }
    let path = config.output_path();
    write_atomic(&path, &artifact)?;
    println!("Generated {}", path.display());
    println!("  - {} flags", manifest.pack_assets().len());
    println!("  - {} country audio files", manifest.country_audio_assets().len());
    println!("  - {} core assets", manifest.core_assets().len());
    println!("  cache: {}", manifest.cache());
    Ok(())
}

fn check(config: &Config, packs: &PackCodes, assets: &ScannedAssets) -> Result<()> {
    let coverage = packs.coverage(assets);
    for code in &coverage.missing_flags {
        tracing::warn!(code = %code, "Pack country has no flag image");
    }
    for code in &coverage.missing_audio {
        tracing::warn!(code = %code, voice = %config.voice_id, "Pack country has no spoken name");
    }
    if !config.strict {
        return Ok(());
    }

    let mut problems = Vec::new();
    if !assets.voice.unrecognized.is_empty() {
        problems.push(format!("unrecognized voice clips: {}", assets.voice.unrecognized.join(", ")));
    }
    if !coverage.missing_flags.is_empty() {
        problems.push(format!("pack countries without flags: {}", coverage.missing_flags.join(", ")));
    }
    if !coverage.missing_audio.is_empty() {
        problems.push(format!("pack countries without audio: {}", coverage.missing_audio.join(", ")));
    }
    if !problems.is_empty() {
        exn::bail!(ErrorKind::Strict(problems.join("; ")));
    }
    Ok(())
}

/// Write via a temporary file in the same directory, so the artifact is either
/// completely replaced or left as it was.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let dir = path.parent().filter(|parent| !parent.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let mut file = NamedTempFile::new_in(dir).or_raise(|| ErrorKind::Write(path.to_path_buf()))?;
    if let Some(permissions) = artifact_permissions(path) {
        file.as_file().set_permissions(permissions).or_raise(|| ErrorKind::Write(path.to_path_buf()))?;
    }
    file.write_all(contents.as_bytes()).or_raise(|| ErrorKind::Write(path.to_path_buf()))?;
    file.persist(path).or_raise(|| ErrorKind::Write(path.to_path_buf()))?;
    tracing::debug!(path = %path.display(), bytes = contents.len(), "Artifact written");
    Ok(())
}

/// The artifact is served by a web server, so it has to stay world-readable.
/// An existing artifact keeps whatever mode it already had.
fn artifact_permissions(path: &Path) -> Option<Permissions> {
    match std::fs::metadata(path) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(_) => default_permissions(),
    }
}

#[cfg(unix)]
fn default_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions() -> Option<Permissions> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const COUNTRIES_JS: &str = r#"const packs = { starter: { codes: ["jp", "fr"] } };"#;

    fn project(voice_files: &[&str]) -> tempfile::TempDir {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        let voice = root.join("assets/audio/voice");
        std::fs::create_dir_all(&voice).unwrap();
        std::fs::create_dir_all(root.join("assets/flags")).unwrap();
        std::fs::write(root.join("countries.js"), COUNTRIES_JS).unwrap();
        for code in ["fr", "jp"] {
            std::fs::write(root.join(format!("assets/flags/{code}.png")), b"png").unwrap();
        }
        for file in voice_files {
            std::fs::write(voice.join(file), b"mp3").unwrap();
        }
        temp_dir
    }

    fn config(root: &Path) -> Config {
        Config { root: root.to_path_buf(), voice_id: "voice".to_string(), ..Default::default() }
    }

    #[test]
    fn test_run_writes_artifact() {
        let temp_dir = project(&["fr.mp3", "jp.mp3", "score_10.mp3", "score_2.mp3"]);
        let config = config(temp_dir.path());
        run(&config, false).unwrap();

        let artifact = std::fs::read_to_string(temp_dir.path().join("sw.js")).unwrap();
        assert!(artifact.contains("const CACHE_NAME = 'flag-game-2.1.0';"));
        let two = artifact.find("score_2.mp3").unwrap();
        let ten = artifact.find("score_10.mp3").unwrap();
        assert!(two < ten);
    }

    #[test]
    fn test_run_is_reproducible() {
        let temp_dir = project(&["fr.mp3", "jp.mp3"]);
        let config = config(temp_dir.path());
        run(&config, false).unwrap();
        let first = std::fs::read(temp_dir.path().join("sw.js")).unwrap();
        run(&config, false).unwrap();
        assert_eq!(std::fs::read(temp_dir.path().join("sw.js")).unwrap(), first);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp_dir = project(&["fr.mp3", "jp.mp3"]);
        run(&config(temp_dir.path()), true).unwrap();
        assert!(!temp_dir.path().join("sw.js").exists());
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_artifact_is_world_readable() {
        use std::os::unix::fs::PermissionsExt;
        let temp_dir = project(&["fr.mp3", "jp.mp3"]);
        run(&config(temp_dir.path()), false).unwrap();
        let mode = std::fs::metadata(temp_dir.path().join("sw.js")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_keeps_mode() {
        use std::os::unix::fs::PermissionsExt;
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("sw.js");
        std::fs::write(&path, "old").unwrap();
        std::fs::set_permissions(&path, Permissions::from_mode(0o664)).unwrap();
        write_atomic(&path, "new").unwrap();
        assert_eq!(std::fs::metadata(&path).unwrap().permissions().mode() & 0o777, 0o664);
    }

    #[test]
    fn test_missing_pack_source_is_fatal() {
        let temp_dir = project(&[]);
        std::fs::remove_file(temp_dir.path().join("countries.js")).unwrap();
        let err = run(&config(temp_dir.path()), false).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Packs));
        assert!(!temp_dir.path().join("sw.js").exists());
    }

    #[test]
    fn test_strict() {
        let temp_dir = project(&["jp.mp3", "outro.mp3"]);
        let lenient = config(temp_dir.path());
        assert!(compile(&lenient).is_ok());

        let strict = Config { strict: true, ..config(temp_dir.path()) };
        let err = compile(&strict).unwrap_err();
        let ErrorKind::Strict(message) = &*err else {
            panic!("expected a strict mode failure, got {err:?}");
        };
        assert!(message.contains("outro.mp3"));
        assert!(message.contains("without audio: fr"));
    }

    #[test]
    fn test_write_atomic_replaces() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path: PathBuf = temp_dir.path().join("sw.js");
        std::fs::write(&path, "old").unwrap();
        write_atomic(&path, "new").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_write_atomic_missing_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("missing/sw.js");
        let err = write_atomic(&path, "new").unwrap_err();
        assert!(matches!(&*err, ErrorKind::Write(_)));
    }
}
