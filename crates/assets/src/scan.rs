//! Single-directory asset listing.

use crate::error::{ErrorKind, Result};
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

fn map_io_error(e: std::io::Error, path: &Path) -> ErrorKind {
    match e.kind() {
        std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(path.to_path_buf()),
        std::io::ErrorKind::NotADirectory => ErrorKind::NotADirectory(path.to_path_buf()),
        _ => ErrorKind::Io(e),
    }
}

/// Lists the files directly inside `dir` whose final extension is exactly
/// `extension` (case-sensitive, leading dot optional), sorted by name.
///
/// The listing is non-recursive: subdirectories are never descended into or
/// returned, even when their names match. A directory that doesn't exist is
/// an empty category, not an error.
///
/// # Examples
///
/// ```
/// let files = flagpack_assets::scan_dir("/definitely/not/here", "png").unwrap();
/// assert!(files.is_empty());
/// ```
pub fn scan_dir(dir: impl AsRef<Path>, extension: &str) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    let extension = extension.trim().trim_start_matches('.');
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %dir.display(), "Asset directory not found; treating as empty");
            return Ok(Vec::new());
        },
        Err(err) => exn::bail!(map_io_error(err, dir)),
    };

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| map_io_error(e, dir))?;
        let path = entry.path();
        // `Path::is_file` follows symlinks, `DirEntry::file_type` does not.
        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(OsStr::to_str) != Some(extension) {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => files.push(name),
            Err(name) => tracing::warn!(name = ?name, path = %dir.display(), "Skipping asset with non UTF-8 filename"),
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let files = scan_dir(temp_dir.path().join("nope"), "png").unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_sorted_and_filtered() {
        let temp_dir = tempfile::tempdir().unwrap();
        for name in ["us.png", "de.png", "fr.png", "notes.txt", "archive.png.bak", "README"] {
            touch(temp_dir.path(), name);
        }
        let files = scan_dir(temp_dir.path(), "png").unwrap();
        assert_eq!(files, vec!["de.png", "fr.png", "us.png"]);
    }

    #[test]
    fn test_leading_dot_is_optional() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(temp_dir.path(), "a.mp3");
        assert_eq!(scan_dir(temp_dir.path(), ".mp3").unwrap(), scan_dir(temp_dir.path(), "mp3").unwrap());
    }

    #[test]
    fn test_extension_is_case_sensitive() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(temp_dir.path(), "loud.PNG");
        touch(temp_dir.path(), "quiet.png");
        assert_eq!(scan_dir(temp_dir.path(), "png").unwrap(), vec!["quiet.png"]);
    }

    #[test]
    fn test_non_recursive() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(temp_dir.path(), "top.png");
        fs::create_dir(temp_dir.path().join("nested.png")).unwrap();
        touch(&temp_dir.path().join("nested.png"), "deep.png");
        assert_eq!(scan_dir(temp_dir.path(), "png").unwrap(), vec!["top.png"]);
    }

    #[test]
    fn test_file_instead_of_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        touch(temp_dir.path(), "flags");
        let err = scan_dir(temp_dir.path().join("flags"), "png").unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotADirectory(_)));
    }
}
