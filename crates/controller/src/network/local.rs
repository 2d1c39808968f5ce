//! Local directory "network".
//!
//! Serves origin-relative URLs (`./app.js`, `/assets/flags/jp.png`) straight
//! from a directory on disk, so a freshly generated manifest can be checked
//! against the tree it was generated from.

use super::Network;
use crate::error::{ErrorKind, Result};
use crate::http::{Method, Request, Response};
use async_trait::async_trait;
use exn::ResultExt;
use std::path::{Component, Path, PathBuf};

const INDEX: &str = "index.html";

/// Serves files from a directory as same-origin responses.
///
/// - `./` and any URL ending in `/` serve that directory's `index.html`.
/// - Query strings and fragments are ignored.
/// - Missing files are a `404` response, not an error.
/// - Anything other than `GET`/`HEAD` is a `405` response.
/// - Absolute URLs and paths escaping the root are
///   [`UnsupportedRequest`](ErrorKind::UnsupportedRequest).
#[derive(Debug, Clone)]
pub struct DirectoryNetwork {
    root: PathBuf,
}
impl DirectoryNetwork {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, url: &str) -> Result<PathBuf> {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let Some(relative) = path.strip_prefix("./").or_else(|| path.strip_prefix('/')) else {
            exn::bail!(ErrorKind::UnsupportedRequest(url.to_string()));
        };
        let relative = match relative.is_empty() || relative.ends_with('/') {
            true => format!("{relative}{INDEX}"),
            false => relative.to_string(),
        };
        let mut resolved = self.root.clone();
        for component in Path::new(&relative).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {},
                // No `..`, even when it would stay inside the root.
                _ => exn::bail!(ErrorKind::UnsupportedRequest(url.to_string())),
            }
        }
        Ok(resolved)
    }
}

#[async_trait]
impl Network for DirectoryNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        if !matches!(request.method, Method::Get | Method::Head) {
            return Ok(Response::basic(405, Vec::new()).with_header("Allow", "GET, HEAD"));
        }
        let path = self.resolve(&request.url)?;
        let body = match tokio::fs::read(&path).await {
            Ok(body) => body,
            Err(err) if matches!(err.kind(), std::io::ErrorKind::NotFound | std::io::ErrorKind::IsADirectory) => {
                tracing::debug!(url = %request.url, path = %path.display(), "Not found");
                return Ok(Response::basic(404, Vec::new()));
            },
            result => result.or_raise(|| ErrorKind::Network(request.url.clone()))?,
        };
        let length = body.len();
        let body = match request.method {
            Method::Head => Vec::new(),
            _ => body,
        };
        Ok(Response::basic(200, body)
            .with_header("Content-Type", content_type(&path))
            .with_header("Content-Length", length.to_string()))
    }
}

fn content_type(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        Some("mp3") => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn site() -> tempfile::TempDir {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("index.html"), "<!DOCTYPE html>").unwrap();
        std::fs::create_dir_all(temp_dir.path().join("assets/flags")).unwrap();
        std::fs::write(temp_dir.path().join("assets/flags/jp.png"), b"\x89PNG").unwrap();
        temp_dir
    }

    #[rstest]
    #[case("./", "index.html")]
    #[case("/", "index.html")]
    #[case("./assets/flags/jp.png", "assets/flags/jp.png")]
    #[case("./assets/flags/jp.png?v=2#top", "assets/flags/jp.png")]
    #[case("./assets/", "assets/index.html")]
    fn test_resolve(#[case] url: &str, #[case] expected: &str) {
        let network = DirectoryNetwork::new("/srv/site");
        assert_eq!(network.resolve(url).unwrap(), Path::new("/srv/site").join(expected));
    }

    #[rstest]
    #[case("https://example.com/app.js")]
    #[case("app.js")]
    #[case("./../secrets.txt")]
    #[case("./assets/../../secrets.txt")]
    fn test_resolve_rejected(#[case] url: &str) {
        let network = DirectoryNetwork::new("/srv/site");
        let err = network.resolve(url).unwrap_err();
        assert!(matches!(&*err, ErrorKind::UnsupportedRequest(_)));
    }

    #[tokio::test]
    async fn test_fetch() {
        let temp_dir = site();
        let network = DirectoryNetwork::new(temp_dir.path());
        let response = network.fetch(&Request::get("./assets/flags/jp.png")).await.unwrap();
        assert!(response.is_cacheable());
        assert_eq!(response.body, b"\x89PNG");
        assert_eq!(response.header("content-type"), Some("image/png"));

        let index = network.fetch(&Request::get("./")).await.unwrap();
        assert_eq!(index.body, b"<!DOCTYPE html>");
    }

    #[tokio::test]
    async fn test_fetch_missing() {
        let temp_dir = site();
        let network = DirectoryNetwork::new(temp_dir.path());
        let response = network.fetch(&Request::get("./assets/flags/zz.png")).await.unwrap();
        assert_eq!(response.status, 404);
    }

    #[tokio::test]
    async fn test_fetch_head_and_post() {
        let temp_dir = site();
        let network = DirectoryNetwork::new(temp_dir.path());
        let head = network.fetch(&Request::new(Method::Head, "./index.html")).await.unwrap();
        assert_eq!(head.status, 200);
        assert!(head.body.is_empty());
        assert_eq!(head.header("content-length"), Some("15"));
        let post = network.fetch(&Request::new(Method::Post, "./index.html")).await.unwrap();
        assert_eq!(post.status, 405);
    }
}
