//! In-memory network for testing.

use super::Network;
use crate::error::{ErrorKind, Result};
use crate::http::{Request, Response};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

/// In-memory network for testing.
///
/// Routes are exact URLs. Unrouted URLs get a `404`, URLs marked with
/// [`failing()`](Self::failing) produce a network error, and every request
/// is recorded so tests can assert on how often the network was reached.
#[derive(Default)]
pub struct MockNetwork {
    routes: HashMap<String, Response>,
    failing: HashSet<String>,
    requests: RwLock<Vec<Request>>,
}
impl MockNetwork {
    /// Create a mock network serving `200` responses with the given bodies.
    pub fn with_routes(routes: impl IntoIterator<Item = (impl Into<String>, impl Into<Vec<u8>>)>) -> Self {
        let routes = routes.into_iter().map(|(url, body)| (url.into(), Response::basic(200, body))).collect();
        Self { routes, ..Default::default() }
    }

    /// Serve an exact response for a URL, replacing any previous route.
    pub fn with_response(mut self, url: impl Into<String>, response: Response) -> Self {
        self.routes.insert(url.into(), response);
        self
    }

    /// Make requests for a URL fail without producing a response.
    pub fn failing(mut self, url: impl Into<String>) -> Self {
        self.failing.insert(url.into());
        self
    }

    /// Number of requests that reached the network.
    pub async fn calls(&self) -> usize {
        self.requests.read().await.len()
    }

    /// Number of requests for a specific URL.
    pub async fn calls_for(&self, url: &str) -> usize {
        self.requests.read().await.iter().filter(|request| request.url == url).count()
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        self.requests.write().await.push(request.clone());
        if self.failing.contains(&request.url) {
            exn::bail!(ErrorKind::Network(format!("connection refused: {}", request.url)));
        }
        Ok(self.routes.get(&request.url).cloned().unwrap_or_else(|| Response::basic(404, Vec::new())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_routes_and_calls() {
        let network = MockNetwork::with_routes([("./app.js", "app")]).failing("./down.js");
        assert_eq!(network.fetch(&Request::get("./app.js")).await.unwrap().body, b"app");
        assert_eq!(network.fetch(&Request::get("./missing.js")).await.unwrap().status, 404);
        let err = network.fetch(&Request::get("./down.js")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Network(_)));
        assert_eq!(network.calls().await, 3);
        assert_eq!(network.calls_for("./app.js").await, 1);
    }
}
