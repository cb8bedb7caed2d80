use std::collections::HashMap;

use serde::Deserialize;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::api::ApiClient;

/// Unauthenticated endpoint reporting the active authentication scheme
pub const SCHEME_PATH: &str = "/auth/scheme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemeKind {
    #[default]
    Native,
    #[serde(alias = "oauth")]
    External,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuthScheme {
    pub name: SchemeKind,
    #[serde(default)]
    pub data: HashMap<String, String>,
}

impl AuthScheme {
    pub fn kind(&self) -> SchemeKind {
        self.name
    }

    pub fn data(&self, key: &str) -> Option<&str> {
        self.data.get(key).map(String::as_str)
    }
}

/// Discovers the server's scheme once and reuses it for the rest of the invocation.
pub struct SchemeResolver {
    api: ApiClient,
    cached: OnceCell<AuthScheme>,
}

impl SchemeResolver {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            cached: OnceCell::new(),
        }
    }

    /// Resolve the scheme. Never fails: any discovery problem yields native.
    pub async fn resolve(&self) -> &AuthScheme {
        self.cached.get_or_init(|| discover(&self.api)).await
    }

    /// The scheme if it has already been resolved
    pub fn cached(&self) -> Option<&AuthScheme> {
        self.cached.get()
    }
}

async fn discover(api: &ApiClient) -> AuthScheme {
    match api.get_json_anonymous::<AuthScheme>(SCHEME_PATH).await {
        Ok(scheme) => {
            info!(scheme = ?scheme.name, "Authentication scheme discovered");
            scheme
        }
        Err(e) => {
            debug!(error = %e, "Scheme discovery failed, assuming native");
            AuthScheme::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::path::PathBuf;

    fn resolver_for(base_url: &str) -> SchemeResolver {
        let config = Config::new(base_url, PathBuf::from("/nonexistent"));
        SchemeResolver::new(ApiClient::new(&config).unwrap())
    }

    #[test]
    fn test_parse_oauth_alias() {
        let scheme: AuthScheme =
            serde_json::from_str(r#"{"name":"oauth","data":{"port":"0"}}"#).unwrap();
        assert_eq!(scheme.kind(), SchemeKind::External);
        assert_eq!(scheme.data("port"), Some("0"));
    }

    #[tokio::test]
    async fn test_resolves_external_scheme() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(SCHEME_PATH);
                then.status(200)
                    .json_body(json!({"name": "external", "data": {"foo": "bar"}}));
            })
            .await;

        let resolver = resolver_for(&server.base_url());
        let scheme = resolver.resolve().await;
        assert_eq!(scheme.kind(), SchemeKind::External);
        assert_eq!(scheme.data("foo"), Some("bar"));
    }

    #[tokio::test]
    async fn test_connection_failure_defaults_to_native() {
        // Nothing listens on port 1
        let resolver = resolver_for("http://127.0.0.1:1");
        let scheme = resolver.resolve().await;
        assert_eq!(scheme, &AuthScheme::default());
        assert_eq!(scheme.kind(), SchemeKind::Native);
        assert!(scheme.data.is_empty());
    }

    #[tokio::test]
    async fn test_error_status_and_garbage_default_to_native() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(SCHEME_PATH);
                then.status(500).body("boom");
            })
            .await;
        assert_eq!(resolver_for(&server.base_url()).resolve().await.kind(), SchemeKind::Native);

        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(SCHEME_PATH);
                then.status(200).body("<html>");
            })
            .await;
        assert_eq!(resolver_for(&server.base_url()).resolve().await.kind(), SchemeKind::Native);
    }

    #[tokio::test]
    async fn test_scheme_is_fetched_once() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path(SCHEME_PATH);
                then.status(200).json_body(json!({"name": "oauth", "data": {}}));
            })
            .await;

        let resolver = resolver_for(&server.base_url());
        assert!(resolver.cached().is_none());
        resolver.resolve().await;
        resolver.resolve().await;
        assert_eq!(resolver.cached().map(AuthScheme::kind), Some(SchemeKind::External));
        mock.assert_calls_async(1).await;
    }
}
