//! Browser-based login for servers running an external (OAuth) scheme.
//!
//! A loopback listener receives the authorization code from the identity
//! provider's redirect, and the code is exchanged for a tsuru token.

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::api::{ApiClient, ApiError};
use crate::console::Console;

use super::login::{ExternalLogin, TokenResponse};
use super::scheme::AuthScheme;
use super::AuthError;

/// How long to wait for the identity provider to redirect back.
const CALLBACK_TIMEOUT_SECS: u64 = 300;

/// How long to let the callback server finish its last response.
const SHUTDOWN_GRACE_SECS: u64 = 5;

/// Loopback address the callback listens on and the browser is sent back to
const CALLBACK_HOST: &str = "127.0.0.1";

/// Placeholder the server puts in `authorizeUrl` for the local redirect URL
const REDIRECT_PLACEHOLDER: &str = "__redirect_url__";

/// Endpoint exchanging an authorization code for a token
const CODE_EXCHANGE_PATH: &str = "/auth/login";

const SUCCESS_PAGE: &str = "<!DOCTYPE html><html><body>\
<p>Login received. You can close this window and return to your terminal.</p>\
</body></html>";

const MISSING_CODE_PAGE: &str = "<!DOCTYPE html><html><body>\
<p>The login callback did not include an authorization code.</p>\
</body></html>";

pub type BrowserOpener = Box<dyn Fn(&str) -> io::Result<()> + Send + Sync>;

pub struct OAuthLogin {
    api: ApiClient,
    open_browser: BrowserOpener,
    timeout: Duration,
}

impl OAuthLogin {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            open_browser: Box::new(|url| open::that(url)),
            timeout: Duration::from_secs(CALLBACK_TIMEOUT_SECS),
        }
    }

    pub fn with_browser_opener(mut self, opener: BrowserOpener) -> Self {
        self.open_browser = opener;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn exchange_code(&self, code: &str, redirect_url: &str) -> Result<String, AuthError> {
        let form = CodeExchange { code, redirect_url };
        let response: TokenResponse = self
            .api
            .post_form_anonymous(CODE_EXCHANGE_PATH, &form)
            .await
            .map_err(|e| match e {
                ApiError::NetworkError(_) => AuthError::Api(e),
                other => AuthError::Authentication(other.to_string()),
            })?;
        response.into_token()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CodeExchange<'a> {
    code: &'a str,
    redirect_url: &'a str,
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
}

async fn callback(
    State(codes): State<mpsc::Sender<String>>,
    Query(params): Query<CallbackParams>,
) -> Html<&'static str> {
    match params.code.filter(|c| !c.is_empty()) {
        Some(code) => {
            // Only the first code matters; later redirects are ignored
            let _ = codes.try_send(code);
            Html(SUCCESS_PAGE)
        }
        None => Html(MISSING_CODE_PAGE),
    }
}

#[async_trait]
impl ExternalLogin for OAuthLogin {
    async fn obtain_token(
        &self,
        scheme: &AuthScheme,
        console: &mut Console<'_>,
    ) -> Result<String, AuthError> {
        let template = scheme
            .data("authorizeUrl")
            .ok_or(AuthError::MissingSchemeData("authorizeUrl"))?;
        let port = scheme
            .data("port")
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(0);

        let listener = TcpListener::bind((CALLBACK_HOST, port)).await?;
        let port = listener.local_addr()?.port();
        let redirect_url = format!("http://{}:{}", CALLBACK_HOST, port);
        let authorize_url = template.replacen(REDIRECT_PLACEHOLDER, &redirect_url, 1);
        debug!(%redirect_url, "Login callback listening");

        let (code_tx, mut code_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = Router::new().route("/", get(callback)).with_state(code_tx);
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        if let Err(e) = (self.open_browser)(&authorize_url) {
            debug!(error = %e, "Could not open browser");
            writeln!(console.out, "Failed to start your browser.")?;
            writeln!(
                console.out,
                "Please open the following URL in your browser: {}",
                authorize_url
            )?;
        }

        let received = tokio::time::timeout(self.timeout, code_rx.recv()).await;

        let _ = shutdown_tx.send(());
        match tokio::time::timeout(Duration::from_secs(SHUTDOWN_GRACE_SECS), server).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(e))) => warn!(error = %e, "Login callback server failed"),
            Ok(Err(e)) => warn!(error = %e, "Login callback server task failed"),
            Err(_) => debug!("Login callback server did not stop in time"),
        }

        let code = match received {
            Ok(Some(code)) => code,
            Ok(None) => {
                return Err(AuthError::Authentication(
                    "login callback closed without a code".to_string(),
                ))
            }
            Err(_) => return Err(AuthError::CallbackTimeout),
        };

        self.exchange_code(&code, &redirect_url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{BufReadPrompt, SchemeKind};
    use crate::config::Config;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::io::Cursor;

    fn scheme(authorize_url: Option<&str>) -> AuthScheme {
        let mut data = HashMap::new();
        if let Some(url) = authorize_url {
            data.insert("authorizeUrl".to_string(), url.to_string());
        }
        data.insert("port".to_string(), "0".to_string());
        AuthScheme {
            name: SchemeKind::External,
            data,
        }
    }

    fn api_for(base_url: &str) -> ApiClient {
        ApiClient::new(&Config::new(base_url, "/nonexistent".into())).unwrap()
    }

    /// Plays the browser: follows the redirect URL back with a code.
    fn redirecting_browser(code: &'static str) -> BrowserOpener {
        Box::new(move |url: &str| {
            let redirect = url
                .split("redirect_uri=")
                .nth(1)
                .expect("authorize url carries the redirect")
                .to_string();
            tokio::spawn(async move {
                reqwest::get(format!("{}/?code={}", redirect, code))
                    .await
                    .expect("callback request");
            });
            Ok(())
        })
    }

    #[tokio::test]
    async fn test_code_is_exchanged_for_token() {
        let server = MockServer::start_async().await;
        let exchange = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(CODE_EXCHANGE_PATH)
                    .body_includes("code=abc123")
                    .body_includes("redirectUrl=http%3A%2F%2F127.0.0.1%3A");
                then.status(200).json_body(json!({"token": "oauth-token"}));
            })
            .await;

        let login = OAuthLogin::new(api_for(&server.base_url()))
            .with_browser_opener(redirecting_browser("abc123"))
            .with_timeout(Duration::from_secs(10));

        let mut out = Vec::new();
        let mut input = BufReadPrompt::new(Cursor::new(""));
        let mut console = Console::new(&mut out, &mut input);

        let token = login
            .obtain_token(
                &scheme(Some("https://idp.example.com/authorize?redirect_uri=__redirect_url__")),
                &mut console,
            )
            .await
            .unwrap();

        assert_eq!(token, "oauth-token");
        exchange.assert_async().await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_browser_failure_prints_url_and_times_out() {
        let login = OAuthLogin::new(api_for("http://127.0.0.1:1"))
            .with_browser_opener(Box::new(|_| Err(io::Error::other("no display"))))
            .with_timeout(Duration::from_millis(200));

        let mut out = Vec::new();
        let mut input = BufReadPrompt::new(Cursor::new(""));
        let mut console = Console::new(&mut out, &mut input);

        let err = login
            .obtain_token(
                &scheme(Some("https://idp.example.com/authorize?redirect_uri=__redirect_url__")),
                &mut console,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::CallbackTimeout));
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("Failed to start your browser.\n"));
        assert!(printed.contains("https://idp.example.com/authorize?redirect_uri=http://127.0.0.1:"));
    }

    #[tokio::test]
    async fn test_missing_authorize_url() {
        let login = OAuthLogin::new(api_for("http://127.0.0.1:1"))
            .with_browser_opener(Box::new(|_| Ok(())));

        let mut out = Vec::new();
        let mut input = BufReadPrompt::new(Cursor::new(""));
        let mut console = Console::new(&mut out, &mut input);

        let err = login.obtain_token(&scheme(None), &mut console).await.unwrap_err();
        assert!(matches!(err, AuthError::MissingSchemeData("authorizeUrl")));
    }
}
