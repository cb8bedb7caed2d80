//! Login and logout state transitions.
//!
//! The login command is described in two stages: `describe` gives usage and
//! arity for a best-effort scheme (help text), and `LoginFlow::login` runs
//! against the resolved scheme. Both paths end in the same contract: persist
//! a token through the `SessionStore` or fail.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::console::Console;

use super::credentials::read_password;
use super::scheme::{AuthScheme, SchemeKind};
use super::session::SessionStore;
use super::AuthError;

/// Usage and arity of the login command for a given scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInfo {
    pub usage: &'static str,
    pub desc: &'static str,
    pub args: usize,
}

impl CommandInfo {
    fn check_args(&self, args: &[String]) -> Result<(), AuthError> {
        if args.len() == self.args {
            return Ok(());
        }
        Err(AuthError::Usage(format!(
            "login expects {} argument{}, got {}. Usage: {}",
            self.args,
            if self.args == 1 { "" } else { "s" },
            args.len(),
            self.usage
        )))
    }
}

pub fn describe(kind: SchemeKind) -> CommandInfo {
    match kind {
        SchemeKind::Native => CommandInfo {
            usage: "login <email>",
            desc: "log in with your credentials.",
            args: 1,
        },
        SchemeKind::External => CommandInfo {
            usage: "login",
            desc: "log in through your identity provider.",
            args: 0,
        },
    }
}

/// A login mechanism that runs outside the native password exchange and
/// yields a session token.
#[async_trait]
pub trait ExternalLogin: Send + Sync {
    async fn obtain_token(
        &self,
        scheme: &AuthScheme,
        console: &mut Console<'_>,
    ) -> Result<String, AuthError>;
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub token: Option<String>,
}

impl TokenResponse {
    pub(crate) fn into_token(self) -> Result<String, AuthError> {
        self.token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::Authentication("server response has no token".to_string()))
    }
}

pub struct LoginFlow<'a> {
    api: &'a ApiClient,
    store: &'a SessionStore,
    external: &'a dyn ExternalLogin,
}

impl<'a> LoginFlow<'a> {
    pub fn new(api: &'a ApiClient, store: &'a SessionStore, external: &'a dyn ExternalLogin) -> Self {
        Self { api, store, external }
    }

    pub async fn login(
        &self,
        scheme: &AuthScheme,
        args: &[String],
        console: &mut Console<'_>,
    ) -> Result<(), AuthError> {
        describe(scheme.kind()).check_args(args)?;

        let token = match scheme.kind() {
            SchemeKind::Native => self.native_token(&args[0], console).await?,
            SchemeKind::External => self.external.obtain_token(scheme, console).await?,
        };

        self.store.persist(&token)?;
        info!(scheme = ?scheme.kind(), "Logged in");
        writeln!(console.out, "Successfully logged in!")?;
        Ok(())
    }

    async fn native_token(&self, email: &str, console: &mut Console<'_>) -> Result<String, AuthError> {
        console.prompt("Password: ")?;
        let password = read_password(&mut *console.input)?;
        writeln!(console.out)?;

        let response: TokenResponse = self
            .api
            .post_json_at(&["users", email, "tokens"], &TokenRequest { password: &password })
            .await
            .map_err(|e| match e {
                ApiError::NetworkError(_) | ApiError::InvalidUrl(_) => AuthError::Api(e),
                other => AuthError::Authentication(other.to_string()),
            })?;
        response.into_token()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    LoggedOut,
    NotLoggedIn,
}

/// Revoke the token on the server (best effort) and clear the local session.
///
/// Local clearing always runs; a failed revocation is only logged.
pub async fn logout(api: &ApiClient, store: &SessionStore) -> Result<LogoutOutcome, AuthError> {
    if api.has_token() {
        if let Err(e) = api.revoke_token().await {
            warn!(error = %e, "Could not revoke the session token on the server");
        }
    } else {
        debug!("No session token, skipping server-side revocation");
    }

    match store.clear() {
        Ok(()) => Ok(LogoutOutcome::LoggedOut),
        Err(AuthError::NotLoggedIn) => Ok(LogoutOutcome::NotLoggedIn),
        Err(e) => Err(e),
    }
}
