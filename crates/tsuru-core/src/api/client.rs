//! API client for the tsuru control plane.
//!
//! `ApiClient` wraps a shared `reqwest::Client`, attaches the session token
//! as a bearer credential, and turns non-2xx responses into `ApiError`s.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::models::{NewTeam, NewUser, PasswordChange, Team, TeamMembers};

use super::ApiError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// API client for a tsuru target.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    /// Create an unauthenticated client for the configured target
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: config.target().to_string(),
            token: None,
        })
    }

    /// Set the bearer token for authenticated requests
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Target URL with each argument appended as one percent-encoded segment.
    ///
    /// Empty, `.` and `..` segments are rejected since they would not survive as segments.
    pub fn url_with_segments(&self, segments: &[&str]) -> Result<Url, ApiError> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(ApiError::InvalidUrl(format!("invalid path segment {:?}", bad)));
        }
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Request builder carrying the session token when one is set
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.authorize(self.client.request(method, self.url(path)))
    }

    /// Like `request`, for paths built from user-supplied segments
    fn request_at(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        let url = self.url_with_segments(segments)?;
        Ok(self.authorize(self.client.request(method, url)))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.token {
            Some(ref token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Request builder that never carries credentials
    fn anonymous(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await?;
        debug!(status = %response.status(), url = %response.url(), "Response received");
        Self::check_response(response).await
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let url = response.url().to_string();
        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", url, e)))
    }

    /// Decode the body only when the server answered exactly 200.
    async fn parse_json_if_ok<T: DeserializeOwned>(response: Response) -> Result<Option<T>, ApiError> {
        if response.status() != StatusCode::OK {
            debug!(status = %response.status(), "Skipping body of non-200 response");
            return Ok(None);
        }
        Self::parse_json(response).await.map(Some)
    }

    pub async fn post_json_at<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.send(self.request_at(Method::POST, segments)?.json(body)).await?;
        Self::parse_json(response).await
    }

    /// Unauthenticated form POST, used by the OAuth code exchange
    pub async fn post_form_anonymous<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        form: &B,
    ) -> Result<T, ApiError> {
        let response = self.send(self.anonymous(Method::POST, path).form(form)).await?;
        Self::parse_json(response).await
    }

    /// Unauthenticated GET, used by scheme discovery
    pub async fn get_json_anonymous<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(self.anonymous(Method::GET, path)).await?;
        Self::parse_json(response).await
    }

    // ===== Users =====

    pub async fn create_user(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let body = NewUser { email, password };
        self.send(self.request(Method::POST, "/users").json(&body)).await?;
        Ok(())
    }

    pub async fn remove_user(&self) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, "/users")).await?;
        Ok(())
    }

    /// Revoke the current session token on the server
    pub async fn revoke_token(&self) -> Result<(), ApiError> {
        self.send(self.request(Method::DELETE, "/users/tokens")).await?;
        Ok(())
    }

    pub async fn change_password(&self, old: &str, new: &str) -> Result<(), ApiError> {
        let body = PasswordChange { old, new };
        self.send(self.request(Method::PUT, "/users/password").json(&body)).await?;
        Ok(())
    }

    /// Start (no token) or complete (with token) a password reset
    pub async fn reset_password(&self, email: &str, token: Option<&str>) -> Result<(), ApiError> {
        let mut builder = self.request_at(Method::POST, &["users", email, "password"])?;
        if let Some(token) = token {
            builder = builder.query(&[("token", token)]);
        }
        self.send(builder).await?;
        Ok(())
    }

    pub async fn show_api_key(&self) -> Result<Option<String>, ApiError> {
        let response = self.send(self.request(Method::GET, "/users/api-key")).await?;
        Self::parse_json_if_ok(response).await
    }

    pub async fn regenerate_api_key(&self) -> Result<Option<String>, ApiError> {
        let response = self.send(self.request(Method::POST, "/users/api-key")).await?;
        Self::parse_json_if_ok(response).await
    }

    // ===== Teams =====

    pub async fn create_team(&self, name: &str) -> Result<(), ApiError> {
        let body = NewTeam { name };
        self.send(self.request(Method::POST, "/teams").json(&body)).await?;
        Ok(())
    }

    pub async fn remove_team(&self, team: &str) -> Result<(), ApiError> {
        self.send(self.request_at(Method::DELETE, &["teams", team])?).await?;
        Ok(())
    }

    pub async fn add_team_user(&self, team: &str, user: &str) -> Result<(), ApiError> {
        self.send(self.request_at(Method::PUT, &["teams", team, user])?).await?;
        Ok(())
    }

    pub async fn remove_team_user(&self, team: &str, user: &str) -> Result<(), ApiError> {
        self.send(self.request_at(Method::DELETE, &["teams", team, user])?).await?;
        Ok(())
    }

    pub async fn team_members(&self, team: &str) -> Result<TeamMembers, ApiError> {
        let response = self.send(self.request_at(Method::GET, &["teams", team])?).await?;
        Self::parse_json(response).await
    }

    /// Teams the user belongs to; `None` when the server answers 2xx but not 200
    pub async fn list_teams(&self) -> Result<Option<Vec<Team>>, ApiError> {
        let response = self.send(self.request(Method::GET, "/teams")).await?;
        Self::parse_json_if_ok(response).await
    }
}
