//! BoothClient - REST client for the booth backend.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::types::{
    Credentials, Event, EventPage, EventTab, MediaType, PinRequest, RefreshRequest,
    RefreshResponse, Template, TokenPair, User,
};

/// Base URL used when nothing is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8001/api";

/// Environment variable that overrides the base URL.
pub const API_URL_ENV: &str = "SELFIE_BOOTH_API_URL";

/// Default timeout for HTTP requests (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Default)]
struct AuthState {
    tokens: Option<TokenPair>,
    user: Option<User>,
}

/// Client for the booth REST API.
///
/// Authorized calls carry the access token as a bearer token. When the server
/// answers 401, the refresh token is exchanged for a new access token and the
/// request is sent once more. Tokens live behind a mutex so the client can be
/// shared through an `Arc`.
pub struct BoothClient {
    base_url: String,
    http_client: reqwest::Client,
    auth: Mutex<AuthState>,
}

impl std::fmt::Debug for BoothClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoothClient")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl BoothClient {
    /// Create a client for `base_url` with the default timeouts.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeouts(base_url, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a client with explicit request and connect timeouts.
    pub fn with_timeouts(base_url: &str, timeout: Duration, connect_timeout: Duration) -> Result<Self, ApiError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
            auth: Mutex::new(AuthState::default()),
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth(&self) -> MutexGuard<'_, AuthState> {
        self.auth.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn access_token(&self) -> Option<String> {
        self.auth().tokens.as_ref().map(|t| t.access.clone())
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth().tokens.is_some()
    }

    /// The user fetched at login, if any.
    pub fn user(&self) -> Option<User> {
        self.auth().user.clone()
    }

    /// Install tokens obtained elsewhere.
    pub fn set_tokens(&self, tokens: TokenPair) {
        self.auth().tokens = Some(tokens);
    }

    /// Current tokens.
    pub fn tokens(&self) -> Option<TokenPair> {
        self.auth().tokens.clone()
    }

    /// Exchange credentials for tokens, then fetch the user profile.
    ///
    /// # Errors
    ///
    /// `ApiError::InvalidCredentials` when the server rejects the credentials
    /// (400 or 401); `ApiError::Status` for any other failure status.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let response = self
            .http_client
            .post(self.url("/auth/jwt/create/"))
            .json(&Credentials { email, password })
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                log::warn!("Login rejected for {}", email);
                return Err(ApiError::InvalidCredentials);
            }
            _ => return Err(ApiError::from_response(response).await),
        }

        let tokens: TokenPair = response.json().await?;
        self.set_tokens(tokens);
        log::info!("Logged in as {}", email);

        let user = match self.fetch_user().await {
            Ok(user) => user,
            Err(e) => {
                log::warn!("Could not fetch user profile: {}", e);
                User {
                    email: Some(email.to_string()),
                    ..User::default()
                }
            }
        };
        self.auth().user = Some(user.clone());
        Ok(user)
    }

    async fn fetch_user(&self) -> Result<User, ApiError> {
        let url = self.url("/auth/users/me/");
        let response = self.send_authorized(|c| c.get(&url)).await?;
        json_body(response).await
    }

    /// Forget tokens and user.
    pub fn logout(&self) {
        let mut auth = self.auth();
        auth.tokens = None;
        auth.user = None;
        log::info!("Logged out");
    }

    /// Exchange the refresh token for a new access token.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let refresh = self
            .auth()
            .tokens
            .as_ref()
            .map(|t| t.refresh.clone())
            .ok_or(ApiError::NotAuthenticated)?;

        let response = self
            .http_client
            .post(self.url("/auth/jwt/refresh/"))
            .json(&RefreshRequest { refresh: &refresh })
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(ApiError::from_response(response).await);
        }

        let body: RefreshResponse = response.json().await?;
        if let Some(tokens) = self.auth().tokens.as_mut() {
            tokens.access = body.access;
        }
        log::debug!("Access token refreshed");
        Ok(())
    }

    /// Send a request with the bearer token, refreshing and retrying once on 401.
    ///
    /// `build` is called again for the retry, so it must produce an
    /// identical request each time.
    async fn send_authorized<F>(&self, build: F) -> Result<Response, ApiError>
    where
        F: Fn(&reqwest::Client) -> RequestBuilder,
    {
        let token = self.access_token().ok_or(ApiError::NotAuthenticated)?;
        let response = build(&self.http_client).bearer_auth(&token).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        log::info!("Access token rejected, refreshing");
        if let Err(e) = self.refresh().await {
            log::warn!("Token refresh failed: {}", e);
            return Ok(response);
        }

        let token = self.access_token().ok_or(ApiError::NotAuthenticated)?;
        Ok(build(&self.http_client).bearer_auth(&token).send().await?)
    }

    /// All events.
    pub async fn get_events(&self) -> Result<Vec<Event>, ApiError> {
        let url = self.url("/events/");
        let response = self.send_authorized(|c| c.get(&url)).await?;
        json_body(response).await
    }

    /// One page of events, optionally filtered by tab and search text.
    pub async fn get_events_paginated(
        &self,
        page: u32,
        page_size: u32,
        tab: Option<EventTab>,
        search: Option<&str>,
    ) -> Result<EventPage, ApiError> {
        let url = self.url("/events/");
        let mut query = vec![
            ("page", page.to_string()),
            ("page_size", page_size.to_string()),
        ];
        if let Some(tab) = tab {
            query.push(("date_filter", tab.date_filter().to_string()));
        }
        if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
            query.push(("search", search.to_string()));
        }

        let response = self.send_authorized(|c| c.get(&url).query(&query)).await?;
        json_body(response).await
    }

    /// Details of one event.
    pub async fn get_event(&self, event_id: i64) -> Result<Event, ApiError> {
        let url = self.url(&format!("/events/{}/", event_id));
        let response = self.send_authorized(|c| c.get(&url)).await?;
        json_body(response).await
    }

    /// Check an event PIN. Any 4xx other than an unrecoverable 401 means "wrong PIN".
    pub async fn verify_event_pin(&self, event_id: i64, pin: &str) -> Result<bool, ApiError> {
        let url = self.url(&format!("/events/{}/verify_pin/", event_id));
        let response = self
            .send_authorized(|c| c.post(&url).json(&PinRequest { pin }))
            .await?;

        let status = response.status();
        if status == StatusCode::OK {
            Ok(true)
        } else if status.is_client_error() && status != StatusCode::UNAUTHORIZED {
            Ok(false)
        } else {
            Err(ApiError::from_response(response).await)
        }
    }

    /// Templates for an event, or all templates.
    pub async fn get_templates(&self, event_id: Option<i64>) -> Result<Vec<Template>, ApiError> {
        let url = match event_id {
            Some(id) => self.url(&format!("/events/{}/templates/", id)),
            None => self.url("/templates/"),
        };
        let response = self.send_authorized(|c| c.get(&url)).await?;
        json_body(response).await
    }

    /// Upload a captured file to an event as multipart form data.
    pub async fn upload_media(
        &self,
        event_id: i64,
        path: &Path,
        media_type: MediaType,
        template_id: Option<i64>,
    ) -> Result<(), ApiError> {
        if !path.is_file() {
            return Err(ApiError::MissingFile(path.to_path_buf()));
        }
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let url = self.url(&format!("/events/{}/media/", event_id));

        let response = self
            .send_authorized(|c| {
                let mut form = Form::new()
                    .part("file", Part::bytes(bytes.clone()).file_name(file_name.clone()))
                    .text("media_type", media_type.as_str());
                if let Some(id) = template_id {
                    form = form.text("template_id", id.to_string());
                }
                c.post(&url).multipart(form)
            })
            .await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                log::info!("Uploaded {} to event {} as {}", file_name, event_id, media_type);
                Ok(())
            }
            _ => Err(ApiError::from_response(response).await),
        }
    }
}

/// Decode a successful JSON response, or turn a failed one into an error.
async fn json_body<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if !response.status().is_success() {
        return Err(ApiError::from_response(response).await);
    }
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = BoothClient::new("http://localhost:8001/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8001/api");
        assert_eq!(client.url("/events/"), "http://localhost:8001/api/events/");
    }

    #[test]
    fn test_tokens_and_logout() {
        let client = BoothClient::new(DEFAULT_BASE_URL).unwrap();
        assert!(!client.is_authenticated());
        client.set_tokens(TokenPair {
            access: "a".to_string(),
            refresh: "r".to_string(),
        });
        assert!(client.is_authenticated());
        assert_eq!(client.tokens().unwrap().access, "a");
        client.logout();
        assert!(!client.is_authenticated());
        assert!(client.user().is_none());
    }

    #[tokio::test]
    async fn test_unauthenticated_request_fails_fast() {
        let client = BoothClient::new("http://127.0.0.1:9").unwrap();
        assert!(matches!(client.get_events().await, Err(ApiError::NotAuthenticated)));
        assert!(matches!(client.refresh().await, Err(ApiError::NotAuthenticated)));
    }
}
