//! Client for the backend REST API.

use std::time::Duration;

use anyhow::{bail, Context};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, info};
use url::Url;

use crate::session::Session;
use crate::types::{AuthResponse, ContentItem, ContentList, MessageResponse, NewContent, ShareResponse, SharedSnapshot};

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("not signed in")]
    NotAuthenticated,
    #[error("the server rejected the session")]
    Unauthorized { session_cleared: bool },
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("session storage failed: {0:#}")]
    Storage(anyhow::Error),
}

/// How a call authenticates, and what a 401 does to the stored session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Anonymous,
    /// A 401 clears the stored token.
    Session,
    /// Like `Session`, but a 401 keeps the token so in-progress input is not thrown away.
    ContentMutation,
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, session: Session) -> anyhow::Result<Self> {
        let base = Url::parse(base_url.trim()).with_context(|| format!("invalid API URL: {base_url}"))?;
        if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
            bail!("API URL must be an http(s) URL: {base_url}");
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("brainbox/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { http, base, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // new() rejects cannot-be-a-base URLs, so segments are always available
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v1"]).extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let url = self.endpoint(segments);
        debug!(%method, %url, "api request");
        self.http.request(method, url)
    }

    async fn send(&self, builder: RequestBuilder, auth: Auth) -> Result<Response, ApiError> {
        let builder = match auth {
            Auth::Anonymous => builder,
            Auth::Session | Auth::ContentMutation => {
                let token = self.session.token().await.map_err(ApiError::Storage)?.ok_or(ApiError::NotAuthenticated)?;
                builder.bearer_auth(&token).header("token", token)
            }
        };

        let resp = builder.send().await?;
        let status = resp.status();
        debug!(status = status.as_u16(), url = %resp.url(), "api response");

        if status == StatusCode::UNAUTHORIZED && auth != Auth::Anonymous {
            let session_cleared = auth == Auth::Session;
            if session_cleared {
                self.session.clear_token().await.map_err(ApiError::Storage)?;
                info!("session rejected by server; stored token cleared");
            }
            return Err(ApiError::Unauthorized { session_cleared });
        }
        if !status.is_success() {
            let message = resp
                .json::<MessageResponse>()
                .await
                .ok()
                .and_then(|m| m.message)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
            return Err(ApiError::Status { status: status.as_u16(), message });
        }
        Ok(resp)
    }

    async fn decode<T: DeserializeOwned + Default>(resp: Response) -> Result<T, ApiError> {
        let body = resp.text().await?;
        if body.trim().is_empty() {
            return Ok(T::default());
        }
        serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Sign in and persist the returned token.
    pub async fn signin(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let req = self
            .request(Method::POST, &["signin"])
            .json(&json!({ "email": email.trim().to_lowercase(), "password": password }));
        let auth: AuthResponse = Self::decode(self.send(req, Auth::Anonymous).await?).await?;
        if let Some(token) = auth.token.as_deref() {
            self.session.set_token(token).await.map_err(ApiError::Storage)?;
            info!("signed in");
        }
        Ok(auth)
    }

    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let req = self
            .request(Method::POST, &["signup"])
            .json(&json!({ "Name": name, "email": email.trim().to_lowercase(), "password": password }));
        Self::decode(self.send(req, Auth::Anonymous).await?).await
    }

    pub async fn list_content(&self) -> Result<Vec<ContentItem>, ApiError> {
        let req = self.request(Method::GET, &["content"]);
        let list: ContentList = Self::decode(self.send(req, Auth::Session).await?).await?;
        Ok(list.content)
    }

    /// Returns the server's confirmation message, if any.
    pub async fn create_content(&self, content: &NewContent) -> Result<Option<String>, ApiError> {
        let req = self.request(Method::POST, &["content"]).json(content);
        let msg: MessageResponse = Self::decode(self.send(req, Auth::ContentMutation).await?).await?;
        Ok(msg.message)
    }

    /// Replace a note's body.
    pub async fn update_note(&self, id: &str, body: &str) -> Result<(), ApiError> {
        let req = self.request(Method::PUT, &["content", id]).json(&json!({ "content": body }));
        self.send(req, Auth::ContentMutation).await?;
        Ok(())
    }

    pub async fn delete_content(&self, id: &str) -> Result<(), ApiError> {
        let req = self.request(Method::DELETE, &["content", id]);
        self.send(req, Auth::ContentMutation).await?;
        Ok(())
    }

    /// Turn public sharing on or off. Returns the sharing hash when enabling.
    pub async fn set_sharing(&self, share: bool) -> Result<Option<String>, ApiError> {
        let req = self.request(Method::POST, &["brain", "share"]).json(&json!({ "share": share }));
        let resp: ShareResponse = Self::decode(self.send(req, Auth::Session).await?).await?;
        if share && resp.hash.is_none() {
            return Err(ApiError::Decode(resp.message.unwrap_or_else(|| "share response has no hash".into())));
        }
        Ok(resp.hash.filter(|_| share))
    }

    /// Fetch the public snapshot behind a sharing hash. Needs no session.
    pub async fn shared_snapshot(&self, hash: &str) -> Result<SharedSnapshot, ApiError> {
        let req = self.request(Method::GET, &["brain", hash]).header(reqwest::header::ACCEPT, "application/json");
        Self::decode(self.send(req, Auth::Anonymous).await?).await
    }
}
