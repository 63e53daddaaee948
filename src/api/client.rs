//! REST client core: token attachment, URL building, status handling and
//! decoding. Endpoint wrappers live in the sibling modules.

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::auth::TokenSource;
use crate::config::BackendConfig;
use crate::error::ApiError;

/// Client for the fitness backend.
///
/// Every call is one-shot: no retry, no backoff, no caching.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenSource>,
}

impl ApiClient {
    pub fn new(config: &BackendConfig, tokens: Arc<dyn TokenSource>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            tokens,
        })
    }

    /// User id of the current session, for payloads that carry it.
    pub(crate) fn user_id(&self) -> Result<String, ApiError> {
        self.tokens.user_id().ok_or(ApiError::MissingToken)
    }

    /// Base URL plus percent-encoded path segments.
    fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and return the body of a 2xx response.
    ///
    /// The token is read first; without one nothing touches the network.
    async fn send<B>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
        query: &[(&str, String)],
    ) -> Result<Vec<u8>, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let token = self.tokens.access_token().ok_or(ApiError::MissingToken)?;
        let url = self.url(segments)?;
        debug!(%method, path = url.path(), "Backend request");

        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(token.expose_secret())
            .header(CONTENT_TYPE, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let resp = request.send().await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        if !status.is_success() {
            let body = lossy(&bytes);
            warn!(%method, %status, "Backend returned an error status");
            return Err(ApiError::Status { status, body });
        }

        Ok(bytes.to_vec())
    }

    async fn request<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
        query: &[(&str, String)],
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let bytes = self.send(method, segments, body, query).await?;
        serde_json::from_slice(&bytes).map_err(|source| ApiError::Decode {
            source,
            body: lossy(&bytes),
        })
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.request::<(), T>(Method::GET, segments, None, query).await
    }

    pub(crate) async fn post<B, T>(&self, segments: &[&str], body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, segments, Some(body), &[]).await
    }

    /// DELETE; any 2xx counts as success and the body is ignored.
    pub(crate) async fn delete(&self, segments: &[&str]) -> Result<(), ApiError> {
        self.send::<()>(Method::DELETE, segments, None, &[])
            .await
            .map(|_| ())
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
