use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use reelshelf_contracts::{ApiError, ApiResult};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;

use crate::config::{Config, normalize_base_url};

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error payload returned by the API on non-success statuses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Acknowledgement payload of item and watched-list mutations
#[derive(Debug, Deserialize)]
struct SuccessFlag {
    success: bool,
}

/// API client with bearer-token support
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    token_store: Arc<RwLock<Option<String>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field(
                "has_token",
                &self
                    .token_store
                    .try_read()
                    .map(|t| t.is_some())
                    .unwrap_or(false),
            )
            .finish()
    }
}

impl ApiClient {
    /// Create a client with the default request timeout
    pub fn new(base_url: impl Into<String>) -> ApiResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> ApiResult<Self> {
        let base_url = normalize_base_url(&base_url.into());
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ApiError::Transport(format!("Failed to create HTTP client: {e}"))
            })?;

        info!(
            "[ApiClient] Creating new API client with base URL: {}",
            base_url
        );

        Ok(Self {
            client,
            base_url,
            token_store: Arc::new(RwLock::new(None)),
        })
    }

    pub fn from_config(config: &Config) -> ApiResult<Self> {
        Self::with_timeout(&config.api_url, config.request_timeout())
    }

    /// Join a route onto the base URL
    pub fn build_url(&self, path: impl AsRef<str>) -> String {
        let p = path.as_ref();
        if p.starts_with("http://") || p.starts_with("https://") {
            return p.to_string();
        }
        format!("{}/{}", self.base_url, p.trim_start_matches('/'))
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set the bearer token sent with every request
    pub async fn set_token(&self, token: Option<String>) {
        *self.token_store.write().await = token;
    }

    /// Get the current bearer token
    pub async fn get_token(&self) -> Option<String> {
        self.token_store.read().await.clone()
    }

    /// Attach the authorization header when a token is set
    async fn build_request(&self, builder: RequestBuilder) -> RequestBuilder {
        if let Some(token) = self.token_store.read().await.as_ref() {
            builder.bearer_auth(token)
        } else {
            builder
        }
    }

    /// Send a request and map non-success statuses to [`ApiError`]
    async fn send(&self, request: RequestBuilder) -> ApiResult<Response> {
        let request = self.build_request(request).await;
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => {
                warn!("[ApiClient] Unauthorized response, clearing token");
                self.set_token(None).await;
                Err(ApiError::Unauthorized)
            }
            status => {
                let message = response
                    .json::<ErrorBody>()
                    .await
                    .ok()
                    .and_then(|body| body.message);
                warn!(
                    "[ApiClient] Request failed with status {}: {:?}",
                    status, message
                );
                Err(ApiError::status(status.as_u16(), message))
            }
        }
    }

    /// Execute a request that must return a JSON body
    async fn execute_request<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> ApiResult<T> {
        let response = self.send(request).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Err(ApiError::Decode(
                "Empty response from server (204 No Content)".to_string(),
            ));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Execute a request whose body, if any, is ignored
    async fn execute_empty(&self, request: RequestBuilder) -> ApiResult<()> {
        self.send(request).await.map(|_| ())
    }

    /// Execute a request answering `{ "success": bool }`.
    ///
    /// An empty 204 answer counts as success.
    async fn execute_flag(&self, request: RequestBuilder) -> ApiResult<bool> {
        let response = self.send(request).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(true);
        }
        response
            .json::<SuccessFlag>()
            .await
            .map(|flag| flag.success)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// GET request with authentication
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let request = self.client.get(self.build_url(path));
        self.execute_request(request).await
    }

    /// POST request with authentication
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let request = self.client.post(self.build_url(path)).json(body);
        self.execute_request(request).await
    }

    /// PUT request with authentication
    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let request = self.client.put(self.build_url(path)).json(body);
        self.execute_request(request).await
    }

    /// DELETE request with authentication
    pub async fn delete(&self, path: &str) -> ApiResult<()> {
        let request = self.client.delete(self.build_url(path));
        self.execute_empty(request).await
    }

    pub(crate) async fn post_flag<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<bool> {
        let mut request = self.client.post(self.build_url(path));
        if let Some(body) = body {
            request = request.json(body);
        }
        self.execute_flag(request).await
    }

    pub(crate) async fn put_flag<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<bool> {
        let request = self.client.put(self.build_url(path)).json(body);
        self.execute_flag(request).await
    }

    pub(crate) async fn delete_flag(&self, path: &str) -> ApiResult<bool> {
        let request = self.client.delete(self.build_url(path));
        self.execute_flag(request).await
    }
}
