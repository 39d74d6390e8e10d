//! Shared HTTP plumbing for the Spark2Scale backend.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::ApiConfig;

/// Result type for backend API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error types for backend API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend API error: {message} (status: {status})")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Whether the backend answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Whether the request hit the client timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}

/// Backend API client shared by the document, workflow and generation services.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// Base URL without trailing slash
    base_url: String,
    /// Optional bearer token
    token: Option<String>,
    /// HTTP client
    client: reqwest::Client,
}

impl ApiClient {
    /// Create a client from API configuration.
    pub fn new(config: &ApiConfig) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("spark2scale/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.is_empty()),
            client,
        })
    }

    /// Base URL requests are made against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Start a request, attaching auth if configured.
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = self.url(path);
        tracing::debug!(%method, %url, "backend request");

        let builder = self.client.request(method, url).header("Accept", "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Turn a non-success response into an error.
    pub async fn parse_error(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let url = response.url().path().to_string();

        match status {
            401 | 403 => ApiError::Unauthorized,
            404 => ApiError::NotFound(url),
            _ => {
                let message = response
                    .json::<serde_json::Value>()
                    .await
                    .ok()
                    .and_then(|v| {
                        v.get("error")
                            .or_else(|| v.get("message"))
                            .and_then(|m| m.as_str())
                            .map(String::from)
                    })
                    .unwrap_or_else(|| format!("HTTP {}", status));
                ApiError::Api { status, message }
            }
        }
    }

    /// Send a prepared request and decode a JSON body.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> ApiResult<T> {
        let response = builder.send().await?;

        if !response.status().is_success() {
            return Err(Self::parse_error(response).await);
        }

        Ok(response.json().await?)
    }

    /// GET a JSON resource.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send_json(self.request(reqwest::Method::GET, path)).await
    }

    /// POST a JSON body and decode the JSON reply.
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send_json(self.request(reqwest::Method::POST, path).json(body)).await
    }
}
