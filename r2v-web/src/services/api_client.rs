//! Shared HTTP API client
//!
//! Wraps `reqwest::Client` with the defaults every outbound call needs:
//! - base URL resolution for relative paths
//! - 15 second timeout, JSON `Accept`/`Content-Type` headers
//! - bearer token injection (skipped for third-party calls)
//! - normalization of failures into [`ClientError`]

use reqwest::{header, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::RwLock;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout applied to each health probe in [`ApiClient::ping_server`]
pub const PING_TIMEOUT: Duration = Duration::from_secs(4);

/// Paths probed by [`ApiClient::ping_server`] when none are given
pub const DEFAULT_PING_PATHS: &[&str] = &["/", "/health", "/api/health"];

/// Normalized outbound request failure
///
/// `Display` renders `"{status}: {message}"`, with `ERR` standing in for
/// the status when no response was received.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Server answered with a non-success status
    #[error("{status}: {message}")]
    Status {
        status: u16,
        message: String,
        /// Parsed JSON error body, when there was one
        data: Option<Value>,
    },

    /// No response (connect, timeout, TLS)
    #[error("ERR: {0}")]
    Transport(String),

    /// Response body did not match the expected shape
    #[error("ERR: invalid response body: {0}")]
    Decode(String),

    /// Client could not be constructed
    #[error("ERR: client setup failed: {0}")]
    Build(String),
}

impl ClientError {
    /// HTTP status of the failed response, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

/// Outcome of [`ApiClient::ping_server`]
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PingResult {
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Shared API client
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    auth_token: RwLock<Option<String>>,
}

impl ApiClient {
    /// Create a client rooted at `base_url` with the default timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http = reqwest::Client::builder()
            .user_agent(concat!("reels2vec/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: RwLock::new(None),
        })
    }

    /// Base URL relative paths resolve against
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Set or clear the bearer token attached to first-party requests
    pub fn set_auth_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.auth_token.write() {
            *guard = token.filter(|t| !t.trim().is_empty());
        }
    }

    /// Current bearer token
    pub fn auth_token(&self) -> Option<String> {
        self.auth_token.read().ok().and_then(|guard| guard.clone())
    }

    /// Resolve a path against the base URL; absolute URLs pass through
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Build a first-party request (bearer token attached when set)
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        match self.auth_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Build a third-party request (never carries the bearer token)
    pub fn third_party(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.url(path))
    }

    /// Send a request and decode a JSON body, normalizing failures
    pub async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ClientError> {
        let response = builder.send().await?;
        let response = Self::check_status(response).await?;
        let body = response.json::<T>().await?;
        Ok(body)
    }

    /// Turn a non-success response into [`ClientError::Status`]
    ///
    /// The message comes from the JSON body's error message, falling back
    /// to `Request failed with status code {status}`.
    pub async fn check_status(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let data = serde_json::from_str::<Value>(&text).ok();
        let message = data
            .as_ref()
            .and_then(extract_message)
            .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));

        debug!(status = status.as_u16(), message = %message, "Request failed");

        Err(ClientError::Status {
            status: status.as_u16(),
            message,
            data,
        })
    }

    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send_json(self.request(Method::GET, path)).await
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send_json(self.request(Method::POST, path).json(body)).await
    }

    pub async fn put_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send_json(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn patch_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        self.send_json(self.request(Method::PATCH, path).json(body)).await
    }

    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send_json(self.request(Method::DELETE, path)).await
    }

    /// Multipart upload; reqwest sets the boundary content type
    pub async fn upload_form<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ClientError> {
        self.send_json(self.request(Method::POST, path).multipart(form)).await
    }

    /// Probe health paths in order and report the first that answers 2xx
    pub async fn ping_server(&self, paths: &[&str]) -> PingResult {
        for path in paths {
            let probe = self.request(Method::GET, path).timeout(PING_TIMEOUT).send().await;
            match probe {
                Ok(response) if response.status().is_success() => {
                    return PingResult {
                        reachable: true,
                        path: Some(path.to_string()),
                    };
                }
                Ok(response) => debug!(path = %path, status = %response.status(), "Ping failed"),
                Err(e) => debug!(path = %path, error = %e, "Ping failed"),
            }
        }

        PingResult {
            reachable: false,
            path: None,
        }
    }
}

/// `message` at the top level, or nested under `error` (Google APIs)
fn extract_message(data: &Value) -> Option<String> {
    data.get("message")
        .or_else(|| data.get("error").and_then(|e| e.get("message")))
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_resolution() {
        let client = ApiClient::new("http://localhost:5000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.url("/health"), "http://localhost:5000/health");
        assert_eq!(client.url("api/health"), "http://localhost:5000/api/health");
        assert_eq!(
            client.url("https://api.github.com/repos/a/b"),
            "https://api.github.com/repos/a/b"
        );
    }

    #[test]
    fn test_blank_token_is_cleared() {
        let client = ApiClient::new("http://localhost").unwrap();
        client.set_auth_token(Some("abc".to_string()));
        assert_eq!(client.auth_token().as_deref(), Some("abc"));

        client.set_auth_token(Some("  ".to_string()));
        assert!(client.auth_token().is_none());
    }

    #[test]
    fn test_status_error_display() {
        let err = ClientError::Status {
            status: 404,
            message: "Not Found".to_string(),
            data: None,
        };
        assert_eq!(err.to_string(), "404: Not Found");
        assert_eq!(err.status(), Some(404));

        let err = ClientError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "ERR: connection refused");
        assert_eq!(err.status(), None);
    }

    #[test]
    fn test_extract_message() {
        assert_eq!(
            extract_message(&json!({"message": "quota exceeded"})).as_deref(),
            Some("quota exceeded")
        );
        assert_eq!(extract_message(&json!({"message": ""})), None);
        assert_eq!(
            extract_message(&json!({"error": {"code": 403, "message": "API key not valid"}}))
                .as_deref(),
            Some("API key not valid")
        );
        assert_eq!(extract_message(&json!({"error": "x"})), None);
    }
}
