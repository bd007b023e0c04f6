//! HTTP transport to the remote API.
//!
//! Gateways and listing clients never touch `reqwest` directly; they hand an
//! [`ApiRequest`] to a [`Transport`]. The route guard binds a request-scoped
//! transport (carrying the caller's request id) while background code can use
//! the shared one, and neither leaks configuration into the other.

use std::future::Future;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::middleware::request_id::REQUEST_ID_HEADER;

/// Failure to obtain any response from the remote API.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, DNS, TLS, or body read failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote API did not answer in time.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// An outbound call to the remote API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the API base URL, starting with `/`.
    pub path: String,
    pub bearer: Option<SecretString>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    /// A `GET` request for `path`.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// A `POST` request for `path`.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            bearer: None,
            body: None,
        }
    }

    /// Attach `Authorization: Bearer <token>`.
    #[must_use]
    pub fn bearer(mut self, token: &SecretString) -> Self {
        self.bearer = Some(token.clone());
        self
    }

    /// Attach a JSON body.
    #[must_use]
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// A response from the remote API, fully buffered.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Whether the status is 2xx.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns the decode error if the body is not the expected shape.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// The server-provided error message, if the body carries one.
    ///
    /// Accepts `{"detail": "..."}` and the validation form
    /// `{"detail": [{"msg": "..."}, ...]}`.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        #[derive(serde::Deserialize)]
        #[serde(untagged)]
        enum Detail {
            Message(String),
            Items(Vec<DetailItem>),
        }

        #[derive(serde::Deserialize)]
        struct DetailItem {
            msg: String,
        }

        #[derive(serde::Deserialize)]
        struct Body {
            detail: Detail,
        }

        let message = match self.json::<Body>().ok()?.detail {
            Detail::Message(message) => message,
            Detail::Items(items) => items
                .into_iter()
                .map(|item| item.msg)
                .collect::<Vec<_>>()
                .join("; "),
        };

        let message = message.trim();
        (!message.is_empty()).then(|| message.to_string())
    }
}

/// Something that can carry an [`ApiRequest`] to the remote API.
pub trait Transport: Clone + Send + Sync + 'static {
    /// Send the request and buffer the response.
    ///
    /// Non-2xx responses are returned as `Ok`; only the failure to get a
    /// response at all is an error.
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, TransportError>> + Send;
}

/// `reqwest`-backed transport.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
    request_id: Option<String>,
}

impl HttpTransport {
    /// Create a transport for the API at `base_url`.
    ///
    /// Every call is bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Client` if the HTTP client cannot be built.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("talent-hub-web/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            timeout,
            request_id: None,
        })
    }

    /// A copy of this transport bound to one incoming request.
    ///
    /// Outbound calls carry the request id so logs on both sides correlate.
    /// The connection pool is shared.
    #[must_use]
    pub fn scoped(&self, request_id: Option<&str>) -> Self {
        Self {
            request_id: request_id.map(str::to_string),
            ..self.clone()
        }
    }

    /// Base URL of the remote API.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("request_id", &self.request_id)
            .finish_non_exhaustive()
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.client.request(request.method.clone(), &url);

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token.expose_secret());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        if let Some(request_id) = &self.request_id {
            builder = builder.header(REQUEST_ID_HEADER, request_id);
        }

        let timeout = self.timeout;
        let to_error = |e: reqwest::Error| {
            if e.is_timeout() {
                TransportError::Timeout(timeout)
            } else {
                TransportError::Http(e)
            }
        };

        let response = builder.send().await.map_err(to_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(to_error)?.to_vec();

        tracing::debug!(method = %request.method, path = %request.path, %status, "remote API call");

        Ok(ApiResponse { status, body })
    }
}
