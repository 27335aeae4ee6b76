//! The HTTP client seam.
//!
//! The gateway only needs one primitive from an HTTP client: issue a
//! request, hand back whatever came over the wire. [`HttpTransport`]
//! captures that seam; [`ReqwestTransport`] is the default implementation.
//!
//! A non-2xx response is a *response*, never a transport error —
//! [`TransportError`] exclusively means no HTTP response arrived at all
//! (connection refused, DNS failure, broken pipe).

use std::future::Future;

use http::{HeaderMap, Method, StatusCode};
use serde_json::Value;

/// An assembled outbound HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute request URL, query string included.
    pub url: String,
    /// Outbound headers (metadata, declared header params, cookies).
    pub headers: HeaderMap,
    /// JSON request body, if any.
    pub body: Option<Value>,
}

/// A normalized inbound HTTP response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Response status code, 2xx–5xx alike.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw trailers as an alternating flat name/value sequence. Empty when
    /// the transport cannot surface trailers.
    pub trailers: Vec<String>,
    /// Decoded response body.
    pub body: Value,
}

/// A transport-level failure: the request produced no HTTP response.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    /// Human-readable failure description from the underlying client.
    pub message: String,
}

impl TransportError {
    /// Wrap a failure message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The "issue an HTTP request" primitive the gateway builds on.
///
/// Implementations must be shareable across concurrent calls; the gateway
/// never serializes access.
pub trait HttpTransport: Send + Sync {
    /// Execute the request and normalize whatever comes back.
    ///
    /// # Errors
    ///
    /// [`TransportError`] only when no HTTP response arrived at all.
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// Default [`HttpTransport`] backed by a shared [`reqwest::Client`].
///
/// Limitation: `reqwest` does not expose raw HTTP trailers, so
/// [`HttpResponse::trailers`] is always empty here. Timeouts, proxies, and
/// TLS configuration come from the injected client.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a default client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport around a pre-configured client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method, request.url.as_str())
            .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|err| TransportError::new(err.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| TransportError::new(err.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            trailers: Vec::new(),
            body: decode_body(&bytes),
        })
    }
}

/// Decode a response body the way a JSON-first client does: empty bodies
/// are null, JSON parses as JSON, anything else is kept as text.
pub(crate) fn decode_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}
