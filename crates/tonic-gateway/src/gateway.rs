//! HTTP dispatch and RPC-shaped result normalization.
//!
//! [`HttpGateway::call`] is the whole translation pipeline for one call:
//! resolve the operation, plan the request, pick the base URL, dispatch,
//! and fold whatever came back into a [`CallResult`]. A failed remote call
//! (404, 500, connection refused) is per-call information and comes back as
//! a normal `CallResult`; only translation-layer problems (unloaded index,
//! unknown operation, malformed path) surface as errors for the
//! interceptor to synthesize a status from.

use std::sync::Arc;

use http::header::{HeaderName, HeaderValue, COOKIE};
use http::{HeaderMap, Method};
use serde_json::Value;
use tonic::metadata::MetadataMap;
use tonic_gateway_openapi::{
    build_request, CallPath, HttpMethod, HttpRequestPlan, OpenApiIndex, RequestParams,
};

use crate::config::{GatewayContext, GatewayUrl};
use crate::error::{Error, Result};
use crate::metadata;
use crate::status_map::http_to_grpc_status;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};

/// The RPC-shaped outcome of one bridged call: the decoded response
/// payload, header metadata, and the terminal status carrying trailer
/// metadata. Constructed fresh per call.
#[derive(Debug)]
pub struct CallResult {
    /// Decoded response payload.
    pub response: Value,
    /// Header-equivalent metadata.
    pub metadata: MetadataMap,
    /// Terminal status; its metadata is the trailer-equivalent metadata.
    pub status: tonic::Status,
}

impl CallResult {
    /// The synthesized failure shape: null payload, empty metadata, and an
    /// `UNKNOWN` status carrying the failure description.
    #[must_use]
    pub fn unknown(details: impl Into<String>) -> Self {
        Self {
            response: Value::Null,
            metadata: MetadataMap::new(),
            status: tonic::Status::unknown(details.into()),
        }
    }
}

/// Issues bridged calls against a gateway base URL.
///
/// Immutable after construction; concurrent calls share one gateway
/// without coordination.
#[derive(Debug)]
pub struct HttpGateway<T> {
    index: Arc<OpenApiIndex>,
    gateway_url: GatewayUrl,
    transport: T,
}

impl<T: HttpTransport> HttpGateway<T> {
    /// Assemble a gateway over a (possibly still loading) shared index.
    pub fn new(index: Arc<OpenApiIndex>, gateway_url: GatewayUrl, transport: T) -> Self {
        Self {
            index,
            gateway_url,
            transport,
        }
    }

    /// The shared operation index.
    #[must_use]
    pub fn index(&self) -> &OpenApiIndex {
        &self.index
    }

    /// Translate and dispatch one unary call.
    ///
    /// Transport-level failure is folded into an `UNKNOWN` [`CallResult`],
    /// not an error: the remote call failing is an expected per-call
    /// outcome.
    ///
    /// # Errors
    ///
    /// [`Error::IndexNotLoaded`] before the index finishes loading,
    /// [`Error::OperationNotFound`] when no document matches, and
    /// [`Error::Openapi`] for a malformed call path or an unplannable
    /// request.
    pub async fn call(
        &self,
        call_path: &str,
        payload: &Value,
        metadata: &MetadataMap,
    ) -> Result<CallResult> {
        if !self.index.is_loaded() {
            return Err(Error::IndexNotLoaded);
        }
        let parsed = CallPath::parse(call_path)?;
        let operation = self
            .index
            .resolve(&parsed)
            .ok_or_else(|| Error::OperationNotFound {
                call_path: call_path.to_string(),
            })?;
        let plan = build_request(operation, RequestParams::from_payload(payload), payload)?;

        let base = self.gateway_url.resolve(&GatewayContext {
            call_path,
            file_path: &operation.file_path,
        });
        let headers = outbound_headers(metadata, &plan);
        let request = HttpRequest {
            method: as_http_method(plan.method),
            url: format!("{}{}", base.trim_end_matches('/'), plan.url),
            headers,
            body: plan.body,
        };

        tracing::debug!(
            call = call_path,
            method = %request.method,
            url = %request.url,
            "dispatching bridged call",
        );
        match self.transport.execute(request).await {
            Ok(reply) => {
                tracing::debug!(call = call_path, status = %reply.status, "bridged call replied");
                Ok(normalize(reply))
            }
            Err(err) => {
                tracing::warn!(
                    call = call_path,
                    error = %err,
                    "bridged call produced no HTTP response",
                );
                Ok(CallResult::unknown(err.to_string()))
            }
        }
    }
}

fn as_http_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Post => Method::POST,
        HttpMethod::Patch => Method::PATCH,
        HttpMethod::Delete => Method::DELETE,
        HttpMethod::Options => Method::OPTIONS,
        HttpMethod::Head => Method::HEAD,
        HttpMethod::Trace => Method::TRACE,
    }
}

/// Metadata headers first, then declared header parameters, then declared
/// cookies folded into one `cookie` header. Unrepresentable names and
/// values are skipped, not fatal.
fn outbound_headers(metadata_map: &MetadataMap, plan: &HttpRequestPlan) -> HeaderMap {
    let mut headers = metadata::to_headers(metadata_map);

    for (name, value) in &plan.headers {
        let (Ok(name), Ok(value)) = (name.parse::<HeaderName>(), HeaderValue::from_str(value))
        else {
            continue;
        };
        headers.insert(name, value);
    }

    if !plan.cookies.is_empty() {
        let cookie = plan
            .cookies
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("; ");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            headers.insert(COOKIE, value);
        }
    }

    headers
}

fn normalize(reply: HttpResponse) -> CallResult {
    let code = http_to_grpc_status(reply.status);
    let details = if reply.status.is_success() {
        String::new()
    } else {
        // grpc-gateway error bodies carry the status message here.
        reply
            .body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let trailer_metadata = metadata::from_trailers(&reply.trailers);

    CallResult {
        response: reply.body,
        metadata: metadata::from_headers(&reply.headers),
        status: tonic::Status::with_metadata(code, details, trailer_metadata),
    }
}
