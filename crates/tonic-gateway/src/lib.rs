#![allow(clippy::doc_markdown)] // "OpenAPI" proper noun throughout
//! Client-side bridge that redirects tonic RPC calls to grpc-gateway REST
//! endpoints.
//!
//! When enabled, each intercepted unary call is resolved against a
//! directory of OpenAPI v2 documents, translated into an HTTP request,
//! dispatched to a grpc-gateway base URL, and the HTTP response is replayed
//! to the original caller as standard RPC events — message, header
//! metadata, then exactly one terminal status. Callers cannot tell whether
//! the call traveled the RPC wire or HTTP.
//!
//! # Types
//!
//! - [`GatewayInterceptor`] / [`InterceptedCall`] — the call lifecycle
//!   state machine installed into the RPC client's interception chain
//! - [`CallListener`] / [`OutboundCall`] — the extension-point seams the
//!   RPC client library implements
//! - [`HttpGateway`] / [`CallResult`] — HTTP dispatch and RPC-shaped
//!   result normalization
//! - [`HttpTransport`] / [`ReqwestTransport`] — the "issue an HTTP
//!   request" primitive
//! - [`ProxyOptions`] / [`GatewayUrl`] — bridge configuration
//! - [`http_to_grpc_status`] — the fixed HTTP → gRPC status table
//! - [`to_headers`] / [`from_headers`] / [`from_trailers`] — metadata ↔
//!   header conversion
//!
//! # Usage
//!
//! ```no_run
//! use tonic_gateway::{CallDescriptor, GatewayInterceptor, ProxyOptions};
//!
//! # async fn run() -> tonic_gateway::Result<()> {
//! let options = ProxyOptions::new(true, "http://127.0.0.1:9090", "openapi")?;
//! let bridge = GatewayInterceptor::load(options).await?;
//! // Hand `bridge.intercept(descriptor, next)` each call's lifecycle.
//! # Ok(())
//! # }
//! ```
//!
//! # Companion Crate
//!
//! | Crate                        | Purpose                              |
//! |------------------------------|--------------------------------------|
//! | `tonic-gateway` (this)       | Interceptor, gateway, transport      |
//! | `tonic-gateway-openapi`      | Document index and request planning  |

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod error;
mod gateway;
mod interceptor;
mod metadata;
mod status_map;
mod transport;

pub use config::{GatewayContext, GatewayUrl, GatewayUrlFn, ProxyOptions};
pub use error::{Error, Result};
pub use gateway::{CallResult, HttpGateway};
pub use interceptor::{
    CallDescriptor, CallListener, GatewayInterceptor, InterceptedCall, OutboundCall,
};
pub use metadata::{from_headers, from_trailers, to_headers, METADATA_PREFIX, TRAILER_PREFIX};
pub use status_map::http_to_grpc_status;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};

/// Re-export of the operation index and request planning crate.
pub use tonic_gateway_openapi as openapi;
