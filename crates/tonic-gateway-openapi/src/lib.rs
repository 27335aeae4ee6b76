#![allow(clippy::doc_markdown)] // "OpenAPI" proper noun throughout
//! OpenAPI v2 operation index and HTTP request planning for the
//! `tonic-gateway` bridge.
//!
//! A schema compiler turns proto packages into `*.swagger.json` documents;
//! this crate loads a directory of them and answers the two questions the
//! bridge asks per call:
//!
//! 1. Which HTTP operation corresponds to an RPC call path? —
//!    [`CallPath`] + [`OpenApiIndex::resolve`]
//! 2. What HTTP request does this decoded RPC message translate to? —
//!    [`build_request`] → [`HttpRequestPlan`]
//!
//! Lookup encodes the gRPC identity into OpenAPI v2 fields: a document tag
//! carries `package.service` and an operation id carries `service_method`.
//! Resolution is an exact-match linear scan over the loaded corpus.
//!
//! # Example
//!
//! ```no_run
//! use tonic_gateway_openapi::{build_request, CallPath, OpenApiIndex, RequestParams};
//!
//! let index = OpenApiIndex::new("openapi");
//! index.load_sync()?;
//!
//! let call = CallPath::parse("/example.greeter.v1.services.Greeter/SayHello")?;
//! let operation = index.resolve(&call).expect("operation is declared");
//!
//! let payload = serde_json::json!({"name": "Li Ming"});
//! let plan = build_request(operation, RequestParams::from_payload(&payload), &payload)?;
//! assert_eq!(plan.method.as_str(), "POST");
//! # Ok::<(), tonic_gateway_openapi::Error>(())
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod call_path;
mod document;
mod error;
mod index;
mod request;

pub use call_path::CallPath;
pub use document::{HttpMethod, OpenApiDocument, Operation, ParamLocation, Parameter};
pub use error::{Error, Result};
pub use index::OpenApiIndex;
pub use request::{build_request, ExplicitParam, HttpRequestPlan, RequestParams};
