//! Typed error enum for the `tonic-gateway` runtime.
//!
//! Construction-time errors (an invalid gateway URL, a missing document
//! directory) abort bridge setup. Everything else is caught at the
//! half-close boundary and synthesized into a terminal `Unknown` status, so
//! a caller always receives exactly one status event.

/// Errors produced by `tonic-gateway` library operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The configured gateway address is not a syntactically valid
    /// `http(s)://` URL. Fatal at construction time.
    #[error("gateway URL '{url}' is not a valid http(s) URL")]
    InvalidGatewayUrl {
        /// The rejected URL string.
        url: String,
    },

    /// The OpenAPI index has not finished loading; the call cannot be
    /// translated yet.
    #[error("the OpenAPI index has not finished loading")]
    IndexNotLoaded,

    /// No loaded document declares a matching tag and operation id.
    #[error("no OpenAPI operation matches call path '{call_path}'")]
    OperationNotFound {
        /// The call path that failed to resolve.
        call_path: String,
    },

    /// Call-path parsing, document loading, or request planning failed.
    #[error(transparent)]
    Openapi(#[from] tonic_gateway_openapi::Error),
}

/// Convenience alias used throughout the library's public API.
pub type Result<T> = std::result::Result<T, Error>;
