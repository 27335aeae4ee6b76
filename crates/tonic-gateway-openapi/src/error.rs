//! Typed error enum for the `tonic-gateway-openapi` library API.
//!
//! Library consumers can match on specific variants. The runtime crate
//! wraps these in its own call-level error at the dispatch boundary.

use std::path::PathBuf;

/// Errors produced by `tonic-gateway-openapi` library operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// File I/O failure while walking or reading the document directory.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A `*.swagger.json` file is not valid OpenAPI v2 JSON.
    #[error("failed to parse OpenAPI document '{path}': {source}")]
    Json {
        /// The offending document file.
        path: PathBuf,
        /// The underlying parse failure.
        source: serde_json::Error,
    },

    /// The configured OpenAPI directory does not exist.
    ///
    /// The index stays unloaded; callers observe this through
    /// [`OpenApiIndex::is_loaded`](crate::OpenApiIndex::is_loaded).
    #[error("OpenAPI directory '{dir}' does not exist; generate the documents first")]
    DirectoryMissing {
        /// The missing directory.
        dir: PathBuf,
    },

    /// A call path does not match the `/<package>.<service>/<method>` shape.
    #[error("malformed RPC call path '{path}'; expected /<package>.<service>/<method>")]
    MalformedCallPath {
        /// The unparseable call path.
        path: String,
    },

    /// A bare scalar parameter was supplied but the operation declares no
    /// parameters to bind it to.
    #[error("operation '{operation_id}' declares no parameters to bind the value to")]
    NoParameterForOperation {
        /// The resolved operation id.
        operation_id: String,
    },

    /// A path-template placeholder received no value.
    #[error("path template '{template}' has no value for placeholder '{name}'")]
    MissingPathParameter {
        /// The unfilled placeholder name.
        name: String,
        /// The operation's path template.
        template: String,
    },
}

/// Convenience alias used throughout the library's public API.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time assertion that `Error` is `Send + Sync`.
    /// Required for use in async contexts and across thread boundaries.
    const _: () = {
        const fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    };

    #[test]
    fn messages_name_the_offender() {
        let err = Error::MalformedCallPath {
            path: "no-slash".to_string(),
        };
        assert!(err.to_string().contains("no-slash"));

        let err = Error::MissingPathParameter {
            name: "id".to_string(),
            template: "/v1/items/{id}".to_string(),
        };
        assert!(err.to_string().contains("'id'"));
        assert!(err.to_string().contains("/v1/items/{id}"));
    }
}
