//! HTTP → gRPC status code mapping.
//!
//! The inverse of the mapping grpc-gateway applies when it serves a gRPC
//! service over REST. Several gRPC codes collapse onto one HTTP code on the
//! way out, so the way back picks the canonical member of each group:
//! `409 → ABORTED` (not `ALREADY_EXISTS`), `400 → INVALID_ARGUMENT` (not
//! `FAILED_PRECONDITION`/`OUT_OF_RANGE`), `500 → INTERNAL` (not
//! `UNKNOWN`/`DATA_LOSS`).

use http::StatusCode;
use tonic::Code;

/// Map an HTTP status code to a gRPC status code.
///
/// Any code absent from the table maps to [`Code::Internal`] — including
/// non-200 success codes, which grpc-gateway never emits.
///
/// # Examples
///
/// ```
/// use tonic_gateway::http_to_grpc_status;
///
/// assert_eq!(http_to_grpc_status(http::StatusCode::OK), tonic::Code::Ok);
/// assert_eq!(http_to_grpc_status(http::StatusCode::NOT_FOUND), tonic::Code::NotFound);
/// ```
#[must_use]
pub fn http_to_grpc_status(status: StatusCode) -> Code {
    match status.as_u16() {
        200 => Code::Ok,
        400 => Code::InvalidArgument,
        401 => Code::Unauthenticated,
        403 => Code::PermissionDenied,
        404 => Code::NotFound,
        408 => Code::Cancelled,
        409 => Code::Aborted,
        429 => Code::ResourceExhausted,
        500 => Code::Internal,
        501 => Code::Unimplemented,
        503 => Code::Unavailable,
        504 => Code::DeadlineExceeded,
        _ => Code::Internal,
    }
}
