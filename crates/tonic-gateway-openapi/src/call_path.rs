//! RPC call path parsing.
//!
//! A gRPC client frames every call as `/<package>.<service>/<method>`,
//! where the package itself may be dot-delimited to arbitrary depth
//! (e.g. `google.ads.v11.services`). The service is the last dot-segment
//! before the final slash; the method is everything after it.

use std::fmt;

use crate::error::{Error, Result};

/// The three components of an RPC call path.
///
/// Parsed with [`CallPath::parse`]; [`CallPath::tag`] and
/// [`CallPath::operation_id`] produce the lookup keys used to resolve the
/// matching OpenAPI operation.
///
/// # Examples
///
/// ```
/// use tonic_gateway_openapi::CallPath;
///
/// let path = CallPath::parse("/example.greeter.v1.services.Greeter/SayHello").unwrap();
/// assert_eq!(path.package, "example.greeter.v1.services");
/// assert_eq!(path.service, "Greeter");
/// assert_eq!(path.method, "SayHello");
/// assert_eq!(path.tag(), "example.greeter.v1.services.Greeter");
/// assert_eq!(path.operation_id(), "Greeter_SayHello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallPath {
    /// Dot-delimited proto package, arbitrary depth.
    pub package: String,
    /// Service name (last dot-segment before the method).
    pub service: String,
    /// RPC method name.
    pub method: String,
}

impl CallPath {
    /// Parse a wire-format call path.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedCallPath`] when the input lacks a leading
    /// slash, a method segment, a `.` separating package from service, or
    /// when any component is empty.
    pub fn parse(raw: &str) -> Result<Self> {
        let malformed = || Error::MalformedCallPath {
            path: raw.to_string(),
        };

        let rest = raw.strip_prefix('/').ok_or_else(malformed)?;
        let (qualified, method) = rest.rsplit_once('/').ok_or_else(malformed)?;
        let (package, service) = qualified.rsplit_once('.').ok_or_else(malformed)?;

        if package.is_empty() || service.is_empty() || method.is_empty() {
            return Err(malformed());
        }

        Ok(Self {
            package: package.to_string(),
            service: service.to_string(),
            method: method.to_string(),
        })
    }

    /// The OpenAPI document tag encoding this service: `{package}.{service}`.
    #[must_use]
    pub fn tag(&self) -> String {
        format!("{}.{}", self.package, self.service)
    }

    /// The OpenAPI operation id encoding this method: `{service}_{method}`.
    #[must_use]
    pub fn operation_id(&self) -> String {
        format!("{}_{}", self.service, self.method)
    }
}

impl fmt::Display for CallPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}.{}/{}", self.package, self.service, self.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_multi_segment_package() {
        let path = CallPath::parse("/example.greeter.v1.services.Greeter/SayHello").unwrap();
        assert_eq!(path.package, "example.greeter.v1.services");
        assert_eq!(path.service, "Greeter");
        assert_eq!(path.method, "SayHello");
    }

    #[test]
    fn parses_single_segment_package() {
        let path = CallPath::parse("/pkg.Service/Method").unwrap();
        assert_eq!(path.package, "pkg");
        assert_eq!(path.service, "Service");
        assert_eq!(path.method, "Method");
    }

    #[test]
    fn display_round_trips() {
        for raw in [
            "/example.greeter.v1.services.Greeter/SayHello",
            "/a.b/C",
            "/google.ads.v11.services.CampaignService/Mutate",
        ] {
            let path = CallPath::parse(raw).unwrap();
            assert_eq!(path.to_string(), raw);
        }
    }

    #[test]
    fn lookup_keys() {
        let path = CallPath::parse("/a.b.Greeter/SayHello").unwrap();
        assert_eq!(path.tag(), "a.b.Greeter");
        assert_eq!(path.operation_id(), "Greeter_SayHello");
    }

    #[test]
    fn rejects_missing_leading_slash() {
        assert!(CallPath::parse("pkg.Service/Method").is_err());
    }

    #[test]
    fn rejects_missing_method_separator() {
        assert!(CallPath::parse("/pkg.Service").is_err());
    }

    #[test]
    fn rejects_missing_package_dot() {
        assert!(CallPath::parse("/Service/Method").is_err());
    }

    #[test]
    fn rejects_empty_components() {
        assert!(CallPath::parse("/.Service/Method").is_err());
        assert!(CallPath::parse("/pkg./Method").is_err());
        assert!(CallPath::parse("/pkg.Service/").is_err());
        assert!(CallPath::parse("/").is_err());
        assert!(CallPath::parse("").is_err());
    }

    #[test]
    fn malformed_error_carries_input() {
        let err = CallPath::parse("garbage").unwrap_err();
        assert!(matches!(err, Error::MalformedCallPath { ref path } if path == "garbage"));
    }
}
