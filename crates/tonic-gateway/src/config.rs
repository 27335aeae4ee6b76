//! Bridge configuration: enable flag, gateway address, document directory.
//!
//! Only malformed configuration is fatal — an invalid gateway URL aborts
//! construction instead of surfacing later as a per-call failure.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Per-call context handed to a [`GatewayUrl::PerCall`] resolver.
#[derive(Debug, Clone, Copy)]
pub struct GatewayContext<'a> {
    /// The RPC call path being bridged, e.g. `/pkg.Service/Method`.
    pub call_path: &'a str,
    /// The OpenAPI document file that declared the resolved operation.
    pub file_path: &'a Path,
}

/// Resolver signature for per-call gateway routing.
pub type GatewayUrlFn = Arc<dyn Fn(&GatewayContext<'_>) -> String + Send + Sync>;

/// Where bridged calls are sent: one fixed base URL, or a function of the
/// call path and owning document for per-service routing.
#[derive(Clone)]
pub enum GatewayUrl {
    /// A single base URL for every call.
    Static(String),
    /// A resolver invoked once per call.
    PerCall(GatewayUrlFn),
}

impl GatewayUrl {
    /// Build a per-call resolver.
    pub fn per_call<F>(resolver: F) -> Self
    where
        F: Fn(&GatewayContext<'_>) -> String + Send + Sync + 'static,
    {
        Self::PerCall(Arc::new(resolver))
    }

    /// The base URL for this call.
    #[must_use]
    pub fn resolve(&self, ctx: &GatewayContext<'_>) -> String {
        match self {
            Self::Static(url) => url.clone(),
            Self::PerCall(resolver) => resolver(ctx),
        }
    }
}

impl fmt::Debug for GatewayUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(url) => f.debug_tuple("Static").field(url).finish(),
            Self::PerCall(_) => f.debug_tuple("PerCall").field(&"<resolver>").finish(),
        }
    }
}

impl From<&str> for GatewayUrl {
    fn from(url: &str) -> Self {
        Self::Static(url.to_string())
    }
}

impl From<String> for GatewayUrl {
    fn from(url: String) -> Self {
        Self::Static(url)
    }
}

/// Bridge configuration.
///
/// # Examples
///
/// ```
/// use tonic_gateway::ProxyOptions;
///
/// let options = ProxyOptions::new(true, "http://127.0.0.1:9090", "openapi").unwrap();
/// assert!(options.enable);
///
/// assert!(ProxyOptions::new(true, "not a url", "openapi").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct ProxyOptions {
    /// Whether the bridge intercepts calls at all; disabled bridges pass
    /// every call through untouched.
    pub enable: bool,
    /// Where bridged calls are sent.
    pub gateway_url: GatewayUrl,
    /// Directory holding the generated `*.swagger.json` documents.
    pub openapi_dir: PathBuf,
}

impl ProxyOptions {
    /// Validate and assemble bridge options.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGatewayUrl`] when a static gateway URL is empty, is
    /// not parseable, or does not use the `http`/`https` scheme. Per-call
    /// resolvers are validated at call time by the HTTP client instead.
    pub fn new(
        enable: bool,
        gateway_url: impl Into<GatewayUrl>,
        openapi_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let gateway_url = gateway_url.into();
        if let GatewayUrl::Static(url) = &gateway_url {
            validate_url(url)?;
        }
        Ok(Self {
            enable,
            gateway_url,
            openapi_dir: openapi_dir.into(),
        })
    }
}

fn validate_url(url: &str) -> Result<()> {
    let invalid = || Error::InvalidGatewayUrl {
        url: url.to_string(),
    };
    let uri: http::Uri = url.parse().map_err(|_| invalid())?;
    match uri.scheme_str() {
        Some("http" | "https") => Ok(()),
        _ => Err(invalid()),
    }
}
