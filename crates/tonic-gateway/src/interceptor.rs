//! The interception point: buffer the outgoing call, dispatch over HTTP at
//! half-close, replay the result as RPC events.
//!
//! The RPC client library is an external collaborator; it only needs to
//! hand each call's lifecycle (`start`, `send_message`, `half_close`) to an
//! [`InterceptedCall`] and implement [`CallListener`] for the original
//! caller plus [`OutboundCall`] for the next link in its chain. Whether a
//! call is bridged or passed through is decided once, when the call is
//! intercepted, and never re-evaluated mid-call.
//!
//! Callers observe standard RPC semantics either way: message, then header
//! metadata, then exactly one terminal status.

use std::sync::Arc;

use serde_json::Value;
use tonic::metadata::MetadataMap;
use tonic_gateway_openapi::OpenApiIndex;

use crate::config::ProxyOptions;
use crate::error::Result;
use crate::gateway::{CallResult, HttpGateway};
use crate::transport::{HttpTransport, ReqwestTransport};

/// Receives the synthesized response events for one call, in order:
/// message, metadata, status.
pub trait CallListener: Send {
    /// The decoded response payload.
    fn on_receive_message(&mut self, message: Value);
    /// Header-equivalent metadata.
    fn on_receive_metadata(&mut self, metadata: MetadataMap);
    /// The terminal status. Delivered last, exactly once.
    fn on_receive_status(&mut self, status: tonic::Status);
}

/// The next link in the RPC client's interception chain. Passed-through
/// calls forward their lifecycle here untouched.
pub trait OutboundCall: Send {
    /// Call start with its outbound metadata.
    fn start(&mut self, metadata: &MetadataMap);
    /// One outgoing message.
    fn send_message(&mut self, message: &Value);
    /// The sender has finished sending.
    fn half_close(&mut self);
}

/// What the RPC layer knows about a call before it begins.
#[derive(Debug, Clone)]
pub struct CallDescriptor {
    /// Wire call path, `/<package>.<service>/<method>`.
    pub path: String,
    /// Whether the client streams requests.
    pub client_streaming: bool,
    /// Whether the server streams responses.
    pub server_streaming: bool,
}

impl CallDescriptor {
    /// Descriptor for a unary call.
    #[must_use]
    pub fn unary(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            client_streaming: false,
            server_streaming: false,
        }
    }

    /// Streaming in either direction; streaming calls bypass the bridge.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.client_streaming || self.server_streaming
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallMode {
    Bridge,
    Passthrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallPhase {
    Idle,
    Started,
    MessageBuffered,
    Resolved,
    Terminal,
}

/// Call-scoped mutable state, created at `start` and consumed at
/// `half_close`. Dropping the call before half-close simply discards it.
struct CallState<L> {
    metadata: MetadataMap,
    message: Option<Value>,
    listener: L,
}

/// Factory for intercepted calls; install one per RPC client.
///
/// Holds the shared [`HttpGateway`] and the enable flag. Cheap to share:
/// every call clones the inner [`Arc`].
#[derive(Debug)]
pub struct GatewayInterceptor<T = ReqwestTransport> {
    gateway: Arc<HttpGateway<T>>,
    enable: bool,
}

impl GatewayInterceptor<ReqwestTransport> {
    /// Load the document index asynchronously and build an interceptor
    /// with the default HTTP transport.
    ///
    /// # Errors
    ///
    /// Fails on a missing or unparseable document directory — malformed
    /// configuration aborts bridge setup instead of surfacing per call.
    pub async fn load(options: ProxyOptions) -> Result<Self> {
        let index = OpenApiIndex::new(&options.openapi_dir);
        index.load().await?;
        Ok(Self::with_index(
            options,
            Arc::new(index),
            ReqwestTransport::new(),
        ))
    }

    /// Blocking variant of [`load`](Self::load), for environments that
    /// accept a short startup unavailability window.
    ///
    /// # Errors
    ///
    /// Same conditions as [`load`](Self::load).
    pub fn load_sync(options: ProxyOptions) -> Result<Self> {
        let index = OpenApiIndex::new(&options.openapi_dir);
        index.load_sync()?;
        Ok(Self::with_index(
            options,
            Arc::new(index),
            ReqwestTransport::new(),
        ))
    }
}

impl<T: HttpTransport> GatewayInterceptor<T> {
    /// Build an interceptor over a shared index and a custom transport.
    ///
    /// The index may still be loading in the background; calls pass
    /// through until it reports loaded.
    pub fn with_index(options: ProxyOptions, index: Arc<OpenApiIndex>, transport: T) -> Self {
        Self {
            gateway: Arc::new(HttpGateway::new(index, options.gateway_url, transport)),
            enable: options.enable,
        }
    }

    /// Whether interception is enabled at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enable
    }

    /// The shared gateway.
    #[must_use]
    pub fn gateway(&self) -> &Arc<HttpGateway<T>> {
        &self.gateway
    }

    /// Intercept one call.
    ///
    /// Streaming calls, a disabled bridge, and a not-yet-loaded index all
    /// produce a pure passthrough: translating a multi-message stream into
    /// a single HTTP exchange has no defined semantics here.
    pub fn intercept<L, N>(&self, descriptor: CallDescriptor, next: N) -> InterceptedCall<T, L, N>
    where
        L: CallListener,
        N: OutboundCall,
    {
        let mode = if !self.enable
            || descriptor.is_streaming()
            || !self.gateway.index().is_loaded()
        {
            tracing::debug!(call = %descriptor.path, "passing call through");
            CallMode::Passthrough
        } else {
            CallMode::Bridge
        };
        InterceptedCall {
            gateway: Arc::clone(&self.gateway),
            descriptor,
            mode,
            phase: CallPhase::Idle,
            state: None,
            next,
        }
    }
}

/// One intercepted call's lifecycle.
///
/// The RPC layer drives `start` → `send_message` → `half_close` in
/// happens-before order; no internal locking is needed for a single call.
pub struct InterceptedCall<T, L, N> {
    gateway: Arc<HttpGateway<T>>,
    descriptor: CallDescriptor,
    mode: CallMode,
    phase: CallPhase,
    state: Option<CallState<L>>,
    next: N,
}

impl<T, L, N> InterceptedCall<T, L, N>
where
    T: HttpTransport,
    L: CallListener,
    N: OutboundCall,
{
    /// Record the call's metadata and listener.
    ///
    /// The next link always sees `start` — transport-level framing is
    /// untouched even for bridged calls.
    pub fn start(&mut self, metadata: MetadataMap, listener: L) {
        if self.phase != CallPhase::Idle {
            return;
        }
        self.next.start(&metadata);
        self.state = Some(CallState {
            metadata,
            message: None,
            listener,
        });
        self.phase = CallPhase::Started;
    }

    /// Buffer the pre-serialization request message (bridged calls), or
    /// forward it (passthrough). A unary call carries exactly one message;
    /// a later message replaces the buffer.
    pub fn send_message(&mut self, message: Value) {
        if !matches!(self.phase, CallPhase::Started | CallPhase::MessageBuffered) {
            return;
        }
        match self.mode {
            CallMode::Passthrough => self.next.send_message(&message),
            CallMode::Bridge => {
                if let Some(state) = &mut self.state {
                    state.message = Some(message);
                    self.phase = CallPhase::MessageBuffered;
                }
            }
        }
    }

    /// The single transition point where HTTP dispatch happens.
    ///
    /// Bridged calls resolve, build, and dispatch the HTTP request, then
    /// deliver message → metadata → status to the listener. Every failure
    /// inside that pipeline is folded into a synthesized `UNKNOWN` status
    /// — never a second dispatch over the real RPC transport, and never a
    /// call left without a terminal status.
    pub async fn half_close(&mut self) {
        if !matches!(self.phase, CallPhase::Started | CallPhase::MessageBuffered) {
            return;
        }
        if self.mode == CallMode::Passthrough {
            self.next.half_close();
            self.phase = CallPhase::Terminal;
            return;
        }

        let Some(mut state) = self.state.take() else {
            return;
        };
        let payload = state.message.take().unwrap_or(Value::Null);
        let result = match self
            .gateway
            .call(&self.descriptor.path, &payload, &state.metadata)
            .await
        {
            Ok(result) => result,
            Err(err) => {
                tracing::warn!(
                    call = %self.descriptor.path,
                    error = %err,
                    "bridge dispatch failed; synthesizing UNKNOWN status",
                );
                CallResult::unknown(err.to_string())
            }
        };
        self.phase = CallPhase::Resolved;
        deliver(&mut state.listener, result);
        self.phase = CallPhase::Terminal;
    }
}

/// Deliver the three response events in the only legal order: message,
/// metadata, status. RPC semantics require the terminal status last so the
/// caller finalizes the call exactly once; every delivery goes through
/// here.
fn deliver<L: CallListener>(listener: &mut L, result: CallResult) {
    listener.on_receive_message(result.response);
    listener.on_receive_metadata(result.metadata);
    listener.on_receive_status(result.status);
}
