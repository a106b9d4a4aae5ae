//! Core FrameLink handle, handler registration and teardown.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::future::Future;
use std::result::Result as StdResult;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::identifiers::MessageId;
use crate::protocol::{Message, WireMessage, is_reserved_key};
use crate::transport::{MessageSender, MessageSource, OriginValidator};

use super::handler::{FnHandler, Handler, HandlerError, RequestHandler, TypedHandler};
use super::options::{FrameLinkOptions, PingPolicy};
use super::state::{LinkState, PendingRequest};

// ============================================================================
// LinkInner
// ============================================================================

/// Shared state of a link.
pub(crate) struct LinkInner {
    /// Validated configuration.
    pub options: FrameLinkOptions,
    /// Host of this context's inbound listener.
    pub source: Arc<dyn MessageSource>,
    /// Inbound origin check.
    pub validator: OriginValidator,
    /// Outbound post with the destination-origin policy.
    pub sender: MessageSender,
    /// Mutable connection state.
    pub state: Mutex<LinkState>,
}

impl LinkInner {
    /// Posts a message to the current target.
    ///
    /// The target is cloned out of the lock first, so a transport that
    /// delivers synchronously may re-enter the link.
    pub fn post(&self, message: &WireMessage) -> Result<()> {
        let target = self.state.lock().target.clone();
        self.sender.send(target.as_deref(), message)
    }

    /// Removes a pending entry without settling it.
    pub fn forget_pending(&self, id: &MessageId) -> Option<PendingRequest> {
        self.state.lock().pending.remove(id)
    }

    /// Returns `true` if registrations under `key` must be ignored.
    fn guards_key(&self, key: &str) -> bool {
        is_reserved_key(key) && self.options.ping_policy == PingPolicy::Reserved
    }

    /// Removes the handler currently registered under `key`.
    pub fn remove_handler(&self, key: &str) {
        if self.guards_key(key) {
            warn!(key, "Ignoring removal of reserved handler");
            return;
        }
        self.state.lock().handlers.remove(key);
    }

    /// Destroys the link: uninstalls the listener and fails everything pending.
    pub fn teardown(&self) {
        let teardown = self.state.lock().reset();

        if let Some(listener) = teardown.listener {
            self.source.remove_listener(listener);
        }

        let count = teardown.pending.len();
        for pending in teardown.pending {
            pending.fail(Error::Destroyed);
        }
        for handshake in teardown.handshakes {
            let _ = handshake.send(Err(Error::Destroyed));
        }

        if count > 0 {
            debug!(count, "Failed pending requests on destroy");
        }
    }
}

impl Drop for LinkInner {
    fn drop(&mut self) {
        if let Some(listener) = self.state.get_mut().listener.take() {
            self.source.remove_listener(listener);
        }
    }
}

// ============================================================================
// FrameLink
// ============================================================================

/// Typed bidirectional request/response channel over a postMessage-style
/// transport.
///
/// A link is created disconnected, becomes usable after
/// [`connect`](Self::connect) completes the ping handshake, and is torn down
/// with [`destroy`](Self::destroy). Instances are fully isolated from each
/// other even when they share a [`MessageSource`].
///
/// Cloning yields another handle to the same link.
///
/// # Example
///
/// ```ignore
/// let link = FrameLink::new(window.clone(), FrameLinkOptions::new("https://example.com"))?;
/// link.connect(frame_target).await?;
///
/// let session = link.send::<UserLogin>(Login { token: "abc123".into() }).await?;
/// ```
#[derive(Clone)]
pub struct FrameLink {
    pub(crate) inner: Arc<LinkInner>,
}

impl fmt::Debug for FrameLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("FrameLink")
            .field("target_origin", &self.inner.options.target_origin)
            .field("connected", &state.connected)
            .field("handlers", &state.handlers.len())
            .field("pending", &state.pending.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// FrameLink - Constructor
// ============================================================================

impl FrameLink {
    /// Creates a disconnected link listening on `source`.
    ///
    /// Nothing is installed on `source` until [`connect`](Self::connect).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `options` are invalid.
    pub fn new(source: impl MessageSource, options: FrameLinkOptions) -> Result<Self> {
        options.validate()?;

        let validator = OriginValidator::new(&options.target_origin);
        let sender = MessageSender::new(options.target_origin.clone());

        Ok(Self {
            inner: Arc::new(LinkInner {
                options,
                source: Arc::new(source),
                validator,
                sender,
                state: Mutex::new(LinkState::default()),
            }),
        })
    }
}

// ============================================================================
// FrameLink - Accessors
// ============================================================================

impl FrameLink {
    /// Returns `true` once the handshake completed, until destroyed.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.state.lock().connected
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &FrameLinkOptions {
        &self.inner.options
    }

    /// Returns the number of outstanding outbound requests, pings included.
    #[inline]
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Returns `true` if a handler is registered under `key`.
    #[inline]
    #[must_use]
    pub fn has_handler(&self, key: &str) -> bool {
        self.inner.state.lock().handlers.contains_key(key)
    }
}

// ============================================================================
// FrameLink - Handlers
// ============================================================================

impl FrameLink {
    /// Registers a typed handler for `M`, replacing any handler for `M::KEY`.
    ///
    /// # Example
    ///
    /// ```ignore
    /// link.on::<Echo, _, _, _>(|payload: EchoPayload| async move {
    ///     Ok::<_, HandlerError>(EchoReply { reply: format!("Echo: {}", payload.message) })
    /// });
    /// ```
    pub fn on<M, F, Fut, E>(&self, handler: F) -> Subscription
    where
        M: Message,
        F: Fn(M::Payload) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StdResult<M::Response, E>> + Send + 'static,
        E: Into<HandlerError> + 'static,
    {
        self.on_handler(M::KEY, TypedHandler::<M, F>::new(handler))
    }

    /// Registers a handler over raw JSON for `key`.
    pub fn on_raw<F, Fut, E>(&self, key: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = StdResult<Value, E>> + Send + 'static,
        E: Into<HandlerError> + 'static,
    {
        self.on_handler(key, FnHandler(handler))
    }

    /// Registers any [`RequestHandler`] for `key`; last registration wins.
    ///
    /// With [`PingPolicy::Reserved`], registrations under the ping key are
    /// ignored and the returned subscription is inert.
    pub fn on_handler(&self, key: impl Into<String>, handler: impl RequestHandler) -> Subscription {
        let key = key.into();

        if self.inner.guards_key(&key) {
            warn!(key, "Ignoring handler registration for reserved key");
            return Subscription {
                link: Weak::new(),
                key,
            };
        }

        let handler: Handler = Arc::new(handler);
        self.inner.state.lock().handlers.insert(key.clone(), handler);

        Subscription {
            link: Arc::downgrade(&self.inner),
            key,
        }
    }

    /// Removes the handler under `key`. Absent keys are a no-op.
    pub fn off(&self, key: &str) {
        self.inner.remove_handler(key);
    }
}

// ============================================================================
// FrameLink - Lifecycle
// ============================================================================

impl FrameLink {
    /// Tears the link down.
    ///
    /// Uninstalls the inbound listener, fails every pending request and
    /// running handshake with [`Error::Destroyed`], clears all handlers and
    /// the target. Safe to call repeatedly; the link stays usable and can be
    /// connected again.
    pub fn destroy(&self) {
        self.inner.teardown();
        debug!(target_origin = %self.inner.options.target_origin, "FrameLink destroyed");
    }
}

// ============================================================================
// Subscription
// ============================================================================

/// Returned by handler registration.
///
/// Dropping it does nothing; call [`unsubscribe`](Self::unsubscribe) to
/// remove the handler.
#[derive(Debug, Clone)]
pub struct Subscription {
    link: Weak<LinkInner>,
    key: String,
}

impl Subscription {
    /// Returns the key this subscription was registered under.
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Removes whichever handler is currently registered under the key.
    ///
    /// This is by key, not by handler: if the key was re-registered since,
    /// the newer handler is removed.
    pub fn unsubscribe(self) {
        if let Some(link) = self.link.upgrade() {
            link.remove_handler(&self.key);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
