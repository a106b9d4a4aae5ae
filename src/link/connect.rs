//! Connection handshake.
//!
//! The transport gives no delivery or liveness guarantee: the other context
//! may not have loaded yet, may load later, or may never load. The only
//! reliable readiness signal is an answered request, so connect polls:
//!
//! ```text
//!   t=0      record target, install listener + ping responder
//!   t=100ms  ping #1 ──────►  (lost / unanswered / remote not ready)
//!   t=200ms  ping #2 ──────►
//!            ◄────── response to #2 ⇒ connected, stop pinging
//!   ...
//!   t=timeout                 ⇒ ConnectionTimeout
//! ```
//!
//! Each ping has a fresh id. An unanswered ping lives until its handshake
//! ends, which is never later than the timeout after it was sent, and then
//! evaporates. Remote error responses (e.g. the other side has not
//! installed its responder yet) are ignored. The handshake is
//! symmetric: both sides ping and both answer.

// ============================================================================
// Imports
// ============================================================================

use std::sync::{Arc, Weak};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval_at, sleep};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::MessageId;
use crate::protocol::{PING_KEY, WireMessage};
use crate::transport::Target;

use super::core::{FrameLink, LinkInner};
use super::handler::{Handler, HandlerResult, RequestHandler};
use super::options::{PING_INTERVAL, PingPolicy};
use super::state::{HandshakeAck, LinkState, PendingRequest};

// ============================================================================
// FrameLink - Connect
// ============================================================================

impl FrameLink {
    /// Connects to `target` and waits for the handshake to complete.
    ///
    /// Returns immediately, without any ping traffic, if already connected.
    /// Otherwise pings every 100ms until a ping is answered or the
    /// configured timeout elapses.
    ///
    /// # Errors
    ///
    /// - [`Error::ConnectionTimeout`] if no ping was answered in time
    /// - [`Error::Destroyed`] if [`destroy`](Self::destroy) ran meanwhile
    /// - [`Error::Transport`] if posting a ping failed
    pub async fn connect(&self, target: impl Target) -> Result<()> {
        let mut handshake = {
            let mut state = self.inner.state.lock();
            if state.connected {
                trace!("Already connected");
                return Ok(());
            }
            state.target = Some(Arc::new(target));
            Handshake::register(&self.inner, &mut state)
        };

        self.inner.install_listener();
        self.inner.install_ping_responder();

        // A destroy between registration and the installs found nothing to
        // uninstall.
        if !handshake.is_registered() {
            self.inner.uninstall_if_idle();
            warn!("Link destroyed while connecting");
            return Err(Error::Destroyed);
        }

        let outcome = handshake.run().await;

        match &outcome {
            Ok(()) => debug!(pings = handshake.issued.len(), "Handshake completed"),
            Err(e) => debug!(error = %e, pings = handshake.issued.len(), "Handshake failed"),
        }

        outcome
    }
}

// ============================================================================
// Handshake
// ============================================================================

/// One running connect attempt.
///
/// Dropping it (completion, failure or a cancelled `connect` future) removes
/// every ping it issued, so a late answer cannot connect an abandoned
/// attempt.
struct Handshake<'a> {
    link: &'a LinkInner,
    ack: HandshakeAck,
    acks: mpsc::UnboundedReceiver<Result<()>>,
    issued: Vec<MessageId>,
}

impl<'a> Handshake<'a> {
    /// Registers a handshake so that destroy can fail it.
    ///
    /// Takes the state already locked by the caller.
    fn register(link: &'a LinkInner, state: &mut LinkState) -> Self {
        let (ack, acks) = mpsc::unbounded_channel();
        state.handshakes.push(ack.clone());

        Self {
            link,
            ack,
            acks,
            issued: Vec::new(),
        }
    }

    async fn run(&mut self) -> Result<()> {
        let deadline = sleep(self.link.options.timeout);
        tokio::pin!(deadline);

        let mut ticker = interval_at(Instant::now() + PING_INTERVAL, PING_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                Some(outcome) = self.acks.recv() => {
                    return outcome.and_then(|()| self.confirm());
                }

                () = &mut deadline => {
                    return self.confirm().map_err(|_| {
                        Error::connection_timeout(self.link.options.timeout_ms())
                    });
                }

                _ = ticker.tick() => {
                    // Another handshake on this link may have finished.
                    if self.link.state.lock().connected {
                        return Ok(());
                    }
                    self.ping()?;
                }
            }
        }
    }

    /// Returns `false` once destroy has failed this handshake.
    fn is_registered(&self) -> bool {
        self.link
            .state
            .lock()
            .handshakes
            .iter()
            .any(|ack| ack.same_channel(&self.ack))
    }

    /// Checks that the link is still connected when an answer is processed.
    fn confirm(&self) -> Result<()> {
        if self.link.state.lock().connected {
            Ok(())
        } else {
            Err(Error::Destroyed)
        }
    }

    /// Issues one ping.
    fn ping(&mut self) -> Result<()> {
        let id = MessageId::generate();

        // Removed again by Drop, at most one timeout from now.
        self.link
            .state
            .lock()
            .pending
            .insert(id.clone(), PendingRequest::ping(PING_KEY, self.ack.clone()));
        self.issued.push(id.clone());

        if let Err(e) = self
            .link
            .post(&WireMessage::request(id.clone(), PING_KEY, Value::Null))
        {
            self.link.forget_pending(&id);
            return Err(e);
        }

        trace!(id = %id, "Ping sent");
        Ok(())
    }
}

impl Drop for Handshake<'_> {
    fn drop(&mut self) {
        let mut state = self.link.state.lock();
        for id in &self.issued {
            state.pending.remove(id);
        }
        state.handshakes.retain(|ack| !ack.same_channel(&self.ack));
    }
}

// ============================================================================
// Ping Responder
// ============================================================================

/// What the responder does after answering.
enum AfterPing {
    /// Stay installed.
    Keep,
    /// Reinstate the handler that was registered before the handshake.
    Restore(Option<Handler>),
}

/// Answers remote pings with an empty success response.
struct PingResponder {
    link: Weak<LinkInner>,
    after: AfterPing,
}

#[async_trait]
impl RequestHandler for PingResponder {
    async fn handle(&self, _payload: Value) -> HandlerResult {
        if let AfterPing::Restore(previous) = &self.after {
            tokio::task::yield_now().await;
            if let Some(link) = self.link.upgrade() {
                link.restore_ping_handler(previous.clone());
            }
        }
        Ok(Value::Null)
    }
}

impl LinkInner {
    /// Installs the handshake's responder under the ping key.
    pub(crate) fn install_ping_responder(self: &Arc<Self>) {
        let mut state = self.state.lock();

        let responder = match self.options.ping_policy {
            PingPolicy::Reserved => PingResponder {
                link: Weak::new(),
                after: AfterPing::Keep,
            },
            PingPolicy::Restore => PingResponder {
                link: Arc::downgrade(self),
                after: AfterPing::Restore(state.handlers.get(PING_KEY).cloned()),
            },
        };

        state
            .handlers
            .insert(PING_KEY.to_string(), Arc::new(responder));
    }

    /// Removes the listener and ping responder installed by a connect that
    /// lost a race with destroy, unless another handshake still needs them.
    fn uninstall_if_idle(&self) {
        let listener = {
            let mut state = self.state.lock();
            if state.connected || !state.handshakes.is_empty() {
                return;
            }
            state.handlers.remove(PING_KEY);
            state.listener.take()
        };

        if let Some(listener) = listener {
            self.source.remove_listener(listener);
        }
    }

    fn restore_ping_handler(&self, previous: Option<Handler>) {
        let mut state = self.state.lock();
        match previous {
            Some(handler) => {
                state.handlers.insert(PING_KEY.to_string(), handler);
            }
            None => {
                state.handlers.remove(PING_KEY);
            }
        }
        trace!("Ping handler restored");
    }
}

// ============================================================================
// Tests
// ============================================================================
