//! Inbound message dispatch.
//!
//! Every inbound message goes through the same steps:
//!
//! 1. Origin check; rejected origins are dropped.
//! 2. Shape check; anything that is not a [`WireMessage`] is dropped.
//! 3. Responses settle the pending request with the same id. Unknown ids
//!    (late, duplicate or foreign responses) are dropped.
//! 4. Requests are answered by the handler registered under their key, or
//!    with a "No handler registered" error response.
//!
//! Nothing in here ever fails outward: foreign traffic on a shared channel
//! must not break the protocol, and handler failures become error responses.

// ============================================================================
// Imports
// ============================================================================

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::runtime::Handle;
use tracing::{debug, trace, warn};

use crate::error::Error;
use crate::protocol::WireMessage;
use crate::transport::{InboundMessage, Listener};

use super::core::LinkInner;
use super::handler::Handler;

// ============================================================================
// Constants
// ============================================================================

/// Error reported when a handler panics.
pub(crate) const UNKNOWN_ERROR: &str = "Unknown error";

/// Error reported for a request nobody handles.
fn no_handler_error(key: &str) -> String {
    format!("No handler registered for key: {key}")
}

// ============================================================================
// LinkInner - Listener
// ============================================================================

impl LinkInner {
    /// Installs this link's inbound listener unless one is installed.
    ///
    /// Must be called from within a tokio runtime; request handlers are
    /// spawned onto it.
    pub(crate) fn install_listener(self: &Arc<Self>) {
        if self.state.lock().listener.is_some() {
            return;
        }

        let link = Arc::downgrade(self);
        let runtime = Handle::current();
        let listener: Listener = Arc::new(move |message| {
            if let Some(link) = link.upgrade() {
                link.dispatch(message, &runtime);
            }
        });

        // Installed outside the lock: a source may deliver synchronously.
        let id = self.source.add_listener(listener);

        let mut state = self.state.lock();
        if state.listener.is_some() {
            drop(state);
            self.source.remove_listener(id);
            return;
        }
        state.listener = Some(id);
        debug!(listener = %id, "Inbound listener installed");
    }

    /// Routes one inbound message.
    pub(crate) fn dispatch(self: &Arc<Self>, message: InboundMessage, runtime: &Handle) {
        if !self.validator.accepts(&message.origin) {
            trace!(origin = %message.origin, "Dropped message from rejected origin");
            return;
        }

        let Some(wire) = WireMessage::parse(&message.data) else {
            trace!(origin = %message.origin, "Dropped non-protocol message");
            return;
        };

        trace!(id = %wire.id, key = %wire.key, kind = ?wire.message_type, "Message received");

        if wire.is_response() {
            self.handle_response(wire);
            return;
        }

        let handler = self.state.lock().handlers.get(&wire.key).cloned();
        let Some(handler) = handler else {
            let error = no_handler_error(&wire.key);
            self.reply(WireMessage::error_response(wire.id, wire.key, error));
            return;
        };

        let link = Arc::clone(self);
        runtime.spawn(async move {
            link.handle_request(wire, handler).await;
        });
    }
}

// ============================================================================
// LinkInner - Routing
// ============================================================================

impl LinkInner {
    /// Settles the pending request matching a response.
    ///
    /// The entry is removed before it is settled, so a duplicate response
    /// finds nothing and is dropped.
    fn handle_response(&self, response: WireMessage) {
        let pending = {
            let mut state = self.state.lock();
            let Some(pending) = state.pending.remove(&response.id) else {
                drop(state);
                trace!(id = %response.id, key = %response.key, "Dropped response for unknown request");
                return;
            };

            if pending.is_ping() && response.error.is_none() && !state.connected {
                state.connected = true;
                debug!(id = %response.id, "Ping answered, link connected");
            }
            pending
        };

        trace!(id = %response.id, key = %pending.key, "Response matched");

        let outcome = match response.error {
            Some(message) => Err(Error::remote(message)),
            None => Ok(response.payload),
        };
        pending.settle(outcome);
    }

    /// Runs a handler and posts its response.
    async fn handle_request(&self, request: WireMessage, handler: Handler) {
        let WireMessage {
            id, key, payload, ..
        } = request;

        let outcome = AssertUnwindSafe(handler.handle(payload))
            .catch_unwind()
            .await;

        let response = match outcome {
            Ok(Ok(value)) => WireMessage::response(id, key, value),
            Ok(Err(error)) => WireMessage::error_response(id, key, error.to_string()),
            Err(_) => {
                warn!(id = %id, key = %key, "Request handler panicked");
                WireMessage::error_response(id, key, UNKNOWN_ERROR)
            }
        };

        self.reply(response);
    }

    /// Posts a response; failures are logged, never raised.
    fn reply(&self, response: WireMessage) {
        if let Err(e) = self.post(&response) {
            warn!(id = %response.id, key = %response.key, error = %e, "Failed to post response");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_handler_error_wording() {
        assert_eq!(
            no_handler_error("test:missing"),
            "No handler registered for key: test:missing"
        );
    }

    #[test]
    fn test_unknown_error_wording() {
        assert_eq!(UNKNOWN_ERROR, "Unknown error");
    }
}
