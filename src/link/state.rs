//! Per-instance connection state.
//!
//! Owned exclusively by one link; mutated only by connect, send, dispatch
//! and destroy. The lock guarding it is never held across an `.await` or a
//! call into the transport.

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};

use crate::error::{Error, Result};
use crate::identifiers::{ListenerId, MessageId};
use crate::transport::Target;

use super::handler::Handler;

// ============================================================================
// Types
// ============================================================================

/// Channel over which a handshake learns about ping outcomes.
pub(crate) type HandshakeAck = mpsc::UnboundedSender<Result<()>>;

// ============================================================================
// PendingRequest
// ============================================================================

/// Where the outcome of an outstanding request goes.
pub(crate) enum Responder {
    /// Application request; its caller awaits the receiver.
    Reply(oneshot::Sender<Result<Value>>),

    /// Handshake ping.
    ///
    /// Only a successful round-trip is reported; remote errors are silent
    /// so the handshake keeps pinging. The issuing handshake removes the
    /// entry when it ends.
    Ping(HandshakeAck),
}

/// Bookkeeping for one outstanding outbound request.
///
/// Removed from the pending map before it is settled, so exactly one
/// resolution path ever fires.
pub(crate) struct PendingRequest {
    /// Message key of the request.
    pub key: String,
    pub responder: Responder,
}

impl PendingRequest {
    /// Creates an entry for an application request.
    pub fn reply(key: impl Into<String>, tx: oneshot::Sender<Result<Value>>) -> Self {
        Self {
            key: key.into(),
            responder: Responder::Reply(tx),
        }
    }

    /// Creates an entry for a handshake ping.
    pub fn ping(key: impl Into<String>, ack: HandshakeAck) -> Self {
        Self {
            key: key.into(),
            responder: Responder::Ping(ack),
        }
    }

    #[inline]
    pub fn is_ping(&self) -> bool {
        matches!(self.responder, Responder::Ping(_))
    }

    /// Settles with the outcome carried by a matching response.
    pub fn settle(self, outcome: Result<Value>) {
        match self.responder {
            Responder::Reply(tx) => {
                let _ = tx.send(outcome);
            }
            Responder::Ping(ack) => {
                if outcome.is_ok() {
                    let _ = ack.send(Ok(()));
                }
            }
        }
    }

    /// Fails the request regardless of kind.
    pub fn fail(self, error: Error) {
        match self.responder {
            Responder::Reply(tx) => {
                let _ = tx.send(Err(error));
            }
            Responder::Ping(ack) => {
                let _ = ack.send(Err(error));
            }
        }
    }
}

// ============================================================================
// LinkState
// ============================================================================

/// Mutable record of one link.
#[derive(Default)]
pub(crate) struct LinkState {
    /// Remote endpoint, set by connect and cleared by destroy.
    pub target: Option<Arc<dyn Target>>,

    /// Set on the first successful ping round-trip.
    pub connected: bool,

    /// Installed inbound listener, at most one.
    pub listener: Option<ListenerId>,

    /// Request handlers by key; last registration wins.
    pub handlers: FxHashMap<String, Handler>,

    /// Outstanding outbound requests by correlation id.
    pub pending: FxHashMap<MessageId, PendingRequest>,

    /// Running handshakes, failed by destroy even before their first ping.
    pub handshakes: Vec<HandshakeAck>,
}

/// Everything destroy has to finish outside the lock.
pub(crate) struct Teardown {
    pub listener: Option<ListenerId>,
    pub pending: Vec<PendingRequest>,
    pub handshakes: Vec<HandshakeAck>,
}

impl LinkState {
    /// Resets to the disconnected, handler-less state.
    pub fn reset(&mut self) -> Teardown {
        self.handlers.clear();
        self.target = None;
        self.connected = false;

        Teardown {
            listener: self.listener.take(),
            pending: self.pending.drain().map(|(_, pending)| pending).collect(),
            handshakes: std::mem::take(&mut self.handshakes),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
