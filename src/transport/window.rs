//! Transport abstraction.
//!
//! Models a postMessage-style primitive as two capabilities:
//!
//! - [`Target`]: fire a message at a remote endpoint (`target.postMessage`)
//! - [`MessageSource`]: deliver inbound messages, tagged with the sender's
//!   origin, to installed listeners (`window.addEventListener("message")`)
//!
//! Delivery is unordered and at-most-once; the link layer adds correlation
//! and liveness on top.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::identifiers::ListenerId;

// ============================================================================
// Types
// ============================================================================

/// Inbound listener callback.
///
/// Called synchronously by the source for every inbound message.
pub type Listener = Arc<dyn Fn(InboundMessage) + Send + Sync>;

// ============================================================================
// TransportError
// ============================================================================

/// Failure raised by a [`Target`] when posting.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The remote endpoint no longer exists.
    #[error("Target window is closed")]
    Closed,

    /// The message could not be serialized for transfer.
    #[error("Failed to serialize message: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The transport refused the message.
    #[error("Transport rejected message: {message}")]
    Rejected {
        /// Reason given by the transport.
        message: String,
    },
}

impl TransportError {
    /// Creates a rejection error.
    #[inline]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }
}

// ============================================================================
// InboundMessage
// ============================================================================

/// A message received from the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    /// Origin credited to the sender.
    pub origin: String,
    /// Message data as posted.
    pub data: Value,
}

impl InboundMessage {
    /// Creates an inbound message.
    #[inline]
    #[must_use]
    pub fn new(origin: impl Into<String>, data: Value) -> Self {
        Self {
            origin: origin.into(),
            data,
        }
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Remote endpoint handle.
///
/// Not owned by the link; the link only keeps a reference while connected.
pub trait Target: Send + Sync + 'static {
    /// Posts `message` to the endpoint.
    ///
    /// `target_origin` restricts delivery to an endpoint with that origin;
    /// `"*"` delivers regardless. A mismatch is not an error, the message is
    /// just not delivered.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the endpoint is gone or the message
    /// cannot be transferred.
    fn post_message(&self, message: Value, target_origin: &str) -> StdResult<(), TransportError>;
}

/// Host of inbound listeners for the local context.
pub trait MessageSource: Send + Sync + 'static {
    /// Installs a listener and returns its handle.
    fn add_listener(&self, listener: Listener) -> ListenerId;

    /// Removes a listener. Unknown handles are ignored.
    fn remove_listener(&self, id: ListenerId);
}

impl<T: Target + ?Sized> Target for Arc<T> {
    #[inline]
    fn post_message(&self, message: Value, target_origin: &str) -> StdResult<(), TransportError> {
        (**self).post_message(message, target_origin)
    }
}

impl<S: MessageSource + ?Sized> MessageSource for Arc<S> {
    #[inline]
    fn add_listener(&self, listener: Listener) -> ListenerId {
        (**self).add_listener(listener)
    }

    #[inline]
    fn remove_listener(&self, id: ListenerId) {
        (**self).remove_listener(id);
    }
}
