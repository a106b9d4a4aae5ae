//! Outbound message sender.
//!
//! Binds the fixed destination-origin policy to the transport call.

// ============================================================================
// Imports
// ============================================================================

use tracing::trace;

use crate::error::{Error, Result};
use crate::protocol::WireMessage;

use super::{Target, TransportError};

// ============================================================================
// MessageSender
// ============================================================================

/// Posts wire messages to the current target.
#[derive(Debug, Clone)]
pub struct MessageSender {
    /// Destination-origin policy passed to every post.
    target_origin: String,
}

impl MessageSender {
    /// Creates a sender posting with `target_origin`.
    #[inline]
    #[must_use]
    pub fn new(target_origin: impl Into<String>) -> Self {
        Self {
            target_origin: target_origin.into(),
        }
    }

    /// Returns the destination-origin policy.
    #[inline]
    #[must_use]
    pub fn target_origin(&self) -> &str {
        &self.target_origin
    }

    /// Posts `message` to `target`.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if no target is registered (nothing is posted)
    /// - [`Error::Transport`] with the transport's own error, unchanged
    pub fn send(&self, target: Option<&dyn Target>, message: &WireMessage) -> Result<()> {
        let target = target.ok_or(Error::NotConnected)?;

        let value = serde_json::to_value(message).map_err(TransportError::from)?;
        target.post_message(value, &self.target_origin)?;

        trace!(
            id = %message.id,
            key = %message.key,
            kind = ?message.message_type,
            "Message posted"
        );

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
