//! Correlated outbound requests.

// ============================================================================
// Imports
// ============================================================================

use serde_json::Value;
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::trace;

use crate::error::{Error, Result};
use crate::identifiers::MessageId;
use crate::protocol::{Message, WireMessage};

use super::core::{FrameLink, LinkInner};
use super::state::PendingRequest;

// ============================================================================
// FrameLink - Send
// ============================================================================

impl FrameLink {
    /// Sends a typed request and waits for its response.
    ///
    /// # Errors
    ///
    /// See [`send_raw`](Self::send_raw); additionally [`Error::Json`] if the
    /// payload cannot be encoded or the response does not decode as
    /// `M::Response`.
    pub async fn send<M: Message>(&self, payload: M::Payload) -> Result<M::Response> {
        let payload = serde_json::to_value(payload)?;
        let response = self.send_raw(M::KEY, payload).await?;
        Ok(serde_json::from_value(response)?)
    }

    /// Sends a request over raw JSON and waits for its response.
    ///
    /// Requests issued before the handshake completed are rejected, not
    /// queued.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if the link is not connected
    /// - [`Error::RequestTimeout`] if no response arrived within the timeout
    /// - [`Error::Remote`] if the remote handler failed or nothing handles `key`
    /// - [`Error::Destroyed`] if the link was destroyed meanwhile
    /// - [`Error::Transport`] if posting failed
    pub async fn send_raw(&self, key: impl Into<String>, payload: Value) -> Result<Value> {
        let key = key.into();
        let request_timeout = self.inner.options.timeout;

        let (id, mut response_rx) = {
            let mut state = self.inner.state.lock();
            if !state.connected {
                return Err(Error::NotConnected);
            }

            let id = MessageId::generate();
            let (response_tx, response_rx) = oneshot::channel();
            state
                .pending
                .insert(id.clone(), PendingRequest::reply(key.clone(), response_tx));
            (id, response_rx)
        };

        // Removes the entry on every exit path, including a dropped future.
        let _guard = PendingGuard {
            link: &self.inner,
            id: &id,
        };

        self.inner
            .post(&WireMessage::request(id.clone(), key.clone(), payload))?;

        match timeout(request_timeout, &mut response_rx).await {
            Ok(result) => result?,
            Err(_) => {
                // Whoever removes the entry decides the outcome.
                if self.inner.forget_pending(&id).is_some() {
                    trace!(id = %id, key = %key, "Request timed out");
                    return Err(Error::request_timeout(
                        key,
                        self.inner.options.timeout_ms(),
                    ));
                }

                match response_rx.try_recv() {
                    Ok(outcome) => outcome,
                    Err(_) => Err(Error::request_timeout(
                        key,
                        self.inner.options.timeout_ms(),
                    )),
                }
            }
        }
    }
}

// ============================================================================
// PendingGuard
// ============================================================================

/// Removes a pending entry when dropped.
struct PendingGuard<'a> {
    link: &'a LinkInner,
    id: &'a MessageId,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.link.forget_pending(self.id);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::link::FrameLinkOptions;
    use crate::transport::MemoryWindow;

    #[tokio::test]
    async fn test_send_before_connect() {
        let window = MemoryWindow::new("https://host.example");
        let link = FrameLink::new(window, FrameLinkOptions::any_origin()).unwrap();

        let err = link.send_raw("k", Value::Null).await.unwrap_err();

        assert!(matches!(err, Error::NotConnected));
        assert_eq!(err.to_string(), "Not connected to target window");
        assert_eq!(link.pending_count(), 0);
    }
}
