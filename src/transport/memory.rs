//! In-process transport.
//!
//! [`MemoryWindow`] stands in for a browsing context: it has an origin and
//! hosts inbound listeners. [`MemoryTarget`] is the handle another context
//! uses to post into it, credited with the poster's origin.
//!
//! Delivery follows postMessage rules:
//!
//! - a post whose target origin is neither `"*"` nor the window's origin is
//!   silently dropped
//! - posting to a closed window fails with [`TransportError::Closed`]
//! - every listener receives its own copy of the data
//!
//! Listeners run synchronously inside `post_message`.
//!
//! # Example
//!
//! ```ignore
//! let host = MemoryWindow::new("https://host.example");
//! let frame = MemoryWindow::new("https://frame.example");
//!
//! // How the host addresses the frame, and vice versa.
//! let to_frame = frame.target_from(&host);
//! let to_host = host.target_from(&frame);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::result::Result as StdResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tracing::trace;

use crate::identifiers::ListenerId;

use super::origin::ANY_ORIGIN;
use super::{InboundMessage, Listener, MessageSource, Target, TransportError};

// ============================================================================
// MemoryWindow
// ============================================================================

/// Shared state of a window.
struct WindowInner {
    /// Origin of this context.
    origin: String,
    /// Installed listeners.
    listeners: RwLock<FxHashMap<ListenerId, Listener>>,
    /// Set once the window is closed.
    closed: AtomicBool,
}

/// An in-process browsing context.
#[derive(Clone)]
pub struct MemoryWindow {
    inner: Arc<WindowInner>,
}

impl fmt::Debug for MemoryWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryWindow")
            .field("origin", &self.inner.origin)
            .field("listeners", &self.listener_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl MemoryWindow {
    /// Creates a window with the given origin.
    #[must_use]
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(WindowInner {
                origin: origin.into(),
                listeners: RwLock::new(FxHashMap::default()),
                closed: AtomicBool::new(false),
            }),
        }
    }

    /// Returns this window's origin.
    #[inline]
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.inner.origin
    }

    /// Returns a handle for posting into this window from `sender`.
    #[must_use]
    pub fn target_from(&self, sender: &MemoryWindow) -> MemoryTarget {
        self.target(sender.origin())
    }

    /// Returns a handle for posting into this window, credited with `source_origin`.
    #[must_use]
    pub fn target(&self, source_origin: impl Into<String>) -> MemoryTarget {
        MemoryTarget {
            window: Arc::downgrade(&self.inner),
            source_origin: source_origin.into(),
        }
    }

    /// Delivers an inbound message to every listener.
    ///
    /// Listeners are snapshotted first, so they may add or remove listeners
    /// while running.
    pub fn dispatch(&self, message: InboundMessage) {
        let listeners: Vec<Listener> = self.inner.listeners.read().values().cloned().collect();

        trace!(
            origin = %message.origin,
            listeners = listeners.len(),
            "Dispatching inbound message"
        );

        for listener in listeners {
            listener(message.clone());
        }
    }

    /// Closes the window. Further posts into it fail.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        self.inner.listeners.write().clear();
    }

    /// Returns `true` if the window was closed.
    #[inline]
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    /// Returns the number of installed listeners.
    #[inline]
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.read().len()
    }
}

impl MessageSource for MemoryWindow {
    fn add_listener(&self, listener: Listener) -> ListenerId {
        let id = ListenerId::next();
        self.inner.listeners.write().insert(id, listener);
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.inner.listeners.write().remove(&id);
    }
}

// ============================================================================
// MemoryTarget
// ============================================================================

/// Handle for posting into a [`MemoryWindow`].
///
/// Does not keep the window alive; posting after the window is dropped
/// fails with [`TransportError::Closed`].
#[derive(Clone)]
pub struct MemoryTarget {
    window: Weak<WindowInner>,
    source_origin: String,
}

impl fmt::Debug for MemoryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTarget")
            .field("source_origin", &self.source_origin)
            .finish_non_exhaustive()
    }
}

impl Target for MemoryTarget {
    fn post_message(&self, message: Value, target_origin: &str) -> StdResult<(), TransportError> {
        let inner = self.window.upgrade().ok_or(TransportError::Closed)?;
        if inner.closed.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }

        if target_origin != ANY_ORIGIN && target_origin != inner.origin {
            trace!(
                target_origin,
                window_origin = %inner.origin,
                "Target origin mismatch, message not delivered"
            );
            return Ok(());
        }

        MemoryWindow { inner }.dispatch(InboundMessage::new(self.source_origin.clone(), message));
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
