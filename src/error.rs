//! Error types for frame-link.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use frame_link::{Error, Result};
//!
//! async fn example(link: &FrameLink) -> Result<()> {
//!     link.connect(target).await?;
//!     let reply = link.send::<Echo>(payload).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`] |
//! | Connection | [`Error::NotConnected`], [`Error::ConnectionTimeout`], [`Error::Destroyed`] |
//! | Request | [`Error::RequestTimeout`], [`Error::Remote`] |
//! | External | [`Error::Transport`], [`Error::Json`], [`Error::ChannelClosed`] |
//!
//! Callers tell timeouts, remote rejections and disconnection apart by
//! variant; the `Display` wording of each variant is stable.

// ============================================================================
// Imports
// ============================================================================

use std::result::Result as StdResult;

use thiserror::Error;
use tokio::sync::oneshot::error::RecvError;

use crate::transport::TransportError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when [`FrameLinkOptions`](crate::FrameLinkOptions) are invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// No live connection.
    ///
    /// Returned by `send` before the handshake completed (requests are
    /// rejected, not queued) and by the sender when no target is registered.
    #[error("Not connected to target window")]
    NotConnected,

    /// Handshake did not complete in time.
    ///
    /// Returned when no ping round-trip succeeded within the configured timeout.
    #[error("Connection timed out after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Configured timeout in milliseconds.
        timeout_ms: u64,
    },

    /// The link was destroyed while the operation was pending.
    #[error("FrameLink destroyed")]
    Destroyed,

    // ========================================================================
    // Request Errors
    // ========================================================================
    /// No response arrived for a request in time.
    #[error("Request timed out: {key}")]
    RequestTimeout {
        /// Message key of the request.
        key: String,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// The remote handler failed.
    ///
    /// Carries the remote's message verbatim, or `"Unknown error"` when the
    /// remote handler panicked.
    #[error("{message}")]
    Remote {
        /// Error message reported by the remote side.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// Transport failure, propagated unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Typed payload or response (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Channel receive error.
    #[error("Channel closed")]
    ChannelClosed(#[from] RecvError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(key: impl Into<String>, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            key: key.into(),
            timeout_ms,
        }
    }

    /// Creates a remote handler error.
    #[inline]
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote {
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::RequestTimeout { .. }
        )
    }

    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::NotConnected
                | Self::ConnectionTimeout { .. }
                | Self::Destroyed
                | Self::Transport(_)
        )
    }

    /// Returns `true` if the remote handler reported this error.
    #[inline]
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================
