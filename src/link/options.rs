//! Link configuration.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use frame_link::{FrameLinkOptions, PingPolicy};
//!
//! let options = FrameLinkOptions::new("https://example.com")
//!     .with_timeout(Duration::from_secs(2))
//!     .with_ping_policy(PingPolicy::Restore);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use crate::error::{Error, Result};
use crate::transport::ANY_ORIGIN;
use crate::transport::origin::check_target_origin;

// ============================================================================
// Constants
// ============================================================================

/// Default timeout for the handshake and for each request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Interval between handshake pings.
pub const PING_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// PingPolicy
// ============================================================================

/// How the handshake treats application handlers under the reserved ping key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PingPolicy {
    /// The handshake owns the ping key.
    ///
    /// Its responder stays installed; application `on`/`off` calls for the
    /// key are ignored.
    #[default]
    Reserved,

    /// Application code may register under the ping key.
    ///
    /// The handshake responder answers one remote ping and then restores
    /// whatever handler was registered before it.
    Restore,
}

// ============================================================================
// FrameLinkOptions
// ============================================================================

/// Configuration for a [`FrameLink`](crate::FrameLink).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLinkOptions {
    /// Origin of the other context, or `"*"` to accept and post to any origin.
    pub target_origin: String,

    /// Handshake timeout and per-request timeout.
    pub timeout: Duration,

    /// Reserved ping key policy.
    pub ping_policy: PingPolicy,
}

impl FrameLinkOptions {
    /// Creates options for the given target origin.
    #[must_use]
    pub fn new(target_origin: impl Into<String>) -> Self {
        Self {
            target_origin: target_origin.into(),
            timeout: DEFAULT_TIMEOUT,
            ping_policy: PingPolicy::default(),
        }
    }

    /// Creates options that accept any origin.
    ///
    /// See [`transport::origin`](crate::transport::origin) for the tradeoff.
    #[inline]
    #[must_use]
    pub fn any_origin() -> Self {
        Self::new(ANY_ORIGIN)
    }

    /// Sets the timeout.
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the ping key policy.
    #[inline]
    #[must_use]
    pub fn with_ping_policy(mut self, policy: PingPolicy) -> Self {
        self.ping_policy = policy;
        self
    }

    /// Returns the timeout in whole milliseconds.
    #[inline]
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the timeout is zero or the target origin
    /// is neither `"*"` nor a serialized origin.
    pub fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(Error::config("timeout must be greater than zero"));
        }
        check_target_origin(&self.target_origin)
    }
}

// ============================================================================
// Tests
// ============================================================================
