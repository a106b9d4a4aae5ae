//! Origin validation.
//!
//! Inbound messages are accepted only from the configured target origin,
//! unless it is the `"*"` wildcard.
//!
//! # Security
//!
//! `"*"` accepts messages from any context able to post to this one and
//! posts outbound messages to whatever document currently occupies the
//! target. Use it only when the payloads are not sensitive.

// ============================================================================
// Imports
// ============================================================================

use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Wildcard origin: accept any origin.
pub const ANY_ORIGIN: &str = "*";

// ============================================================================
// OriginValidator
// ============================================================================

/// Decides whether an inbound message's origin is acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OriginValidator {
    /// Accept every origin.
    Any,
    /// Accept exactly this origin.
    Exact(String),
}

impl OriginValidator {
    /// Creates a validator for the configured target origin.
    #[must_use]
    pub fn new(target_origin: &str) -> Self {
        if target_origin == ANY_ORIGIN {
            Self::Any
        } else {
            Self::Exact(target_origin.to_string())
        }
    }

    /// Returns `true` if a message from `origin` is acceptable.
    #[inline]
    #[must_use]
    pub fn accepts(&self, origin: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(expected) => origin == expected,
        }
    }

    /// Returns `true` if origin checking is disabled.
    #[inline]
    #[must_use]
    pub const fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

// ============================================================================
// Configuration Check
// ============================================================================

/// Checks that `origin` is `"*"` or a serialized tuple origin.
///
/// A tuple origin is `scheme://host[:port]` with no path, query or fragment,
/// exactly as a browser reports it (`https://example.com`, not
/// `https://example.com/`).
///
/// # Errors
///
/// Returns [`Error::Config`] otherwise.
pub(crate) fn check_target_origin(origin: &str) -> Result<()> {
    if origin == ANY_ORIGIN {
        return Ok(());
    }

    let url = Url::parse(origin)
        .map_err(|e| Error::config(format!("invalid target origin {origin:?}: {e}")))?;

    let serialized = url.origin();
    if !serialized.is_tuple() || serialized.ascii_serialization() != origin {
        return Err(Error::config(format!(
            "target origin {origin:?} is not a serialized origin (expected scheme://host[:port])"
        )));
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
