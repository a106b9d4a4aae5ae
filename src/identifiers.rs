//! Type-safe identifiers.
//!
//! Newtype wrappers prevent mixing correlation ids with listener handles.
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`MessageId`] | Request/response correlation on the wire |
//! | [`ListenerId`] | Handle for an installed inbound listener |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Constants
// ============================================================================

/// Radix used for both id components.
const ID_RADIX: u128 = 36;

/// Length of the random component.
const RANDOM_LEN: usize = 9;

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// ============================================================================
// MessageId
// ============================================================================

/// Correlation identifier carried in the wire `id` field.
///
/// Generated ids have the form `{millis}-{random}`, both components
/// base-36 encoded. Ids received from the remote side are arbitrary strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Generates a fresh identifier.
    ///
    /// Unique with overwhelming probability among the outstanding requests
    /// of one link.
    #[must_use]
    pub fn generate() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();

        let mut random = to_radix36(Uuid::new_v4().as_u128());
        random.truncate(RANDOM_LEN);

        Self(format!("{}-{random}", to_radix36(millis)))
    }

    /// Wraps an existing identifier.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

fn to_radix36(mut value: u128) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(25);
    while value > 0 {
        digits.push(DIGITS[(value % ID_RADIX) as usize]);
        value /= ID_RADIX;
    }
    digits.reverse();

    // Only ASCII digits were pushed.
    String::from_utf8(digits).unwrap_or_default()
}

// ============================================================================
// ListenerId
// ============================================================================

/// Handle for a listener installed on a [`MessageSource`](crate::transport::MessageSource).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Allocates the next process-unique listener id.
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Tests
// ============================================================================
