//! Compile-time message registry.
//!
//! Each message kind is a type implementing [`Message`], binding a wire key
//! to its payload and response types:
//!
//! ```
//! use frame_link::Message;
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Login { token: String }
//!
//! #[derive(Serialize, Deserialize)]
//! struct Session { user_id: String }
//!
//! enum UserLogin {}
//!
//! impl Message for UserLogin {
//!     const KEY: &'static str = "user:login";
//!     type Payload = Login;
//!     type Response = Session;
//! }
//! ```
//!
//! Use `()` for messages without payload or response; it travels as `null`.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use serde::de::DeserializeOwned;

// ============================================================================
// Constants
// ============================================================================

/// Key reserved for handshake pings.
///
/// Application registries must not define a message under this key.
pub const PING_KEY: &str = "__framelink:ping";

// ============================================================================
// Message
// ============================================================================

/// A message contract: key plus payload and response types.
pub trait Message: 'static {
    /// Wire key.
    const KEY: &'static str;

    /// Request payload.
    type Payload: Serialize + DeserializeOwned + Send + 'static;

    /// Response data.
    type Response: Serialize + DeserializeOwned + Send + 'static;
}

/// Returns `true` if `key` is reserved for internal use.
#[inline]
#[must_use]
pub fn is_reserved_key(key: &str) -> bool {
    key == PING_KEY
}

// ============================================================================
// Tests
// ============================================================================
