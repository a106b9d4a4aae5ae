//! Protocol message types.
//!
//! This module defines the envelope exchanged between the two contexts and
//! the compile-time registry mapping keys to payload/response types.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `request` | Either way | Call a handler registered on the other side |
//! | `response` | Either way | Result (or `error`) for the request with the same `id` |
//!
//! The handshake is an ordinary request under the reserved [`PING_KEY`];
//! either side may initiate or answer it.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `registry` | [`Message`] trait and reserved keys |
//! | `wire` | [`WireMessage`] envelope and shape validation |

// ============================================================================
// Submodules
// ============================================================================

/// Compile-time message registry.
pub mod registry;

/// Wire envelope.
pub mod wire;

// ============================================================================
// Re-exports
// ============================================================================

pub use registry::{Message, PING_KEY, is_reserved_key};
pub use wire::{MessageType, WireMessage, is_wire_message};
