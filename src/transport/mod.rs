//! Transport layer.
//!
//! This module defines the seam between the link engine and the raw
//! cross-context messaging primitive, plus the pieces the link binds to it.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐   post_message(data, target_origin)   ┌──────────────────┐
//! │  Host context    │ ─────────────────────────────────────►│  Frame context   │
//! │                  │                                       │                  │
//! │  FrameLink       │◄───────────────────────────────────── │  FrameLink       │
//! │  (MessageSource) │   listener(InboundMessage{origin})    │  (MessageSource) │
//! └──────────────────┘                                       └──────────────────┘
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `window` | [`Target`] / [`MessageSource`] traits and [`TransportError`] |
//! | `origin` | [`OriginValidator`] |
//! | `sender` | [`MessageSender`] |
//! | `memory` | [`MemoryWindow`] in-process transport |

// ============================================================================
// Submodules
// ============================================================================

/// In-process transport.
pub mod memory;

/// Origin validation.
pub mod origin;

/// Outbound message sender.
pub mod sender;

/// Transport traits.
pub mod window;

// ============================================================================
// Re-exports
// ============================================================================

pub use memory::{MemoryTarget, MemoryWindow};
pub use origin::{ANY_ORIGIN, OriginValidator};
pub use sender::MessageSender;
pub use window::{InboundMessage, Listener, MessageSource, Target, TransportError};
