//! Frame Link - Typed request/response messaging between browsing contexts.
//!
//! This library layers a bidirectional, correlated request/response protocol
//! on top of a fire-and-forget, postMessage-style transport between two
//! contexts (for example a host page and an embedded frame).
//!
//! # Architecture
//!
//! Each side owns one [`FrameLink`]:
//!
//! - **Handshake**: [`FrameLink::connect`] pings the other side every 100ms
//!   until a ping is answered or the timeout elapses
//! - **Requests**: [`FrameLink::send`] correlates each request with its
//!   response by id, with a per-request timeout
//! - **Handlers**: [`FrameLink::on`] answers the other side's requests by key
//!
//! Key design principles:
//!
//! - Message kinds are types implementing [`Message`], so key, payload and
//!   response are checked at compile time
//! - Inbound traffic is filtered by origin and shape; foreign messages on a
//!   shared channel are ignored
//! - Both sides are symmetric: either may connect, send and handle
//!
//! # Quick Start
//!
//! ```no_run
//! use frame_link::{FrameLink, FrameLinkOptions, HandlerError, MemoryWindow, Message, Result};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Ping { message: String }
//!
//! #[derive(Serialize, Deserialize)]
//! struct Pong { reply: String }
//!
//! enum Echo {}
//!
//! impl Message for Echo {
//!     const KEY: &'static str = "test:echo";
//!     type Payload = Ping;
//!     type Response = Pong;
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let host = MemoryWindow::new("https://host.example");
//!     let frame = MemoryWindow::new("https://frame.example");
//!
//!     let host_link = FrameLink::new(host.clone(), FrameLinkOptions::new("https://frame.example"))?;
//!     let frame_link = FrameLink::new(frame.clone(), FrameLinkOptions::new("https://host.example"))?;
//!
//!     frame_link.on::<Echo, _, _, _>(|ping: Ping| async move {
//!         Ok::<_, HandlerError>(Pong { reply: format!("Echo: {}", ping.message) })
//!     });
//!
//!     let (a, b) = tokio::join!(
//!         host_link.connect(frame.target_from(&host)),
//!         frame_link.connect(host.target_from(&frame)),
//!     );
//!     a?;
//!     b?;
//!
//!     let pong = host_link.send::<Echo>(Ping { message: "Hello".into() }).await?;
//!     assert_eq!(pong.reply, "Echo: Hello");
//!
//!     host_link.destroy();
//!     frame_link.destroy();
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`link`] | [`FrameLink`] engine: handshake, send, dispatch |
//! | [`protocol`] | Wire envelope and message registry |
//! | [`transport`] | Transport traits and in-process transport |

// ============================================================================
// Modules
// ============================================================================

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Type-safe identifiers.
///
/// Newtype wrappers prevent mixing correlation ids with listener handles.
pub mod identifiers;

/// Connection and dispatch engine.
///
/// Use [`FrameLink::new`] to create a link, then [`FrameLink::connect`].
pub mod link;

/// Wire envelope and compile-time message registry.
pub mod protocol;

/// Transport abstraction.
///
/// [`Target`] and [`MessageSource`] model the postMessage primitive;
/// [`MemoryWindow`] implements both in process.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{ListenerId, MessageId};

// Link types
pub use link::{
    DEFAULT_TIMEOUT, FnHandler, FrameLink, FrameLinkOptions, HandlerError, HandlerResult,
    PING_INTERVAL, PingPolicy, RequestHandler, Subscription, TypedHandler,
};

// Protocol types
pub use protocol::{Message, MessageType, PING_KEY, WireMessage, is_wire_message};

// Transport types
pub use transport::{
    ANY_ORIGIN, InboundMessage, Listener, MemoryTarget, MemoryWindow, MessageSource, Target,
    TransportError,
};
