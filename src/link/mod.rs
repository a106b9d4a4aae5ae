//! Connection and dispatch engine.
//!
//! Turns a fire-and-forget, unordered transport into a correlated
//! request/response protocol with a liveness handshake.
//!
//! # Lifecycle
//!
//! 1. [`FrameLink::new`] - validate options, create disconnected state
//! 2. [`FrameLink::connect`] - record target, install listener, ping until answered
//! 3. [`FrameLink::send`] / [`FrameLink::on`] - exchange requests both ways
//! 4. [`FrameLink::destroy`] - uninstall listener, fail pending requests
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `connect` | Ping handshake |
//! | `core` | [`FrameLink`] handle, handler registration, teardown |
//! | `dispatcher` | Inbound routing |
//! | `handler` | [`RequestHandler`] and closure adapters |
//! | `options` | [`FrameLinkOptions`], [`PingPolicy`] |
//! | `send` | Correlated outbound requests |
//! | `state` | Per-instance connection state |

// ============================================================================
// Submodules
// ============================================================================

/// Ping handshake.
mod connect;

/// FrameLink handle.
mod core;

/// Inbound routing.
mod dispatcher;

/// Request handlers.
pub mod handler;

/// Link configuration.
pub mod options;

/// Correlated outbound requests.
mod send;

/// Per-instance connection state.
mod state;

// ============================================================================
// Re-exports
// ============================================================================

pub use core::{FrameLink, Subscription};
pub use handler::{FnHandler, HandlerError, HandlerResult, RequestHandler, TypedHandler};
pub use options::{DEFAULT_TIMEOUT, FrameLinkOptions, PING_INTERVAL, PingPolicy};
