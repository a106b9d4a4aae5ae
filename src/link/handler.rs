//! Request handlers.
//!
//! Inbound requests are answered by a [`RequestHandler`] registered under the
//! request's key. Closures are adapted with [`FnHandler`] (untyped JSON) and
//! [`TypedHandler`] (payload/response decoded through a [`Message`]).

// ============================================================================
// Imports
// ============================================================================

use std::future::Future;
use std::marker::PhantomData;
use std::result::Result as StdResult;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::protocol::Message;

// ============================================================================
// Types
// ============================================================================

/// Error returned by a handler; its `Display` text is sent to the remote.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Result of handling one request.
pub type HandlerResult = StdResult<Value, HandlerError>;

/// Shared handler reference stored in the handler table.
pub type Handler = Arc<dyn RequestHandler>;

// ============================================================================
// RequestHandler
// ============================================================================

/// Answers inbound requests for one key.
#[async_trait]
pub trait RequestHandler: Send + Sync + 'static {
    /// Handles a request payload and produces the response payload.
    async fn handle(&self, payload: Value) -> HandlerResult;
}

// ============================================================================
// FnHandler
// ============================================================================

/// Adapts an async closure over raw JSON.
pub struct FnHandler<F>(pub F);

#[async_trait]
impl<F, Fut, E> RequestHandler for FnHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = StdResult<Value, E>> + Send + 'static,
    E: Into<HandlerError> + 'static,
{
    async fn handle(&self, payload: Value) -> HandlerResult {
        (self.0)(payload).await.map_err(Into::into)
    }
}

// ============================================================================
// TypedHandler
// ============================================================================

/// Adapts an async closure over a [`Message`]'s payload and response types.
///
/// A payload that does not decode as `M::Payload` is answered with the
/// decoding error.
pub struct TypedHandler<M, F> {
    handler: F,
    _message: PhantomData<fn() -> M>,
}

impl<M, F> TypedHandler<M, F> {
    /// Wraps `handler`.
    #[inline]
    #[must_use]
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _message: PhantomData,
        }
    }
}

#[async_trait]
impl<M, F, Fut, E> RequestHandler for TypedHandler<M, F>
where
    M: Message,
    F: Fn(M::Payload) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = StdResult<M::Response, E>> + Send + 'static,
    E: Into<HandlerError> + 'static,
{
    async fn handle(&self, payload: Value) -> HandlerResult {
        let payload: M::Payload = serde_json::from_value(payload)?;
        let response = (self.handler)(payload).await.map_err(Into::into)?;
        Ok(serde_json::to_value(response)?)
    }
}

// ============================================================================
// Tests
// ============================================================================
