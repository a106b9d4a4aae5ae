//! Wire message envelope.
//!
//! The only shape that crosses the transport boundary. Field names are
//! fixed; there is no version byte and no magic number.
//!
//! # Format
//!
//! Request:
//! ```json
//! { "type": "request", "id": "lq2x1f-k3j9a8b7c", "key": "user:login", "payload": { ... } }
//! ```
//!
//! Success response:
//! ```json
//! { "type": "response", "id": "lq2x1f-k3j9a8b7c", "key": "user:login", "payload": { ... } }
//! ```
//!
//! Error response:
//! ```json
//! { "type": "response", "id": "lq2x1f-k3j9a8b7c", "key": "user:login", "payload": null, "error": "..." }
//! ```

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::identifiers::MessageId;

// ============================================================================
// MessageType
// ============================================================================

/// Discriminator of a [`WireMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Outbound call expecting a response.
    Request,
    /// Answer to a request with the same id.
    Response,
}

// ============================================================================
// WireMessage
// ============================================================================

/// Request/response envelope.
///
/// A response with `error` set signals failure; without it, success, even
/// when `payload` is `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    /// Request or response.
    #[serde(rename = "type")]
    pub message_type: MessageType,

    /// Correlation id.
    pub id: MessageId,

    /// Message key from the registry.
    pub key: String,

    /// Request payload or response data (`null` for none).
    pub payload: Value,

    /// Failure message (responses only).
    ///
    /// Any non-null value counts as failure; non-string values are kept as
    /// their JSON text.
    #[serde(
        default,
        deserialize_with = "deserialize_error",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
}

impl WireMessage {
    /// Creates a request.
    #[must_use]
    pub fn request(id: MessageId, key: impl Into<String>, payload: Value) -> Self {
        Self {
            message_type: MessageType::Request,
            id,
            key: key.into(),
            payload,
            error: None,
        }
    }

    /// Creates a success response.
    #[must_use]
    pub fn response(id: MessageId, key: impl Into<String>, payload: Value) -> Self {
        Self {
            message_type: MessageType::Response,
            id,
            key: key.into(),
            payload,
            error: None,
        }
    }

    /// Creates an error response with no payload.
    #[must_use]
    pub fn error_response(
        id: MessageId,
        key: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            message_type: MessageType::Response,
            id,
            key: key.into(),
            payload: Value::Null,
            error: Some(error.into()),
        }
    }

    /// Returns `true` for requests.
    #[inline]
    #[must_use]
    pub fn is_request(&self) -> bool {
        self.message_type == MessageType::Request
    }

    /// Returns `true` for responses.
    #[inline]
    #[must_use]
    pub fn is_response(&self) -> bool {
        self.message_type == MessageType::Response
    }

    /// Validates and decodes an inbound value.
    ///
    /// Returns `None` exactly when [`is_wire_message`] returns `false`:
    /// non-objects, unknown `type`, non-string `id`/`key` or a missing
    /// `payload` property. Never panics.
    #[must_use]
    pub fn parse(value: &Value) -> Option<Self> {
        if !is_wire_message(value) {
            return None;
        }
        Self::deserialize(value).ok()
    }
}

/// Reads `error` leniently: `null` is no error, a string is kept, anything
/// else becomes its JSON text.
fn deserialize_error<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(message) => Some(message),
        other => Some(other.to_string()),
    })
}

// ============================================================================
// Shape Guard
// ============================================================================

/// Returns `true` if `value` has the wire message shape.
///
/// Checks `type`, `id`, `key` and the presence of `payload` (which may be
/// `null`). Extra properties are allowed.
#[must_use]
pub fn is_wire_message(value: &Value) -> bool {
    let Some(object) = value.as_object() else {
        return false;
    };

    let type_ok = matches!(
        object.get("type").and_then(Value::as_str),
        Some("request" | "response")
    );

    type_ok
        && object.get("id").is_some_and(Value::is_string)
        && object.get("key").is_some_and(Value::is_string)
        && object.contains_key("payload")
}

// ============================================================================
// Tests
// ============================================================================
