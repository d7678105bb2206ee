//! Decoding of messages arriving from the other side of the iframe boundary.
//!
//! The transport hands the host a wrapped value shaped like
//! `{ "message": <json> }`.  Nothing about the inner value can be trusted: the
//! embedded page may run an older build, or something else entirely may be
//! posting into the window.  [`decode_envelope`] turns that untyped value into
//! either a [`CrossDomainMessage`] or a [`MessageError`] describing why it must
//! be dropped.  Callers log the error and keep the channel open.

use serde_json::Value;
use thiserror::Error;

use super::events::{CrossDomainMessage, EventName};

/// Reasons an incoming message is dropped instead of delivered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageError {
    /// The wrapper carried no inner message (absent or `null`).
    #[error("null \"message\" passed from child iframe")]
    MissingMessage,

    /// The inner value is not an object with a string `name` field.
    #[error("malformed message passed from child iframe: {0}")]
    Malformed(String),

    /// The `name` field is not a member of the [`EventName`] vocabulary.
    #[error("invalid event name \"{0}\" passed from child iframe")]
    UnknownEvent(String),
}

/// Decodes the inner message of a transport envelope.
///
/// # Errors
///
/// - [`MessageError::MissingMessage`] if `message` is `None` or JSON `null`.
/// - [`MessageError::Malformed`] if it is not an object with a string `name`.
/// - [`MessageError::UnknownEvent`] if `name` is not a known [`EventName`].
pub fn decode_envelope(message: Option<&Value>) -> Result<CrossDomainMessage, MessageError> {
    let message = match message {
        None | Some(Value::Null) => return Err(MessageError::MissingMessage),
        Some(value) => value,
    };

    let object = message
        .as_object()
        .ok_or_else(|| MessageError::Malformed(format!("expected an object, got {message}")))?;

    let raw_name = match object.get("name") {
        Some(Value::String(name)) => name,
        Some(other) => {
            return Err(MessageError::Malformed(format!(
                "\"name\" must be a string, got {other}"
            )))
        }
        None => return Err(MessageError::Malformed("missing \"name\" field".to_string())),
    };

    let name: EventName = raw_name
        .parse()
        .map_err(|_| MessageError::UnknownEvent(raw_name.clone()))?;

    // A `null` payload is the same as no payload.
    let data = object.get("data").filter(|d| !d.is_null()).cloned();

    Ok(CrossDomainMessage { name, data })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
