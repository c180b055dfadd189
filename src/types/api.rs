//! Call outcome and payload types

use crate::error::{KiteError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Callback invoked when the gateway reports an expired or invalid session (HTTP 403)
pub type SessionHook = Arc<dyn Fn() + Send + Sync>;

/// Result of a call that reached the gateway
///
/// `SessionExpired` means the gateway rejected the session, the registered session hook
/// has already run, and the operation did not complete. It is never a success.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a call may have been cut short by session expiry"]
pub enum Outcome<T> {
    /// The operation completed and produced a value
    Completed(T),
    /// The session hook took over; there is no result
    SessionExpired,
}

impl<T> Outcome<T> {
    /// Whether the session hook intercepted the call
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Outcome::SessionExpired)
    }

    /// The completed value, if any
    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::SessionExpired => None,
        }
    }

    /// Borrow the completed value
    pub fn as_ref(&self) -> Outcome<&T> {
        match self {
            Outcome::Completed(value) => Outcome::Completed(value),
            Outcome::SessionExpired => Outcome::SessionExpired,
        }
    }

    /// Transform the completed value
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Completed(value) => Outcome::Completed(f(value)),
            Outcome::SessionExpired => Outcome::SessionExpired,
        }
    }

    /// Transform the completed value with a fallible function
    pub fn try_map<U, F: FnOnce(T) -> Result<U>>(self, f: F) -> Result<Outcome<U>> {
        match self {
            Outcome::Completed(value) => f(value).map(Outcome::Completed),
            Outcome::SessionExpired => Ok(Outcome::SessionExpired),
        }
    }
}

/// Decoded response body
#[derive(Clone, PartialEq)]
pub enum Payload {
    /// `data` member of a JSON success envelope
    Json(Value),
    /// Raw image bytes (two-factor challenge images)
    Image(Vec<u8>),
}

impl Payload {
    /// JSON data; an image payload is a data format error
    pub fn into_json(self) -> Result<Value> {
        match self {
            Payload::Json(value) => Ok(value),
            Payload::Image(_) => Err(KiteError::data_format("Expected JSON data, got an image")),
        }
    }

    /// Deserialize the JSON data into `T`
    pub fn decode<T: DeserializeOwned>(self) -> Result<T> {
        let value = self.into_json()?;
        serde_json::from_value(value).map_err(|e| KiteError::data_format(format!("Unexpected data shape: {}", e)))
    }

    /// Image bytes, if this is an image payload
    pub fn as_image(&self) -> Option<&[u8]> {
        match self {
            Payload::Image(bytes) => Some(bytes),
            Payload::Json(_) => None,
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Payload::Image(bytes) => write!(f, "Image({} bytes)", bytes.len()),
        }
    }
}
