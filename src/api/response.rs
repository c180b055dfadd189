//! Response classification and error mapping
//!
//! The gateway wraps JSON answers in an envelope:
//!
//! ```json
//! {"status": "ok", "data": ...}
//! {"status": "error", "error_type": "OrderException", "message": "...", "questions": ...}
//! ```
//!
//! Two-factor challenge images come back as raw JPEG bytes instead.

use crate::api::dispatch::RawResponse;
use crate::error::{ErrorKind, KiteError, Result};
use crate::types::api::{Outcome, Payload, SessionHook};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// HTTP status the gateway uses for expired or invalid sessions
pub const SESSION_EXPIRED_STATUS: u16 = 403;

const JSON_TYPE: &str = "application/json";
const IMAGE_TYPES: [&str; 2] = ["image/jpeg", "image/jpg"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum EnvelopeStatus {
    Ok,
    Error,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: EnvelopeStatus,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    error_type: Option<Value>,
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    questions: Option<Value>,
}

/// Error detail from an `"error"` envelope
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPayload {
    /// Wire error type, e.g. "OrderException"
    pub error_type: Option<String>,
    /// Server message, empty if none was sent
    pub message: String,
    /// Pending two-factor questions
    pub questions: Option<Value>,
}

impl ErrorPayload {
    /// Kind this payload maps to
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::from_wire(self.error_type.as_deref())
    }

    /// Map to exactly one typed error carrying `status` as its code
    pub fn into_error(self, status: u16) -> KiteError {
        self.kind().into_error(self.message, status, self.questions)
    }
}

/// Result of classifying a raw response
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    /// `"ok"` envelope; holds `data` unchanged
    Success(Value),
    /// `"error"` envelope with the HTTP status it arrived with
    Error {
        /// Error detail
        payload: ErrorPayload,
        /// HTTP status
        status: u16,
    },
    /// Image body
    Binary(Vec<u8>),
}

/// Error envelope fields are usually strings; anything else (e.g. a map of field errors) is kept as its JSON text
fn text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

/// Media type without parameters, lower-cased: `Application/JSON; charset=utf-8` -> `application/json`
fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// Classify a response by content type and envelope status.
///
/// Image bodies are returned as bytes whatever the HTTP status. JSON that does not parse,
/// carries an unknown status, or any other content type is a data format error.
pub fn classify(response: RawResponse) -> Result<Classified> {
    let media = response.content_type.as_deref().map(media_type).unwrap_or_default();

    if media == JSON_TYPE {
        let envelope: Envelope = serde_json::from_slice(&response.body)
            .map_err(|e| KiteError::data_format(format!("Unparsable response: {}", e)))?;

        return Ok(match envelope.status {
            EnvelopeStatus::Ok => Classified::Success(envelope.data),
            EnvelopeStatus::Error => Classified::Error {
                payload: ErrorPayload {
                    error_type: text(envelope.error_type),
                    message: text(envelope.message).unwrap_or_default(),
                    questions: envelope.questions,
                },
                status: response.status,
            },
        });
    }

    if IMAGE_TYPES.contains(&media.as_str()) {
        return Ok(Classified::Binary(response.body));
    }

    Err(KiteError::data_format(format!(
        "Invalid response format: {}",
        response.content_type.as_deref().unwrap_or("no content type")
    )))
}

/// Turn a classified response into the call's outcome.
///
/// A 403 error with a session hook registered runs the hook once and yields
/// [`Outcome::SessionExpired`]. Every other error envelope becomes its typed error.
pub fn resolve(classified: Classified, session_hook: Option<&SessionHook>) -> Result<Outcome<Payload>> {
    match classified {
        Classified::Success(data) => Ok(Outcome::Completed(Payload::Json(data))),
        Classified::Binary(bytes) => Ok(Outcome::Completed(Payload::Image(bytes))),
        Classified::Error { payload, status } => {
            if status == SESSION_EXPIRED_STATUS {
                if let Some(hook) = session_hook {
                    warn!(error_type = ?payload.error_type, message = %payload.message, "Session rejected, running session hook");
                    (hook.as_ref())();
                    return Ok(Outcome::SessionExpired);
                }
            }
            Err(payload.into_error(status))
        }
    }
}
