//! Error types for the Kite SDK

use serde_json::Value;
use thiserror::Error;

/// Result type alias for Kite operations
pub type Result<T> = std::result::Result<T, KiteError>;

/// Category of a [`KiteError`].
///
/// The server names its failures with an `error_type` string; [`ErrorKind::from_wire`]
/// turns that string into exactly one of these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unclassified server failure
    General,
    /// Account or credential problem
    User,
    /// Two-factor challenge failed or is pending
    TwoFactor,
    /// Order rejected or not found
    Order,
    /// Bad or missing parameters
    Input,
    /// Response could not be decoded
    DataFormat,
    /// Transport failure or gateway-side network problem
    Network,
}

impl ErrorKind {
    /// Map a wire `error_type` to its kind. Unknown or missing names fall back to `General`.
    pub fn from_wire(error_type: Option<&str>) -> Self {
        match error_type {
            Some("GeneralException") => ErrorKind::General,
            Some("UserException") => ErrorKind::User,
            Some("TwoFAException") => ErrorKind::TwoFactor,
            Some("OrderException") => ErrorKind::Order,
            Some("InputException") => ErrorKind::Input,
            Some("DataException") => ErrorKind::DataFormat,
            Some("NetworkException") => ErrorKind::Network,
            _ => ErrorKind::General,
        }
    }

    /// Build the error of this kind from a server message and HTTP status.
    ///
    /// `questions` is only kept for [`ErrorKind::TwoFactor`].
    pub fn into_error(self, message: String, code: u16, questions: Option<Value>) -> KiteError {
        match self {
            ErrorKind::General => KiteError::General { message, code },
            ErrorKind::User => KiteError::User { message, code },
            ErrorKind::TwoFactor => KiteError::TwoFactor {
                message,
                code,
                questions: questions.unwrap_or(Value::Null),
            },
            ErrorKind::Order => KiteError::Order { message, code },
            ErrorKind::Input => KiteError::Input {
                message,
                code: Some(code),
            },
            ErrorKind::DataFormat => KiteError::DataFormat {
                message,
                code: Some(code),
            },
            ErrorKind::Network => KiteError::Network { message, code },
        }
    }
}

/// Main error type for Kite SDK operations
#[derive(Error, Debug)]
pub enum KiteError {
    /// Transport failure (503 unreachable, 504 timeout, 502 bad response, 500 other)
    /// or a `NetworkException` reported by the gateway
    #[error("Network error {code}: {message}")]
    Network {
        /// Synthetic transport code or the server's HTTP status
        code: u16,
        /// Error message
        message: String,
    },

    /// Unparsable or unrecognised response payload
    #[error("Data error: {message}")]
    DataFormat {
        /// Error message
        message: String,
        /// HTTP status, when the server reported the failure
        code: Option<u16>,
    },

    /// `GeneralException` or an unrecognised error type
    #[error("General error {code}: {message}")]
    General {
        /// HTTP status
        code: u16,
        /// Error message
        message: String,
    },

    /// `UserException`
    #[error("User error {code}: {message}")]
    User {
        /// HTTP status
        code: u16,
        /// Error message
        message: String,
    },

    /// `TwoFAException`, carrying the pending question set
    #[error("Two-factor error {code}: {message}")]
    TwoFactor {
        /// HTTP status
        code: u16,
        /// Error message
        message: String,
        /// Questions still to be answered
        questions: Value,
    },

    /// `OrderException`
    #[error("Order error {code}: {message}")]
    Order {
        /// HTTP status
        code: u16,
        /// Error message
        message: String,
    },

    /// `InputException`, or a request that could not be built locally
    #[error("Input error: {message}")]
    Input {
        /// Error message
        message: String,
        /// HTTP status, when the server reported the failure
        code: Option<u16>,
    },

    /// Programmer errors: unknown route, invalid root URL, HTTP client setup
    #[error("Configuration error: {0}")]
    Config(String),
}

impl KiteError {
    /// Create a new network error
    pub fn network(code: u16, message: impl Into<String>) -> Self {
        Self::Network {
            code,
            message: message.into(),
        }
    }

    /// Create a new data format error raised on the client side
    pub fn data_format(message: impl Into<String>) -> Self {
        Self::DataFormat {
            message: message.into(),
            code: None,
        }
    }

    /// Create a new input error raised on the client side
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            code: None,
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Category of this error. `None` for configuration errors.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            KiteError::Network { .. } => Some(ErrorKind::Network),
            KiteError::DataFormat { .. } => Some(ErrorKind::DataFormat),
            KiteError::General { .. } => Some(ErrorKind::General),
            KiteError::User { .. } => Some(ErrorKind::User),
            KiteError::TwoFactor { .. } => Some(ErrorKind::TwoFactor),
            KiteError::Order { .. } => Some(ErrorKind::Order),
            KiteError::Input { .. } => Some(ErrorKind::Input),
            KiteError::Config(_) => None,
        }
    }

    /// Numeric code: the HTTP status for server errors, the synthetic code for transport errors
    pub fn code(&self) -> Option<u16> {
        match self {
            KiteError::Network { code, .. }
            | KiteError::General { code, .. }
            | KiteError::User { code, .. }
            | KiteError::TwoFactor { code, .. }
            | KiteError::Order { code, .. } => Some(*code),
            KiteError::DataFormat { code, .. } | KiteError::Input { code, .. } => *code,
            KiteError::Config(_) => None,
        }
    }

    /// Error message as sent by the server or raised locally
    pub fn message(&self) -> &str {
        match self {
            KiteError::Network { message, .. }
            | KiteError::DataFormat { message, .. }
            | KiteError::General { message, .. }
            | KiteError::User { message, .. }
            | KiteError::TwoFactor { message, .. }
            | KiteError::Order { message, .. }
            | KiteError::Input { message, .. } => message,
            KiteError::Config(message) => message,
        }
    }
}
