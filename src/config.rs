//! Configuration for the Kite SDK

use crate::error::{KiteError, Result};
use url::Url;

/// Default API root
pub const DEFAULT_ROOT: &str = "http://localhost:8000";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 7;

/// Configuration for [`KiteClient`](crate::KiteClient)
///
/// Built once and never mutated by the client. The only mutable session state,
/// the access token, lives in the client itself.
#[derive(Debug, Clone)]
pub struct Config {
    /// API root URL, validated and without a trailing slash
    pub root: String,

    /// User id sent with every request
    pub user_id: String,

    /// Access token to start with, if one was saved from an earlier login
    pub token: Option<String>,

    /// Whole-request timeout in seconds
    pub timeout_secs: u64,

    /// Trace every request and response at debug level
    pub debug: bool,
}

impl Config {
    /// Create a configuration for `user_id` against the default root
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            root: DEFAULT_ROOT.to_string(),
            user_id: user_id.into(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            debug: false,
        }
    }

    /// Override the API root
    ///
    /// # Arguments
    ///
    /// * `root` - Absolute http(s) URL, e.g. "https://kite.example.com/api"
    pub fn with_root(mut self, root: &str) -> Result<Self> {
        let url = Url::parse(root).map_err(|e| KiteError::config(format!("Invalid root URL {root}: {e}")))?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(KiteError::config(format!("Unsupported URL scheme: {other}"))),
        }
        self.root = url.as_str().trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Enable or disable request/response tracing
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Start with a previously issued access token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Root URL without a trailing slash, ready for path concatenation
    pub fn root_str(&self) -> &str {
        &self.root
    }
}
