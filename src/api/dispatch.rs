//! Request dispatch: parameter sets, identity merge, path templating and the HTTP round trip

use crate::api::routes::{HttpMethod, Route};
use crate::config::Config;
use crate::error::{KiteError, Result};
use reqwest::{redirect::Policy, Client as HttpClient};
use rust_decimal::Decimal;
use std::error::Error as StdError;
use std::time::Duration;
use tracing::debug;

/// Maximum number of redirects followed per request
const MAX_REDIRECTS: usize = 10;

/// Identity parameter carrying the user id
pub const USER_ID_PARAM: &str = "user_id";

/// Identity parameter carrying the access token
pub const TOKEN_PARAM: &str = "token";

/// Value of a request parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    /// Single value
    One(String),
    /// Repeated key, e.g. `question[]`
    Many(Vec<String>),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::One(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::One(value)
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        ParamValue::One(value.clone())
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        ParamValue::One(value.to_string())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::One(value.to_string())
    }
}

impl From<Decimal> for ParamValue {
    fn from(value: Decimal) -> Self {
        ParamValue::One(value.to_string())
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        ParamValue::Many(values)
    }
}

/// Ordered request parameters. Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    /// Create an empty parameter set
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Params::insert`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key`, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Value for `key`
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Whether `key` is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Remove `key`, returning its value
    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate keys and values in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Flatten into key/value pairs, repeating the key for each element of a multi-value
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            match value {
                ParamValue::One(v) => pairs.push((key.clone(), v.clone())),
                ParamValue::Many(values) => {
                    pairs.extend(values.iter().map(|v| (key.clone(), v.clone())));
                }
            }
        }
        pairs
    }
}

/// Who is calling: the user id and, once logged in, the access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// User id, sent with every request
    pub user_id: String,
    /// Access token, sent only when set
    pub token: Option<String>,
}

impl Identity {
    /// Return a copy of `params` with `user_id` and, if set and non-empty, `token` merged in
    pub fn apply(&self, params: &Params) -> Params {
        let mut merged = params.clone();
        merged.insert(USER_ID_PARAM, self.user_id.as_str());
        if let Some(token) = self.token.as_deref().filter(|token| !token.is_empty()) {
            merged.insert(TOKEN_PARAM, token);
        }
        merged
    }
}

/// A fully built request: concrete path and the parameters that go on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    /// Route the request was built from
    pub route: Route,
    /// HTTP method
    pub method: HttpMethod,
    /// Path with placeholders substituted, relative to the root
    pub path: String,
    /// Query (or, for POST, body) parameters
    pub params: Params,
}

/// Build the request for `route`.
///
/// Identity parameters are merged first, then every `{key}` in the template is replaced with
/// the path-encoded value of `key`. Parameters used in the path stay in the query/body as
/// well, so the gateway sees them either way. A placeholder with no matching single-valued
/// parameter is an input error; nothing is sent.
pub fn prepare(route: Route, method: HttpMethod, params: &Params, identity: &Identity) -> Result<PreparedRequest> {
    let merged = identity.apply(params);
    let template = route.template();

    let mut path = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let key = &rest[start + 1..start + len];
        path.push_str(&rest[..start]);

        let value = match merged.get(key) {
            Some(ParamValue::One(value)) => value,
            Some(ParamValue::Many(_)) => {
                return Err(KiteError::input(format!(
                    "Parameter `{}` for route {} must be a single value",
                    key, route
                )))
            }
            None => {
                return Err(KiteError::input(format!(
                    "Missing parameter `{}` for route {}",
                    key, route
                )))
            }
        };
        path.push_str(&urlencoding::encode(value));
        rest = &rest[start + len + 1..];
    }
    path.push_str(rest);

    Ok(PreparedRequest {
        route,
        method,
        path,
        params: merged,
    })
}

/// Response as received, before classification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status
    pub status: u16,
    /// Raw `Content-Type` header, if any
    pub content_type: Option<String>,
    /// Body bytes
    pub body: Vec<u8>,
}

/// Transport failure categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFault {
    /// Connection refused or host unreachable
    Unreachable,
    /// Request exceeded the configured timeout
    TimedOut,
    /// The gateway answered with something that is not valid HTTP
    BadResponse,
    /// Anything else
    Other(String),
}

impl TransportFault {
    /// Classify a reqwest error. A timeout wins over a connect failure.
    pub fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportFault::TimedOut
        } else if err.is_connect() {
            TransportFault::Unreachable
        } else if err.is_body() || err.is_decode() || err.is_redirect() || is_malformed_http(err) {
            TransportFault::BadResponse
        } else {
            TransportFault::Other(err.to_string())
        }
    }

    /// Synthetic code callers branch on
    pub fn code(&self) -> u16 {
        match self {
            TransportFault::Unreachable => 503,
            TransportFault::TimedOut => 504,
            TransportFault::BadResponse => 502,
            TransportFault::Other(_) => 500,
        }
    }

    /// Convert into a [`KiteError::Network`]
    pub fn into_error(self) -> KiteError {
        let code = self.code();
        let message = match self {
            TransportFault::Unreachable => "Gateway connection error".to_string(),
            TransportFault::TimedOut => "Gateway timed out".to_string(),
            TransportFault::BadResponse => "Invalid response from gateway".to_string(),
            TransportFault::Other(message) => message,
        };
        KiteError::network(code, message)
    }
}

fn is_malformed_http(err: &reqwest::Error) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(hyper_err) = cause.downcast_ref::<hyper::Error>() {
            return hyper_err.is_parse() || hyper_err.is_incomplete_message();
        }
        source = cause.source();
    }
    false
}

fn transport_error(err: reqwest::Error) -> KiteError {
    TransportFault::from_reqwest(&err).into_error()
}

/// Performs the HTTP round trip for prepared requests
#[derive(Debug, Clone)]
pub struct Dispatcher {
    /// HTTP client
    http_client: HttpClient,
    /// Root URL without trailing slash
    root: String,
    /// Trace requests and responses
    debug: bool,
}

impl Dispatcher {
    /// Create a dispatcher from the client configuration
    pub fn new(config: &Config) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(true)
            .redirect(Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| KiteError::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            root: config.root_str().to_string(),
            debug: config.debug,
        })
    }

    /// Absolute URL of a prepared request, without query string
    pub fn url(&self, request: &PreparedRequest) -> String {
        format!("{}{}", self.root, request.path)
    }

    /// Send the request. POST carries parameters as a form body, every other method as a query string.
    pub async fn send(&self, request: &PreparedRequest) -> Result<RawResponse> {
        let url = self.url(request);
        let pairs = request.params.to_pairs();

        if self.debug {
            debug!(method = %request.method, url = %url, params = ?pairs, "Kite request");
        }

        let builder = self.http_client.request(request.method.into(), &url);
        let builder = if request.method.sends_body() {
            builder.form(&pairs)
        } else {
            builder.query(&pairs)
        };

        let response = builder.send().await.map_err(transport_error)?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let body = response.bytes().await.map_err(transport_error)?.to_vec();

        if self.debug {
            debug!(
                status,
                content_type = content_type.as_deref().unwrap_or("-"),
                body = %String::from_utf8_lossy(&body),
                "Kite response"
            );
        }

        Ok(RawResponse {
            status,
            content_type,
            body,
        })
    }
}
