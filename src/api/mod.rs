//! REST API module: routes, request dispatch, response classification and the client

pub mod client;
pub mod dispatch;
pub mod response;
pub mod routes;
pub mod utils;

pub use client::KiteClient;
pub use dispatch::{prepare, Dispatcher, Identity, ParamValue, Params, PreparedRequest, RawResponse, TransportFault};
pub use response::{classify, resolve, Classified, ErrorPayload};
pub use routes::{HttpMethod, Route};
