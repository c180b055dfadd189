//! Route table: logical operation names and their URL templates

use crate::error::{KiteError, Result};
use std::fmt;

/// HTTP method of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET, parameters in the query string
    Get,
    /// POST, parameters in a form-encoded body
    Post,
    /// PUT, parameters in the query string
    Put,
    /// DELETE, parameters in the query string
    Delete,
}

impl HttpMethod {
    /// Whether parameters travel in the request body rather than the query string
    pub fn sends_body(&self) -> bool {
        matches!(self, HttpMethod::Post)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A named API route
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    TwoFactor,
    Logout,
    Profile,
    Password,
    TransPassword,
    Margins,
    SessionHash,
    Orders,
    Order,
    OrderInfo,
    OrderModify,
    OrderCancel,
    Trades,
    Positions,
    ProductModify,
    Holdings,
    HoldingsT1,
    Scrips,
    Quote,
    AmoPlace,
    AmoModify,
    AmoCancel,
    MessagesAdmin,
    MessagesExchange,
}

impl Route {
    /// Every route, in table order
    pub const ALL: [Route; 25] = [
        Route::Login,
        Route::TwoFactor,
        Route::Logout,
        Route::Profile,
        Route::Password,
        Route::TransPassword,
        Route::Margins,
        Route::SessionHash,
        Route::Orders,
        Route::Order,
        Route::OrderInfo,
        Route::OrderModify,
        Route::OrderCancel,
        Route::Trades,
        Route::Positions,
        Route::ProductModify,
        Route::Holdings,
        Route::HoldingsT1,
        Route::Scrips,
        Route::Quote,
        Route::AmoPlace,
        Route::AmoModify,
        Route::AmoCancel,
        Route::MessagesAdmin,
        Route::MessagesExchange,
    ];

    /// Logical name
    pub const fn name(&self) -> &'static str {
        match self {
            Route::Login => "login",
            Route::TwoFactor => "2fa",
            Route::Logout => "logout",
            Route::Profile => "profile",
            Route::Password => "password",
            Route::TransPassword => "transpassword",
            Route::Margins => "margins",
            Route::SessionHash => "session_hash",
            Route::Orders => "orders",
            Route::Order => "order",
            Route::OrderInfo => "order_info",
            Route::OrderModify => "order_modify",
            Route::OrderCancel => "order_cancel",
            Route::Trades => "trades",
            Route::Positions => "positions",
            Route::ProductModify => "product_modify",
            Route::Holdings => "holdings",
            Route::HoldingsT1 => "holdings_t1",
            Route::Scrips => "scrips",
            Route::Quote => "quote",
            Route::AmoPlace => "amo_place",
            Route::AmoModify => "amo_modify",
            Route::AmoCancel => "amo_cancel",
            Route::MessagesAdmin => "messages_admin",
            Route::MessagesExchange => "messages_exchange",
        }
    }

    /// Path template, placeholders written as `{key}`
    pub const fn template(&self) -> &'static str {
        match self {
            Route::Login => "/user/login",
            Route::TwoFactor => "/user/2fa",
            Route::Logout => "/user/logout",
            Route::Profile => "/user/profile",
            Route::Password => "/user/password",
            Route::TransPassword => "/user/transpassword",
            Route::Margins => "/user/margins/{segment}",
            Route::SessionHash => "/user/session_hash",
            Route::Orders => "/orders",
            Route::Order | Route::OrderInfo | Route::OrderModify | Route::OrderCancel => "/orders/{order_id}",
            Route::Trades => "/trades",
            Route::Positions | Route::ProductModify => "/positions",
            Route::Holdings => "/holdings",
            Route::HoldingsT1 => "/holdings/t1",
            Route::Scrips => "/scrips/{exchange}",
            Route::Quote => "/quote/{exchange}/{tradingsymbol}",
            Route::AmoPlace => "/amo",
            Route::AmoModify | Route::AmoCancel => "/amo/{order_id}",
            Route::MessagesAdmin => "/messages/admin",
            Route::MessagesExchange => "/messages/exchange",
        }
    }

    /// Look a route up by its logical name
    pub fn resolve(name: &str) -> Result<Route> {
        Route::ALL
            .iter()
            .copied()
            .find(|route| route.name() == name)
            .ok_or_else(|| KiteError::config(format!("Unknown route: {}", name)))
    }

    /// Placeholder keys in template order
    pub fn placeholders(&self) -> Vec<&'static str> {
        placeholders(self.template())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Placeholder keys of a template, e.g. `["exchange", "tradingsymbol"]`
pub(crate) fn placeholders(template: &str) -> Vec<&str> {
    let mut keys = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                keys.push(&after[..end]);
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_by_name() {
        for route in Route::ALL {
            assert_eq!(Route::resolve(route.name()).unwrap(), route);
        }
        assert_eq!(Route::resolve("quote").unwrap().template(), "/quote/{exchange}/{tradingsymbol}");
    }

    #[test]
    fn test_unknown_route_is_config_error() {
        let err = Route::resolve("funds").unwrap_err();
        assert!(matches!(err, KiteError::Config(_)));
    }

    #[test]
    fn test_names_are_unique() {
        let mut names: Vec<_> = Route::ALL.iter().map(|r| r.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), Route::ALL.len());
    }

    #[test]
    fn test_placeholders() {
        assert_eq!(Route::Quote.placeholders(), vec!["exchange", "tradingsymbol"]);
        assert_eq!(Route::AmoCancel.placeholders(), vec!["order_id"]);
        assert!(Route::Orders.placeholders().is_empty());
    }

    #[test]
    fn test_only_post_sends_body() {
        assert!(HttpMethod::Post.sends_body());
        assert!(!HttpMethod::Get.sends_body());
        assert!(!HttpMethod::Put.sends_body());
        assert!(!HttpMethod::Delete.sends_body());
    }
}
