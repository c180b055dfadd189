//! Order-related types for the Kite API

use crate::api::Params;
use crate::error::{KiteError, Result};
use crate::types::serde_util::{self, opt_string_or_number, string_or_number};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Exchange segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Exchange {
    /// National Stock Exchange
    Nse,
    /// Bombay Stock Exchange
    Bse,
    /// NSE futures and options
    Nfo,
    /// BSE futures and options
    Bfo,
    /// Multi Commodity Exchange
    Mcx,
    /// MCX stock exchange
    Mcxsx,
}

impl Exchange {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Exchange::Nse => "NSE",
            Exchange::Bse => "BSE",
            Exchange::Nfo => "NFO",
            Exchange::Bfo => "BFO",
            Exchange::Mcx => "MCX",
            Exchange::Mcxsx => "MCXSX",
        }
    }
}

impl std::fmt::Display for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exchange {
    type Err = KiteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "NSE" => Ok(Exchange::Nse),
            "BSE" => Ok(Exchange::Bse),
            "NFO" => Ok(Exchange::Nfo),
            "BFO" => Ok(Exchange::Bfo),
            "MCX" => Ok(Exchange::Mcx),
            "MCXSX" => Ok(Exchange::Mcxsx),
            _ => Err(KiteError::input(format!("Unknown exchange: {}", s))),
        }
    }
}

/// Transaction type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Buy
    Buy,
    /// Sell
    Sell,
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::Buy => write!(f, "BUY"),
            TransactionType::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    /// Market order
    #[serde(rename = "MARKET")]
    Market,
    /// Limit order
    #[serde(rename = "LIMIT")]
    Limit,
    /// Stop-loss limit order
    #[serde(rename = "SL")]
    StopLoss,
    /// Stop-loss market order
    #[serde(rename = "SL-M")]
    StopLossMarket,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::StopLoss => write!(f, "SL"),
            OrderType::StopLossMarket => write!(f, "SL-M"),
        }
    }
}

/// Product (margin) type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Product {
    /// Cash and carry (delivery)
    Cnc,
    /// Margin intraday squareoff
    Mis,
    /// Normal (carry-forward F&O)
    Nrml,
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Product::Cnc => write!(f, "CNC"),
            Product::Mis => write!(f, "MIS"),
            Product::Nrml => write!(f, "NRML"),
        }
    }
}

/// Order validity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Validity {
    /// Valid for the trading day
    #[default]
    Day,
    /// Immediate or cancel
    Ioc,
    /// Good till cancelled
    Gtc,
    /// Good till date
    Gtd,
}

impl std::fmt::Display for Validity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Validity::Day => write!(f, "DAY"),
            Validity::Ioc => write!(f, "IOC"),
            Validity::Gtc => write!(f, "GTC"),
            Validity::Gtd => write!(f, "GTD"),
        }
    }
}

/// Parameters shared by order and after-market-order placement and modification
#[derive(Debug, Clone, PartialEq)]
pub struct OrderParams {
    /// Exchange
    pub exchange: Exchange,
    /// Full trading symbol, e.g. "NIFTY14DEC8200CE"
    pub tradingsymbol: String,
    /// Buy or sell
    pub transaction_type: TransactionType,
    /// Market, limit or stop-loss
    pub order_type: OrderType,
    /// Quantity
    pub quantity: u32,
    /// Price (0 for market orders)
    pub price: Decimal,
    /// Product type
    pub product: Product,
    /// Validity, DAY unless set
    pub validity: Validity,
    /// Disclosed quantity, 0 or the full quantity
    pub disclosed_quantity: u32,
    /// Trigger price, only meaningful for stop-loss orders
    pub trigger_price: Decimal,
}

impl OrderParams {
    /// Create order parameters with DAY validity and no disclosed quantity or trigger price
    pub fn new(
        exchange: Exchange,
        tradingsymbol: impl Into<String>,
        transaction_type: TransactionType,
        order_type: OrderType,
        quantity: u32,
        price: Decimal,
        product: Product,
    ) -> Self {
        Self {
            exchange,
            tradingsymbol: tradingsymbol.into(),
            transaction_type,
            order_type,
            quantity,
            price,
            product,
            validity: Validity::Day,
            disclosed_quantity: 0,
            trigger_price: Decimal::ZERO,
        }
    }

    /// Set the validity
    pub fn with_validity(mut self, validity: Validity) -> Self {
        self.validity = validity;
        self
    }

    /// Set the disclosed quantity
    pub fn with_disclosed_quantity(mut self, disclosed_quantity: u32) -> Self {
        self.disclosed_quantity = disclosed_quantity;
        self
    }

    /// Set the trigger price
    pub fn with_trigger_price(mut self, trigger_price: Decimal) -> Self {
        self.trigger_price = trigger_price;
        self
    }

    /// Wire parameters
    pub fn to_params(&self) -> Params {
        Params::new()
            .with("exchange", self.exchange.as_str())
            .with("tradingsymbol", self.tradingsymbol.as_str())
            .with("transaction_type", self.transaction_type.to_string())
            .with("quantity", self.quantity)
            .with("price", self.price)
            .with("order_type", self.order_type.to_string())
            .with("trigger_price", self.trigger_price)
            .with("disclosed_quantity", self.disclosed_quantity)
            .with("product", self.product.to_string())
            .with("validity", self.validity.to_string())
    }
}

/// Order book entry, also used for the status history of a single order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// Order id
    #[serde(with = "string_or_number")]
    pub order_id: String,
    /// Exchange-assigned order id, absent until the exchange acknowledges
    #[serde(default, with = "opt_string_or_number")]
    pub exchange_order_id: Option<String>,
    /// Account id
    #[serde(default)]
    pub account_id: Option<String>,
    /// User id
    #[serde(default)]
    pub user_id: Option<String>,
    /// Exchange
    #[serde(default)]
    pub exchange: Option<String>,
    /// Trading symbol
    #[serde(default)]
    pub tradingsymbol: Option<String>,
    /// Underlying symbol
    #[serde(default)]
    pub symbol: Option<String>,
    /// Order status, e.g. "rejected", "cancel pending"
    #[serde(default)]
    pub status: Option<String>,
    /// Reason for the current status
    #[serde(default)]
    pub status_message: Option<String>,
    /// Buy or sell
    #[serde(default)]
    pub transaction_type: Option<String>,
    /// Order type
    #[serde(default)]
    pub order_type: Option<String>,
    /// Product type as sent, including ones [`Product`] does not model (e.g. "BO")
    #[serde(default)]
    pub product: Option<String>,
    /// Validity (reported as `validity` or `duration`)
    #[serde(default, alias = "duration")]
    pub validity: Option<String>,
    /// Ordered quantity
    #[serde(default)]
    pub quantity: i64,
    /// Quantity still pending
    #[serde(default)]
    pub pending_quantity: i64,
    /// Quantity filled
    #[serde(default)]
    pub filled_quantity: i64,
    /// Disclosed quantity
    #[serde(default)]
    pub disclosed_quantity: i64,
    /// Limit price
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Trigger price
    #[serde(default)]
    pub trigger_price: Option<Decimal>,
    /// Average fill price
    #[serde(default)]
    pub average_price: Option<Decimal>,
    /// Placement time as sent by the gateway
    #[serde(default)]
    pub order_timestamp: Option<String>,
    /// Exchange acknowledgement time
    #[serde(default)]
    pub exchange_timestamp: Option<String>,
}

impl Order {
    /// Placement time, if present and well formed
    pub fn placed_at(&self) -> Option<NaiveDateTime> {
        self.order_timestamp.as_deref().and_then(serde_util::parse_timestamp)
    }

    /// Exchange acknowledgement time, if present and well formed
    pub fn exchanged_at(&self) -> Option<NaiveDateTime> {
        self.exchange_timestamp.as_deref().and_then(serde_util::parse_timestamp)
    }
}

/// Trade book entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    /// Trade id
    #[serde(with = "string_or_number")]
    pub trade_id: String,
    /// Order the trade belongs to
    #[serde(with = "string_or_number")]
    pub order_id: String,
    /// Exchange-assigned order id
    #[serde(default, with = "opt_string_or_number")]
    pub exchange_order_id: Option<String>,
    /// Exchange
    #[serde(default)]
    pub exchange: Option<String>,
    /// Trading symbol
    #[serde(default)]
    pub tradingsymbol: Option<String>,
    /// Underlying symbol
    #[serde(default)]
    pub symbol: Option<String>,
    /// Buy or sell
    #[serde(default)]
    pub transaction_type: Option<String>,
    /// Average fill price
    #[serde(default)]
    pub average_price: Option<Decimal>,
    /// Filled quantity
    #[serde(default)]
    pub filled_quantity: i64,
    /// Product type
    #[serde(default)]
    pub product: Option<String>,
    /// Placement time
    #[serde(default)]
    pub order_timestamp: Option<String>,
    /// Exchange fill time
    #[serde(default)]
    pub exchange_timestamp: Option<String>,
}

impl Trade {
    /// Exchange fill time, if present and well formed
    pub fn filled_at(&self) -> Option<NaiveDateTime> {
        self.exchange_timestamp.as_deref().and_then(serde_util::parse_timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ParamValue;

    #[test]
    fn test_order_params_defaults() {
        let params = OrderParams::new(
            Exchange::Nse,
            "RELIANCE",
            TransactionType::Buy,
            OrderType::Limit,
            1,
            Decimal::from(950),
            Product::Cnc,
        )
        .to_params();

        assert_eq!(params.get("exchange"), Some(&ParamValue::from("NSE")));
        assert_eq!(params.get("price"), Some(&ParamValue::from("950")));
        assert_eq!(params.get("validity"), Some(&ParamValue::from("DAY")));
        assert_eq!(params.get("disclosed_quantity"), Some(&ParamValue::from("0")));
        assert_eq!(params.get("trigger_price"), Some(&ParamValue::from("0")));
        assert_eq!(params.len(), 10);
    }

    #[test]
    fn test_order_type_wire_names() {
        assert_eq!(OrderType::StopLossMarket.to_string(), "SL-M");
        let parsed: OrderType = serde_json::from_str(r#""SL-M""#).unwrap();
        assert_eq!(parsed, OrderType::StopLossMarket);
    }

    #[test]
    fn test_exchange_from_str() {
        assert_eq!("nse".parse::<Exchange>().unwrap(), Exchange::Nse);
        assert!(matches!("LSE".parse::<Exchange>(), Err(KiteError::Input { .. })));
    }

    #[test]
    fn test_order_deserialize() {
        let json = r#"{
            "account_id": "DM0002",
            "average_price": 0,
            "disclosed_quantity": 0,
            "duration": "DAY",
            "exchange": "NSE",
            "exchange_order_id": null,
            "exchange_timestamp": null,
            "filled_quantity": 0,
            "order_id": 141119000078269,
            "order_timestamp": "2014-11-19 17:36:47",
            "order_type": "LIMIT",
            "pending_quantity": 0,
            "price": 95000,
            "product": "MIS",
            "quantity": 1,
            "status": "rejected",
            "status_message": "Admin stopped AMO",
            "tradingsymbol": "RELIANCE-EQ",
            "transaction_type": "BUY",
            "user_id": "DM0002"
        }"#;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.order_id, "141119000078269");
        assert_eq!(order.validity.as_deref(), Some("DAY"));
        assert_eq!(order.price, Some(Decimal::from(95000)));
        assert!(order.exchange_order_id.is_none());
        assert!(order.placed_at().is_some());
        assert!(order.exchanged_at().is_none());
    }

    #[test]
    fn test_unmodelled_wire_values_kept_as_sent() {
        let order: Order = serde_json::from_str(
            r#"{"order_id": 1, "product": "BO", "order_type": "SL-L", "transaction_type": "SHORT", "validity": "EOS"}"#,
        )
        .unwrap();
        assert_eq!(order.product.as_deref(), Some("BO"));
        assert_eq!(order.order_type.as_deref(), Some("SL-L"));
        assert_eq!(order.validity.as_deref(), Some("EOS"));

        let trade: Trade =
            serde_json::from_str(r#"{"trade_id": 7, "order_id": 1, "product": "CO", "transaction_type": "SHORT"}"#)
                .unwrap();
        assert_eq!(trade.product.as_deref(), Some("CO"));
        assert_eq!(trade.transaction_type.as_deref(), Some("SHORT"));
    }
}
