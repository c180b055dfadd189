//! Market data and message types for the Kite API

use crate::types::serde_util::{self, opt_string_or_number};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Instrument from /scrips/{exchange}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scrip {
    /// Trading symbol, e.g. "RELINFRA-EQ"
    pub tradingsymbol: String,
    /// Company or contract name
    #[serde(default)]
    pub name: Option<String>,
    /// ISIN
    #[serde(default)]
    pub isin: Option<String>,
    /// Exchange symbol code
    #[serde(default, with = "opt_string_or_number")]
    pub symbol_code: Option<String>,
    /// Lot size
    #[serde(default)]
    pub lot_size: Option<u32>,
}

/// One price level of market depth
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthLevel {
    /// Price
    pub price: Decimal,
    /// Quantity at this price
    #[serde(default)]
    pub quantity: i64,
    /// Number of orders at this price
    #[serde(default)]
    pub orders: i64,
}

/// Market depth, best levels first
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Depth {
    /// Bid side
    #[serde(default)]
    pub buy: Vec<DepthLevel>,
    /// Ask side
    #[serde(default)]
    pub sell: Vec<DepthLevel>,
}

/// Day's open, high, low and previous close
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Ohlc {
    /// Open
    pub open: Decimal,
    /// High
    pub high: Decimal,
    /// Low
    pub low: Decimal,
    /// Close
    pub close: Decimal,
}

/// Quote and market depth from /quote/{exchange}/{tradingsymbol}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    /// Instrument name
    #[serde(default)]
    pub name: Option<String>,
    /// Underlying symbol
    #[serde(default)]
    pub symbol: Option<String>,
    /// Series
    #[serde(default)]
    pub series: Option<String>,
    /// Last traded price
    pub last_price: Decimal,
    /// Last traded quantity
    #[serde(default)]
    pub last_quantity: i64,
    /// Last trade time as sent by the gateway
    #[serde(default)]
    pub last_time: Option<String>,
    /// Absolute change from previous close
    #[serde(default)]
    pub change: Option<Decimal>,
    /// Percentage change from previous close
    #[serde(default)]
    pub change_percent: Option<Decimal>,
    /// Total pending buy quantity
    #[serde(default)]
    pub buys: i64,
    /// Total pending sell quantity
    #[serde(default)]
    pub sells: i64,
    /// Volume traded today
    #[serde(default)]
    pub volume: i64,
    /// Open interest
    #[serde(default)]
    pub open_interest: i64,
    /// OHLC
    #[serde(default)]
    pub ohlc: Ohlc,
    /// Market depth
    #[serde(default)]
    pub depth: Depth,
}

impl Quote {
    /// Last trade time, if present and well formed
    pub fn last_traded_at(&self) -> Option<NaiveDateTime> {
        self.last_time.as_deref().and_then(serde_util::parse_timestamp)
    }

    /// Best bid, if any
    pub fn best_bid(&self) -> Option<&DepthLevel> {
        self.depth.buy.first()
    }

    /// Best ask, if any
    pub fn best_ask(&self) -> Option<&DepthLevel> {
        self.depth.sell.first()
    }
}

/// Broadcast from the broker's admin desk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminMessage {
    /// Message text
    pub message: String,
}

/// Notice published by an exchange
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeMessage {
    /// Exchange the notice came from
    pub exchange: String,
    /// Message text
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_deserialize() {
        let json = r#"{
            "name": "FUTCOM-GOLD",
            "symbol": "GOLD",
            "buys": 722,
            "sells": 751,
            "change": 0.39,
            "change_percent": 106.0,
            "depth": {
                "buy": [{"orders": 1, "price": 26706.0, "quantity": 1}, {"orders": 1, "price": 26705.0, "quantity": 1}],
                "sell": [{"orders": 1, "price": 26713.0, "quantity": 1}]
            },
            "last_price": 26702.0,
            "last_quantity": 1,
            "last_time": "2014-11-19 20:40:55",
            "ohlc": {"close": 26596.0, "high": 26810.0, "low": 26553.0, "open": 26575.0},
            "open_interest": 9066,
            "series": null,
            "volume": 12899
        }"#;
        let quote: Quote = serde_json::from_str(json).unwrap();
        assert_eq!(quote.last_price, Decimal::from(26702));
        assert_eq!(quote.best_bid().unwrap().price, Decimal::from(26706));
        assert_eq!(quote.best_ask().unwrap().price, Decimal::from(26713));
        assert_eq!(quote.ohlc.high, Decimal::from(26810));
        assert!(quote.series.is_none());
        assert!(quote.last_traded_at().is_some());
    }

    #[test]
    fn test_scrip_deserialize() {
        let json = r#"{"isin": "INE036A01016", "lot_size": 1, "name": "RELIANCE INFRASTRUCTU LTD",
                       "symbol_code": 12711, "tradingsymbol": "RELINFRA-BL"}"#;
        let scrip: Scrip = serde_json::from_str(json).unwrap();
        assert_eq!(scrip.symbol_code.as_deref(), Some("12711"));
        assert_eq!(scrip.lot_size, Some(1));
    }
}
