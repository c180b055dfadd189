//! Account, margin and portfolio types for the Kite API

use crate::api::Params;
use crate::types::serde_util::{opt_string_or_number, vec_string_or_number};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Margin segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    /// Equity segment
    Equity,
    /// Commodity segment
    Commodity,
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Equity => write!(f, "equity"),
            Segment::Commodity => write!(f, "commodity"),
        }
    }
}

/// Answers to a two-factor question set, in the order they were given
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TwoFactorAnswers {
    answers: Vec<(String, String)>,
}

impl TwoFactorAnswers {
    /// Create an empty answer set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the answer for a question id
    pub fn answer(mut self, question_id: impl Into<String>, answer: impl Into<String>) -> Self {
        self.answers.push((question_id.into(), answer.into()));
        self
    }

    /// Number of answers
    pub fn len(&self) -> usize {
        self.answers.len()
    }

    /// Whether no answers were given
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Wire parameters: parallel `question[]` and `answer[]` arrays
    pub fn to_params(&self) -> Params {
        let (questions, answers): (Vec<String>, Vec<String>) = self.answers.iter().cloned().unzip();
        Params::new().with("question[]", questions).with("answer[]", answers)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TwoFactorAnswers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            answers: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Bank account linked to the trading account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankAccount {
    /// Account number
    #[serde(default, with = "opt_string_or_number")]
    pub account: Option<String>,
    /// Bank name
    #[serde(default)]
    pub name: Option<String>,
    /// Branch
    #[serde(default)]
    pub branch: Option<String>,
}

/// User profile from /user/profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// User id
    pub user_id: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
    /// Email
    #[serde(default)]
    pub email: Option<String>,
    /// Phone number
    #[serde(default, with = "opt_string_or_number")]
    pub phone: Option<String>,
    /// PAN
    #[serde(default)]
    pub pan: Option<String>,
    /// Depository participant ids
    #[serde(default, with = "vec_string_or_number")]
    pub dp_ids: Vec<String>,
    /// Linked bank accounts
    #[serde(default)]
    pub bank_accounts: Vec<BankAccount>,
}

/// Funds available for trading
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailableMargin {
    /// Ad hoc margin
    pub adhoc_margin: Decimal,
    /// Collateral value
    pub collateral: Decimal,
    /// Intraday pay-in
    pub intraday_payin: Decimal,
    /// Cash balance
    pub cash: Decimal,
}

/// Funds blocked by positions and orders
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UtilisedMargin {
    /// Segment category, e.g. "EQUITY"
    pub category: Option<String>,
    /// SPAN margin
    pub span: Decimal,
    /// Exposure margin
    pub exposure: Decimal,
    /// Realised mark-to-market
    pub m2m_realised: Decimal,
    /// Unrealised mark-to-market
    pub m2m_unrealised: Decimal,
    /// Turnover
    pub turnover: Decimal,
    /// Option premium
    pub option_premium: Decimal,
    /// Value of holdings sold today
    pub holding_sales: Decimal,
}

/// Margins for one segment from /user/margins/{segment}
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Margins {
    /// Net available margin
    pub net: Decimal,
    /// Available funds
    #[serde(default)]
    pub available: AvailableMargin,
    /// Utilised funds
    #[serde(default)]
    pub utilised: UtilisedMargin,
}

/// Open position from /positions
///
/// Position payloads vary by segment; fields the SDK does not model are kept in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Trading symbol
    pub tradingsymbol: String,
    /// Exchange
    #[serde(default)]
    pub exchange: Option<String>,
    /// Product type
    #[serde(default)]
    pub product: Option<String>,
    /// Net quantity, negative when short
    #[serde(default)]
    pub quantity: i64,
    /// Average price
    #[serde(default)]
    pub average_price: Option<Decimal>,
    /// Last traded price
    #[serde(default)]
    pub last_price: Option<Decimal>,
    /// All remaining fields
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Demat holding from /holdings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holding {
    /// Trading symbol
    pub tradingsymbol: String,
    /// Account id
    #[serde(default)]
    pub account_id: Option<String>,
    /// Product type
    #[serde(default)]
    pub product: Option<String>,
    /// Settled quantity
    #[serde(default)]
    pub quantity: i64,
    /// Quantity awaiting T+1 settlement
    #[serde(default)]
    pub t1_quantity: i64,
    /// Quantity pledged as collateral
    #[serde(default)]
    pub collateral_quantity: i64,
    /// Collateral type
    #[serde(default, rename = "collateraltype")]
    pub collateral_type: Option<String>,
    /// Average buy price
    #[serde(default)]
    pub price: Option<Decimal>,
    /// Last traded price
    #[serde(default)]
    pub last_price: Option<Decimal>,
}

impl Holding {
    /// Settled plus unsettled quantity
    pub fn total_quantity(&self) -> i64 {
        self.quantity + self.t1_quantity
    }
}

/// Unsettled holding from /holdings/t1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct T1Holding {
    /// Trading symbol
    pub tradingsymbol: String,
    /// Account id
    #[serde(default)]
    pub account_id: Option<String>,
    /// Product type
    #[serde(default)]
    pub product: Option<String>,
    /// Quantity
    #[serde(default)]
    pub quantity: i64,
}
