//! API client for the Kite REST API

use crate::{
    api::{
        dispatch::{prepare, Dispatcher, Identity, Params},
        response::{classify, resolve},
        routes::{HttpMethod, Route},
        utils::{extract_order_id, null_as_empty},
    },
    config::Config,
    error::{KiteError, Result},
    types::{account::*, api::*, market::*, orders::*},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::info;

/// Kite API client
///
/// Cheap to clone; clones share the access token and the session hook.
#[derive(Clone)]
pub struct KiteClient {
    /// HTTP dispatcher
    dispatcher: Dispatcher,
    /// Immutable configuration
    config: Arc<Config>,
    /// Access token, written on login and read by every call
    token: Arc<RwLock<Option<String>>>,
    /// Callback for rejected sessions
    session_hook: Arc<RwLock<Option<SessionHook>>>,
}

impl fmt::Debug for KiteClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KiteClient")
            .field("root", &self.config.root_str())
            .field("user_id", &self.config.user_id)
            .field("has_token", &self.token().is_some())
            .field("has_session_hook", &self.has_session_hook())
            .finish()
    }
}

impl KiteClient {
    /// Create a new API client
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use kite_rust_sdk::{Config, KiteClient};
    ///
    /// # fn main() -> kite_rust_sdk::Result<()> {
    /// let config = Config::new("DM0002")
    ///     .with_root("https://kite.example.com")?
    ///     .with_timeout(10);
    /// let client = KiteClient::new(config)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: Config) -> Result<Self> {
        let dispatcher = Dispatcher::new(&config)?;
        let token = config.token.clone();

        info!("Kite client ready for {} at {}", config.user_id, config.root_str());

        Ok(Self {
            dispatcher,
            config: Arc::new(config),
            token: Arc::new(RwLock::new(token)),
            session_hook: Arc::new(RwLock::new(None)),
        })
    }

    /// Configuration the client was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// User id sent with every request
    pub fn user_id(&self) -> &str {
        &self.config.user_id
    }

    /// Current access token
    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Set the access token received after a successful login.
    ///
    /// Every later request carries it. Save it somewhere and pass it back through
    /// [`Config::with_token`] to resume the session in a new client.
    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    /// Forget the access token
    pub fn clear_token(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Register the callback run when the gateway rejects the session (HTTP 403).
    ///
    /// Replaces any previous hook. The hook runs synchronously on the calling task and the
    /// interrupted call returns [`Outcome::SessionExpired`]. It may call [`KiteClient::set_token`]
    /// or re-register itself, but must not issue requests through the interrupted call.
    pub fn set_session_hook<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.session_hook.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(hook));
    }

    /// Remove the session hook; 403 errors are then returned like any other error
    pub fn clear_session_hook(&self) {
        *self.session_hook.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Whether a session hook is registered
    pub fn has_session_hook(&self) -> bool {
        self.session_hook.read().unwrap_or_else(PoisonError::into_inner).is_some()
    }

    /// Snapshot of the caller identity used for the next request
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.config.user_id.clone(),
            token: self.token(),
        }
    }

    /// Call any route and get the raw payload back.
    ///
    /// Every catalog method goes through here: build the request, send it, classify the
    /// response, map errors, and run the session hook on a rejected session.
    pub async fn request(&self, route: Route, method: HttpMethod, params: Params) -> Result<Outcome<Payload>> {
        let prepared = prepare(route, method, &params, &self.identity())?;
        let raw = self.dispatcher.send(&prepared).await?;
        let classified = classify(raw)?;

        // Cloned out so the lock is not held while the hook runs
        let hook = self.session_hook.read().unwrap_or_else(PoisonError::into_inner).clone();
        resolve(classified, hook.as_ref())
    }

    async fn get(&self, route: Route, params: Params) -> Result<Outcome<Payload>> {
        self.request(route, HttpMethod::Get, params).await
    }

    async fn post(&self, route: Route, params: Params) -> Result<Outcome<Payload>> {
        self.request(route, HttpMethod::Post, params).await
    }

    async fn put(&self, route: Route, params: Params) -> Result<Outcome<Payload>> {
        self.request(route, HttpMethod::Put, params).await
    }

    async fn delete(&self, route: Route, params: Params) -> Result<Outcome<Payload>> {
        self.request(route, HttpMethod::Delete, params).await
    }

    fn decode<T: DeserializeOwned>(outcome: Outcome<Payload>) -> Result<Outcome<T>> {
        outcome.try_map(Payload::decode)
    }

    fn decode_list<T: DeserializeOwned>(outcome: Outcome<Payload>) -> Result<Outcome<Vec<T>>> {
        outcome.try_map(|payload| Payload::Json(null_as_empty(payload.into_json()?)).decode())
    }

    fn json(outcome: Outcome<Payload>) -> Result<Outcome<Value>> {
        outcome.try_map(Payload::into_json)
    }

    fn order_id(outcome: Outcome<Payload>) -> Result<Outcome<String>> {
        outcome.try_map(|payload| extract_order_id(payload.into_json()?))
    }

    // === Authentication ===

    /// Authenticate the user's credentials.
    ///
    /// Returns the login data, which may include two-factor questions, or a challenge image.
    /// A failed login is a [`KiteError::User`].
    pub async fn login(&self, password: &str, ip: &str) -> Result<Outcome<Payload>> {
        let params = Params::new().with("password", password).with("ip", ip);
        self.post(Route::Login, params).await
    }

    /// Answer the two-factor questions returned by [`KiteClient::login`] and complete the login.
    ///
    /// Wrong answers are a [`KiteError::TwoFactor`] carrying the questions again; too many
    /// failures block the account with a [`KiteError::User`].
    pub async fn do_2fa(&self, answers: &TwoFactorAnswers) -> Result<Outcome<Payload>> {
        self.post(Route::TwoFactor, answers.to_params()).await
    }

    /// Set the user's choice of two-factor questions and answers
    pub async fn update_2fa(&self, answers: &TwoFactorAnswers) -> Result<Outcome<Value>> {
        Self::json(self.put(Route::TwoFactor, answers.to_params()).await?)
    }

    /// Reset the two-factor question set so a fresh one is asked at the next login
    ///
    /// # Arguments
    ///
    /// * `email` - Account email
    /// * `identification` - Required form of identification, e.g. PAN
    pub async fn reset_2fa(&self, email: &str, identification: &str) -> Result<Outcome<Value>> {
        let params = Params::new().with("email", email).with("identification", identification);
        Self::json(self.delete(Route::TwoFactor, params).await?)
    }

    /// Session hash for non-login flows such as payment gateway authentication
    pub async fn session_hash(&self) -> Result<Outcome<Value>> {
        Self::json(self.get(Route::SessionHash, Params::new()).await?)
    }

    /// Log out, invalidating the token on the server
    pub async fn logout(&self) -> Result<Outcome<Value>> {
        Self::json(self.post(Route::Logout, Params::new()).await?)
    }

    // === User ===

    /// Fetch the user's profile
    pub async fn profile(&self) -> Result<Outcome<Profile>> {
        Self::decode(self.get(Route::Profile, Params::new()).await?)
    }

    /// Change the login password
    pub async fn password_update(&self, old_password: &str, new_password: &str) -> Result<Outcome<Value>> {
        let params = Params::new()
            .with("old_password", old_password)
            .with("new_password", new_password);
        Self::json(self.put(Route::Password, params).await?)
    }

    /// Change the transaction password
    pub async fn transpassword_update(&self, old_password: &str, new_password: &str) -> Result<Outcome<Value>> {
        let params = Params::new()
            .with("old_password", old_password)
            .with("new_password", new_password);
        Self::json(self.put(Route::TransPassword, params).await?)
    }

    /// Check the transaction password
    pub async fn transpassword_check(&self, password: &str) -> Result<Outcome<Value>> {
        let params = Params::new().with("password", password);
        Self::json(self.post(Route::TransPassword, params).await?)
    }

    /// Reset the primary password
    pub async fn reset_password(&self, email: &str, identification: &str) -> Result<Outcome<Value>> {
        let params = Params::new().with("email", email).with("identification", identification);
        Self::json(self.delete(Route::Password, params).await?)
    }

    /// Account balance and cash margin for a segment
    pub async fn margins(&self, segment: Segment) -> Result<Outcome<Margins>> {
        let params = Params::new().with("segment", segment.to_string());
        Self::decode(self.get(Route::Margins, params).await?)
    }

    // === Orders ===

    /// Status history of a single order, oldest first
    pub async fn order_info(&self, order_id: &str) -> Result<Outcome<Vec<Order>>> {
        let params = Params::new().with("order_id", order_id);
        Self::decode_list(self.get(Route::OrderInfo, params).await?)
    }

    /// Place an order and return its order id
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use kite_rust_sdk::{Exchange, KiteClient, OrderParams, OrderType, Product, TransactionType};
    /// use rust_decimal::Decimal;
    ///
    /// # async fn run(client: KiteClient) -> kite_rust_sdk::Result<()> {
    /// let order = OrderParams::new(
    ///     Exchange::Nse,
    ///     "RELIANCE",
    ///     TransactionType::Buy,
    ///     OrderType::Limit,
    ///     1,
    ///     Decimal::from(950),
    ///     Product::Cnc,
    /// );
    /// if let Some(order_id) = client.order_place(&order).await?.completed() {
    ///     println!("placed {}", order_id);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn order_place(&self, order: &OrderParams) -> Result<Outcome<String>> {
        Self::order_id(self.post(Route::Orders, order.to_params()).await?)
    }

    /// Modify an open order and return its order id
    pub async fn order_modify(&self, order_id: &str, order: &OrderParams) -> Result<Outcome<String>> {
        let params = order.to_params().with("order_id", order_id);
        Self::order_id(self.put(Route::OrderModify, params).await?)
    }

    /// Cancel an open order and return its order id
    pub async fn order_cancel(&self, order_id: &str) -> Result<Outcome<String>> {
        let params = Params::new().with("order_id", order_id);
        Self::order_id(self.delete(Route::OrderCancel, params).await?)
    }

    /// Place an after-market order and return its order id
    pub async fn amo_place(&self, order: &OrderParams) -> Result<Outcome<String>> {
        Self::order_id(self.post(Route::AmoPlace, order.to_params()).await?)
    }

    /// Modify an after-market order and return its order id
    pub async fn amo_modify(&self, order_id: &str, order: &OrderParams) -> Result<Outcome<String>> {
        let params = order.to_params().with("order_id", order_id);
        Self::order_id(self.put(Route::AmoModify, params).await?)
    }

    /// Cancel an after-market order and return its order id
    pub async fn amo_cancel(&self, order_id: &str) -> Result<Outcome<String>> {
        let params = Params::new().with("order_id", order_id);
        Self::order_id(self.delete(Route::AmoCancel, params).await?)
    }

    /// Order book
    pub async fn orders(&self) -> Result<Outcome<Vec<Order>>> {
        Self::decode_list(self.get(Route::Orders, Params::new()).await?)
    }

    /// Trade book
    pub async fn trades(&self) -> Result<Outcome<Vec<Trade>>> {
        Self::decode_list(self.get(Route::Trades, Params::new()).await?)
    }

    // === Portfolio ===

    /// Open positions
    pub async fn positions(&self) -> Result<Outcome<Vec<Position>>> {
        Self::decode_list(self.get(Route::Positions, Params::new()).await?)
    }

    /// Demat holdings
    pub async fn holdings(&self) -> Result<Outcome<Vec<Holding>>> {
        Self::decode_list(self.get(Route::Holdings, Params::new()).await?)
    }

    /// Holdings awaiting T+1 settlement
    pub async fn holdings_t1(&self) -> Result<Outcome<Vec<T1Holding>>> {
        Self::decode_list(self.get(Route::HoldingsT1, Params::new()).await?)
    }

    /// Convert a position from one product type to another
    pub async fn product_modify(
        &self,
        exchange: Exchange,
        tradingsymbol: &str,
        transaction_type: TransactionType,
        quantity: u32,
        old_product: Product,
        new_product: Product,
    ) -> Result<Outcome<Value>> {
        let params = Params::new()
            .with("exchange", exchange.as_str())
            .with("tradingsymbol", tradingsymbol)
            .with("transaction_type", transaction_type.to_string())
            .with("quantity", quantity)
            .with("old_product", old_product.to_string())
            .with("new_product", new_product.to_string());
        Self::json(self.put(Route::ProductModify, params).await?)
    }

    // === Market ===

    /// Instruments on an exchange, optionally filtered by a substring of the symbol.
    ///
    /// An empty `search` is treated as no search. Without one the gateway returns every instrument in the segment, which can be
    /// very large.
    pub async fn scrips(&self, exchange: Exchange, search: Option<&str>) -> Result<Outcome<Vec<Scrip>>> {
        let mut params = Params::new().with("exchange", exchange.as_str());
        if let Some(search) = search.filter(|search| !search.is_empty()) {
            params.insert("search", search);
        }
        Self::decode_list(self.get(Route::Scrips, params).await?)
    }

    /// Quote and market depth for an instrument
    pub async fn quote(&self, exchange: Exchange, tradingsymbol: &str) -> Result<Outcome<Quote>> {
        let params = Params::new()
            .with("exchange", exchange.as_str())
            .with("tradingsymbol", tradingsymbol);
        Self::decode(self.get(Route::Quote, params).await?)
    }

    // === Messages ===

    /// Messages posted by the broker's admin desk
    pub async fn messages_admin(&self) -> Result<Outcome<Vec<AdminMessage>>> {
        Self::decode_list(self.get(Route::MessagesAdmin, Params::new()).await?)
    }

    /// Messages posted by the exchanges
    pub async fn messages_exchange(&self) -> Result<Outcome<Vec<ExchangeMessage>>> {
        Self::decode_list(self.get(Route::MessagesExchange, Params::new()).await?)
    }
}

impl TryFrom<Config> for KiteClient {
    type Error = KiteError;

    fn try_from(config: Config) -> Result<Self> {
        KiteClient::new(config)
    }
}
