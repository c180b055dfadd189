//! End-to-end tests against a mock gateway

use axum::{
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Router,
};
use kite_rust_sdk::{
    api::{HttpMethod, Params, Route},
    Config, Exchange, KiteClient, KiteError, OrderParams, OrderType, Outcome, Payload, Product, TransactionType,
    TwoFactorAnswers,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_test::{assert_err, assert_ok};

/// Request as seen by the mock gateway
#[derive(Debug, Clone)]
struct Captured {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    form: Vec<(String, String)>,
}

impl Captured {
    fn query_value(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    fn form_value(&self, key: &str) -> Option<&str> {
        self.form.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

#[derive(Clone)]
struct MockGateway {
    status: StatusCode,
    content_type: String,
    body: Vec<u8>,
    captured: Arc<Mutex<Vec<Captured>>>,
}

impl MockGateway {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            content_type: "application/json; charset=utf-8".to_string(),
            body: body.to_string().into_bytes(),
            captured: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn raw(status: u16, content_type: &str, body: &[u8]) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            content_type: content_type.to_string(),
            body: body.to_vec(),
            captured: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn last(&self) -> Captured {
        self.captured.lock().unwrap().last().cloned().expect("no request reached the gateway")
    }

    fn hits(&self) -> usize {
        self.captured.lock().unwrap().len()
    }
}

fn decode_pairs(raw: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(raw.as_bytes()).into_owned().collect()
}

async fn handle(State(gateway): State<MockGateway>, method: Method, uri: Uri, body: String) -> Response {
    gateway.captured.lock().unwrap().push(Captured {
        method,
        path: uri.path().to_string(),
        query: decode_pairs(uri.query().unwrap_or_default()),
        form: decode_pairs(&body),
    });
    (
        gateway.status,
        [(header::CONTENT_TYPE, gateway.content_type.clone())],
        gateway.body.clone(),
    )
        .into_response()
}

async fn serve(gateway: MockGateway) -> SocketAddr {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let app = Router::new().fallback(handle).with_state(gateway);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn client_for(addr: SocketAddr) -> KiteClient {
    let config = Config::new("DM0002")
        .with_root(&format!("http://{}", addr))
        .unwrap()
        .with_debug(true);
    KiteClient::new(config).unwrap()
}

fn limit_buy() -> OrderParams {
    OrderParams::new(
        Exchange::Nse,
        "RELIANCE",
        TransactionType::Buy,
        OrderType::Limit,
        1,
        Decimal::from(950),
        Product::Cnc,
    )
}

#[tokio::test]
async fn test_order_place_returns_order_id() {
    let gateway = MockGateway::json(200, json!({"status": "ok", "data": {"order_id": "141119000062604"}}));
    let client = client_for(serve(gateway.clone()).await);
    client.set_token("tok-123");

    let outcome = assert_ok!(client.order_place(&limit_buy()).await);
    assert_eq!(outcome, Outcome::Completed("141119000062604".to_string()));

    let request = gateway.last();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/orders");
    assert!(request.query.is_empty());
    assert_eq!(request.form_value("tradingsymbol"), Some("RELIANCE"));
    assert_eq!(request.form_value("transaction_type"), Some("BUY"));
    assert_eq!(request.form_value("validity"), Some("DAY"));
    assert_eq!(request.form_value("user_id"), Some("DM0002"));
    assert_eq!(request.form_value("token"), Some("tok-123"));
}

#[tokio::test]
async fn test_scrips_without_search() {
    let gateway = MockGateway::json(
        200,
        json!({"status": "ok", "data": [{"tradingsymbol": "RELIANCE-EQ", "symbol_code": 2885}]}),
    );
    let client = client_for(serve(gateway.clone()).await);

    let scrips = assert_ok!(client.scrips(Exchange::Nse, None).await).completed().unwrap();
    assert_eq!(scrips.len(), 1);
    assert_eq!(scrips[0].symbol_code.as_deref(), Some("2885"));

    let request = gateway.last();
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.path, "/scrips/NSE");
    assert_eq!(request.query_value("exchange"), Some("NSE"));
    assert_eq!(request.query_value("user_id"), Some("DM0002"));
    assert_eq!(request.query_value("search"), None);
    assert_eq!(request.query_value("token"), None);
}

#[tokio::test]
async fn test_quote_path_is_encoded() {
    let gateway = MockGateway::json(200, json!({"status": "ok", "data": {"last_price": 1234.5}}));
    let client = client_for(serve(gateway.clone()).await);

    let quote = assert_ok!(client.quote(Exchange::Nse, "M&M").await).completed().unwrap();
    assert_eq!(quote.last_price, Decimal::new(12345, 1));
    assert_eq!(gateway.last().path, "/quote/NSE/M%26M");
}

#[tokio::test]
async fn test_two_factor_answers_sent_as_repeated_keys() {
    let gateway = MockGateway::json(200, json!({"status": "ok", "data": {"token": "fresh"}}));
    let client = client_for(serve(gateway.clone()).await);

    let answers: TwoFactorAnswers = [("12", "blue"), ("7", "1984")].into_iter().collect();
    let payload = assert_ok!(client.do_2fa(&answers).await).completed().unwrap();
    assert_eq!(payload, Payload::Json(json!({"token": "fresh"})));

    let request = gateway.last();
    let questions: Vec<&str> = request
        .form
        .iter()
        .filter(|(k, _)| k == "question[]")
        .map(|(_, v)| v.as_str())
        .collect();
    let answers: Vec<&str> = request
        .form
        .iter()
        .filter(|(k, _)| k == "answer[]")
        .map(|(_, v)| v.as_str())
        .collect();
    assert_eq!(questions, vec!["12", "7"]);
    assert_eq!(answers, vec!["blue", "1984"]);
}

#[tokio::test]
async fn test_delete_sends_query_string() {
    let gateway = MockGateway::json(200, json!({"status": "ok", "data": {"order_id": 141119000062604u64}}));
    let client = client_for(serve(gateway.clone()).await);

    let outcome = assert_ok!(client.order_cancel("141119000062604").await);
    assert_eq!(outcome.completed().as_deref(), Some("141119000062604"));

    let request = gateway.last();
    assert_eq!(request.method, Method::DELETE);
    assert_eq!(request.path, "/orders/141119000062604");
    assert_eq!(request.query_value("order_id"), Some("141119000062604"));
}

#[tokio::test]
async fn test_null_list_is_empty() {
    let gateway = MockGateway::json(200, json!({"status": "ok", "data": null}));
    let client = client_for(serve(gateway.clone()).await);

    let positions = assert_ok!(client.positions().await).completed().unwrap();
    assert!(positions.is_empty());
}

#[tokio::test]
async fn test_error_envelope_maps_to_typed_error() {
    let gateway = MockGateway::json(
        400,
        json!({"status": "error", "error_type": "OrderException", "message": "Insufficient funds"}),
    );
    let client = client_for(serve(gateway.clone()).await);

    let err = assert_err!(client.order_place(&limit_buy()).await);
    match err {
        KiteError::Order { code, message } => {
            assert_eq!(code, 400);
            assert_eq!(message, "Insufficient funds");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_session_expiry_runs_hook_once() {
    let gateway = MockGateway::json(
        403,
        json!({"status": "error", "error_type": "UserException", "message": "Session expired"}),
    );
    let client = client_for(serve(gateway.clone()).await);
    client.set_token("stale");

    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let hook_client = client.clone();
    client.set_session_hook(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        hook_client.clear_token();
    });

    let outcome = assert_ok!(client.holdings().await);
    assert!(outcome.is_session_expired());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(gateway.hits(), 1);
    assert!(client.token().is_none());
}

#[tokio::test]
async fn test_session_expiry_without_hook_is_error() {
    let gateway = MockGateway::json(
        403,
        json!({"status": "error", "error_type": "UserException", "message": "Session expired"}),
    );
    let client = client_for(serve(gateway).await);

    let err = assert_err!(client.profile().await);
    assert!(matches!(err, KiteError::User { code: 403, .. }));
}

#[tokio::test]
async fn test_challenge_image_returned_for_error_status() {
    let image = [0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10];
    let gateway = MockGateway::raw(401, "image/jpeg", &image);
    let client = client_for(serve(gateway.clone()).await);

    let payload = assert_ok!(client.login("secret", "10.0.0.1").await).completed().unwrap();
    assert_eq!(payload.as_image(), Some(&image[..]));
    assert_eq!(gateway.last().form_value("password"), Some("secret"));
}

#[tokio::test]
async fn test_html_response_is_data_error() {
    let gateway = MockGateway::raw(502, "text/html", b"<html>Bad Gateway</html>");
    let client = client_for(serve(gateway).await);

    let err = assert_err!(client.trades().await);
    assert!(matches!(err, KiteError::DataFormat { .. }));
}

#[tokio::test]
async fn test_generic_request_by_route_name() {
    let gateway = MockGateway::json(200, json!({"status": "ok", "data": [{"message": "Market closes early"}]}));
    let client = client_for(serve(gateway.clone()).await);

    let route = assert_ok!(Route::resolve("messages_admin"));
    let payload = assert_ok!(client.request(route, HttpMethod::Get, Params::new()).await)
        .completed()
        .unwrap();
    assert_eq!(
        assert_ok!(payload.into_json()),
        json!([{"message": "Market closes early"}])
    );
    assert_eq!(gateway.last().path, "/messages/admin");
}

#[tokio::test]
async fn test_missing_placeholder_never_reaches_gateway() {
    let gateway = MockGateway::json(200, json!({"status": "ok", "data": []}));
    let client = client_for(serve(gateway.clone()).await);

    let err = assert_err!(client.request(Route::Quote, HttpMethod::Get, Params::new().with("exchange", "NSE")).await);
    assert!(matches!(err, KiteError::Input { .. }));
    assert_eq!(gateway.hits(), 0);
}

#[tokio::test]
async fn test_connection_refused_is_503() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(addr);
    let err = assert_err!(client.profile().await);
    assert!(matches!(err, KiteError::Network { code: 503, .. }));
}

#[tokio::test]
async fn test_unanswered_request_times_out_with_504() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let config = Config::new("DM0002")
        .with_root(&format!("http://{}", addr))
        .unwrap()
        .with_timeout(1);
    let client = KiteClient::new(config).unwrap();

    let err = assert_err!(client.profile().await);
    assert!(matches!(err, KiteError::Network { code: 504, .. }));
}

#[tokio::test]
async fn test_unmodelled_product_does_not_fail_order_book() {
    let gateway = MockGateway::json(
        200,
        json!({"status": "ok", "data": [
            {"order_id": 1, "product": "BO", "order_type": "LIMIT", "transaction_type": "BUY"},
            {"order_id": 2, "product": "CNC", "validity": "DAY"}
        ]}),
    );
    let client = client_for(serve(gateway).await);

    let orders = assert_ok!(client.orders().await).completed().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].product.as_deref(), Some("BO"));
    assert_eq!(orders[1].validity.as_deref(), Some("DAY"));
}

#[tokio::test]
async fn test_map_valued_error_message_maps_to_input_error() {
    let gateway = MockGateway::json(
        400,
        json!({"status": "error", "error_type": "InputException", "message": {"price": "invalid"}}),
    );
    let client = client_for(serve(gateway).await);

    let err = assert_err!(client.order_place(&limit_buy()).await);
    assert!(matches!(err, KiteError::Input { code: Some(400), .. }));
    assert!(err.message().contains("price"));
}

#[tokio::test]
async fn test_empty_token_and_search_not_sent() {
    let gateway = MockGateway::json(200, json!({"status": "ok", "data": []}));
    let client = client_for(serve(gateway.clone()).await);
    client.set_token("");

    assert_ok!(client.scrips(Exchange::Bse, Some("")).await);

    let request = gateway.last();
    assert_eq!(request.path, "/scrips/BSE");
    assert_eq!(request.query_value("search"), None);
    assert_eq!(request.query_value("token"), None);
}

#[tokio::test]
async fn test_non_http_reply_is_502() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(b"THIS IS NOT HTTP\r\n\r\n").await;
            let _ = socket.shutdown().await;
        }
    });

    let client = client_for(addr);
    let err = assert_err!(client.profile().await);
    assert!(matches!(err, KiteError::Network { code: 502, .. }), "{err:?}");
    assert_eq!(err.message(), "Invalid response from gateway");
}
