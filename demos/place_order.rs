//! Place, modify and cancel an order
//!
//! Needs `KITE_TOKEN` from an earlier login.

use kite_rust_sdk::{Config, Exchange, KiteClient, OrderParams, OrderType, Product, TransactionType, Validity};
use rust_decimal::Decimal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let root = std::env::var("KITE_ROOT").unwrap_or_else(|_| "http://localhost:8000".to_string());
    let token = std::env::var("KITE_TOKEN").unwrap_or_default();

    let config = Config::new("DM0002").with_root(&root)?.with_token(token);
    let client = KiteClient::new(config)?;
    client.set_session_hook(|| error!("Session expired, log in again"));

    let order = OrderParams::new(
        Exchange::Nse,
        "RELIANCE",
        TransactionType::Buy,
        OrderType::Limit,
        1,
        Decimal::new(95050, 2),
        Product::Cnc,
    );

    let Some(order_id) = client.order_place(&order).await?.completed() else {
        return Ok(());
    };
    info!("Order placed: {}", order_id);

    // Move the limit price and make it immediate-or-cancel
    let modified = OrderParams::new(
        Exchange::Nse,
        "RELIANCE",
        TransactionType::Buy,
        OrderType::Limit,
        1,
        Decimal::new(95100, 2),
        Product::Cnc,
    )
    .with_validity(Validity::Ioc);

    match client.order_modify(&order_id, &modified).await {
        Ok(outcome) => info!("Order modified: {:?}", outcome),
        Err(e) => error!("Modify failed: {}", e),
    }

    if let Some(history) = client.order_info(&order_id).await?.completed() {
        for step in history {
            info!("  {} {} at {:?}", step.order_id, step.status.as_deref().unwrap_or("-"), step.placed_at());
        }
    }

    if let Some(cancelled) = client.order_cancel(&order_id).await?.completed() {
        info!("Order cancelled: {}", cancelled);
    }

    Ok(())
}
