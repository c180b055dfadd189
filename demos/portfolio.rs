//! Portfolio overview example
//!
//! Prints margins, holdings, positions and today's trades.

use kite_rust_sdk::{Config, KiteClient, Segment};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let root = std::env::var("KITE_ROOT").unwrap_or_else(|_| "http://localhost:8000".to_string());
    let token = std::env::var("KITE_TOKEN").unwrap_or_default();

    let config = Config::new("DM0002").with_root(&root)?.with_token(token);
    let client = KiteClient::new(config)?;

    match client.margins(Segment::Equity).await {
        Ok(outcome) => {
            if let Some(margins) = outcome.completed() {
                info!("Net margin: {} (cash {})", margins.net, margins.available.cash);
            }
        }
        Err(e) => error!("Failed to get margins: {}", e),
    }

    if let Some(holdings) = client.holdings().await?.completed() {
        info!("Holdings: {}", holdings.len());
        for holding in holdings.iter().take(10) {
            info!("  - {}: {}", holding.tradingsymbol, holding.total_quantity());
        }
    }

    if let Some(positions) = client.positions().await?.completed() {
        info!("Open positions: {}", positions.len());
    }

    if let Some(trades) = client.trades().await?.completed() {
        for trade in trades {
            info!("  trade {} for order {}", trade.trade_id, trade.order_id);
        }
    }

    Ok(())
}
