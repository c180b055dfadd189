//! Utility functions for API operations

use crate::error::{KiteError, Result};
use serde_json::Value;

/// Pull `order_id` out of an order placement/modification/cancellation result
pub fn extract_order_id(data: Value) -> Result<String> {
    match data.get("order_id") {
        Some(Value::String(id)) => Ok(id.clone()),
        Some(Value::Number(id)) => Ok(id.to_string()),
        Some(other) => Err(KiteError::data_format(format!("Invalid order_id in response: {}", other))),
        None => Err(KiteError::data_format("Missing order_id in response")),
    }
}

/// Treat a JSON `null` list as empty
pub fn null_as_empty(data: Value) -> Value {
    if data.is_null() {
        Value::Array(Vec::new())
    } else {
        data
    }
}
