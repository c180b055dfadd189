//! Type definitions for the Kite API

pub mod account;
pub mod api;
pub mod market;
pub mod orders;
pub mod serde_util;

// Re-export commonly used types
pub use account::*;
pub use api::*;
pub use market::*;
pub use orders::*;
