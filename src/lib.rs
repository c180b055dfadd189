//! # Kite Rust SDK
//! 
//! A Rust client for the Kite brokerage REST API.
//! 
//! ## Features
//! 
//! - **Route Table**: Every endpoint is a named route with a path template
//! - **Request Dispatch**: User id and access token added to every call, path placeholders filled from parameters
//! - **Response Classification**: JSON envelopes and two-factor challenge images, with typed errors per error type
//! - **Session Handling**: Register a hook that runs when the gateway rejects the session
//! - **Type Safety**: Typed orders, positions, holdings, quotes and margins with serde support
//! 
//! ## Quick Start
//! 
//! ```rust,no_run
//! use kite_rust_sdk::{Config, KiteClient, Exchange, Outcome};
//! 
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new("DM0002")              // user id
//!         .with_root("https://kite.example.com")?     // gateway root
//!         .with_token("saved_access_token");          // token from an earlier login
//!     
//!     let client = KiteClient::new(config)?;
//!     client.set_session_hook(|| eprintln!("Session expired, log in again"));
//!     
//!     // Get a quote
//!     match client.quote(Exchange::Nse, "RELIANCE").await? {
//!         Outcome::Completed(quote) => println!("Last price: {}", quote.last_price),
//!         Outcome::SessionExpired => return Ok(()),
//!     }
//!     
//!     // List instruments matching a search
//!     if let Some(scrips) = client.scrips(Exchange::Nse, Some("INFY")).await?.completed() {
//!         println!("Matches: {}", scrips.len());
//!     }
//!     
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod api;
pub mod config;
pub mod error;
pub mod types;

// Re-exports for convenience
pub use api::KiteClient;
pub use config::Config;
pub use error::{ErrorKind, KiteError, Result};
pub use types::*;
