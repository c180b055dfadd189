//! Login with two-factor authentication
//!
//! Logs in, answers the two-factor questions and stores the access token on the client.
//! Answers are read from `KITE_2FA_ANSWERS` as `id=answer,id=answer`.

use kite_rust_sdk::{Config, KiteClient, KiteError, Payload, TwoFactorAnswers};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let root = std::env::var("KITE_ROOT").unwrap_or_else(|_| "http://localhost:8000".to_string());
    let user_id = std::env::var("KITE_USER_ID").unwrap_or_else(|_| "DM0002".to_string());
    let password = std::env::var("KITE_PASSWORD").unwrap_or_default();

    let config = Config::new(user_id).with_root(&root)?.with_debug(true);
    let client = KiteClient::new(config)?;

    // Step 1: password
    let login = match client.login(&password, "127.0.0.1").await {
        Ok(outcome) => outcome.completed(),
        Err(KiteError::User { message, .. }) => {
            error!("Login rejected: {}", message);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    match login {
        Some(Payload::Json(data)) => info!("Login ok, questions: {}", data["questions"]),
        Some(Payload::Image(bytes)) => {
            info!("Gateway sent a {} byte challenge image", bytes.len());
            return Ok(());
        }
        None => return Ok(()),
    }

    // Step 2: two-factor answers
    let answers: TwoFactorAnswers = std::env::var("KITE_2FA_ANSWERS")
        .unwrap_or_default()
        .split(',')
        .filter_map(|pair| pair.split_once('='))
        .collect();

    match client.do_2fa(&answers).await {
        Ok(outcome) => {
            if let Some(Payload::Json(data)) = outcome.completed() {
                if let Some(token) = data["token"].as_str() {
                    client.set_token(token);
                    info!("Logged in, token stored");
                }
            }
        }
        Err(KiteError::TwoFactor { message, questions, .. }) => {
            warn!("Wrong answers ({}), new questions: {}", message, questions);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    if let Some(profile) = client.profile().await?.completed() {
        info!("Welcome {}", profile.name.unwrap_or(profile.user_id));
    }

    Ok(())
}
