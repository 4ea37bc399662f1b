//! Typed configuration from environment variables.
//!
//! Loads once at startup. Every setting has a default matching the classic
//! layout (credentials.json, subscriptions.csv, completed.txt in the working
//! directory); malformed values fail fast.

pub mod secrets;

use crate::auth::AuthConfig;
use crate::engine::Throttle;
use crate::error::{Error, Result};
use crate::gateway::youtube::DEFAULT_API_BASE;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials_path: PathBuf,
    pub application_name: String,
    pub input_path: PathBuf,
    pub progress_path: PathBuf,
    pub token_dir: PathBuf,
    pub throttle: Throttle,
    pub api_base_url: String,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            credentials_path: var_or("RESUB_CREDENTIALS", "credentials.json").into(),
            application_name: var_or("RESUB_APP_NAME", "YT-Subscriptions-Migrator"),
            input_path: var_or("RESUB_INPUT", "subscriptions.csv").into(),
            progress_path: var_or("RESUB_PROGRESS", "completed.txt").into(),
            token_dir: var_or("RESUB_TOKEN_DIR", "tokens").into(),
            throttle: throttle_from_env()?,
            api_base_url: var_or("RESUB_API_BASE", DEFAULT_API_BASE),
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: var_or("LOG_LEVEL", "info"),
        })
    }

    /// Settings the authorization collaborator needs.
    pub fn auth(&self) -> AuthConfig {
        AuthConfig {
            credentials_path: self.credentials_path.clone(),
            application_name: self.application_name.clone(),
            token_dir: self.token_dir.clone(),
            api_base_url: self.api_base_url.clone(),
        }
    }
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn throttle_from_env() -> Result<Throttle> {
    match std::env::var("RESUB_THROTTLE_MS") {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(|ms| Throttle::fixed(Duration::from_millis(ms)))
            .map_err(|e| Error::Config(format!("RESUB_THROTTLE_MS={raw:?} is not a number: {e}"))),
        Err(_) => Ok(Throttle::default()),
    }
}
