//! Environment-driven settings.
//!
//! Loaded once at startup from the process environment (with `.env` support
//! via dotenvy). Configuration problems are fatal and surfaced immediately;
//! they are never retried.

use std::env;
use std::path::Path;
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};
use crate::retry::RetryPolicy;

/// Names of the remote resources the store addresses.
#[derive(Debug, Clone)]
pub struct ResourceNames {
    pub products: String,
    pub orders: String,
    pub customers: String,
    pub config_bot: String,
    pub config_site: String,
}

impl Default for ResourceNames {
    fn default() -> Self {
        Self {
            products: "products".into(),
            orders: "orders".into(),
            customers: "customers_b2b".into(),
            config_bot: "config_bot".into(),
            config_site: "config_site".into(),
        }
    }
}

/// Store-wide settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Target spreadsheet identifier.
    pub spreadsheet_id: String,
    /// Path to the service-account credentials consumed by the host's auth
    /// bootstrap. Only its existence is checked here.
    pub credentials_path: String,
    /// Resource (worksheet) names.
    pub resources: ResourceNames,
    /// TTL for the products resource.
    pub products_ttl: Duration,
    /// TTL for the config resources.
    pub configs_ttl: Duration,
    /// Retry budget for remote calls.
    pub retry: RetryPolicy,
}

impl Settings {
    /// Load settings from the environment.
    ///
    /// Fails fast on a missing spreadsheet id or a credentials path that
    /// does not point at a file.
    pub fn from_env() -> ConfigResult<Self> {
        // Try loading .env file
        let _ = dotenvy::dotenv();

        let spreadsheet_id = env::var("SHEETSTORE_SPREADSHEET_ID")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingSpreadsheetId)?;

        let credentials_path =
            env::var("SHEETSTORE_CREDENTIALS").unwrap_or_else(|_| "./credentials.json".into());
        if !Path::new(&credentials_path).is_file() {
            return Err(ConfigError::MissingCredentials(credentials_path));
        }

        let resources = ResourceNames {
            products: env_or("SHEETSTORE_PRODUCTS_SHEET", "products"),
            orders: env_or("SHEETSTORE_ORDERS_SHEET", "orders"),
            customers: env_or("SHEETSTORE_CUSTOMERS_SHEET", "customers_b2b"),
            config_bot: env_or("SHEETSTORE_CONFIG_BOT_SHEET", "config_bot"),
            config_site: env_or("SHEETSTORE_CONFIG_SITE_SHEET", "config_site"),
        };

        Ok(Self {
            spreadsheet_id,
            credentials_path,
            resources,
            products_ttl: Duration::from_secs(env_secs("SHEETSTORE_PRODUCTS_TTL_SEC", 45)?),
            configs_ttl: Duration::from_secs(env_secs("SHEETSTORE_CONFIGS_TTL_SEC", 45)?),
            retry: RetryPolicy::default(),
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_secs(name: &str, default: u64) -> ConfigResult<u64> {
    match env::var(name) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            name: name.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}
