use std::path::PathBuf;
use std::str::FromStr;

use gardenkeep_core::booking::Pricing;
use gardenkeep_core::money::{self, Cents};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long background services get to drain after the listener stops.
    pub shutdown_timeout_secs: u64,
    /// Root directory of uploaded media (default: `./media`).
    pub media_dir: PathBuf,
    /// Recipient of admin notifications. Admin mails are skipped when unset.
    pub admin_email: Option<String>,
    pub jwt: JwtConfig,
    pub pricing: PricingConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                  |
    /// |-------------------------|--------------------------|
    /// | `HOST`                  | `0.0.0.0`                |
    /// | `PORT`                  | `3000`                   |
    /// | `CORS_ORIGINS`          | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                     |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                     |
    /// | `MEDIA_DIR`             | `./media`                |
    /// | `ADMIN_EMAIL`           | unset                    |
    ///
    /// # Panics
    ///
    /// Panics on unparseable values so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", 3000),
            cors_origins,
            request_timeout_secs: env_or("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: env_or("SHUTDOWN_TIMEOUT_SECS", 30),
            media_dir: std::env::var("MEDIA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./media")),
            admin_email: std::env::var("ADMIN_EMAIL")
                .ok()
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty()),
            jwt: JwtConfig::from_env(),
            pricing: PricingConfig::from_env(),
        }
    }
}

/// Holiday-let price list. The nightly rate is held in cents.
#[derive(Debug, Clone, PartialEq)]
pub struct PricingConfig {
    pub per_night: Cents,
    pub weekly_discount_percent: i64,
    pub family_discount_percent: i64,
    pub family_code: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            per_night: 5_000,
            weekly_discount_percent: 10,
            family_discount_percent: 50,
            family_code: "FAMILY".into(),
        }
    }
}

impl PricingConfig {
    /// | Env Var                   | Default  |
    /// |---------------------------|----------|
    /// | `PRICE_PER_NIGHT` (EUR)   | `50`     |
    /// | `WEEKLY_DISCOUNT_PERCENT` | `10`     |
    /// | `FAMILY_DISCOUNT_PERCENT` | `50`     |
    /// | `FAMILY_DISCOUNT_CODE`    | `FAMILY` |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            per_night: money::from_euros(env_or(
                "PRICE_PER_NIGHT",
                money::to_euros(defaults.per_night),
            ))
            .unwrap_or_else(|e| panic!("PRICE_PER_NIGHT must be valid: {e}")),
            weekly_discount_percent: env_or(
                "WEEKLY_DISCOUNT_PERCENT",
                defaults.weekly_discount_percent,
            ),
            family_discount_percent: env_or(
                "FAMILY_DISCOUNT_PERCENT",
                defaults.family_discount_percent,
            ),
            family_code: std::env::var("FAMILY_DISCOUNT_CODE").unwrap_or(defaults.family_code),
        }
    }

    pub fn pricing(&self) -> Pricing {
        Pricing {
            per_night: self.per_night,
            weekly_discount_percent: self.weekly_discount_percent,
            family_discount_percent: self.family_discount_percent,
            family_code: self.family_code.clone(),
        }
    }
}

/// Parse `key` from the environment, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> T
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|e| panic!("{key} must be valid: {e}")),
        Err(_) => default,
    }
}
