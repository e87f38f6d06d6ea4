use std::{env, fmt::Display, str::FromStr, time::Duration};

use checkout_common::{parse_boolean_flag, Secret, DEFAULT_CURRENCY_CODE};
use checkout_engine::checkout_objects::{PricePolicy, ReconcileOptions};
use log::*;
use rand::{thread_rng, RngCore};
use razorpay_tools::RazorpayConfig;

use crate::errors::ServerError;

const DEFAULT_CHECKOUT_HOST: &str = "127.0.0.1";
const DEFAULT_CHECKOUT_PORT: u16 = 8370;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/checkout_store.db";
const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 10;
const DEFAULT_STORAGE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_PENDING_PAYMENT_TTL_MINS: i64 = 60;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;
const DEFAULT_TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Apply the embedded migrations when the server starts.
    pub run_migrations: bool,
    pub auth: AuthConfig,
    pub razorpay: RazorpayConfig,
    pub reconcile: ReconcileOptions,
    /// How often the expired pending payments are deleted.
    pub pending_sweep_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_CHECKOUT_HOST.to_string(),
            port: DEFAULT_CHECKOUT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            run_migrations: true,
            auth: AuthConfig::default(),
            razorpay: RazorpayConfig::default(),
            reconcile: ReconcileOptions::default(),
            pending_sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("CHECKOUT_HOST").ok().unwrap_or_else(|| DEFAULT_CHECKOUT_HOST.into());
        let port = env_or_default("CHECKOUT_PORT", DEFAULT_CHECKOUT_PORT);
        let database_url = env::var("CHECKOUT_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ CHECKOUT_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let run_migrations = parse_boolean_flag(env::var("CHECKOUT_RUN_MIGRATIONS").ok(), true);
        let auth = AuthConfig::try_from_env().unwrap_or_else(|e| {
            warn!(
                "🪛️ Could not load the authentication configuration from environment variables. {e}. Reverting to the \
                 default configuration."
            );
            AuthConfig::default()
        });
        let razorpay = RazorpayConfig::new_from_env_or_default();
        let reconcile = reconcile_options_from_env();
        let pending_sweep_interval =
            Duration::from_secs(env_or_default("CHECKOUT_PENDING_SWEEP_INTERVAL_SECS", DEFAULT_SWEEP_INTERVAL_SECS));
        Self { host, port, database_url, run_migrations, auth, razorpay, reconcile, pending_sweep_interval }
    }

    /// The secret that the gateway signs payment confirmations with. For Razorpay this is the API key secret.
    pub fn payment_signature_secret(&self) -> Secret<String> {
        self.razorpay.key_secret.clone()
    }
}

fn reconcile_options_from_env() -> ReconcileOptions {
    let gateway_timeout =
        Duration::from_secs(env_or_default("CHECKOUT_GATEWAY_TIMEOUT_SECS", DEFAULT_GATEWAY_TIMEOUT_SECS));
    let storage_timeout =
        Duration::from_secs(env_or_default("CHECKOUT_STORAGE_TIMEOUT_SECS", DEFAULT_STORAGE_TIMEOUT_SECS));
    let pending_payment_ttl = chrono::Duration::minutes(env_or_default(
        "CHECKOUT_PENDING_PAYMENT_TTL_MINS",
        DEFAULT_PENDING_PAYMENT_TTL_MINS,
    ));
    let price_policy = env_or_default("CHECKOUT_PRICE_POLICY", PricePolicy::default());
    let currency = env::var("CHECKOUT_CURRENCY")
        .ok()
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_CURRENCY_CODE.to_string());
    ReconcileOptions { pending_payment_ttl, gateway_timeout, storage_timeout, price_policy, currency }
}

/// Reads and parses `key`, logging and falling back to `default` if it is missing or invalid.
fn env_or_default<T>(key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    T::Err: Display,
{
    match env::var(key) {
        Ok(s) => s.trim().parse::<T>().unwrap_or_else(|e| {
            error!("🪛️ {s} is not a valid value for {key}. {e} Using the default, {default:?}, instead.");
            default
        }),
        Err(_) => {
            debug!("🪛️ {key} is not set. Using the default value of {default:?}.");
            default
        },
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// HS256 key for signing and verifying access tokens.
    pub jwt_secret: Secret<String>,
    pub token_lifetime: chrono::Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        warn!(
            "🚨️🚨️🚨️ The JWT secret has not been set. I'm using a random value for this session. Tokens will not \
             survive a restart. DO NOT operate on production like this. 🚨️🚨️🚨️"
        );
        let mut key = [0u8; 32];
        thread_rng().fill_bytes(&mut key);
        Self {
            jwt_secret: Secret::new(hex::encode(key)),
            token_lifetime: chrono::Duration::hours(DEFAULT_TOKEN_LIFETIME_HOURS),
        }
    }
}

impl AuthConfig {
    pub fn new<S: Into<String>>(secret: S) -> Self {
        Self {
            jwt_secret: Secret::new(secret.into()),
            token_lifetime: chrono::Duration::hours(DEFAULT_TOKEN_LIFETIME_HOURS),
        }
    }

    pub fn try_from_env() -> Result<Self, ServerError> {
        let secret = env::var("CHECKOUT_JWT_SECRET")
            .map_err(|e| ServerError::ConfigurationError(format!("{e} [CHECKOUT_JWT_SECRET]")))?;
        if secret.trim().len() < 32 {
            return Err(ServerError::ConfigurationError(
                "CHECKOUT_JWT_SECRET must be at least 32 characters long".to_string(),
            ));
        }
        let hours = env_or_default("CHECKOUT_TOKEN_LIFETIME_HOURS", DEFAULT_TOKEN_LIFETIME_HOURS);
        Ok(Self { jwt_secret: Secret::new(secret), token_lifetime: chrono::Duration::hours(hours) })
    }
}
