//! API configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TEAKSPICE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `TEAKSPICE_TOKEN_SECRET` - Bearer token signing key (min 32 chars, high entropy)
//!
//! ## Optional
//! - `TEAKSPICE_HOST` - Bind address (default: 127.0.0.1)
//! - `TEAKSPICE_PORT` - Listen port (default: 8080)
//! - `TEAKSPICE_CORS_ORIGIN` - Allowed browser origin (no CORS layer when unset)
//! - `TEAKSPICE_TOKEN_TTL_HOURS` - Bearer token lifetime in hours (default: 24)
//! - `TEAKSPICE_TRUST_PROXY_HEADERS` - Key rate limits on `X-Forwarded-For` /
//!   `X-Real-IP` instead of the peer address (default: false). Only enable
//!   behind a reverse proxy that overwrites these headers.
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` / `SENTRY_TRACES_SAMPLE_RATE` - Sentry sampling (default: 1.0)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use chrono::Duration;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_TOKEN_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// API application configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Browser origin allowed by CORS
    pub cors_origin: Option<String>,
    /// Bearer token settings
    pub token: TokenConfig,
    /// Whether client-supplied forwarding headers identify the client
    pub trust_proxy_headers: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry performance traces sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Bearer token configuration.
///
/// Implements `Debug` manually to redact the signing key.
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC signing key
    pub secret: SecretString,
    /// How long an issued token stays valid
    pub ttl: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("TEAKSPICE_DATABASE_URL")?;
        let host = get_env_or_default("TEAKSPICE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("TEAKSPICE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("TEAKSPICE_PORT", "8080")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("TEAKSPICE_PORT".to_string(), e.to_string()))?;
        let cors_origin = get_optional_env("TEAKSPICE_CORS_ORIGIN");
        let token = TokenConfig::from_env()?;
        let trust_proxy_headers = match get_optional_env("TEAKSPICE_TRUST_PROXY_HEADERS") {
            Some(raw) => parse_bool("TEAKSPICE_TRUST_PROXY_HEADERS", &raw)?,
            None => false,
        };
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            cors_origin,
            token,
            trust_proxy_headers,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl TokenConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = get_validated_secret("TEAKSPICE_TOKEN_SECRET")?;
        validate_secret_length(&secret, "TEAKSPICE_TOKEN_SECRET")?;

        let ttl_hours = match get_optional_env("TEAKSPICE_TOKEN_TTL_HOURS") {
            Some(raw) => parse_ttl_hours(&raw)?,
            None => DEFAULT_TOKEN_TTL_HOURS,
        };

        Ok(Self {
            secret,
            ttl: Duration::hours(ttl_hours),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable. Empty values count as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a token lifetime; must be a positive number of hours.
fn parse_ttl_hours(raw: &str) -> Result<i64, ConfigError> {
    match raw.trim().parse::<i64>() {
        Ok(hours) if (1..=24 * 365).contains(&hours) => Ok(hours),
        Ok(hours) => Err(ConfigError::InvalidEnvVar(
            "TEAKSPICE_TOKEN_TTL_HOURS".to_string(),
            format!("must be between 1 and 8760 hours (got {hours})"),
        )),
        Err(e) => Err(ConfigError::InvalidEnvVar(
            "TEAKSPICE_TOKEN_TTL_HOURS".to_string(),
            e.to_string(),
        )),
    }
}

/// Parse a boolean flag (`true`/`false`, `1`/`0`, `yes`/`no`).
fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected true or false (got {other:?})"),
        )),
    }
}

/// Validate that a signing secret meets minimum length requirements.
fn validate_secret_length(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_TOKEN_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_TOKEN_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}
