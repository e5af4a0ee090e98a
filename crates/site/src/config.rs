//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PRESSROOM_BASE_URL` - Public URL for the site
//!
//! ## Optional
//! - `PRESSROOM_HOST` - Bind address (default: 127.0.0.1)
//! - `PRESSROOM_PORT` - Listen port (default: 3000)
//! - `PRESSROOM_CONTENT_DIR` - Directory holding `posts.json` (default: crates/site/content)
//! - `PRESSROOM_IDENTITY_URL` - Base URL of the hosted identity/directory service
//! - `PRESSROOM_IDENTITY_PUBLISHABLE_KEY` - Publishable API key for the service
//! - `PRESSROOM_IDENTITY_SERVICE_KEY` - Service-role key for directory access
//!   (falls back to the publishable key)
//! - `PRESSROOM_ADMIN_EMAIL` - Administrator email for the admin gate
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry tracing sample rate (default: 0.0)
//!
//! The identity block is only constructed when both the URL and the
//! publishable key are present. When it is absent, the admin gate degrades
//! to fail-open and signup/login report the service as unconfigured. When
//! `PRESSROOM_ADMIN_EMAIL` is absent, any authenticated user is treated as
//! the administrator.

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

use pressroom_core::Email;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

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

/// Site application configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the site
    pub base_url: String,
    /// Directory holding the posts dataset
    pub content_dir: PathBuf,
    /// Identity/directory service configuration (absent => gate fails open)
    pub identity: Option<IdentityConfig>,
    /// Administrator email (absent => any authenticated user is admin)
    pub admin_email: Option<Email>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Sentry event sample rate
    pub sentry_sample_rate: f32,
    /// Sentry tracing sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Hosted identity + directory service configuration.
///
/// Implements `Debug` manually to redact the service key.
#[derive(Clone)]
pub struct IdentityConfig {
    /// Base URL of the service (auth + directory share it)
    pub url: String,
    /// Publishable API key (safe to expose in browser)
    pub publishable_key: String,
    /// Service-role key authorizing directory reads/mutations
    pub service_key: SecretString,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("url", &self.url)
            .field("publishable_key", &self.publishable_key)
            .field("service_key", &"[REDACTED]")
            .finish()
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if the service key fails validation (placeholder detection, entropy
    /// check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("PRESSROOM_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("PRESSROOM_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PRESSROOM_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PRESSROOM_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("PRESSROOM_BASE_URL")?;
        let content_dir =
            PathBuf::from(get_env_or_default("PRESSROOM_CONTENT_DIR", "crates/site/content"));

        let identity = IdentityConfig::from_env()?;

        let admin_email = match get_optional_env("PRESSROOM_ADMIN_EMAIL") {
            Some(raw) => Some(Email::parse(&raw).map_err(|e| {
                ConfigError::InvalidEnvVar("PRESSROOM_ADMIN_EMAIL".to_string(), e.to_string())
            })?),
            None => None,
        };

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_env_or_default("SENTRY_SAMPLE_RATE", "1.0")
            .parse::<f32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SENTRY_SAMPLE_RATE".to_string(), e.to_string())
            })?;
        let sentry_traces_sample_rate = get_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0")
            .parse::<f32>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SENTRY_TRACES_SAMPLE_RATE".to_string(), e.to_string())
            })?;

        Ok(Self {
            host,
            port,
            base_url,
            content_dir,
            identity,
            admin_email,
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

    /// Whether session cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl IdentityConfig {
    /// Build the identity block when the service is configured.
    ///
    /// Both the URL and the publishable key must be present; otherwise the
    /// block is absent and the admin gate fails open. This is the deliberate
    /// availability-over-strictness branch, not an error path.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let (Some(url), Some(publishable_key)) = (
            get_optional_env("PRESSROOM_IDENTITY_URL"),
            get_optional_env("PRESSROOM_IDENTITY_PUBLISHABLE_KEY"),
        ) else {
            return Ok(None);
        };

        let service_key = match get_optional_env("PRESSROOM_IDENTITY_SERVICE_KEY") {
            Some(raw) => {
                validate_secret_strength(&raw, "PRESSROOM_IDENTITY_SERVICE_KEY")?;
                SecretString::from(raw)
            }
            // The publishable key is an acceptable fallback for development;
            // the directory will only allow what that key can see.
            None => SecretString::from(publishable_key.clone()),
        };

        Ok(Some(Self {
            url: url.trim_end_matches('/').to_string(),
            publishable_key,
            service_key,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
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

    // Check blocklist
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    // Check entropy (real service keys have high entropy)
    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the key issued by the service."
            ),
        ));
    }

    Ok(())
}
