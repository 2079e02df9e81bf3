//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_FILES_BASE_URL` - Prefix for `public://` image references
//!   (default: `<base_url>/files/`)
//! - `STOREFRONT_FILES_DIR` - Directory served at `/files`
//! - `STOREFRONT_PRODUCT_KIND` - Catalog kind listed as products (default: products)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.1)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::SecretString;
use shopfront_core::ContentKind;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Url,
    /// Absolute prefix that `public://` image references resolve under
    pub files_base_url: Url,
    /// Local directory with product images, served at `/files` when set
    pub files_dir: Option<PathBuf>,
    /// Catalog kind that marks an entry as a product
    pub product_kind: ContentKind,
    /// Sentry error tracking configuration
    pub sentry: SentryConfig,
}

/// Sentry error tracking configuration.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    /// Sentry DSN; Sentry stays disabled when unset
    pub dsn: Option<String>,
    /// Environment name reported with events
    pub environment: Option<String>,
    /// Fraction of errors sent
    pub sample_rate: f32,
    /// Fraction of transactions traced
    pub traces_sample_rate: f32,
}

impl Default for SentryConfig {
    fn default() -> Self {
        Self {
            dsn: None,
            environment: None,
            sample_rate: 1.0,
            traces_sample_rate: 0.1,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let database_url = env
            .get("STOREFRONT_DATABASE_URL")
            .or_else(|| env.get("DATABASE_URL"))
            .map(SecretString::from)
            .ok_or_else(|| ConfigError::MissingEnvVar("STOREFRONT_DATABASE_URL".to_string()))?;
        let host = env.parse_or("STOREFRONT_HOST", "127.0.0.1")?;
        let port = env.parse_or("STOREFRONT_PORT", "3000")?;
        let base_url = parse_url("STOREFRONT_BASE_URL", &env.required("STOREFRONT_BASE_URL")?)?;

        let files_base_url = match env.get("STOREFRONT_FILES_BASE_URL") {
            Some(raw) => parse_url("STOREFRONT_FILES_BASE_URL", &raw)?,
            None => with_trailing_slash(base_url.clone()).join("files/").map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
            })?,
        };
        let files_base_url = with_trailing_slash(files_base_url);

        let files_dir = env.get("STOREFRONT_FILES_DIR").map(PathBuf::from);
        let product_kind = env
            .get("STOREFRONT_PRODUCT_KIND")
            .filter(|kind| !kind.trim().is_empty())
            .map_or_else(ContentKind::default, ContentKind::new);

        let sentry = SentryConfig {
            dsn: env.get("SENTRY_DSN"),
            environment: env.get("SENTRY_ENVIRONMENT"),
            sample_rate: env.rate("SENTRY_SAMPLE_RATE", 1.0)?,
            traces_sample_rate: env.rate("SENTRY_TRACES_SAMPLE_RATE", 0.1)?,
        };

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            files_base_url,
            files_dir,
            product_kind,
            sentry,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.scheme() == "https"
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Variable lookup with typed accessors.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// Get an optional variable; empty values count as unset.
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Parse a variable, using `default` when unset.
    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        self.get(key)
            .as_deref()
            .unwrap_or(default)
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    }

    /// Parse a sampling rate in `[0, 1]`.
    fn rate(&self, key: &str, default: f32) -> Result<f32, ConfigError> {
        let Some(raw) = self.get(key) else {
            return Ok(default);
        };
        let rate = raw
            .parse::<f32>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::InvalidEnvVar(
                key.to_string(),
                format!("must be between 0.0 and 1.0 (got {rate})"),
            ));
        }
        Ok(rate)
    }
}

/// Parse an absolute http(s) URL.
fn parse_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be an absolute http(s) URL".to_string(),
        ));
    }
    Ok(url)
}

/// `Url::join` drops the last path segment unless the base ends with `/`.
fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| map.get(key).cloned())
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("STOREFRONT_DATABASE_URL", "postgres://localhost/shopfront"),
        ("STOREFRONT_BASE_URL", "https://shop.example"),
    ];

    #[test]
    fn test_defaults() {
        let config = load(MINIMAL).unwrap();
        assert_eq!(config.host.to_string(), "127.0.0.1");
        assert_eq!(config.port, 3000);
        assert_eq!(config.product_kind.as_str(), "products");
        assert_eq!(config.files_base_url.as_str(), "https://shop.example/files/");
        assert!(config.files_dir.is_none());
        assert!(config.sentry.dsn.is_none());
        assert!(config.is_secure());
    }

    #[test]
    fn test_missing_database_url() {
        let err = load(&[("STOREFRONT_BASE_URL", "https://shop.example")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "STOREFRONT_DATABASE_URL"));
    }

    #[test]
    fn test_database_url_fallback() {
        let config = load(&[
            ("DATABASE_URL", "postgres://fly/shopfront"),
            ("STOREFRONT_BASE_URL", "http://localhost:3000"),
        ])
        .unwrap();
        assert_eq!(config.database_url.expose_secret(), "postgres://fly/shopfront");
        assert!(!config.is_secure());
    }

    #[test]
    fn test_missing_base_url() {
        let err = load(&[("STOREFRONT_DATABASE_URL", "postgres://localhost/x")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "STOREFRONT_BASE_URL"));
    }

    #[test]
    fn test_relative_base_url_rejected() {
        let err = load(&[
            ("STOREFRONT_DATABASE_URL", "postgres://localhost/x"),
            ("STOREFRONT_BASE_URL", "/shop"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
    }

    #[test]
    fn test_invalid_port() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("STOREFRONT_PORT", "http"));
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::InvalidEnvVar(ref k, _) if k == "STOREFRONT_PORT"
        ));
    }

    #[test]
    fn test_files_base_url_gets_trailing_slash() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("STOREFRONT_FILES_BASE_URL", "https://cdn.example/media"));
        let config = load(&vars).unwrap();
        assert_eq!(config.files_base_url.as_str(), "https://cdn.example/media/");
    }

    #[test]
    fn test_default_files_url_keeps_base_path() {
        for base in ["https://shop.example/store", "https://shop.example/store/"] {
            let config = load(&[
                ("STOREFRONT_DATABASE_URL", "postgres://localhost/shopfront"),
                ("STOREFRONT_BASE_URL", base),
            ])
            .unwrap();
            assert_eq!(
                config.files_base_url.as_str(),
                "https://shop.example/store/files/",
                "{base}"
            );
        }
    }

    #[test]
    fn test_custom_product_kind() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("STOREFRONT_PRODUCT_KIND", "merch"));
        assert_eq!(load(&vars).unwrap().product_kind.as_str(), "merch");
    }

    #[test]
    fn test_sample_rate_out_of_range() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("SENTRY_SAMPLE_RATE", "1.5"));
        assert!(matches!(
            load(&vars).unwrap_err(),
            ConfigError::InvalidEnvVar(ref k, _) if k == "SENTRY_SAMPLE_RATE"
        ));
    }

    #[test]
    fn test_socket_addr() {
        let mut vars = MINIMAL.to_vec();
        vars.push(("STOREFRONT_HOST", "0.0.0.0"));
        vars.push(("STOREFRONT_PORT", "8080"));
        let addr = load(&vars).unwrap().socket_addr();
        assert_eq!(addr.ip().to_string(), "0.0.0.0");
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let mut vars = MINIMAL.to_vec();
        vars[0] = ("STOREFRONT_DATABASE_URL", "postgres://user:hunter2@db/shop");
        let debug_output = format!("{:?}", load(&vars).unwrap());
        assert!(!debug_output.contains("hunter2"));
    }
}
