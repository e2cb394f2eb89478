//! Application configuration loaded from environment variables.

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `JWT_SECRET` — bearer token signing secret (default: `"dev-secret"`)
/// - `TOKEN_TTL_SECS` — bearer token lifetime (default: `3600`)
/// - `AUTH_PATTERN` — validation request/reply pattern (default: `"auth.validate"`)
/// - `BILLING_PATTERN` — billing queue pattern (default: `"billing.order_created"`)
/// - `AUTH_TIMEOUT_MS` — guard wait bound for validation replies (default: `5000`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub auth_pattern: String,
    pub billing_pattern: String,
    pub auth_timeout_ms: u64,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: std::env::var("RUST_LOG").unwrap_or(defaults.log_level),
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            token_ttl_secs: std::env::var("TOKEN_TTL_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.token_ttl_secs),
            auth_pattern: std::env::var("AUTH_PATTERN").unwrap_or(defaults.auth_pattern),
            billing_pattern: std::env::var("BILLING_PATTERN").unwrap_or(defaults.billing_pattern),
            auth_timeout_ms: std::env::var("AUTH_TIMEOUT_MS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(defaults.auth_timeout_ms),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            jwt_secret: "dev-secret".to_string(),
            token_ttl_secs: 3600,
            auth_pattern: "auth.validate".to_string(),
            billing_pattern: "billing.order_created".to_string(),
            auth_timeout_ms: 5000,
        }
    }
}
