/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `API_CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `API_PRODUCTION`: Enables HSTS and strict defaults (default: false)
/// - `SESSION_JWT_SECRET`: Shared secret for provider session tokens (required)
/// - `SESSION_ISSUER`: Expected issuer claim (default: atrium-idp)
/// - `IDENTITY_API_URL` / `IDENTITY_API_KEY`: Identity provider management
///   API; when unset, role metadata propagation is disabled
/// - `IDENTITY_TIMEOUT_SECONDS`: Per-request provider timeout (default: 10)
/// - `PLATFORM_DOMAIN`: Base domain for subdomain tenant routing; when
///   unset, subdomain and root rewrites are disabled
/// - `RUST_LOG`: Log level (default: info)
///
/// # Example
///
/// ```no_run
/// use atrium_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Session-token configuration
    pub session: SessionConfig,

    /// Identity provider configuration
    pub identity: IdentityConfig,

    /// Tenant host-routing configuration
    pub routing: TenantRoutingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` enables permissive CORS for development
    pub cors_origins: Vec<String>,

    /// Production hardening (HSTS header, strict CORS expectations)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session-token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Shared secret the identity provider signs session tokens with
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Issuer expected in the `iss` claim
    pub issuer: String,
}

/// Identity provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Management API base URL; None disables role propagation
    pub api_url: Option<String>,

    /// Management API key
    pub api_key: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

/// Tenant host-routing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantRoutingConfig {
    /// Platform base domain (e.g. "app.example.com")
    ///
    /// Hosts carrying a subdomain under this domain are rewritten to
    /// tenant-scoped paths. When unset, the subdomain check degrades to
    /// always-false instead of failing requests.
    pub platform_domain: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or
    /// have invalid values.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins = env::var("API_CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let production = env::var("API_PRODUCTION")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let session_secret = env::var("SESSION_JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("SESSION_JWT_SECRET environment variable is required"))?;

        if session_secret.len() < 32 {
            anyhow::bail!("SESSION_JWT_SECRET must be at least 32 characters long");
        }

        let session_issuer =
            env::var("SESSION_ISSUER").unwrap_or_else(|_| "atrium-idp".to_string());

        let identity_api_url = env::var("IDENTITY_API_URL").ok().filter(|s| !s.is_empty());
        let identity_api_key = env::var("IDENTITY_API_KEY").ok().filter(|s| !s.is_empty());
        let identity_timeout = env::var("IDENTITY_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u64>()?;

        let platform_domain = env::var("PLATFORM_DOMAIN").ok().filter(|s| !s.is_empty());

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            session: SessionConfig {
                secret: session_secret,
                issuer: session_issuer,
            },
            identity: IdentityConfig {
                api_url: identity_api_url,
                api_key: identity_api_key,
                timeout_seconds: identity_timeout,
            },
            routing: TenantRoutingConfig { platform_domain },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/atrium_test".to_string(),
                max_connections: 10,
            },
            session: SessionConfig {
                secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                issuer: "atrium-idp".to_string(),
            },
            identity: IdentityConfig {
                api_url: None,
                api_key: None,
                timeout_seconds: 10,
            },
            routing: TenantRoutingConfig {
                platform_domain: Some("app.example.com".to_string()),
            },
        }
    }

    #[test]
    fn test_bind_address() {
        let config = test_config();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_missing_platform_domain_is_allowed() {
        let mut config = test_config();
        config.routing.platform_domain = None;
        assert!(config.routing.platform_domain.is_none());
    }
}
