use orientati_core::config::{env_parse, env_string, split_list, ConfigError};

/// Name of the environment that hides internal error details.
const PRODUCTION: &str = "production";

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Upper bound on post-shutdown cleanup in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Deployment environment (default: `development`).
    pub environment: String,
    /// Reported by `/health` (default: `orientati-schools`).
    pub service_name: String,
    /// Prefix every resource route is nested under (default: `/api/v1`).
    pub api_prefix: String,
    /// Sentry DSN. Error reporting is disabled when unset.
    pub sentry_dsn: Option<String>,
    /// Release tag attached to Sentry events.
    pub sentry_release: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
            cors_origins: vec!["http://localhost:5173".into()],
            request_timeout_secs: 30,
            shutdown_timeout_secs: 30,
            environment: "development".into(),
            service_name: "orientati-schools".into(),
            api_prefix: "/api/v1".into(),
            sentry_dsn: None,
            sentry_release: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    /// | `ENVIRONMENT`           | `development`           |
    /// | `SERVICE_NAME`          | `orientati-schools`     |
    /// | `API_PREFIX`            | `/api/v1`               |
    /// | `SENTRY_DSN`            | unset                   |
    /// | `SENTRY_RELEASE`        | crate version           |
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_prefix = env_string("API_PREFIX", &defaults.api_prefix);
        if !api_prefix.starts_with('/') || api_prefix.ends_with('/') {
            return Err(ConfigError::Invalid {
                key: "API_PREFIX",
                expected: "path starting with '/' and not ending with '/'",
                value: api_prefix,
            });
        }

        Ok(Self {
            host: env_string("HOST", &defaults.host),
            port: env_parse("PORT", defaults.port, "u16")?,
            cors_origins: split_list(&env_string("CORS_ORIGINS", "http://localhost:5173")),
            request_timeout_secs: env_parse(
                "REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
                "u64",
            )?,
            shutdown_timeout_secs: env_parse(
                "SHUTDOWN_TIMEOUT_SECS",
                defaults.shutdown_timeout_secs,
                "u64",
            )?,
            environment: env_string("ENVIRONMENT", &defaults.environment),
            service_name: env_string("SERVICE_NAME", &defaults.service_name),
            api_prefix,
            sentry_dsn: env_optional("SENTRY_DSN"),
            sentry_release: env_optional("SENTRY_RELEASE"),
        })
    }

    /// Whether Sentry reporting should be initialised.
    pub fn sentry_enabled(&self) -> bool {
        self.sentry_dsn.is_some()
    }

    /// Production hides internal error messages from response bodies.
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case(PRODUCTION)
    }
}

/// A variable that is unset or blank reads as `None`.
fn env_optional(key: &str) -> Option<String> {
    let value = env_string(key, "");
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
