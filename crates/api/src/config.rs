//! Runtime settings for the proposal API, read once at startup.

use std::str::FromStr;

/// Settings for the proposal API process. Every value can be overridden
/// via environment variables; the defaults target a local builder UI on
/// Vite's dev port.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Origins allowed to call the API from a browser (`CORS_ORIGINS`,
    /// comma separated). The public proposal page and the builder UI both
    /// need to be listed when they are served from different hosts.
    pub cors_origins: Vec<String>,
    pub request_timeout_secs: u64,
    /// How long in-flight saves and submissions get to finish after a
    /// shutdown signal.
    pub shutdown_timeout_secs: u64,
    /// Origin of the client-facing proposal pages. Published templates are
    /// linked as `{public_base_url}/proposals/preview/{slug}`. Stored
    /// without a trailing slash.
    pub public_base_url: String,
}

impl ServerConfig {
    /// Read settings from the environment.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `3000`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    /// | `PUBLIC_BASE_URL`       | `http://localhost:3000` |
    ///
    /// # Panics
    ///
    /// If a numeric variable is set but does not parse.
    pub fn from_env() -> Self {
        let cors_origins = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: parse_env("PORT", 3000),
            cors_origins,
            request_timeout_secs: parse_env("REQUEST_TIMEOUT_SECS", 30),
            shutdown_timeout_secs: parse_env("SHUTDOWN_TIMEOUT_SECS", 30),
            public_base_url: env_or("PUBLIC_BASE_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_string(),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{key} must be a valid {}", std::any::type_name::<T>())),
        Err(_) => default,
    }
}
