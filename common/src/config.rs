//! Application configuration.
//!
//! Loaded once from the process environment at startup. A `.env` file in the
//! working directory may seed the environment; real variables take precedence.

use std::path::Path;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Top-level configuration for a service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Name used in logs and API response metadata.
    pub service_name: String,
    /// Listen address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Relational store settings.
    pub database: DatabaseConfig,
    /// Cache store settings.
    pub cache: CacheConfig,
    /// Upper bound of pooled relational connections.
    pub max_connections: u32,
    /// Pool acquire timeout.
    pub connect_timeout_secs: u64,
    /// Emit logs as JSON lines instead of the human-readable format.
    pub json_logs: bool,
}

/// PostgreSQL connection parameters.
#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    /// Full connection URL; wins over the individual fields when set.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub database: String,
}

/// Redis connection parameters.
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Whether the cache subsystem is consulted at all.
    pub enabled: bool,
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

impl CacheConfig {
    /// Connection URL for the redis client.
    pub fn connection_url(&self) -> String {
        if let Some(url) = &self.url {
            return url.clone();
        }
        match &self.password {
            Some(password) => format!("redis://:{}@{}:{}", password, self.host, self.port),
            None => format!("redis://{}:{}", self.host, self.port),
        }
    }
}

impl AppConfig {
    /// Loads configuration from the process environment.
    pub fn load_with_service(service_name: &str) -> Self {
        Self::from_lookup(service_name, |key| std::env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source.
    pub fn from_lookup<F>(service_name: &str, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let parse_or = |key: &str, default: u64| {
            get(key)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .unwrap_or(default)
        };

        let port = get("PORT")
            .or_else(|| get("SERVER_PORT"))
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let database = DatabaseConfig {
            url: get("DATABASE_URL"),
            host: get("POSTGRES_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: get("POSTGRES_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(5432),
            user: get("POSTGRES_USER").unwrap_or_else(|| "postgres".to_string()),
            password: get("POSTGRES_PASSWORD"),
            database: get("POSTGRES_DB").unwrap_or_else(|| "postgres".to_string()),
        };

        // An explicit switch wins; otherwise the cache follows the deployment mode.
        let cache_enabled = match get("CACHE_ENABLED") {
            Some(flag) => parse_flag(&flag),
            None => get("APP_ENV")
                .map(|env| env.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
        };

        let cache = CacheConfig {
            enabled: cache_enabled,
            url: get("REDIS_URL"),
            host: get("REDIS_HOST").unwrap_or_else(|| "localhost".to_string()),
            port: get("REDIS_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(6379),
            password: get("REDIS_PASSWORD"),
        };

        Self {
            service_name: service_name.to_string(),
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            database,
            cache,
            max_connections: parse_or("DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS as u64) as u32,
            connect_timeout_secs: parse_or("DB_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            json_logs: get("LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        }
    }

    /// Socket address string to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Load `.env` from the working directory (best-effort, no error if missing).
pub fn load_dotenv() {
    load_dotenv_from(Path::new(".env"));
}

fn load_dotenv_from(env_path: &Path) {
    let Ok(content) = std::fs::read_to_string(env_path) else {
        return;
    };
    for (key, value) in parse_dotenv(&content) {
        // Only set if not already set by the environment
        if std::env::var(&key).is_err() {
            std::env::set_var(key, value);
        }
    }
}

fn parse_dotenv(content: &str) -> Vec<(String, String)> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches('"');
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}
