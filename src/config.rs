//! Environment-driven configuration.

use std::collections::HashMap;
use std::str::FromStr;

/// Default server host binding.
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_PORT: u16 = 8080;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/tabimport";

/// Default maximum database connections in the pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default Superset base URL for local development.
pub const DEFAULT_SUPERSET_URL: &str = "http://localhost:8088";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub superset: SupersetConfig,
    /// Aliases applied to user-provided site URLs before building file URLs.
    pub site_url_aliases: HashMap<String, String>,
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Visualization-service (Superset) configuration.
#[derive(Debug, Clone)]
pub struct SupersetConfig {
    pub base_url: String,
    /// Long-lived refresh token exchanged for access tokens per request.
    pub refresh_token: String,
    /// Superset database id that datasets are registered against.
    pub database_id: i64,
    /// Schema the destination tables live in.
    pub schema: String,
}

impl Config {
    /// Load configuration from the environment (reads `.env` first when present).
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Self {
            server: ServerConfig {
                host: env_or("TABIMPORT_HOST", DEFAULT_HOST),
                port: env_parse("TABIMPORT_PORT", DEFAULT_PORT),
            },
            database: DatabaseConfig {
                url: env_or("DATABASE_URL", DEFAULT_DATABASE_URL),
                max_connections: env_parse("DATABASE_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS),
            },
            superset: SupersetConfig {
                base_url: env_or("SUPERSET_URL", DEFAULT_SUPERSET_URL),
                refresh_token: env_or("SUPERSET_REFRESH_TOKEN", ""),
                database_id: env_parse("SUPERSET_DATABASE_ID", 1),
                schema: env_or("SUPERSET_SCHEMA", "public"),
            },
            site_url_aliases: parse_aliases(
                &std::env::var("SITE_URL_ALIASES").unwrap_or_default(),
            ),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// `SITE_URL_ALIASES` is a comma-separated list of `from=to` pairs.
fn parse_aliases(raw: &str) -> HashMap<String, String> {
    raw.split(',')
        .filter_map(|pair| {
            let (from, to) = pair.split_once('=')?;
            let (from, to) = (from.trim(), to.trim());
            (!from.is_empty() && !to.is_empty())
                .then(|| (from.to_string(), to.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_aliases_splits_pairs() {
        let aliases = parse_aliases("a=https://x.org, b=https://y.org");
        assert_eq!(aliases.get("a").map(String::as_str), Some("https://x.org"));
        assert_eq!(aliases.get("b").map(String::as_str), Some("https://y.org"));
        assert!(parse_aliases("").is_empty());
        assert!(parse_aliases("novalue").is_empty());
    }
}
