//! Application configuration.
//!
//! Values resolve with priority: config.toml > environment (.env honoured) > default.

use serde::Deserialize;
use std::path::PathBuf;

use crate::paths;

const CONFIG_FILE: &str = "config.toml";

// ==================== File Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Default, Deserialize)]
struct AppConfig {
    database: Option<DatabaseConfig>,
    server: Option<ServerConfig>,
}

#[derive(Debug, Deserialize)]
struct DatabaseConfig {
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServerConfig {
    addr: Option<String>,
    port: Option<u16>,
}

fn read_config_file() -> AppConfig {
    let Ok(contents) = std::fs::read_to_string(CONFIG_FILE) else {
        return AppConfig::default();
    };
    match toml::from_str::<AppConfig>(&contents) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring malformed {}: {}", CONFIG_FILE, e);
            AppConfig::default()
        }
    }
}

/// Resolved settings for the server binary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_path: PathBuf,
    pub server_addr: String,
    pub server_port: u16,
}

impl Settings {
    /// Load settings from config.toml, the environment and defaults.
    pub fn load() -> Self {
        // Load .env file if present
        let _ = dotenvy::dotenv();
        Self::resolve(read_config_file(), |key| std::env::var(key).ok())
    }

    fn resolve(config: AppConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let database_path = match config.database.and_then(|db| db.path) {
            Some(path) => {
                tracing::info!("Using database from {}: {}", CONFIG_FILE, path);
                PathBuf::from(path)
            }
            None => match env("DATABASE_PATH") {
                Some(path) => {
                    tracing::info!("Using database from DATABASE_PATH env: {}", path);
                    PathBuf::from(path)
                }
                None => PathBuf::from(paths::db_path()),
            },
        };

        let (file_addr, file_port) = config
            .server
            .map(|s| (s.addr, s.port))
            .unwrap_or((None, None));

        let server_addr = file_addr
            .or_else(|| env("HOST"))
            .unwrap_or_else(|| SERVER_ADDR.to_string());
        let server_port = file_port
            .or_else(|| env("PORT").and_then(|p| p.parse().ok()))
            .unwrap_or(SERVER_PORT);

        Self {
            database_path,
            server_addr,
            server_port,
        }
    }

    /// Get the full server bind address
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server_addr, self.server_port)
    }
}

// ==================== Server Defaults ====================

/// Server address to bind to
pub const SERVER_ADDR: &str = "0.0.0.0";

/// Server port
pub const SERVER_PORT: u16 = 3000;

// ==================== Scheduling ====================

/// Due-set size used when a request does not give a limit
pub const DEFAULT_DUE_LIMIT: i64 = 50;

/// Attempts at a grading write before a version conflict is surfaced
pub const GRADE_CONFLICT_RETRIES: u32 = 3;

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(AppConfig::default(), no_env);
        assert_eq!(settings.database_path, PathBuf::from(paths::db_path()));
        assert_eq!(settings.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_config_file_wins_over_env() {
        let config: AppConfig = toml::from_str(
            r#"
            [database]
            path = "/srv/reviews.db"

            [server]
            port = 8080
            "#,
        )
        .unwrap();
        let env = |key: &str| match key {
            "DATABASE_PATH" => Some("/tmp/other.db".to_string()),
            "PORT" => Some("9999".to_string()),
            _ => None,
        };

        let settings = Settings::resolve(config, env);
        assert_eq!(settings.database_path, PathBuf::from("/srv/reviews.db"));
        assert_eq!(settings.server_port, 8080);
        assert_eq!(settings.server_addr, SERVER_ADDR);
    }

    #[test]
    fn test_env_fallback() {
        let env = |key: &str| match key {
            "DATABASE_PATH" => Some("/tmp/env.db".to_string()),
            "HOST" => Some("127.0.0.1".to_string()),
            "PORT" => Some("4100".to_string()),
            _ => None,
        };
        let settings = Settings::resolve(AppConfig::default(), env);
        assert_eq!(settings.database_path, PathBuf::from("/tmp/env.db"));
        assert_eq!(settings.bind_addr(), "127.0.0.1:4100");
    }

    #[test]
    fn test_unparseable_port_uses_default() {
        let env = |key: &str| (key == "PORT").then(|| "not-a-port".to_string());
        let settings = Settings::resolve(AppConfig::default(), env);
        assert_eq!(settings.server_port, SERVER_PORT);
    }
}
