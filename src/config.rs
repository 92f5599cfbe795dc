use anyhow::{Context, Result};
use serde::Deserialize;
use std::{env, time::Duration};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub security: SecurityConfig,
    pub game: GameConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub frontend_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    /// JSON question file; the builtin bank is used when unset
    pub questions_path: Option<String>,
    pub notification_seconds: u64,
    /// Fixed seed for reproducible grids
    pub grid_seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database = DatabaseConfig {
            url: env::var("DATABASE_URL")
                .context("DATABASE_URL must be set")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a number")?,
        };

        let server = ServerConfig {
            host: env::var("HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
            frontend_dir: env::var("FRONTEND_DIR")
                .unwrap_or_else(|_| "../frontend".to_string()),
        };

        let security = SecurityConfig {
            jwt_secret: env::var("JWT_SECRET")
                .context("JWT_SECRET must be set")?,
        };

        let game = GameConfig {
            questions_path: env::var("QUESTIONS_PATH").ok(),
            notification_seconds: env::var("NOTIFICATION_SECONDS")
                .unwrap_or_else(|_| "3".to_string())
                .parse()
                .unwrap_or(3),
            grid_seed: env::var("GRID_SEED")
                .ok()
                .map(|seed| seed.parse())
                .transpose()
                .context("GRID_SEED must be a number")?,
        };

        Ok(Config {
            database,
            server,
            security,
            game,
        })
    }

    pub fn database_url(&self) -> &str {
        &self.database.url
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.game.notification_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_addr_and_ttl() {
        let config = Config {
            database: DatabaseConfig {
                url: "postgres://localhost/quiz".to_string(),
                max_connections: 5,
            },
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 4000,
                frontend_dir: "../frontend".to_string(),
            },
            security: SecurityConfig {
                jwt_secret: "secret".to_string(),
            },
            game: GameConfig {
                questions_path: None,
                notification_seconds: 3,
                grid_seed: Some(7),
            },
        };

        assert_eq!(config.server_addr(), "127.0.0.1:4000");
        assert_eq!(config.database_url(), "postgres://localhost/quiz");
        assert_eq!(config.notification_ttl(), Duration::from_secs(3));
    }
}
