//! Database configuration.

use std::env;

/// Connection pool configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub database_url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection acquire timeout in seconds
    pub connection_timeout_secs: u64,

    /// Idle connection timeout in seconds
    pub idle_timeout_secs: u64,

    /// Maximum connection lifetime in seconds
    pub max_lifetime_secs: u64,
}

impl DatabaseConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads `DATABASE_URL` (required) plus `DB_MAX_CONNECTIONS`,
    /// `DB_MIN_CONNECTIONS`, `DB_CONNECTION_TIMEOUT`, `DB_IDLE_TIMEOUT`,
    /// and `DB_MAX_LIFETIME` (all optional, sensible defaults).
    ///
    /// # Panics
    ///
    /// Panics if `DATABASE_URL` is not set or a numeric variable does not
    /// parse.
    pub fn from_env() -> Self {
        fn numeric<T: std::str::FromStr>(key: &str, default: &str) -> T
        where
            T::Err: std::fmt::Debug,
        {
            env::var(key)
                .unwrap_or_else(|_| default.to_string())
                .parse()
                .unwrap_or_else(|e| panic!("{key} must be numeric: {e:?}"))
        }

        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            max_connections: numeric("DB_MAX_CONNECTIONS", "20"),
            min_connections: numeric("DB_MIN_CONNECTIONS", "5"),
            connection_timeout_secs: numeric("DB_CONNECTION_TIMEOUT", "10"),
            idle_timeout_secs: numeric("DB_IDLE_TIMEOUT", "600"),
            max_lifetime_secs: numeric("DB_MAX_LIFETIME", "1800"),
        }
    }

    /// Default configuration for local development.
    pub fn development() -> Self {
        Self {
            database_url: "postgres://postgres@localhost/chess_arbiter".to_string(),
            max_connections: 20,
            min_connections: 5,
            connection_timeout_secs: 10,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::development()
    }
}
