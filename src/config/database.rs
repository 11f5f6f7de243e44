//! Database configuration
//!
//! Connection pool settings for PostgreSQL with SQLx.

use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

use super::environment::EnvironmentConfig;

/// Database settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>, max_connections: u32) -> Self {
        Self {
            url: url.into(),
            max_connections,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(3600),
        }
    }

    /// Settings for the configured database, if any
    pub fn from_environment(config: &EnvironmentConfig) -> Option<Self> {
        config
            .database_url
            .as_ref()
            .map(|url| Self::new(url.clone(), config.database_max_connections))
    }

    /// Create a new connection pool
    pub async fn create_pool(&self) -> Result<PgPool, sqlx::Error> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .acquire_timeout(self.connect_timeout)
            .idle_timeout(self.idle_timeout)
            .max_lifetime(self.max_lifetime)
            .connect(&self.url)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_database_without_url() {
        assert!(DatabaseConfig::from_environment(&EnvironmentConfig::default()).is_none());
    }

    #[test]
    fn test_database_from_environment() {
        let config = EnvironmentConfig {
            database_url: Some("postgres://localhost/motors".to_string()),
            database_max_connections: 7,
            ..EnvironmentConfig::default()
        };
        let db = DatabaseConfig::from_environment(&config).unwrap();
        assert_eq!(db.url, "postgres://localhost/motors");
        assert_eq!(db.max_connections, 7);
    }
}
