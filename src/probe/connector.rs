//! Connection-attempt seam between the retry loop and the database driver.

use std::fmt;

use async_trait::async_trait;
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};
use thiserror::Error;

use crate::config::DbConfig;

/// A connection-establishment failure.
///
/// The probe does not classify errors: an unreachable host, a database that
/// is not yet accepting connections and rejected credentials are all folded
/// into this one retryable type.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConnectError(String);

impl ConnectError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<sqlx::Error> for ConnectError {
    fn from(err: sqlx::Error) -> Self {
        Self(err.to_string())
    }
}

/// Parameters for opening a database session. Built once at startup and
/// shared read-only by all probes.
#[derive(Clone)]
pub struct ConnectionParameters {
    pub host: String,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl ConnectionParameters {
    /// Unset settings become empty strings; the resulting probe fails
    /// through the normal retry path.
    pub fn from_config(config: &DbConfig) -> Self {
        Self {
            host: config.host.clone().unwrap_or_default(),
            database: config.name.clone().unwrap_or_default(),
            user: config.user.clone().unwrap_or_default(),
            password: config.pass.clone().unwrap_or_default(),
        }
    }
}

// Mask the password so parameters are safe to log
impl fmt::Debug for ConnectionParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParameters")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// A single connection attempt against the backend.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self) -> Result<(), ConnectError>;
}

/// PostgreSQL connector backed by sqlx.
///
/// Each attempt opens one plain connection and closes it as soon as it is
/// established. No pool is involved.
pub struct PgConnector {
    params: ConnectionParameters,
}

impl PgConnector {
    pub fn new(params: ConnectionParameters) -> Self {
        Self { params }
    }

    fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.params.host)
            .database(&self.params.database)
            .username(&self.params.user)
            .password(&self.params.password)
    }
}

#[async_trait]
impl Connector for PgConnector {
    async fn connect(&self) -> Result<(), ConnectError> {
        let conn = PgConnection::connect_with(&self.connect_options()).await?;

        // The connection itself is the health signal; close errors after a
        // successful open do not fail the probe.
        if let Err(e) = conn.close().await {
            tracing::debug!(error = %e, "Error closing probe connection");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let params = ConnectionParameters {
            host: "localhost".to_string(),
            database: "app".to_string(),
            user: "app".to_string(),
            password: "secret123".to_string(),
        };

        let rendered = format!("{:?}", params);
        assert!(!rendered.contains("secret123"));
        assert!(rendered.contains("***"));
        assert!(rendered.contains("localhost"));
    }

    #[test]
    fn test_from_config_defaults_unset_fields_to_empty() {
        let config = DbConfig {
            host: Some("db".to_string()),
            name: None,
            user: Some("app".to_string()),
            pass: None,
        };

        let params = ConnectionParameters::from_config(&config);
        assert_eq!(params.host, "db");
        assert_eq!(params.database, "");
        assert_eq!(params.user, "app");
        assert_eq!(params.password, "");
    }

    #[test]
    fn test_connect_error_from_message() {
        let err = ConnectError::new("connection refused");
        assert_eq!(err.to_string(), "connection refused");
    }
}
