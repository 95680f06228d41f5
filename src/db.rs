//! Database connectivity probe.
//!
//! Each probe opens a single connection, round-trips a trivial query, and
//! closes it. No pool, no reuse: the point is to answer "could a client
//! connect right now", not to hold resources between requests.

use std::time::Duration;

use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::Connection;

use crate::config::DatabaseConfig;
use crate::error::AppError;
use crate::secret;

/// Probe the configured database.
///
/// Reads the password file, connects, and verifies the connection with a
/// `SELECT 1`. The whole sequence runs under `connect_timeout_seconds` so a
/// black-holed host produces a timely failure instead of a hung probe.
pub async fn probe(config: &DatabaseConfig) -> Result<(), AppError> {
    let password = secret::load_password(&config.password_file)?;

    let options = MySqlConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.user)
        .password(&password);

    let deadline = Duration::from_secs(config.connect_timeout_seconds);
    tokio::time::timeout(deadline, check_connection(options))
        .await
        .map_err(|_| AppError::Timeout(config.connect_timeout_seconds))?
}

async fn check_connection(options: MySqlConnectOptions) -> Result<(), AppError> {
    let mut conn = MySqlConnection::connect_with(&options).await?;

    // A connection that cannot answer a trivial query does not count as healthy.
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&mut conn)
        .await?;

    conn.close().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn unreachable_config(password_file: std::path::PathBuf) -> DatabaseConfig {
        DatabaseConfig {
            host: "127.0.0.1".to_string(),
            // Port 1 is never a MySQL server; connect fails immediately.
            port: 1,
            database: "app".to_string(),
            user: "probe".to_string(),
            password_file,
            connect_timeout_seconds: 2,
        }
    }

    #[tokio::test]
    async fn unreachable_host_fails_with_connection_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "s3cret").unwrap();

        let config = unreachable_config(file.path().to_path_buf());
        let err = probe(&config).await.unwrap_err();

        assert!(matches!(
            err,
            AppError::Database(_) | AppError::Timeout(_)
        ));
        assert!(!err.to_string().is_empty());
    }

    #[tokio::test]
    async fn missing_password_file_fails_before_connecting() {
        let config = unreachable_config("/nonexistent/db-password".into());
        let err = probe(&config).await.unwrap_err();

        assert!(matches!(err, AppError::Secret(_)));
    }
}
