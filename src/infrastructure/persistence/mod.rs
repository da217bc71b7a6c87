use sqlx::{
    any::{AnyConnectOptions, AnyPoolOptions, AnyRow},
    AnyPool, ConnectOptions, Row,
};
use std::str::FromStr;
use log::LevelFilter;

use crate::domain::errors::DomainError;

mod customers;
pub mod distributed_lock;
mod jobs;
mod workers;

/// Storage format of calendar dates
pub(crate) const DATE_FORMAT: &str = "%Y-%m-%d";
/// Storage format of wall-clock appointment times (no timezone; business-local)
pub(crate) const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub struct Database {
    pub(crate) pool: AnyPool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        // Ensure drivers are installed for AnyPool
        sqlx::any::install_default_drivers();

        let mut connect_options = AnyConnectOptions::from_str(database_url)?;

        connect_options = connect_options
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, std::time::Duration::from_secs(1));

        let pool = AnyPoolOptions::new()
            .max_connections(10)
            .min_connections(1)
            .connect_with(connect_options)
            .await?;

        // Enable optimizations for SQLite
        if database_url.starts_with("sqlite") {
            sqlx::query("PRAGMA journal_mode = WAL")
                .execute(&pool)
                .await?;
            sqlx::query("PRAGMA busy_timeout = 5000")
                .execute(&pool)
                .await?;
            sqlx::query("PRAGMA synchronous = NORMAL")
                .execute(&pool)
                .await?;
            sqlx::query("PRAGMA foreign_keys = ON")
                .execute(&pool)
                .await?;
        }

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("migrations/sqlite").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
        }
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DomainError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                let message = db_err.message();
                if message.contains("UNIQUE") || message.contains("unique") {
                    DomainError::Conflict(format!("Duplicate record: {}", message))
                } else {
                    DomainError::Internal(format!("Database error: {}", message))
                }
            }
            other => DomainError::Internal(format!("Database error: {}", other)),
        }
    }
}

pub(crate) fn parse_stored_date(column: &str, value: &str) -> Result<chrono::NaiveDate, DomainError> {
    let day = value.get(..10).unwrap_or(value);
    chrono::NaiveDate::parse_from_str(day, DATE_FORMAT)
        .map_err(|e| DomainError::Internal(format!("Invalid {} {:?}: {}", column, value, e)))
}

/// Appointment times are written with [`DATE_TIME_FORMAT`] only; the day-range
/// queries compare them as strings, so no other layout is accepted back.
pub(crate) fn parse_stored_date_time(
    column: &str,
    value: &str,
) -> Result<chrono::NaiveDateTime, DomainError> {
    chrono::NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT)
        .map_err(|e| DomainError::Internal(format!("Invalid {} {:?}: {}", column, value, e)))
}

/// Read a nullable text column.
///
/// The Any driver reports SQL NULL as a type mismatch for `Option<String>`,
/// so a failed decode reads as absent.
pub(crate) fn optional_string(row: &AnyRow, column: &str) -> Option<String> {
    row.try_get::<Option<String>, _>(column).ok().flatten()
}
