pub mod cards;
pub mod reviews;
pub mod schema;

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

pub use cards::*;
pub use reviews::*;
pub use schema::run_migrations;

use crate::srs::sm2::LATEST_REVIEW_YEAR;

pub type DbPool = Arc<Mutex<Connection>>;

/// How long a writer waits on a locked database before failing with SQLITE_BUSY
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
    /// Log the error at warn level and return None
    fn log_warn(self, context: &str) -> Option<T>;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
    fn log_warn(self, context: &str) -> Option<T> {
        match self {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("{}: {}", context, e);
                None
            }
        }
    }
}

/// Error returned when database lock cannot be acquired
#[derive(Debug)]
pub struct DbLockError;

impl std::fmt::Display for DbLockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Database unavailable")
    }
}

impl std::error::Error for DbLockError {}

/// Try to acquire the database lock, returning an error if poisoned
pub fn try_lock(pool: &DbPool) -> std::result::Result<MutexGuard<'_, Connection>, DbLockError> {
    pool.lock().map_err(|_: PoisonError<_>| {
        tracing::error!("Database mutex poisoned - a thread panicked while holding the lock");
        DbLockError
    })
}

pub fn init_db(path: &Path) -> Result<DbPool> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).log_warn("Could not create database directory");
    }

    // Create backup before migrations if database exists
    if path.exists() {
        let backup_path = path.with_extension("db.backup");
        std::fs::copy(path, &backup_path).log_warn("Could not create database backup");
    }

    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    run_migrations(&conn)?;
    tracing::debug!("Database ready at {}", path.display());
    Ok(Arc::new(Mutex::new(conn)))
}

/// Fixed-width RFC 3339 form. Every stored timestamp uses it so that string
/// comparison in SQL agrees with chronological order.
///
/// Years outside 0..=9999 would be written with a sign and more digits, which neither
/// sorts nor parses back, so they are rejected.
pub fn format_timestamp(dt: DateTime<Utc>) -> Result<String> {
    if !(0..=LATEST_REVIEW_YEAR).contains(&dt.year()) {
        return Err(rusqlite::Error::ToSqlConversionFailure(
            format!("timestamp {} is outside the storable range", dt).into(),
        ));
    }
    Ok(dt.to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Parse a stored timestamp, reporting the column on failure.
pub(crate) fn parse_timestamp(raw: &str, column: usize) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(column, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone};

    #[test]
    fn test_timestamp_roundtrip() {
        let dt = Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap();
        let raw = format_timestamp(dt).unwrap();
        assert_eq!(raw, "2025-02-03T04:05:06.000000Z");
        assert_eq!(parse_timestamp(&raw, 0).unwrap(), dt);
    }

    #[test]
    fn test_timestamp_strings_sort_chronologically() {
        let base = Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap();
        let earlier = format_timestamp(base).unwrap();
        let later = format_timestamp(base + ChronoDuration::microseconds(1500)).unwrap();
        assert!(earlier < later);
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday", 3).is_err());
    }

    #[test]
    fn test_format_timestamp_rejects_five_digit_years() {
        let last = crate::srs::sm2::latest_review_time();
        assert_eq!(format_timestamp(last).unwrap(), "9999-12-31T23:59:59.000000Z");
        assert!(format_timestamp(last + ChronoDuration::days(1)).is_err());
        assert!(format_timestamp(DateTime::<Utc>::MAX_UTC).is_err());
    }

    #[test]
    fn test_log_warn() {
        let failed: std::result::Result<i64, String> = Err("boom".into());
        assert_eq!(failed.log_warn("context"), None);
        let ok: std::result::Result<i64, String> = Ok(7);
        assert_eq!(ok.log_warn("context"), Some(7));
    }
}
