//! Test utilities for database setup.
//!
//! Reuses the authoritative schema initialization so tests never carry their own
//! copy of the DDL.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Result};
use std::path::PathBuf;
use tempfile::TempDir;

use crate::db::{self, DbPool};
use crate::domain::Card;

/// Card store in a temporary directory, removed when dropped.
pub struct TestEnv {
    /// Kept alive for database file persistence
    pub temp: TempDir,
    /// Connection with the full schema applied
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let conn = Connection::open(temp.path().join("cards.db"))?;
        db::run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }

    pub fn db_path(&self) -> PathBuf {
        self.temp.path().join("cards.db")
    }

    /// A second, pooled connection to the same database file.
    pub fn pool(&self) -> Result<DbPool> {
        db::init_db(&self.db_path())
    }

    /// Insert a fresh card due at `next_review`.
    pub fn add_card(&self, owner: Option<&str>, next_review: DateTime<Utc>) -> Result<i64> {
        db::insert_card(&self.conn, &Card::new(owner.map(str::to_string), next_review))
    }

    pub fn all_cards(&self) -> Result<Vec<Card>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, owner, ease_factor, interval_days, repetitions, next_review, last_reviewed_at, version FROM cards",
        )?;
        let cards = stmt
            .query_map([], db::cards::row_to_card)?
            .collect::<Result<Vec<_>>>()?;
        Ok(cards)
    }
}
