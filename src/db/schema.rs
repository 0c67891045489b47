use rusqlite::{Connection, Result};

pub fn run_migrations(conn: &Connection) -> Result<()> {
  // Create tables with COMPLETE schema for new databases
  // Migrations below handle upgrades for existing databases
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS cards (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      owner TEXT,
      ease_factor REAL NOT NULL DEFAULT 2.5 CHECK (ease_factor >= 1.3),
      interval_days INTEGER NOT NULL DEFAULT 0 CHECK (interval_days >= 0),
      repetitions INTEGER NOT NULL DEFAULT 0 CHECK (repetitions >= 0),
      next_review TEXT NOT NULL,
      last_reviewed_at TEXT,
      version INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS review_logs (
      id INTEGER PRIMARY KEY AUTOINCREMENT,
      card_id INTEGER NOT NULL,
      quality INTEGER NOT NULL CHECK (quality BETWEEN 0 AND 5),
      reviewed_at TEXT NOT NULL,
      is_correct INTEGER NOT NULL,
      ease_factor REAL NOT NULL,
      interval_days INTEGER NOT NULL,
      FOREIGN KEY (card_id) REFERENCES cards(id)
    );

    -- Indexes
    CREATE INDEX IF NOT EXISTS idx_cards_next_review ON cards(next_review, id);
    CREATE INDEX IF NOT EXISTS idx_cards_owner ON cards(owner);
    CREATE INDEX IF NOT EXISTS idx_review_logs_card_id ON review_logs(card_id);
    "#,
  )?;

  // ============================================================
  // MIGRATIONS FOR EXISTING DATABASES
  // These are no-ops for new databases (columns already exist)
  // ============================================================

  // Migration: optimistic concurrency token for schedule writes
  add_column_if_missing(conn, "cards", "version", "INTEGER NOT NULL DEFAULT 0")?;
  add_column_if_missing(conn, "cards", "last_reviewed_at", "TEXT")?;

  Ok(())
}

/// Check if a column exists in a table
fn column_exists(conn: &Connection, table: &str, column: &str) -> bool {
  conn
    .prepare(&format!("SELECT {} FROM {} LIMIT 1", column, table))
    .is_ok()
}

/// Add a column if it doesn't already exist
fn add_column_if_missing(conn: &Connection, table: &str, column: &str, column_def: &str) -> Result<()> {
  if !column_exists(conn, table, column) {
    tracing::info!("Migrating {}: adding column {}", table, column);
    conn.execute(
      &format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, column_def),
      [],
    )?;
  }
  Ok(())
}
