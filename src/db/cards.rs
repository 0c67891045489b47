//! Card CRUD and query operations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::domain::{Card, DueQuery};
#[cfg(feature = "profiling")]
use crate::profiling::EventType;
use crate::srs::Sm2Result;

use super::{format_timestamp, parse_timestamp};

const CARD_COLUMNS: &str =
    "id, owner, ease_factor, interval_days, repetitions, next_review, last_reviewed_at, version";

pub fn insert_card(conn: &Connection, card: &Card) -> Result<i64> {
    #[cfg(feature = "profiling")]
    crate::profile_log!(EventType::DbQuery {
        operation: "insert".into(),
        table: "cards".into(),
    });

    conn.execute(
        r#"
    INSERT INTO cards (owner, ease_factor, interval_days, repetitions, next_review,
                       last_reviewed_at, version)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    "#,
        params![
            card.owner,
            card.ease_factor,
            card.interval_days,
            card.repetitions,
            format_timestamp(card.next_review)?,
            card.last_reviewed_at.map(format_timestamp).transpose()?,
            card.version,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_card_by_id(conn: &Connection, id: i64) -> Result<Option<Card>> {
    #[cfg(feature = "profiling")]
    crate::profile_log!(EventType::DbQuery {
        operation: "select".into(),
        table: "cards".into(),
    });

    conn.query_row(
        &format!("SELECT {} FROM cards WHERE id = ?1", CARD_COLUMNS),
        params![id],
        row_to_card,
    )
    .optional()
}

/// Due cards for `query`: `next_review <= now`, owned by the requested learner or shared,
/// most overdue first with id as tiebreak, capped at the query limit.
pub fn get_due_cards(conn: &Connection, query: &DueQuery) -> Result<Vec<Card>> {
    #[cfg(feature = "profiling")]
    crate::profile_log!(EventType::DueSelection {
        owner: query.owner.clone(),
        limit: query.limit(),
    });

    let sql = format!(
        r#"
    SELECT {}
    FROM cards
    WHERE next_review <= ?1
      AND (?2 IS NULL OR owner = ?2 OR owner IS NULL)
    ORDER BY next_review ASC, id ASC
    LIMIT ?3
    "#,
        CARD_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;

    let limit = i64::try_from(query.limit()).unwrap_or(i64::MAX);
    let cards = stmt
        .query_map(
            params![format_timestamp(query.now)?, query.owner(), limit],
            row_to_card,
        )?
        .collect::<Result<Vec<_>>>()?;
    Ok(cards)
}

/// Number of due cards in the owner's scope, without a limit.
pub fn get_due_count(conn: &Connection, now: DateTime<Utc>, owner: Option<&str>) -> Result<i64> {
    #[cfg(feature = "profiling")]
    crate::profile_log!(EventType::DbQuery {
        operation: "count".into(),
        table: "cards".into(),
    });

    conn.query_row(
        r#"
    SELECT COUNT(*) FROM cards
    WHERE next_review <= ?1
      AND (?2 IS NULL OR owner = ?2 OR owner IS NULL)
    "#,
        params![format_timestamp(now)?, owner],
        |row| row.get(0),
    )
}

/// Get the next upcoming review time (only cards not yet due)
pub fn get_next_review_time(
    conn: &Connection,
    now: DateTime<Utc>,
    owner: Option<&str>,
) -> Result<Option<DateTime<Utc>>> {
    #[cfg(feature = "profiling")]
    crate::profile_log!(EventType::DbQuery {
        operation: "select_min".into(),
        table: "cards".into(),
    });

    let result: Option<String> = conn.query_row(
        r#"
    SELECT MIN(next_review) FROM cards
    WHERE next_review > ?1
      AND (?2 IS NULL OR owner = ?2 OR owner IS NULL)
    "#,
        params![format_timestamp(now)?, owner],
        |row| row.get(0),
    )?;

    result.map(|s| parse_timestamp(&s, 0)).transpose()
}

/// Write a grading result if the row still carries `expected_version`.
///
/// Returns false when another writer got there first; the row is left untouched.
pub fn update_card_after_review(
    conn: &Connection,
    card_id: i64,
    expected_version: i64,
    result: &Sm2Result,
    reviewed_at: DateTime<Utc>,
) -> Result<bool> {
    #[cfg(feature = "profiling")]
    crate::profile_log!(EventType::DbQuery {
        operation: "update".into(),
        table: "cards".into(),
    });

    let updated = conn.execute(
        r#"
    UPDATE cards
    SET ease_factor = ?1, interval_days = ?2, repetitions = ?3, next_review = ?4,
        last_reviewed_at = ?5, version = version + 1
    WHERE id = ?6 AND version = ?7
    "#,
        params![
            result.ease_factor,
            result.interval_days,
            result.repetitions,
            format_timestamp(result.next_review)?,
            format_timestamp(reviewed_at)?,
            card_id,
            expected_version,
        ],
    )?;
    Ok(updated == 1)
}

/// Convert a database row to a Card struct
pub(crate) fn row_to_card(row: &rusqlite::Row) -> Result<Card> {
    let next_review_str: String = row.get(5)?;
    let last_reviewed_str: Option<String> = row.get(6)?;

    Ok(Card {
        id: row.get(0)?,
        owner: row.get(1)?,
        ease_factor: row.get(2)?,
        interval_days: row.get(3)?,
        repetitions: row.get(4)?,
        next_review: parse_timestamp(&next_review_str, 5)?,
        last_reviewed_at: last_reviewed_str
            .map(|s| parse_timestamp(&s, 6))
            .transpose()?,
        version: row.get(7)?,
    })
}
