//! Review log persistence

use rusqlite::{params, Connection, Result};

use crate::domain::{Quality, ReviewLog};
#[cfg(feature = "profiling")]
use crate::profiling::EventType;

use super::{format_timestamp, parse_timestamp};

pub fn insert_review_log(conn: &Connection, log: &ReviewLog) -> Result<i64> {
    #[cfg(feature = "profiling")]
    crate::profile_log!(EventType::DbQuery {
        operation: "insert".into(),
        table: "review_logs".into(),
    });

    conn.execute(
        r#"
    INSERT INTO review_logs (card_id, quality, reviewed_at, is_correct, ease_factor, interval_days)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
    "#,
        params![
            log.card_id,
            log.quality.value(),
            format_timestamp(log.reviewed_at)?,
            log.is_correct,
            log.ease_factor,
            log.interval_days,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Review history for a card, oldest first
pub fn get_review_logs(conn: &Connection, card_id: i64) -> Result<Vec<ReviewLog>> {
    #[cfg(feature = "profiling")]
    crate::profile_log!(EventType::DbQuery {
        operation: "select".into(),
        table: "review_logs".into(),
    });

    let mut stmt = conn.prepare(
        r#"
    SELECT id, card_id, quality, reviewed_at, is_correct, ease_factor, interval_days
    FROM review_logs
    WHERE card_id = ?1
    ORDER BY reviewed_at ASC, id ASC
    "#,
    )?;

    let logs = stmt
        .query_map(params![card_id], |row| {
            let quality_raw: i64 = row.get(2)?;
            let reviewed_at_str: String = row.get(3)?;
            let quality = Quality::new(quality_raw).map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    2,
                    rusqlite::types::Type::Integer,
                    Box::new(e),
                )
            })?;
            Ok(ReviewLog {
                id: row.get(0)?,
                card_id: row.get(1)?,
                quality,
                reviewed_at: parse_timestamp(&reviewed_at_str, 3)?,
                is_correct: row.get(4)?,
                ease_factor: row.get(5)?,
                interval_days: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;

    Ok(logs)
}
