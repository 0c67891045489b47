//! Review flow on top of the card store.
//!
//! Grading reads the card, runs SM-2 and writes the result back inside one
//! IMMEDIATE transaction. The write is additionally guarded by the card's version so a
//! second process sharing the database file can never apply a grade computed from a
//! stale baseline.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior};
use serde::Serialize;

use crate::config::GRADE_CONFLICT_RETRIES;
use crate::db::{self, DbPool};
use crate::domain::{Card, DueQuery, Quality, ReviewLog};
use crate::error::ScheduleError;
#[cfg(feature = "profiling")]
use crate::profiling::EventType;
use crate::srs::sm2;

/// Overview of a learner's queue
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DueSummary {
    pub now: DateTime<Utc>,
    pub due_count: i64,
    /// Earliest review still in the future, if any
    pub next_review: Option<DateTime<Utc>>,
}

/// Grade `card_id` with `quality` at `now` and persist the new schedule.
pub fn grade_review(
    pool: &DbPool,
    card_id: i64,
    quality: Quality,
    now: DateTime<Utc>,
) -> Result<Card, ScheduleError> {
    let mut conn = db::try_lock(pool)?;
    retry_on_conflict(GRADE_CONFLICT_RETRIES, || {
        grade_once(&mut conn, card_id, quality, now)
    })
}

/// Single read-compute-write attempt.
pub fn grade_once(
    conn: &mut Connection,
    card_id: i64,
    quality: Quality,
    now: DateTime<Utc>,
) -> Result<Card, ScheduleError> {
    #[cfg(feature = "profiling")]
    crate::profile_log!(EventType::Grade {
        card_id,
        quality: quality.value(),
    });

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let card = db::get_card_by_id(&tx, card_id)?.ok_or(ScheduleError::CardNotFound(card_id))?;
    let result = sm2::grade(&card.schedule(), quality, now);

    if !db::update_card_after_review(&tx, card.id, card.version, &result, now)? {
        // Dropping the transaction rolls it back
        return Err(ScheduleError::Conflict(card_id));
    }
    db::insert_review_log(
        &tx,
        &ReviewLog::new(card.id, quality, now, result.ease_factor, result.interval_days),
    )?;
    tx.commit()?;

    tracing::info!(
        card_id,
        quality = quality.value(),
        repetitions = result.repetitions,
        interval_days = result.interval_days,
        ease_factor = result.ease_factor,
        "Graded review"
    );

    Ok(card.with_review(&result, now))
}

/// Run `attempt` until it stops failing with a version conflict, at most `attempts` times.
pub(crate) fn retry_on_conflict<T>(
    attempts: u32,
    mut attempt: impl FnMut() -> Result<T, ScheduleError>,
) -> Result<T, ScheduleError> {
    let mut tries = 0;
    loop {
        tries += 1;
        match attempt() {
            Err(ScheduleError::Conflict(card_id)) if tries < attempts => {
                tracing::warn!(card_id, tries, "Version conflict while grading, retrying");
            }
            other => return other,
        }
    }
}

pub fn get_card(pool: &DbPool, card_id: i64) -> Result<Card, ScheduleError> {
    let conn = db::try_lock(pool)?;
    db::get_card_by_id(&conn, card_id)?.ok_or(ScheduleError::CardNotFound(card_id))
}

/// The ordered due set for `query`.
pub fn due_cards(pool: &DbPool, query: &DueQuery) -> Result<Vec<Card>, ScheduleError> {
    let conn = db::try_lock(pool)?;
    let cards = crate::profile_scope!("due_cards", { db::get_due_cards(&conn, query) })?;
    tracing::debug!(
        owner = query.owner(),
        limit = query.limit(),
        selected = cards.len(),
        "Selected due cards"
    );
    Ok(cards)
}

pub fn due_summary(
    pool: &DbPool,
    now: DateTime<Utc>,
    owner: Option<&str>,
) -> Result<DueSummary, ScheduleError> {
    let conn = db::try_lock(pool)?;
    Ok(DueSummary {
        now,
        due_count: db::get_due_count(&conn, now, owner)?,
        next_review: db::get_next_review_time(&conn, now, owner)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;
    use chrono::{Duration, TimeZone};

    fn t() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 1, 7, 15, 0).unwrap()
    }

    fn q(value: i64) -> Quality {
        Quality::new(value).unwrap()
    }

    #[test]
    fn test_grade_persists_schedule_and_log() {
        let env = TestEnv::new().unwrap();
        let id = env.add_card(Some("alice"), t()).unwrap();
        let pool = env.pool().unwrap();

        let graded = grade_review(&pool, id, q(5), t()).unwrap();
        assert_eq!(graded.repetitions, 1);
        assert_eq!(graded.interval_days, 1);
        assert!((graded.ease_factor - 2.6).abs() < 1e-9);
        assert_eq!(graded.last_reviewed_at, Some(t()));
        assert_eq!(graded.next_review, t() + Duration::days(1));
        assert_eq!(graded.version, 1);

        let stored = db::get_card_by_id(&env.conn, id).unwrap().unwrap();
        assert_eq!(stored, graded);

        let logs = db::get_review_logs(&env.conn, id).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].quality.value(), 5);
        assert_eq!(logs[0].interval_days, 1);
    }

    #[test]
    fn test_grade_sequence_follows_sm2() {
        let env = TestEnv::new().unwrap();
        let id = env.add_card(None, t()).unwrap();
        let pool = env.pool().unwrap();

        let first = grade_review(&pool, id, q(5), t()).unwrap();
        let second = grade_review(&pool, id, q(5), first.next_review).unwrap();
        assert_eq!(second.repetitions, 2);
        assert_eq!(second.interval_days, 6);

        let third = grade_review(&pool, id, q(4), second.next_review).unwrap();
        assert_eq!(third.repetitions, 3);
        // 6 * 2.7 = 16.2
        assert_eq!(third.interval_days, 16);
        assert_eq!(third.next_review, second.next_review + Duration::days(16));

        let lapse = grade_review(&pool, id, q(1), third.next_review).unwrap();
        assert_eq!(lapse.repetitions, 0);
        assert_eq!(lapse.interval_days, 1);
        assert!(lapse.ease_factor >= sm2::MIN_EASE_FACTOR);
        assert_eq!(lapse.version, 4);
    }

    #[test]
    fn test_grade_unknown_card() {
        let env = TestEnv::new().unwrap();
        let pool = env.pool().unwrap();
        let err = grade_review(&pool, 99, q(3), t()).unwrap_err();
        assert!(matches!(err, ScheduleError::CardNotFound(99)));
    }

    #[test]
    fn test_retry_on_conflict_gives_up_after_attempts() {
        let mut calls = 0;
        let result: Result<(), ScheduleError> = retry_on_conflict(3, || {
            calls += 1;
            Err(ScheduleError::Conflict(7))
        });
        assert!(matches!(result, Err(ScheduleError::Conflict(7))));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_retry_on_conflict_recovers() {
        let mut calls = 0;
        let result = retry_on_conflict(3, || {
            calls += 1;
            if calls == 1 {
                Err(ScheduleError::Conflict(7))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(result.unwrap(), 2);
    }

    #[test]
    fn test_retry_does_not_repeat_other_errors() {
        let mut calls = 0;
        let result: Result<(), ScheduleError> = retry_on_conflict(3, || {
            calls += 1;
            Err(ScheduleError::CardNotFound(1))
        });
        assert!(matches!(result, Err(ScheduleError::CardNotFound(1))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_due_cards_and_summary() {
        let env = TestEnv::new().unwrap();
        let overdue = env.add_card(None, t() - Duration::days(1)).unwrap();
        env.add_card(None, t() + Duration::days(1)).unwrap();
        let pool = env.pool().unwrap();

        let query = DueQuery::new(t(), None, 10).unwrap();
        let due = due_cards(&pool, &query).unwrap();
        assert_eq!(due.iter().map(|c| c.id).collect::<Vec<_>>(), vec![overdue]);

        let summary = due_summary(&pool, t(), None).unwrap();
        assert_eq!(summary.due_count, 1);
        assert_eq!(summary.next_review, Some(t() + Duration::days(1)));
    }

    #[test]
    fn test_graded_card_leaves_due_set() {
        let env = TestEnv::new().unwrap();
        let id = env.add_card(Some("alice"), t() - Duration::hours(2)).unwrap();
        let pool = env.pool().unwrap();
        let query = DueQuery::new(t(), Some("alice".into()), 10).unwrap();

        assert_eq!(due_cards(&pool, &query).unwrap().len(), 1);
        grade_review(&pool, id, q(4), t()).unwrap();
        assert!(due_cards(&pool, &query).unwrap().is_empty());
    }

    #[test]
    fn test_many_perfect_grades_keep_store_readable() {
        let env = TestEnv::new().unwrap();
        let shared = env.add_card(None, t()).unwrap();
        let owned = env.add_card(Some("bob"), t()).unwrap();
        let pool = env.pool().unwrap();

        for _ in 0..50 {
            grade_review(&pool, shared, q(5), t()).unwrap();
            grade_review(&pool, owned, q(5), t()).unwrap();
        }

        let card = get_card(&pool, shared).unwrap();
        assert_eq!(card.interval_days, sm2::MAX_INTERVAL_DAYS);
        assert_eq!(card.next_review, t() + Duration::days(sm2::MAX_INTERVAL_DAYS));

        // Far-future cards are not due
        let query = DueQuery::new(t(), Some("bob".into()), 10).unwrap();
        assert!(due_cards(&pool, &query).unwrap().is_empty());
        let later = DueQuery::new(card.next_review, Some("bob".into()), 10).unwrap();
        assert_eq!(due_cards(&pool, &later).unwrap().len(), 2);

        let lapse = grade_review(&pool, shared, q(1), t()).unwrap();
        assert_eq!(lapse.interval_days, 1);
    }

    #[test]
    fn test_grading_on_schedule_until_latest_time() {
        let env = TestEnv::new().unwrap();
        let id = env.add_card(None, t()).unwrap();
        let pool = env.pool().unwrap();

        let mut reviewed_at = t();
        for _ in 0..120 {
            reviewed_at = grade_review(&pool, id, q(5), reviewed_at).unwrap().next_review;
        }

        assert_eq!(reviewed_at, sm2::latest_review_time());
        assert_eq!(get_card(&pool, id).unwrap().next_review, reviewed_at);
        let summary = due_summary(&pool, t(), None).unwrap();
        assert_eq!(summary.due_count, 0);
        assert_eq!(summary.next_review, Some(reviewed_at));
    }
}
