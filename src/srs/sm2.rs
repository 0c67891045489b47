use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

use crate::domain::{Quality, ScheduleState};

pub const MIN_EASE_FACTOR: f64 = 1.3;
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Interval after the first success and after any lapse
const FIRST_INTERVAL_DAYS: i64 = 1;
const SECOND_INTERVAL_DAYS: i64 = 6;

/// Longest interval a card can be pushed out by (100 years)
pub const MAX_INTERVAL_DAYS: i64 = 36_500;

/// Last year a timestamp can carry and still be written as four-digit RFC 3339
pub const LATEST_REVIEW_YEAR: i32 = 9999;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sm2Result {
  pub ease_factor: f64,
  pub interval_days: i64,
  pub repetitions: i64,
  pub next_review: DateTime<Utc>,
}

/// EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02)), floored at 1.3
pub fn next_ease_factor(current: f64, quality: Quality) -> f64 {
  let miss = 5.0 - quality.value() as f64;
  let ease_delta = 0.1 - miss * (0.08 + miss * 0.02);
  (current + ease_delta).max(MIN_EASE_FACTOR)
}

/// Apply one SM-2 grading to `state`. Pure; `now` only anchors the due date.
///
/// Intervals count whole days from the instant of the review, keeping its time of day.
pub fn grade(state: &ScheduleState, quality: Quality, now: DateTime<Utc>) -> Sm2Result {
  let new_ease_factor = next_ease_factor(state.ease_factor, quality);

  let (new_interval, new_repetitions) = if quality.is_lapse() {
    (FIRST_INTERVAL_DAYS, 0)
  } else {
    let repetitions = state.repetitions.saturating_add(1);
    let interval = match repetitions {
      1 => FIRST_INTERVAL_DAYS,
      2 => SECOND_INTERVAL_DAYS,
      // Growth base is the previous interval, not the one being computed
      _ => (((state.interval_days as f64) * new_ease_factor).round() as i64)
        .clamp(1, MAX_INTERVAL_DAYS),
    };
    (interval, repetitions)
  };

  Sm2Result {
    ease_factor: new_ease_factor,
    interval_days: new_interval,
    repetitions: new_repetitions,
    next_review: advance_days(now, new_interval),
  }
}

/// `now + days`, saturating at the last representable review time.
fn advance_days(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
  Duration::try_days(days)
    .and_then(|delta| now.checked_add_signed(delta))
    .filter(|next| next.year() <= LATEST_REVIEW_YEAR)
    .unwrap_or_else(latest_review_time)
}

/// 9999-12-31T23:59:59Z
pub fn latest_review_time() -> DateTime<Utc> {
  Utc
    .with_ymd_and_hms(LATEST_REVIEW_YEAR, 12, 31, 23, 59, 59)
    .single()
    .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
