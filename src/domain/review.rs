use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// Lowest quality that counts as a successful recall
pub const SUCCESS_THRESHOLD: u8 = 3;

/// Highest quality a learner can report
pub const MAX_QUALITY: u8 = 5;

/// Recall quality in 0..=5. 0-2 is a lapse, 3-5 a success of increasing confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "u8")]
pub struct Quality(u8);

impl Quality {
  pub fn new(value: i64) -> Result<Self, ScheduleError> {
    if (0..=MAX_QUALITY as i64).contains(&value) {
      Ok(Self(value as u8))
    } else {
      Err(ScheduleError::InvalidQuality(value))
    }
  }

  pub fn value(self) -> u8 {
    self.0
  }

  pub fn is_success(self) -> bool {
    self.0 >= SUCCESS_THRESHOLD
  }

  pub fn is_lapse(self) -> bool {
    !self.is_success()
  }
}

impl From<Quality> for u8 {
  fn from(q: Quality) -> Self {
    q.0
  }
}

impl<'de> Deserialize<'de> for Quality {
  fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = i64::deserialize(deserializer)?;
    Self::new(raw).map_err(serde::de::Error::custom)
  }
}

/// One persisted grading event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewLog {
  pub id: i64,
  pub card_id: i64,
  pub quality: Quality,
  pub reviewed_at: DateTime<Utc>,
  pub is_correct: bool,
  /// Ease factor after the grading
  pub ease_factor: f64,
  /// Interval after the grading
  pub interval_days: i64,
}

impl ReviewLog {
  pub fn new(
    card_id: i64,
    quality: Quality,
    reviewed_at: DateTime<Utc>,
    ease_factor: f64,
    interval_days: i64,
  ) -> Self {
    Self {
      id: 0,
      card_id,
      quality,
      reviewed_at,
      is_correct: quality.is_success(),
      ease_factor,
      interval_days,
    }
  }
}
