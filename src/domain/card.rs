use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::srs::sm2::{Sm2Result, DEFAULT_EASE_FACTOR};

/// The scheduling fields the grading engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleState {
  pub repetitions: i64,
  pub ease_factor: f64,
  pub interval_days: i64,
}

impl ScheduleState {
  /// State of a card that has never been reviewed
  pub fn fresh() -> Self {
    Self {
      repetitions: 0,
      ease_factor: DEFAULT_EASE_FACTOR,
      interval_days: 0,
    }
  }
}

impl Default for ScheduleState {
  fn default() -> Self {
    Self::fresh()
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
  pub id: i64,
  /// Learner who owns the card; None means shared with every learner
  pub owner: Option<String>,

  pub ease_factor: f64,
  pub interval_days: i64,
  pub repetitions: i64,
  pub next_review: DateTime<Utc>,
  pub last_reviewed_at: Option<DateTime<Utc>>,

  /// Bumped on every persisted grading, compared on write
  pub version: i64,
}

impl Card {
  /// A new card, due immediately.
  pub fn new(owner: Option<String>, now: DateTime<Utc>) -> Self {
    let state = ScheduleState::fresh();
    Self {
      id: 0,
      owner,
      ease_factor: state.ease_factor,
      interval_days: state.interval_days,
      repetitions: state.repetitions,
      next_review: now,
      last_reviewed_at: None,
      version: 0,
    }
  }

  pub fn schedule(&self) -> ScheduleState {
    ScheduleState {
      repetitions: self.repetitions,
      ease_factor: self.ease_factor,
      interval_days: self.interval_days,
    }
  }

  pub fn is_due(&self, now: DateTime<Utc>) -> bool {
    self.next_review <= now
  }

  /// Copy of this card after a grading at `reviewed_at` has been persisted.
  pub fn with_review(&self, result: &Sm2Result, reviewed_at: DateTime<Utc>) -> Self {
    Self {
      ease_factor: result.ease_factor,
      interval_days: result.interval_days,
      repetitions: result.repetitions,
      next_review: result.next_review,
      last_reviewed_at: Some(reviewed_at),
      version: self.version + 1,
      ..self.clone()
    }
  }
}
