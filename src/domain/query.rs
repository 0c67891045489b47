use chrono::{DateTime, Utc};

use crate::error::ScheduleError;

/// Validated arguments for a due-set selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueQuery {
    pub now: DateTime<Utc>,
    /// None selects across all learners
    pub owner: Option<String>,
    limit: usize,
}

impl DueQuery {
    pub fn new(now: DateTime<Utc>, owner: Option<String>, limit: i64) -> Result<Self, ScheduleError> {
        if limit <= 0 {
            return Err(ScheduleError::InvalidLimit(limit));
        }
        Ok(Self {
            now,
            owner,
            limit: usize::try_from(limit).map_err(|_| ScheduleError::InvalidLimit(limit))?,
        })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    /// Ownership scoping: shared cards are visible to everyone.
    pub fn includes_owner(&self, card_owner: Option<&str>) -> bool {
        match (self.owner(), card_owner) {
            (None, _) => true,
            (Some(_), None) => true,
            (Some(wanted), Some(actual)) => wanted == actual,
        }
    }
}
