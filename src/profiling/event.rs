//! Profiling event records.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One JSONL line.
#[derive(Serialize)]
pub struct ProfileEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: EventType,
    /// Microseconds, for timed scopes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_us: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ProfileEvent {
    pub fn new(event_type: EventType) -> Self {
        Self {
            timestamp: Utc::now(),
            event_type,
            duration_us: None,
            metadata: None,
        }
    }

    pub fn with_duration(event_type: EventType, duration: std::time::Duration) -> Self {
        Self {
            duration_us: Some(duration.as_micros() as u64),
            ..Self::new(event_type)
        }
    }

    pub fn with_metadata(event_type: EventType, metadata: serde_json::Value) -> Self {
        Self {
            metadata: Some(metadata),
            ..Self::new(event_type)
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventType {
    SessionStart {
        session_id: String,
    },
    SessionEnd {
        total_events: u64,
    },
    /// A card store statement is about to run
    DbQuery {
        /// select, insert, update, count
        operation: String,
        table: String,
    },
    /// One grading attempt
    Grade {
        card_id: i64,
        quality: u8,
    },
    /// A due-set selection against the store
    DueSelection {
        owner: Option<String>,
        limit: usize,
    },
    TimedScope {
        name: String,
        duration_ms: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = ProfileEvent::new(EventType::Grade {
            card_id: 3,
            quality: 5,
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"grade\""));
        assert!(json.contains("\"card_id\":3"));
        assert!(!json.contains("duration_us"));
    }

    #[test]
    fn test_timed_event_carries_duration() {
        let event = ProfileEvent::with_duration(
            EventType::TimedScope {
                name: "due_cards".into(),
                duration_ms: 2,
            },
            std::time::Duration::from_micros(2500),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["duration_us"], 2500);
        assert_eq!(json["event_type"]["type"], "timed_scope");
    }
}
