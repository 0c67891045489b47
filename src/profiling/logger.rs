//! JSONL file sink for profiling events.

#![allow(dead_code)]

use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;

use super::event::{EventType, ProfileEvent};
use crate::paths;

/// Flush the buffered writer every this many events
const FLUSH_EVERY: u64 = 100;

static LOGGER: Mutex<Option<ProfileLogger>> = Mutex::new(None);

static EVENT_COUNT: AtomicU64 = AtomicU64::new(0);

pub struct ProfileLogger {
    writer: BufWriter<File>,
    session_id: String,
}

impl ProfileLogger {
    fn new() -> std::io::Result<Self> {
        let session_id = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        let dir = paths::profile_dir();
        create_dir_all(&dir)?;

        let filename = format!("{}/profile_{}.jsonl", dir, session_id);
        let file = OpenOptions::new().create(true).append(true).open(&filename)?;

        tracing::info!("Profiling enabled: writing to {}", filename);

        Ok(Self {
            writer: BufWriter::new(file),
            session_id,
        })
    }

    fn log(&mut self, event: ProfileEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => {
                if let Err(e) = writeln!(self.writer, "{}", json) {
                    tracing::warn!("Failed to write profiling event: {}", e);
                }
                if EVENT_COUNT.fetch_add(1, Ordering::Relaxed) % FLUSH_EVERY == 0 {
                    let _ = self.writer.flush();
                }
            }
            Err(e) => tracing::warn!("Failed to serialize profiling event: {}", e),
        }
    }
}

fn with_logger(f: impl FnOnce(&mut ProfileLogger)) {
    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_mut() {
            f(logger);
        }
    }
}

/// Open the session file. Call once from main() before any logging.
pub fn init() {
    let Ok(mut guard) = LOGGER.lock() else {
        tracing::error!("Profiler lock poisoned");
        return;
    };
    if guard.is_some() {
        tracing::warn!("Profiler already initialized");
        return;
    }

    match ProfileLogger::new() {
        Ok(logger) => {
            let session_id = logger.session_id.clone();
            *guard = Some(logger);
            drop(guard);
            log_event(EventType::SessionStart { session_id });
        }
        Err(e) => tracing::error!("Failed to initialize profiler: {}", e),
    }
}

/// Write the session end marker and flush.
pub fn shutdown() {
    let total_events = EVENT_COUNT.load(Ordering::Relaxed);
    log_event(EventType::SessionEnd { total_events });

    if let Ok(mut guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_mut() {
            let _ = logger.writer.flush();
            tracing::info!("Profiling session ended: {} events logged", total_events);
        }
        *guard = None;
    }
}

pub fn log_event(event_type: EventType) {
    with_logger(|logger| logger.log(ProfileEvent::new(event_type)));
}

pub fn log_event_with_meta(event_type: EventType, metadata: serde_json::Value) {
    with_logger(|logger| logger.log(ProfileEvent::with_metadata(event_type, metadata)));
}

pub fn log_timed(name: &str, duration: Duration) {
    let event = ProfileEvent::with_duration(
        EventType::TimedScope {
            name: name.to_string(),
            duration_ms: duration.as_millis() as u64,
        },
        duration,
    );
    with_logger(|logger| logger.log(event));
}
