//! Feature-gated profiling event log.
//!
//! Built with `--features profiling`, grading, due selection and store queries append
//! JSONL events under `paths::profile_dir()`. Without the feature every entry point
//! is an empty inline function and the macros expand to nothing or to their body.
//!
//! ```rust,ignore
//! use spaced_review::profile_log;
//! use spaced_review::profiling::EventType;
//!
//! profile_log!(EventType::Grade { card_id: 12, quality: 4 });
//! ```

#[cfg(feature = "profiling")]
mod event;
#[cfg(feature = "profiling")]
mod logger;

#[cfg(feature = "profiling")]
pub use event::*;
#[cfg(feature = "profiling")]
pub use logger::*;

#[cfg(not(feature = "profiling"))]
mod noop;
#[cfg(not(feature = "profiling"))]
pub use noop::*;

/// Record a profiling event. Expands to nothing without the `profiling` feature.
#[cfg(feature = "profiling")]
#[macro_export]
macro_rules! profile_log {
    ($event_type:expr) => {
        $crate::profiling::log_event($event_type)
    };
    ($event_type:expr, $meta:expr) => {
        $crate::profiling::log_event_with_meta($event_type, $meta)
    };
}

#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! profile_log {
    ($($args:tt)*) => {};
}

/// Evaluate a block, recording how long it took when profiling is enabled.
///
/// ```rust,ignore
/// let cards = profile_scope!("due_cards", { db::get_due_cards(&conn, &query) });
/// ```
#[cfg(feature = "profiling")]
#[macro_export]
macro_rules! profile_scope {
    ($name:expr, $body:block) => {{
        let _start = std::time::Instant::now();
        let result = $body;
        $crate::profiling::log_timed($name, _start.elapsed());
        result
    }};
}

#[cfg(not(feature = "profiling"))]
#[macro_export]
macro_rules! profile_scope {
    ($name:expr, $body:block) => {
        $body
    };
}
