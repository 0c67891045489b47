pub mod card;
pub mod query;
pub mod review;

pub use card::{Card, ScheduleState};
pub use query::DueQuery;
pub use review::{Quality, ReviewLog};
