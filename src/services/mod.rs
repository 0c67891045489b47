pub mod review;

pub use review::{due_cards, due_summary, get_card, grade_review, DueSummary};
