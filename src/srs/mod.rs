pub mod due_set;
pub mod sm2;

pub use due_set::select_due;
pub use sm2::{grade, Sm2Result};
