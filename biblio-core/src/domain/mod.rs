//! Core domain entities
//!
//! All library entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod book;
mod field;
pub mod result;
mod user;

pub use book::{
    due_date_for, overdue_days, penalty_for, BookCopy, BookTemplate, CopyState, CopyStatus,
    Loan, MAX_BORROW_DAYS, PENALTY_PER_DAY,
};
pub(crate) use field::clean;
pub use field::FIELD_DELIMITER;
pub use user::{Identity, User};
