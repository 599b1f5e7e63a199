//! Book copy domain model and circulation rules

use std::fmt;

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::field::clean;
use crate::domain::result::{Error, Result};

/// Loan period in days
pub const MAX_BORROW_DAYS: u64 = 14;

/// Penalty charged per day a copy is kept past its due date
pub const PENALTY_PER_DAY: Decimal = Decimal::ONE_HUNDRED;

/// Due date for a loan starting on `borrowed_on`
pub fn due_date_for(borrowed_on: NaiveDate) -> Option<NaiveDate> {
    borrowed_on.checked_add_days(Days::new(MAX_BORROW_DAYS))
}

/// Whole calendar days between `due_on` and `as_of`, floored at zero
pub fn overdue_days(due_on: NaiveDate, as_of: NaiveDate) -> i64 {
    as_of.signed_duration_since(due_on).num_days().max(0)
}

/// Penalty owed for a copy due on `due_on` and returned on `as_of`
pub fn penalty_for(due_on: NaiveDate, as_of: NaiveDate) -> Decimal {
    Decimal::from(overdue_days(due_on, as_of)) * PENALTY_PER_DAY
}

/// An active loan of one copy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub borrower: String,
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
}

impl Loan {
    /// Start a loan; the due date follows from the loan period
    pub fn start(borrower: impl Into<String>, borrowed_on: NaiveDate) -> Result<Self> {
        let due_on = due_date_for(borrowed_on)
            .ok_or_else(|| Error::validation(format!("borrow date {} out of range", borrowed_on)))?;
        Ok(Self {
            borrower: borrower.into(),
            borrowed_on,
            due_on,
        })
    }

    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        as_of > self.due_on
    }

    pub fn overdue_days(&self, as_of: NaiveDate) -> i64 {
        overdue_days(self.due_on, as_of)
    }

    pub fn penalty(&self, as_of: NaiveDate) -> Decimal {
        penalty_for(self.due_on, as_of)
    }

    /// True when `due_on` matches the loan period rule
    pub fn has_standard_due_date(&self) -> bool {
        due_date_for(self.borrowed_on) == Some(self.due_on)
    }
}

/// Circulation state of a single copy
///
/// A copy is never borrowed and reserved at the same time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CopyState {
    #[default]
    Available,
    Borrowed(Loan),
    Reserved { by: String },
}

impl CopyState {
    pub fn status(&self) -> CopyStatus {
        match self {
            CopyState::Available => CopyStatus::Available,
            CopyState::Borrowed(_) => CopyStatus::Borrowed,
            CopyState::Reserved { .. } => CopyStatus::Reserved,
        }
    }
}

/// State tag without payload, for filtering and display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyStatus {
    Available,
    Borrowed,
    Reserved,
}

impl fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CopyStatus::Available => "Available",
            CopyStatus::Borrowed => "Borrowed",
            CopyStatus::Reserved => "Reserved",
        };
        f.write_str(s)
    }
}

/// Descriptive fields shared by every copy of an edition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookTemplate {
    pub title: String,
    pub author: String,
    pub isbn: String,
}

impl BookTemplate {
    pub fn new(title: impl Into<String>, author: impl Into<String>, isbn: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
        }
    }

    /// Trimmed copy of the template, rejecting values the file format cannot hold
    pub fn normalized(&self) -> Result<Self> {
        Ok(Self {
            title: clean("title", &self.title, true)?,
            author: clean("author", &self.author, true)?,
            isbn: clean("isbn", &self.isbn, true)?,
        })
    }
}

/// One physical copy of a title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookCopy {
    pub id: String,
    pub title: String,
    pub author: String,
    pub isbn: String,
    #[serde(flatten)]
    pub state: CopyState,
}

impl BookCopy {
    /// Create a new available copy with a fresh id
    pub fn from_template(template: &BookTemplate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: template.title.clone(),
            author: template.author.clone(),
            isbn: template.isbn.clone(),
            state: CopyState::Available,
        }
    }

    pub fn status(&self) -> CopyStatus {
        self.state.status()
    }

    pub fn is_available(&self) -> bool {
        matches!(self.state, CopyState::Available)
    }

    pub fn loan(&self) -> Option<&Loan> {
        match &self.state {
            CopyState::Borrowed(loan) => Some(loan),
            _ => None,
        }
    }

    pub fn reserved_by(&self) -> Option<&str> {
        match &self.state {
            CopyState::Reserved { by } => Some(by),
            _ => None,
        }
    }

    /// Penalty accumulated so far by a copy that is still out
    pub fn accrued_penalty(&self, as_of: NaiveDate) -> Decimal {
        self.loan().map_or(Decimal::ZERO, |loan| loan.penalty(as_of))
    }

    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        self.loan().is_some_and(|loan| loan.is_overdue(as_of))
    }
}
