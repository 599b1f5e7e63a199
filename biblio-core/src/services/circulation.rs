//! Circulation service - the per-copy borrow/reserve state machine
//!
//! ```text
//!             borrow                    reserve
//!   Borrowed <-------  Available  -------> Reserved
//!            ------->             <-------
//!             return                 cancel
//! ```
//!
//! Failed preconditions leave the copy untouched and nothing is written.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::adapters::repository::LibraryRepository;
use crate::domain::result::{Committed, Error, Result};
use crate::domain::{clean, BookCopy, CopyState, Loan, User};

/// What a successful return produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReturnReceipt {
    pub copy_id: String,
    pub borrower: String,
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
    pub returned_on: NaiveDate,
    pub overdue_days: i64,
    pub penalty: Decimal,
}

/// Circulation service for borrowing and reserving copies
pub struct CirculationService {
    repository: Arc<LibraryRepository>,
    require_registered_users: bool,
}

fn find_copy<'a>(books: &'a mut [BookCopy], copy_id: &str, action: &str) -> Result<&'a mut BookCopy> {
    books.iter_mut().find(|b| b.id == copy_id).ok_or_else(|| {
        debug!("Copy {} not found for {}", copy_id, action);
        Error::not_found(format!("copy {}", copy_id))
    })
}

fn unavailable(copy: &BookCopy, action: &str) -> Error {
    debug!(
        "Copy {} is not available to {} (currently {})",
        copy.id,
        action,
        copy.status()
    );
    Error::invalid_state(format!(
        "copy {} is {}, cannot {}",
        copy.id,
        copy.status().to_string().to_lowercase(),
        action
    ))
}

impl CirculationService {
    pub fn new(repository: Arc<LibraryRepository>, require_registered_users: bool) -> Self {
        Self {
            repository,
            require_registered_users,
        }
    }

    /// The id as it will be stored; it must fit in a single record field
    fn check_user(&self, users: &[User], user_id: &str) -> Result<String> {
        let user_id = clean("user id", user_id, true)?;
        if self.require_registered_users && !users.iter().any(|u| u.id == user_id) {
            debug!("Unknown user {}", user_id);
            return Err(Error::not_found(format!("user {}", user_id)));
        }
        Ok(user_id)
    }

    /// Lend an available copy to `user_id` starting on `borrowed_on`
    pub fn borrow(&self, copy_id: &str, user_id: &str, borrowed_on: NaiveDate) -> Result<Committed<Loan>> {
        let (copy_id, user_id) = (copy_id.trim(), user_id.trim());
        self.repository.update_books(|books, users| {
            let copy = find_copy(books, copy_id, "borrowing")?;
            if !copy.is_available() {
                return Err(unavailable(copy, "borrow"));
            }
            let user_id = self.check_user(users, user_id)?;

            let loan = Loan::start(user_id.as_str(), borrowed_on)?;
            copy.state = CopyState::Borrowed(loan.clone());
            debug!(
                "Copy {} borrowed by {} on {}, due by {}",
                copy_id, user_id, loan.borrowed_on, loan.due_on
            );
            Ok(loan)
        })
    }

    /// Take back a borrowed copy, charging for each day past the due date
    ///
    /// `returned_on` is the as-of date for the penalty.
    pub fn return_copy(&self, copy_id: &str, returned_on: NaiveDate) -> Result<Committed<ReturnReceipt>> {
        let copy_id = copy_id.trim();
        self.repository.update_books(|books, _| {
            let copy = find_copy(books, copy_id, "returning")?;
            let CopyState::Borrowed(loan) = &copy.state else {
                debug!("Copy {} was not borrowed", copy_id);
                return Err(Error::invalid_state(format!("copy {} is not borrowed", copy_id)));
            };

            let receipt = ReturnReceipt {
                copy_id: copy.id.clone(),
                borrower: loan.borrower.clone(),
                borrowed_on: loan.borrowed_on,
                due_on: loan.due_on,
                returned_on,
                overdue_days: loan.overdue_days(returned_on),
                penalty: loan.penalty(returned_on),
            };
            if receipt.overdue_days > 0 {
                debug!(
                    "Copy {} is overdue by {} days, penalty {}",
                    copy_id, receipt.overdue_days, receipt.penalty
                );
            }

            copy.state = CopyState::Available;
            debug!("Copy {} returned", copy_id);
            Ok(receipt)
        })
    }

    /// Hold an available copy for `user_id`
    pub fn reserve(&self, copy_id: &str, user_id: &str) -> Result<Committed<BookCopy>> {
        let (copy_id, user_id) = (copy_id.trim(), user_id.trim());
        self.repository.update_books(|books, users| {
            let copy = find_copy(books, copy_id, "reserving")?;
            if !copy.is_available() {
                return Err(unavailable(copy, "reserve"));
            }
            let user_id = self.check_user(users, user_id)?;

            copy.state = CopyState::Reserved {
                by: user_id.clone(),
            };
            debug!("Copy {} reserved by {}", copy_id, user_id);
            Ok(copy.clone())
        })
    }

    /// Release a reservation, making the copy available again
    pub fn cancel_reservation(&self, copy_id: &str) -> Result<Committed<BookCopy>> {
        let copy_id = copy_id.trim();
        self.repository.update_books(|books, _| {
            let copy = find_copy(books, copy_id, "cancelling a reservation")?;
            if copy.reserved_by().is_none() {
                debug!("Copy {} was not reserved", copy_id);
                return Err(Error::invalid_state(format!("copy {} is not reserved", copy_id)));
            }

            copy.state = CopyState::Available;
            debug!("Reservation for copy {} cancelled", copy_id);
            Ok(copy.clone())
        })
    }

    /// Copies currently lent to or held for `user_id`
    pub fn copies_for_user(&self, user_id: &str) -> Vec<BookCopy> {
        let user_id = user_id.trim();
        self.repository.read(|books, _| {
            books
                .iter()
                .filter(|b| {
                    b.loan().is_some_and(|l| l.borrower == user_id) || b.reserved_by() == Some(user_id)
                })
                .cloned()
                .collect()
        })
    }
}
