//! Status service - catalog and circulation summaries

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::adapters::repository::LibraryRepository;
use crate::domain::CopyStatus;

/// Status service for library summaries
pub struct StatusService {
    repository: Arc<LibraryRepository>,
}

impl StatusService {
    pub fn new(repository: Arc<LibraryRepository>) -> Self {
        Self { repository }
    }

    /// Get overall status summary as of the given day
    pub fn get_status(&self, as_of: NaiveDate) -> StatusSummary {
        self.repository.read(|books, users| {
            let mut summary = StatusSummary {
                as_of,
                total_copies: books.len(),
                available: 0,
                borrowed: 0,
                reserved: 0,
                total_users: users.len(),
                titles: Vec::new(),
                overdue: Vec::new(),
                outstanding_penalty: Decimal::ZERO,
            };

            // keyed by ISBN so titles come out in a stable order
            let mut titles: BTreeMap<&str, TitleSummary> = BTreeMap::new();

            for copy in books {
                match copy.status() {
                    CopyStatus::Available => summary.available += 1,
                    CopyStatus::Borrowed => summary.borrowed += 1,
                    CopyStatus::Reserved => summary.reserved += 1,
                }

                let title = titles.entry(copy.isbn.as_str()).or_insert_with(|| TitleSummary {
                    isbn: copy.isbn.clone(),
                    title: copy.title.clone(),
                    author: copy.author.clone(),
                    copies: 0,
                    available: 0,
                });
                title.copies += 1;
                if copy.is_available() {
                    title.available += 1;
                }

                if let Some(loan) = copy.loan().filter(|l| l.is_overdue(as_of)) {
                    let penalty = loan.penalty(as_of);
                    summary.outstanding_penalty += penalty;
                    summary.overdue.push(OverdueCopy {
                        copy_id: copy.id.clone(),
                        title: copy.title.clone(),
                        borrower: loan.borrower.clone(),
                        due_on: loan.due_on,
                        overdue_days: loan.overdue_days(as_of),
                        penalty,
                    });
                }
            }

            summary.titles = titles.into_values().collect();
            summary
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub as_of: NaiveDate,
    pub total_copies: usize,
    pub available: usize,
    pub borrowed: usize,
    pub reserved: usize,
    pub total_users: usize,
    pub titles: Vec<TitleSummary>,
    pub overdue: Vec<OverdueCopy>,
    pub outstanding_penalty: Decimal,
}

#[derive(Debug, Serialize)]
pub struct TitleSummary {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub copies: usize,
    pub available: usize,
}

#[derive(Debug, Serialize)]
pub struct OverdueCopy {
    pub copy_id: String,
    pub title: String,
    pub borrower: String,
    pub due_on: NaiveDate,
    pub overdue_days: i64,
    pub penalty: Decimal,
}
