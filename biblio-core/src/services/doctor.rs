//! Doctor service - data file health checks

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;

use crate::adapters::repository::LibraryRepository;
use crate::domain::{BookCopy, CopyState, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Warning,
    Error,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<serde_json::Value>>,
}

impl CheckResult {
    /// Pass when `details` is empty, otherwise report `on_failure`
    fn from_details(
        details: Vec<serde_json::Value>,
        on_failure: CheckStatus,
        pass_message: &str,
        failure_message: impl FnOnce(usize) -> String,
    ) -> Self {
        if details.is_empty() {
            Self {
                status: CheckStatus::Pass,
                message: pass_message.to_string(),
                details: None,
            }
        } else {
            Self {
                status: on_failure,
                message: failure_message(details.len()),
                details: Some(details),
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorResult {
    pub checks: BTreeMap<String, CheckResult>,
    pub summary: DoctorSummary,
}

#[derive(Debug, Serialize)]
pub struct DoctorSummary {
    pub passed: usize,
    pub warnings: usize,
    pub errors: usize,
}

/// Doctor service for health checks
pub struct DoctorService {
    repository: Arc<LibraryRepository>,
}

impl DoctorService {
    pub fn new(repository: Arc<LibraryRepository>) -> Self {
        Self { repository }
    }

    /// Run all health checks
    pub fn run_checks(&self, as_of: NaiveDate) -> DoctorResult {
        let mut checks = BTreeMap::new();

        // Lines dropped while loading (missing files are not a problem)
        let skipped: Vec<serde_json::Value> = self
            .repository
            .load_warnings()
            .iter()
            .filter(|w| w.starts_with("Skipped") || w.starts_with("Could not read"))
            .map(|w| json!({ "warning": w }))
            .collect();
        checks.insert(
            "unreadable_records".to_string(),
            CheckResult::from_details(skipped, CheckStatus::Warning, "All stored records loaded", |n| {
                format!("{} problem(s) reading stored records; unreadable lines are dropped on next save", n)
            }),
        );

        self.repository.read(|books, users| {
            checks.insert("due_dates".to_string(), check_due_dates(books));
            checks.insert("unknown_patrons".to_string(), check_unknown_patrons(books, users));
            checks.insert("duplicate_copy_ids".to_string(), check_duplicate_copy_ids(books));
            checks.insert("duplicate_identities".to_string(), check_duplicate_identities(users));
            checks.insert("future_loans".to_string(), check_future_loans(books, as_of));
        });

        let count = |status| checks.values().filter(|c| c.status == status).count();
        let summary = DoctorSummary {
            passed: count(CheckStatus::Pass),
            warnings: count(CheckStatus::Warning),
            errors: count(CheckStatus::Error),
        };

        DoctorResult { checks, summary }
    }
}

fn check_due_dates(books: &[BookCopy]) -> CheckResult {
    let details = books
        .iter()
        .filter_map(|b| b.loan().map(|l| (b, l)))
        .filter(|(_, loan)| !loan.has_standard_due_date())
        .map(|(b, loan)| {
            json!({
                "copy_id": b.id,
                "borrowed_on": loan.borrowed_on.to_string(),
                "due_on": loan.due_on.to_string(),
            })
        })
        .collect();
    CheckResult::from_details(details, CheckStatus::Warning, "All due dates follow the loan period", |n| {
        format!("{} loan(s) have a due date that does not match the loan period", n)
    })
}

fn check_unknown_patrons(books: &[BookCopy], users: &[User]) -> CheckResult {
    let known: HashSet<&str> = users.iter().map(|u| u.id.as_str()).collect();
    let details = books
        .iter()
        .filter_map(|b| match &b.state {
            CopyState::Borrowed(loan) if !known.contains(loan.borrower.as_str()) => {
                Some(json!({ "copy_id": b.id, "borrower": loan.borrower }))
            }
            CopyState::Reserved { by } if !known.contains(by.as_str()) => {
                Some(json!({ "copy_id": b.id, "reserved_by": by }))
            }
            _ => None,
        })
        .collect();
    CheckResult::from_details(details, CheckStatus::Warning, "All loans and reservations belong to registered users", |n| {
        format!("{} copy(ies) are held by unregistered user ids", n)
    })
}

fn check_duplicate_copy_ids(books: &[BookCopy]) -> CheckResult {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for copy in books {
        *counts.entry(copy.id.as_str()).or_default() += 1;
    }
    let mut duplicates: Vec<(&str, usize)> = counts.into_iter().filter(|(_, n)| *n > 1).collect();
    duplicates.sort();
    let details = duplicates
        .into_iter()
        .map(|(id, n)| json!({ "copy_id": id, "count": n }))
        .collect();
    CheckResult::from_details(details, CheckStatus::Error, "All copy ids are unique", |n| {
        format!("{} copy id(s) appear more than once", n)
    })
}

fn check_duplicate_identities(users: &[User]) -> CheckResult {
    let mut seen: HashMap<(&str, &str, &str), Vec<&str>> = HashMap::new();
    for user in users {
        seen.entry((user.name.as_str(), user.phone.as_str(), user.email.as_str()))
            .or_default()
            .push(user.id.as_str());
    }
    let mut duplicates: Vec<Vec<&str>> = seen.into_values().filter(|ids| ids.len() > 1).collect();
    duplicates.sort();
    let details = duplicates
        .into_iter()
        .map(|ids| json!({ "user_ids": ids }))
        .collect();
    CheckResult::from_details(details, CheckStatus::Error, "All users have distinct details", |n| {
        format!("{} set(s) of users share the same name, phone and email", n)
    })
}

fn check_future_loans(books: &[BookCopy], as_of: NaiveDate) -> CheckResult {
    let details = books
        .iter()
        .filter_map(|b| b.loan().map(|l| (b, l)))
        .filter(|(_, loan)| loan.borrowed_on > as_of)
        .map(|(b, loan)| json!({ "copy_id": b.id, "borrowed_on": loan.borrowed_on.to_string() }))
        .collect();
    CheckResult::from_details(details, CheckStatus::Warning, "No loans start in the future", |n| {
        format!("{} loan(s) start after {}", n, as_of)
    })
}
