//! Notify service - broadcast messages to every patron with an email

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::adapters::repository::LibraryRepository;
use crate::ports::Notifier;

/// How a broadcast went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BroadcastReport {
    pub sent: usize,
    /// Users without an email address
    pub skipped: usize,
}

pub struct NotifyService {
    repository: Arc<LibraryRepository>,
    notifier: Arc<dyn Notifier>,
}

impl NotifyService {
    pub fn new(repository: Arc<LibraryRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    pub fn notify_all(&self, subject: &str, body: &str) -> BroadcastReport {
        let users = self.repository.users();
        if users.is_empty() {
            debug!("No registered users to notify");
        }

        let mut report = BroadcastReport { sent: 0, skipped: 0 };
        for user in &users {
            if user.has_email() {
                self.notifier.send(&user.email, subject, body);
                report.sent += 1;
            } else {
                debug!("Skipping user {}: no email address", user.id);
                report.skipped += 1;
            }
        }

        debug!("Broadcast finished: {} sent, {} skipped", report.sent, report.skipped);
        report
    }
}
