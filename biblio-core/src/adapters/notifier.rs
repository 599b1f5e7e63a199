//! Simulated email notifier

use tracing::info;

use crate::ports::Notifier;

/// Notifier that records each message in the diagnostic log instead of
/// delivering it
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, to_address: &str, subject: &str, body: &str) {
        info!(
            target: "biblio::notify",
            to = to_address,
            subject = subject,
            body_len = body.len(),
            "Simulated email sent"
        );
    }
}
