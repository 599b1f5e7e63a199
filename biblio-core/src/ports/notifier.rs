//! Notifier port - outbound messages to patrons

/// Sink for patron notifications
///
/// Fire-and-forget: delivery problems stay inside the implementation and are
/// never reported back to the circulation services.
pub trait Notifier: Send + Sync {
    fn send(&self, to_address: &str, subject: &str, body: &str);
}
