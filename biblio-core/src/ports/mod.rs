//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The core domain
//! depends only on these traits, not on concrete implementations.

mod notifier;
mod repository;

pub use notifier::Notifier;
pub use repository::{LoadReport, RecordStore};
