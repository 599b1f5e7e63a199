//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - Pipe-delimited text files for the RecordStore port
//! - The library repository owning both collections
//! - A file lock guarding the data directory
//! - A logging notifier standing in for email delivery

pub mod flatfile;
pub mod lock;
pub mod notifier;
pub mod repository;
