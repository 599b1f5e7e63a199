//! Record store port - persistence abstraction

use crate::codec::Record;
use crate::domain::result::Result;

/// Records read from a backing store, plus anything that was skipped
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport<R> {
    pub records: Vec<R>,
    pub warnings: Vec<String>,
}

impl<R> LoadReport<R> {
    pub fn empty_with_warning(warning: impl Into<String>) -> Self {
        Self {
            records: Vec::new(),
            warnings: vec![warning.into()],
        }
    }
}

impl<R> Default for LoadReport<R> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// Backing storage for one collection of records
///
/// `load` never fails: missing or unreadable storage and undecodable entries
/// are reported as warnings. `save` replaces the whole collection.
pub trait RecordStore<R: Record>: Send + Sync {
    fn load(&self) -> LoadReport<R>;

    fn save(&self, records: &[R]) -> Result<()>;

    /// Where the records live, for diagnostics
    fn location(&self) -> String;
}
