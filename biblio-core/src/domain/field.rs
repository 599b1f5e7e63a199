//! Free-text field cleanup shared by the record types

use crate::domain::result::{Error, Result};

/// Separator used by the flat-file format; may never appear inside a field
pub const FIELD_DELIMITER: char = '|';

/// Trim `value` and make sure it can be stored in a single flat-file field
pub(crate) fn clean(label: &str, value: &str, required: bool) -> Result<String> {
    let trimmed = value.trim();
    if required && trimmed.is_empty() {
        return Err(Error::validation(format!("{} cannot be empty", label)));
    }
    if trimmed.contains(FIELD_DELIMITER) {
        return Err(Error::validation(format!(
            "{} cannot contain '{}'",
            label, FIELD_DELIMITER
        )));
    }
    if trimmed.contains(['\n', '\r']) {
        return Err(Error::validation(format!("{} cannot contain line breaks", label)));
    }
    Ok(trimmed.to_string())
}
