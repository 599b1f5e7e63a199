//! CLI command implementations

pub mod books;
pub mod circulation;
pub mod doctor;
pub mod logs;
pub mod notify;
pub mod status;
pub mod users;

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use biblio_core::{Committed, EntryPoint, LibraryContext, LogEvent, LoggingService, OperationResult};
use chrono::{Local, NaiveDate};
use dialoguer::Password;
use serde::Serialize;
use tracing::debug;

use crate::output;

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Get the library directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("BIBLIO_DIR") {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|home| home.join(".biblio"))
        .ok_or_else(|| anyhow!("Could not find home directory; set BIBLIO_DIR"))
}

/// Open the library, locking its directory for this process
pub fn get_context() -> Result<LibraryContext> {
    let data_dir = get_data_dir()?;

    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create library directory: {:?}", data_dir))?;

    debug!("Opening library at {}", data_dir.display());
    let ctx = LibraryContext::new(&data_dir).context("Failed to open library")?;

    // A missing file on first run is expected; anything else means lost lines
    let problems = ctx
        .load_warnings()
        .iter()
        .filter(|w| !w.starts_with("No "))
        .count();
    if problems > 0 {
        output::warning(&format!(
            "{} problem(s) reading the data files; run `biblio doctor` for details",
            problems
        ));
    }
    Ok(ctx)
}

/// The given day, or today in local time
pub fn day_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

/// Check the librarian password, prompting for it when not given
pub fn require_librarian(ctx: &LibraryContext, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => Password::new()
            .with_prompt("Librarian password")
            .interact()?,
    };
    ctx.auth_service.require_librarian(&password)?;
    Ok(())
}

/// Print the outcome of a change; failures still surface as errors
pub fn finish<T: Serialize>(
    result: biblio_core::domain::result::Result<Committed<T>>,
    json: bool,
    show: impl FnOnce(&T),
) -> Result<()> {
    if json {
        let failure = result.as_ref().err().map(|e| e.to_string());
        println!("{}", serde_json::to_string_pretty(&OperationResult::from(result))?);
        return match failure {
            Some(msg) => Err(anyhow!(msg)),
            None => Ok(()),
        };
    }

    let committed = result?;
    show(&committed.value);
    output::persistence_warning(committed.warning.as_deref());
    Ok(())
}
