//! Logs command - inspect and prune logs.jsonl

use anyhow::Result;
use biblio_core::services::logging::LogEntry;
use biblio_core::{EntryPoint, LoggingService};
use chrono::{DateTime, Duration, Local, Utc};
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;
use serde_json::json;

use super::get_data_dir;
use crate::output;

#[derive(Subcommand)]
pub enum LogAction {
    /// Print the latest entries, oldest first
    Tail {
        /// How many entries to print
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,
        /// Only entries recording a failure
        #[arg(long)]
        failures: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Drop entries older than the given number of days
    Prune {
        #[arg(long, default_value = "30")]
        keep_days: i64,
        /// Do not ask for confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Where the log lives and what it holds
    Info {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: LogAction) -> Result<()> {
    let log = LoggingService::new(&get_data_dir()?, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))?;
    match action {
        LogAction::Tail { count, failures, json } => tail(&log, count, failures, json),
        LogAction::Prune { keep_days, yes } => prune(&log, keep_days, yes),
        LogAction::Info { json } => info(&log, json),
    }
}

fn local_time(timestamp_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "?".to_string())
}

fn tail(log: &LoggingService, count: usize, failures: bool, json: bool) -> Result<()> {
    let mut entries = if failures {
        log.get_errors(count)?
    } else {
        log.get_recent(count)?
    };
    entries.reverse();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        output::info("Log is empty");
        return Ok(());
    }

    for entry in &entries {
        println!("{}", describe(entry));
    }
    Ok(())
}

/// One line per entry: time, command (or event), then the failure if any
fn describe(entry: &LogEntry) -> String {
    let what = entry.command.as_deref().unwrap_or(entry.event.as_str());
    let stamp = local_time(entry.timestamp).dimmed();
    match &entry.error_message {
        Some(msg) => format!("{} {} {}", stamp, what.red(), msg),
        None => format!("{} {}", stamp, what),
    }
}

fn prune(log: &LoggingService, keep_days: i64, yes: bool) -> Result<()> {
    let cutoff = Utc::now() - Duration::days(keep_days.clamp(0, 36_500));
    let confirmed = yes
        || Confirm::new()
            .with_prompt(format!("Drop log entries from before {}?", cutoff.with_timezone(&Local).format("%Y-%m-%d")))
            .default(false)
            .interact()?;
    if !confirmed {
        return Ok(());
    }

    let dropped = log.delete_before(cutoff.timestamp_millis())?;
    output::success(&format!("Dropped {} entr{}", dropped, if dropped == 1 { "y" } else { "ies" }));
    Ok(())
}

fn info(log: &LoggingService, json: bool) -> Result<()> {
    let entries = log.get_recent(usize::MAX)?;
    let failures = entries.iter().filter(|e| e.error_message.is_some()).count();
    // newest first
    let newest = entries.first().map(|e| local_time(e.timestamp));
    let oldest = entries.last().map(|e| local_time(e.timestamp));

    if json {
        let summary = json!({
            "path": log.path().display().to_string(),
            "entries": entries.len(),
            "failures": failures,
            "oldest": oldest,
            "newest": newest,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", log.path().display());
    println!("{} entries, {} failures", entries.len(), failures);
    if let (Some(oldest), Some(newest)) = (oldest, newest) {
        println!("{} .. {}", oldest, newest);
    }
    Ok(())
}
