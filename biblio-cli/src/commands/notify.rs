//! Notify command - broadcast a message to users (librarian only)

use anyhow::Result;

use super::{get_context, require_librarian};
use crate::output;

pub fn run(subject: &str, body: &str, password: Option<String>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    require_librarian(&ctx, password)?;

    let report = ctx.notify_service.notify_all(subject, body);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    output::success(&format!("Sent to {} user(s)", report.sent));
    if report.skipped > 0 {
        output::info(&format!("{} user(s) skipped: no email address", report.skipped));
    }
    Ok(())
}
