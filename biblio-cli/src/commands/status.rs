//! Status command - catalog and circulation summary

use anyhow::Result;
use chrono::NaiveDate;
use colored::Colorize;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use super::{day_or_today, get_context};
use crate::output::{create_table, format_penalty};

pub fn run(date: Option<NaiveDate>, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let status = ctx.status_service.get_status(day_or_today(date));

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", format!("Library Status ({})", status.as_of).bold());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec!["Copies", &status.total_copies.to_string()]);
    table.add_row(vec!["Available", &status.available.to_string()]);
    table.add_row(vec!["Borrowed", &status.borrowed.to_string()]);
    table.add_row(vec!["Reserved", &status.reserved.to_string()]);
    table.add_row(vec!["Users", &status.total_users.to_string()]);

    println!("{}", table);
    println!();

    if !status.titles.is_empty() {
        println!("{}", "Titles".bold());
        let mut titles = create_table();
        titles.set_header(vec!["ISBN", "Title", "Author", "Available"]);
        for title in &status.titles {
            titles.add_row(vec![
                title.isbn.clone(),
                title.title.clone(),
                title.author.clone(),
                format!("{}/{}", title.available, title.copies),
            ]);
        }
        println!("{}", titles);
        println!();
    }

    if !status.overdue.is_empty() {
        println!("{}", "Overdue".red().bold());
        let mut overdue = create_table();
        overdue.set_header(vec!["Copy", "Title", "Borrower", "Due", "Days", "Penalty"]);
        for copy in &status.overdue {
            overdue.add_row(vec![
                Cell::new(&copy.copy_id),
                Cell::new(&copy.title),
                Cell::new(&copy.borrower),
                Cell::new(copy.due_on),
                Cell::new(copy.overdue_days),
                Cell::new(format_penalty(copy.penalty)).fg(Color::Red),
            ]);
        }
        println!("{}", overdue);
        println!("Outstanding penalties: {}", format_penalty(status.outstanding_penalty).red());
    }

    Ok(())
}
