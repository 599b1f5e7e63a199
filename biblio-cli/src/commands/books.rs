//! Books command - list, add and remove copies

use anyhow::Result;
use biblio_core::services::CopyFilter;
use biblio_core::{BookCopy, BookTemplate, CopyState, CopyStatus};
use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use colored::Colorize;
use comfy_table::{Cell, Color};
use dialoguer::Confirm;

use super::{day_or_today, finish, get_context, require_librarian};
use crate::output::{self, create_table, format_penalty};

#[derive(Clone, Copy, ValueEnum)]
pub enum StateFilter {
    Available,
    Borrowed,
    Reserved,
    Overdue,
}

#[derive(Subcommand)]
pub enum BooksCommands {
    /// List copies in the catalog
    List {
        /// Only copies of this ISBN
        #[arg(long)]
        isbn: Option<String>,
        /// Only copies in this state
        #[arg(long, value_enum)]
        state: Option<StateFilter>,
        /// Day used for overdue checks (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add copies of a title (librarian only)
    Add {
        title: String,
        author: String,
        isbn: String,
        /// Number of copies to add
        #[arg(long, short = 'n', default_value = "1")]
        copies: usize,
        /// Librarian password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove an available copy (librarian only)
    Remove {
        /// Copy ID
        copy_id: String,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
        /// Librarian password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl BooksCommands {
    pub fn name(&self) -> &'static str {
        match self {
            BooksCommands::List { .. } => "books list",
            BooksCommands::Add { .. } => "books add",
            BooksCommands::Remove { .. } => "books remove",
        }
    }
}

fn holder(copy: &BookCopy) -> String {
    match &copy.state {
        CopyState::Available => String::new(),
        CopyState::Borrowed(loan) => loan.borrower.clone(),
        CopyState::Reserved { by } => by.clone(),
    }
}

pub fn run(command: BooksCommands) -> Result<()> {
    match command {
        BooksCommands::List { isbn, state, date, json } => {
            let ctx = get_context()?;
            let as_of = day_or_today(date);
            let filter = CopyFilter {
                isbn,
                status: state.and_then(|s| match s {
                    StateFilter::Available => Some(CopyStatus::Available),
                    StateFilter::Borrowed => Some(CopyStatus::Borrowed),
                    StateFilter::Reserved => Some(CopyStatus::Reserved),
                    StateFilter::Overdue => None,
                }),
                overdue_as_of: matches!(state, Some(StateFilter::Overdue)).then_some(as_of),
            };
            let copies = ctx.catalog_service.list(&filter);

            if json {
                println!("{}", serde_json::to_string_pretty(&copies)?);
                return Ok(());
            }

            if copies.is_empty() {
                println!("No copies found.");
                return Ok(());
            }

            let mut table = create_table();
            table.set_header(vec!["ID", "Title", "Author", "ISBN", "Status", "Holder", "Due"]);
            for copy in &copies {
                let status = match copy.status() {
                    CopyStatus::Available => Cell::new("Available").fg(Color::Green),
                    CopyStatus::Borrowed => Cell::new("Borrowed").fg(Color::Yellow),
                    CopyStatus::Reserved => Cell::new("Reserved").fg(Color::Cyan),
                };
                let due = match copy.loan() {
                    Some(loan) if loan.is_overdue(as_of) => {
                        Cell::new(format!("OVERDUE: {}", format_penalty(loan.penalty(as_of))))
                            .fg(Color::Red)
                    }
                    Some(loan) => Cell::new(loan.due_on),
                    None => Cell::new(""),
                };
                table.add_row(vec![
                    Cell::new(&copy.id),
                    Cell::new(&copy.title),
                    Cell::new(&copy.author),
                    Cell::new(&copy.isbn),
                    status,
                    Cell::new(holder(copy)),
                    due,
                ]);
            }
            println!("{}", table);
        }
        BooksCommands::Add { title, author, isbn, copies, password, json } => {
            let ctx = get_context()?;
            require_librarian(&ctx, password)?;

            let template = BookTemplate::new(title, author, isbn);
            let result = ctx.catalog_service.add_copies(&template, copies);
            finish(result, json, |added| {
                output::success(&format!("Added {} copies", added.len()));
                for copy in added {
                    println!("  {}", copy.id);
                }
            })?;
        }
        BooksCommands::Remove { copy_id, force, password, json } => {
            let ctx = get_context()?;
            require_librarian(&ctx, password)?;

            if !force && !json {
                let copy = ctx.catalog_service.get(&copy_id)?;
                println!(
                    "\n{}",
                    format!("This will remove copy {} of '{}'.", copy.id, copy.title).yellow()
                );
                if !Confirm::new()
                    .with_prompt("Are you sure?")
                    .default(false)
                    .interact()?
                {
                    println!("{}\n", "Cancelled".dimmed());
                    return Ok(());
                }
            }

            let result = ctx.catalog_service.remove_copy(&copy_id);
            finish(result, json, |removed| {
                output::success(&format!("Copy {} removed", removed.id));
            })?;
        }
    }

    Ok(())
}
