//! Biblio CLI - a small lending library in your terminal

use std::process::ExitCode;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use biblio_core::LogEvent;
use commands::{books, circulation, doctor, get_logger, log_event, logs, notify, status, users};

/// Biblio - book copies, loans and reservations for a small library
#[derive(Parser)]
#[command(name = "biblio", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show catalog and circulation summary
    Status {
        /// Compute overdue penalties as of this day (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage book copies
    Books {
        #[command(subcommand)]
        command: books::BooksCommands,
    },

    /// Lend a copy to a user
    Borrow {
        /// Copy ID
        copy_id: String,
        /// User ID
        user_id: String,
        /// Loan start day (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Take back a borrowed copy
    Return {
        /// Copy ID
        copy_id: String,
        /// Return day used for the penalty (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Hold an available copy for a user
    Reserve {
        /// Copy ID
        copy_id: String,
        /// User ID
        user_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Cancel the reservation on a copy
    Cancel {
        /// Copy ID
        copy_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage library users
    Users {
        #[command(subcommand)]
        command: users::UsersCommands,
    },

    /// Send a message to every user with an email address
    Notify {
        /// Message subject
        subject: String,
        /// Message body
        body: String,
        /// Librarian password (prompted if omitted)
        #[arg(long)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run data file health checks
    Doctor {
        /// Show details for each finding
        #[arg(long, short)]
        verbose: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the activity log
    Logs {
        #[command(subcommand)]
        command: logs::LogAction,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Status { .. } => "status",
            Commands::Books { command } => command.name(),
            Commands::Borrow { .. } => "borrow",
            Commands::Return { .. } => "return",
            Commands::Reserve { .. } => "reserve",
            Commands::Cancel { .. } => "cancel",
            Commands::Users { command } => command.name(),
            Commands::Notify { .. } => "notify",
            Commands::Doctor { .. } => "doctor",
            Commands::Logs { .. } => "logs",
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("BIBLIO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let name = cli.command.name();
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command(name));

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("command_failed")
                    .with_command(name)
                    .with_error(e.to_string()),
            );
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Status { date, json } => status::run(date, json),
        Commands::Books { command } => books::run(command),
        Commands::Borrow { copy_id, user_id, date, json } => {
            circulation::borrow(&copy_id, &user_id, date, json)
        }
        Commands::Return { copy_id, date, json } => circulation::return_copy(&copy_id, date, json),
        Commands::Reserve { copy_id, user_id, json } => circulation::reserve(&copy_id, &user_id, json),
        Commands::Cancel { copy_id, json } => circulation::cancel(&copy_id, json),
        Commands::Users { command } => users::run(command),
        Commands::Notify { subject, body, password, json } => {
            notify::run(&subject, &body, password, json)
        }
        Commands::Doctor { verbose, json } => doctor::run(verbose, json),
        Commands::Logs { command } => logs::run(command),
    }
}
