//! Users command - registration, login and lookup

use anyhow::Result;
use biblio_core::{CopyState, Identity};
use chrono::NaiveDate;
use clap::Subcommand;
use colored::Colorize;

use super::{day_or_today, finish, get_context};
use crate::output::{self, create_table, format_penalty};

#[derive(Subcommand)]
pub enum UsersCommands {
    /// List registered users
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Find your account by name, phone and email, creating it if new
    Login {
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        email: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Register a new user
    Register {
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        email: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a user and the copies they hold
    Show {
        /// User ID
        user_id: String,
        /// Day used for penalties (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl UsersCommands {
    pub fn name(&self) -> &'static str {
        match self {
            UsersCommands::List { .. } => "users list",
            UsersCommands::Login { .. } => "users login",
            UsersCommands::Register { .. } => "users register",
            UsersCommands::Show { .. } => "users show",
        }
    }
}

pub fn run(command: UsersCommands) -> Result<()> {
    match command {
        UsersCommands::List { json } => {
            let ctx = get_context()?;
            let users = ctx.member_service.list();

            if json {
                println!("{}", serde_json::to_string_pretty(&users)?);
                return Ok(());
            }

            if users.is_empty() {
                println!("No users registered.");
                return Ok(());
            }

            let mut table = create_table();
            table.set_header(vec!["ID", "Name", "Phone", "Email"]);
            for user in users {
                table.add_row(vec![user.id, user.name, user.phone, user.email]);
            }
            println!("{}", table);
        }
        UsersCommands::Login { name, phone, email, json } => {
            let ctx = get_context()?;
            let result = ctx
                .member_service
                .login_or_register(&Identity::new(name, phone, email));
            finish(result, json, |login| {
                if login.created {
                    output::success(&format!("Welcome, {}! Your account has been created.", login.user.name));
                } else {
                    output::success(&format!("Welcome back, {}!", login.user.name));
                }
                println!("  User ID: {}", login.user.id);
            })?;
        }
        UsersCommands::Register { name, phone, email, json } => {
            let ctx = get_context()?;
            let result = ctx.member_service.register(&Identity::new(name, phone, email));
            finish(result, json, |user| {
                output::success(&format!("Registered {}", user.name));
                println!("  User ID: {}", user.id);
            })?;
        }
        UsersCommands::Show { user_id, date, json } => {
            let ctx = get_context()?;
            let user = ctx.member_service.find_by_id(&user_id)?;
            let copies = ctx.circulation_service.copies_for_user(&user.id);

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "user": user,
                        "copies": copies,
                    }))?
                );
                return Ok(());
            }

            println!("{}", user.name.bold());
            println!("  Phone: {}", user.phone);
            println!("  Email: {}", user.email);
            println!();

            if copies.is_empty() {
                output::info("No borrowed or reserved copies.");
                return Ok(());
            }

            let as_of = day_or_today(date);
            let mut table = create_table();
            table.set_header(vec!["Copy", "Title", "State", "Due"]);
            for copy in copies {
                let (state, due) = match &copy.state {
                    CopyState::Borrowed(loan) if loan.is_overdue(as_of) => (
                        "Borrowed".to_string(),
                        format!("OVERDUE: {}", format_penalty(loan.penalty(as_of))),
                    ),
                    CopyState::Borrowed(loan) => ("Borrowed".to_string(), loan.due_on.to_string()),
                    other => (other.status().to_string(), String::new()),
                };
                table.add_row(vec![copy.id, copy.title, state, due]);
            }
            println!("{}", table);
        }
    }

    Ok(())
}
