//! Command-line front end.
//!
//! Each submodule is one top-level subcommand with a clap `Args` struct and
//! an async `cmd` entry point. Commands open the store through [`Db::new`],
//! hand clones to the repositories they need, and print through the
//! `msg_*` macros and [`View`](crate::libs::view::View).

pub mod init;
#[cfg(debug_assertions)]
pub mod migrations;
pub mod session;
pub mod stats;
pub mod student;
pub mod tool;
pub mod usage;

use crate::libs::error::WorkshopError;
use crate::libs::messages::{print_validation, Message};
use crate::{msg_error, msg_error_anyhow};
use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Manage students", arg_required_else_help = true)]
    Student(student::StudentArgs),
    #[command(about = "Manage the tool inventory", arg_required_else_help = true)]
    Tool(tool::ToolArgs),
    #[command(about = "Schedule and run workshop sessions", arg_required_else_help = true)]
    Session(session::SessionArgs),
    #[command(about = "Record tool wear during sessions", arg_required_else_help = true)]
    Usage(usage::UsageArgs),
    #[command(about = "Show workshop statistics")]
    Stats(stats::StatsArgs),
    #[cfg(debug_assertions)]
    #[command(about = "Inspect database migrations (debug builds only)")]
    Migrations(migrations::MigrationsArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Student(args) => student::cmd(args).await,
            Commands::Tool(args) => tool::cmd(args).await,
            Commands::Session(args) => session::cmd(args).await,
            Commands::Usage(args) => usage::cmd(args).await,
            Commands::Stats(args) => stats::cmd(args).await,
            #[cfg(debug_assertions)]
            Commands::Migrations(args) => migrations::cmd(args).await,
        }
    }
}

/// Shows an expected repository failure to the user.
///
/// Store faults are propagated instead, they are not the user's doing.
pub(crate) fn report(err: WorkshopError) -> Result<()> {
    match err {
        WorkshopError::Validation(result) => {
            print_validation(&result.errors);
            Ok(())
        }
        WorkshopError::Database(_) | WorkshopError::Io(_) => Err(err.into()),
        other => {
            msg_error!(other.user_message());
            Ok(())
        }
    }
}

/// Parses `YYYY-MM-DD`.
pub(crate) fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| msg_error_anyhow!(Message::DateInvalid(value.to_string())))
}

pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Current wall clock time as `HH:MM`.
pub(crate) fn now_hhmm() -> String {
    Local::now().format("%H:%M").to_string()
}
