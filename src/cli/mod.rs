//! Command-line interface.
//!
//! # Commands
//!
//! - `create`: Create a ticket in a project
//! - `view`: Show one ticket by id or title
//! - `update`: Change fields of an existing ticket
//! - `delete`: Delete a ticket and its tags, files and comments
//! - `list`: List tickets with optional filters
//! - `source`: Show or switch the database backend
//!
//! Enumerated values (`--type`, `--status`, `--priority`) are taken as text
//! and validated by the commands, so a bad value surfaces as a validation
//! error with the allowed values listed.

pub mod commands;

use crate::config::{self, BackendKind, RemoteCredentials};
use crate::error::Result;
use crate::storage::TicketStore;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::debug;

/// Alexandria - project ticket tracker
///
/// Tickets are stored in a local SQLite file under `$ALEXANDRIA_DIR`
/// (default `~/Alexandria`) or in a remote libSQL database.
#[derive(Parser, Debug)]
#[command(name = "alexandria")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Local database file (default: <data dir>/tickets.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Also write JSON logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create a new ticket
    Create(CreateArgs),

    /// View a single ticket's details
    View(ViewArgs),

    /// Update an existing ticket
    ///
    /// Only the given fields change. Tags and files replace the current
    /// lists; comments are added to the existing ones.
    Update(UpdateArgs),

    /// Delete a ticket and everything attached to it
    Delete(DeleteArgs),

    /// List tickets, newest first
    List(ListArgs),

    /// Switch between the local-file and remote databases
    Source(SourceArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct CreateArgs {
    /// Ticket title
    #[arg(short, long)]
    pub title: String,

    /// Project name
    #[arg(long)]
    pub project: String,

    #[arg(short, long)]
    pub description: Option<String>,

    /// Ticket type (bug, feature, task)
    #[arg(long = "type", default_value = "task")]
    pub ticket_type: String,

    /// Ticket priority (undefined, low, medium, high)
    #[arg(short, long, default_value = "undefined")]
    pub priority: String,

    /// Mark the ticket as on the critical path
    #[arg(short = 'c', long = "criticalpath", visible_alias = "critical-path")]
    pub critical_path: bool,

    #[arg(short, long)]
    pub assigned_to: Option<String>,

    #[arg(long)]
    pub created_by: Option<String>,

    /// Comma-separated tags
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Comma-separated file paths
    #[arg(long, value_delimiter = ',')]
    pub files: Vec<String>,

    /// Comma-separated comments
    #[arg(long, value_delimiter = ',')]
    pub comments: Vec<String>,

    /// Print the created ticket as JSON
    #[arg(long)]
    pub json: bool,
}

/// Identifies one ticket: `--id` wins over `--title`.
#[derive(Parser, Debug, Clone)]
pub struct TicketRef {
    /// Ticket id
    #[arg(short, long)]
    pub id: Option<i64>,

    /// Ticket title (first match within the project)
    #[arg(short, long)]
    pub title: Option<String>,

    /// Project name
    #[arg(short, long)]
    pub project: String,
}

#[derive(Parser, Debug, Clone)]
pub struct ViewArgs {
    #[command(flatten)]
    pub target: TicketRef,

    /// Print the ticket as JSON
    #[arg(long)]
    pub json: bool,

    /// Show comments with their timestamps
    #[arg(long)]
    pub history: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct UpdateArgs {
    /// Ticket id
    #[arg(short, long)]
    pub id: Option<i64>,

    /// Find the ticket by title
    #[arg(short, long)]
    pub title: Option<String>,

    /// Project name
    #[arg(long)]
    pub project: String,

    #[arg(long)]
    pub new_title: Option<String>,

    #[arg(short, long)]
    pub description: Option<String>,

    /// New type (bug, feature, task)
    #[arg(long = "type")]
    pub ticket_type: Option<String>,

    /// New status (open, in-progress, closed)
    #[arg(long)]
    pub status: Option<String>,

    /// New priority (undefined, low, medium, high)
    #[arg(short, long)]
    pub priority: Option<String>,

    /// Set or clear the critical path flag
    #[arg(short = 'c', long = "criticalpath", visible_alias = "critical-path")]
    pub critical_path: Option<bool>,

    #[arg(short, long)]
    pub assigned_to: Option<String>,

    /// Comma-separated tags (replaces existing)
    #[arg(long, value_delimiter = ',')]
    pub tags: Option<Vec<String>>,

    /// Comma-separated file paths (replaces existing)
    #[arg(long, value_delimiter = ',')]
    pub files: Option<Vec<String>>,

    /// Comma-separated comments to add
    #[arg(long, value_delimiter = ',')]
    pub comments: Option<Vec<String>>,

    /// Print the updated ticket as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub target: TicketRef,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    Json,
    #[default]
    Table,
    Summary,
}

#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    #[arg(long)]
    pub project: Option<String>,

    /// Filter by status (open, in-progress, closed)
    #[arg(long)]
    pub status: Option<String>,

    /// Filter by type (bug, feature, task)
    #[arg(long = "type")]
    pub ticket_type: Option<String>,

    /// Filter by priority (undefined, low, medium, high)
    #[arg(long)]
    pub priority: Option<String>,

    #[arg(long)]
    pub assigned_to: Option<String>,

    /// Tickets with any of these comma-separated tags
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Maximum number of tickets
    #[arg(short = 'n', long)]
    pub limit: Option<u32>,

    #[arg(short = 'o', long = "format", visible_alias = "output", value_enum, default_value_t)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug, Clone)]
pub struct SourceArgs {
    /// Backend to switch to (local-file or remote; sqlite/turso also accepted)
    #[arg(required_unless_present = "status")]
    pub backend: Option<String>,

    /// Show the current database configuration
    #[arg(long)]
    pub status: bool,
}

/// Per-invocation state: where data lives and the (lazily opened) store.
#[derive(Debug)]
pub struct Session {
    pub data_dir: PathBuf,
    pub db_override: Option<PathBuf>,
    store: Option<TicketStore>,
}

impl Session {
    #[must_use]
    pub const fn new(data_dir: PathBuf, db_override: Option<PathBuf>) -> Self {
        Self {
            data_dir,
            db_override,
            store: None,
        }
    }

    /// The store for the configured backend, connecting on first use.
    ///
    /// # Errors
    ///
    /// Returns a configuration or connection error.
    pub fn store(&mut self) -> Result<&mut TicketStore> {
        if self.store.is_none() {
            let (store, config) = config::open_store(&self.data_dir, self.db_override.as_deref())?;
            debug!(backend = %config.database_type, "Store opened");
            self.store = Some(store);
        }
        self.store.as_mut().ok_or(crate::error::TicketError::ConnectionClosed)
    }

    /// Close any open store, connect to `kind`, then persist the selection.
    ///
    /// The selection file is only rewritten once the new backend answered.
    ///
    /// # Errors
    ///
    /// Returns `ConfigMissing` for a remote switch without credentials, or
    /// the connection error of the new backend.
    pub fn switch(&mut self, kind: BackendKind, credentials: &RemoteCredentials) -> Result<()> {
        if kind == BackendKind::Remote {
            credentials.validate()?;
        }
        self.close()?;

        let store = config::open_store_with(
            kind,
            &self.data_dir,
            self.db_override.as_deref(),
            credentials,
        )?;
        config::switch_backend(&self.data_dir, kind, credentials)?;
        self.store = Some(store);
        Ok(())
    }

    /// Close the store if one is open.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if closing fails.
    pub fn close(&mut self) -> Result<()> {
        match self.store.take() {
            Some(mut store) => store.close(),
            None => Ok(()),
        }
    }
}

/// Run one parsed command line.
///
/// # Errors
///
/// Returns the command's error; the caller maps it to an exit code.
pub fn run(cli: &Cli) -> Result<()> {
    let data_dir = config::data_dir()?;
    debug!(data_dir = %data_dir.display(), "Resolved data directory");
    let mut session = Session::new(data_dir, cli.db.clone());

    let result = match &cli.command {
        Commands::Create(args) => commands::create::execute(args, &mut session),
        Commands::View(args) => commands::view::execute(args, &mut session),
        Commands::Update(args) => commands::update::execute(args, &mut session),
        Commands::Delete(args) => commands::delete::execute(args, &mut session),
        Commands::List(args) => commands::list::execute(args, &mut session),
        Commands::Source(args) => commands::source::execute(args, &mut session),
    };

    let closed = session.close();
    result.and(closed)
}

/// Trim entries and drop empty ones from a comma-separated flag.
#[must_use]
pub fn clean_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}
