//! `alexandria` - project ticket tracker library
//!
//! Tickets with tags, files and comments, stored through one transactional
//! engine on either a local `SQLite` file or a remote libSQL database.
//!
//! # Architecture
//!
//! - [`model`] - Ticket types and lookup keys
//! - [`storage`] - Backends, schema, query builder, persistence engine
//! - [`config`] - Data directory, backend selection, credentials
//! - [`cli`] - Command-line interface using clap
//! - [`format`] - Human-readable output
//! - [`error`] - Error types and exit codes
//! - [`logging`] - Tracing setup

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod model;
pub mod storage;

pub use error::{ErrorCode, Result, TicketError};
pub use model::{Comment, Priority, Status, Ticket, TicketKey, TicketType};
pub use storage::{ListFilters, TicketStore};
