//! Storage layer for `alexandria`.
//!
//! Tickets live in four tables (tickets plus tag, file and comment child
//! tables) behind a pluggable backend:
//!
//! - [`backend`] - Connection seam, backend registry, owned handle
//! - [`local`] - Local `SQLite` file backend
//! - [`remote`] - Remote libSQL backend over HTTP
//! - [`schema`] - Table definitions and bootstrap
//! - [`filter`] - Listing query builder
//! - [`loaders`] - Child collection hydration
//! - [`store`] - Transactional ticket operations

pub mod backend;
pub mod filter;
pub mod loaders;
pub mod local;
pub mod remote;
pub mod schema;
pub mod store;

pub use backend::{BackendRegistry, ConnectParams, DbHandle, LOCAL_FILE, REMOTE, SqlConnection};
pub use filter::{ListFilters, ListQuery, build_list_query};
pub use store::TicketStore;
