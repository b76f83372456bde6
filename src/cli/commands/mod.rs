//! Command implementations.

pub mod create;
pub mod delete;
pub mod list;
pub mod source;
pub mod update;
pub mod view;
