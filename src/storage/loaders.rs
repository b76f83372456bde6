//! Hydrate a ticket's child collections from the child tables.

use crate::error::Result;
use crate::model::{Comment, Ticket};
use crate::storage::backend::{SqlConnection, SqlValue};
use crate::storage::store::parse_timestamp;
use std::collections::BTreeSet;

/// Tags of a ticket, in lexical order.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn load_tags(conn: &mut dyn SqlConnection, ticket_id: i64) -> Result<BTreeSet<String>> {
    conn.query(
        "SELECT tag FROM ticket_tags WHERE ticket_id = ? ORDER BY tag",
        &[SqlValue::Integer(ticket_id)],
    )?
    .iter()
    .map(|row| row.get_string(0))
    .collect()
}

/// Files of a ticket, in insertion order.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn load_files(conn: &mut dyn SqlConnection, ticket_id: i64) -> Result<Vec<String>> {
    conn.query(
        "SELECT file_path FROM ticket_files WHERE ticket_id = ? ORDER BY id",
        &[SqlValue::Integer(ticket_id)],
    )?
    .iter()
    .map(|row| row.get_string(0))
    .collect()
}

/// Comment rows of a ticket, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn load_comment_records(conn: &mut dyn SqlConnection, ticket_id: i64) -> Result<Vec<Comment>> {
    conn.query(
        "SELECT id, ticket_id, comment_text, created_at
         FROM ticket_comments
         WHERE ticket_id = ?
         ORDER BY created_at, id",
        &[SqlValue::Integer(ticket_id)],
    )?
    .iter()
    .map(|row| {
        Ok(Comment {
            id: row.get_i64(0)?,
            ticket_id: row.get_i64(1)?,
            text: row.get_string(2)?,
            created_at: parse_timestamp(&row.get_string(3)?, 3)?,
        })
    })
    .collect()
}

/// Comment texts of a ticket, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a row cannot be decoded.
pub fn load_comments(conn: &mut dyn SqlConnection, ticket_id: i64) -> Result<Vec<String>> {
    Ok(load_comment_records(conn, ticket_id)?
        .into_iter()
        .map(|comment| comment.text)
        .collect())
}

/// Fill `tags`, `files` and `comments` of a ticket read from the main table.
///
/// # Errors
///
/// Returns an error if any of the child queries fails.
pub fn hydrate(conn: &mut dyn SqlConnection, ticket: &mut Ticket, ticket_id: i64) -> Result<()> {
    ticket.tags = load_tags(conn, ticket_id)?;
    ticket.files = load_files(conn, ticket_id)?;
    ticket.comments = load_comments(conn, ticket_id)?;
    Ok(())
}
