//! Ticket persistence engine.
//!
//! Every public operation runs inside exactly one transaction on the
//! store's connection. The transaction commits only after every statement
//! succeeded; any error rolls the whole operation back.

use crate::error::{Result, TicketError};
use crate::model::{Comment, Priority, Status, Ticket, TicketKey, TicketType};
use crate::storage::backend::{
    BackendRegistry, ConnectParams, DbHandle, LOCAL_FILE, Row, SqlConnection, SqlValue, TxMode,
};
use crate::storage::filter::{ListFilters, TICKET_COLUMNS, build_list_query};
use crate::storage::loaders::{hydrate, load_comment_records};
use crate::storage::local::MEMORY_PATH;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeZone, Timelike, Utc};
use std::path::Path;
use tracing::{debug, info, warn};

/// Ticket store over one open backend connection.
#[derive(Debug)]
pub struct TicketStore {
    handle: DbHandle,
}

impl TicketStore {
    #[must_use]
    pub const fn new(handle: DbHandle) -> Self {
        Self { handle }
    }

    /// Open (or create) a local database file with the schema applied.
    ///
    /// # Errors
    ///
    /// Returns a connection or schema error if the database cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        BackendRegistry::with_defaults()
            .connect(LOCAL_FILE, &ConnectParams::local(path))
            .map(Self::new)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created.
    pub fn open_memory() -> Result<Self> {
        Self::open(Path::new(MEMORY_PATH))
    }

    /// Kind name of the backend behind this store.
    #[must_use]
    pub fn backend(&self) -> &str {
        self.handle.kind()
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    /// Direct access to the connection, for callers that need raw SQL.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionClosed` once the store is closed.
    pub fn connection(&mut self) -> Result<&mut dyn SqlConnection> {
        self.handle.connection()
    }

    /// Close the underlying connection. Closing twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if closing fails.
    pub fn close(&mut self) -> Result<()> {
        self.handle.close()
    }

    /// Run `f` inside one transaction: begin, run, then commit, or roll
    /// back if anything failed.
    fn transaction<F, R>(&mut self, op: &str, mode: TxMode, f: F) -> Result<R>
    where
        F: FnOnce(&mut dyn SqlConnection) -> Result<R>,
    {
        let conn = self.handle.connection()?;
        conn.begin(mode)?;

        let result = f(&mut *conn).and_then(|value| conn.commit().map(|()| value));
        if let Err(ref err) = result {
            debug!(op = %op, error = %err, "Rolling back transaction");
            if let Err(rollback_err) = conn.rollback() {
                warn!(op = %op, error = %rollback_err, "Rollback failed");
            }
        }
        result
    }

    /// Create a ticket in `project`, with its tags, files and comments.
    ///
    /// The id and both timestamps are assigned here; any values on the
    /// input are ignored. Each comment gets its own creation time.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank title or project, or a
    /// `Write` error if any statement fails (nothing is stored then).
    pub fn create_ticket(&mut self, ticket: &Ticket, project: &str) -> Result<Ticket> {
        let mut ticket = ticket.clone();
        ticket.project = project.to_string();
        ticket.validate()?;

        let now = now_micros();
        ticket.created_at = now;
        ticket.updated_at = now;

        let id = self
            .transaction("create", TxMode::Write, |conn| {
                let outcome = conn.execute(
                    "INSERT INTO tickets (
                        project, type, title, description, critical_path,
                        status, priority, created_by, assigned_to,
                        created_at, updated_at
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    &[
                        SqlValue::from(&ticket.project),
                        ticket.ticket_type.as_str().into(),
                        SqlValue::from(&ticket.title),
                        ticket.description.clone().into(),
                        ticket.critical_path.into(),
                        ticket.status.as_str().into(),
                        ticket.priority.as_str().into(),
                        ticket.created_by.clone().into(),
                        ticket.assigned_to.clone().into(),
                        format_timestamp(&ticket.created_at).into(),
                        format_timestamp(&ticket.updated_at).into(),
                    ],
                )?;
                let id = outcome.last_insert_id.ok_or_else(|| TicketError::Remote {
                    message: "store did not report the new ticket id".to_string(),
                    code: None,
                })?;

                insert_tags(conn, id, ticket.tags.iter())?;
                insert_files(conn, id, &ticket.files)?;
                insert_comments(conn, id, &ticket.comments)?;
                Ok(id)
            })
            .map_err(|err| err.into_write("create", &format!("'{}'", ticket.title)))?;

        ticket.id = Some(id);
        info!(id, project = %ticket.project, title = %ticket.title, "Created ticket");
        Ok(ticket)
    }

    /// Fetch one ticket with its child collections.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the key resolves to no ticket in `project`.
    pub fn view_ticket(&mut self, project: &str, key: &TicketKey) -> Result<Ticket> {
        self.transaction("view", TxMode::Read, |conn| {
            let id = resolve_ticket_id(conn, project, key)?;
            fetch_ticket(conn, project, id, key)
        })
    }

    /// Overwrite a ticket's scalar fields, replace its tags and files, and
    /// append `ticket.comments` to the existing comments.
    ///
    /// `created_by`, `created_at` and the id are never changed. Returns the
    /// ticket as stored after the update.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank title, `NotFound` if the key
    /// resolves to nothing or the row vanished, or a `Write` error if a
    /// statement fails. Nothing is changed on error.
    pub fn update_ticket(
        &mut self,
        ticket: &Ticket,
        project: &str,
        key: &TicketKey,
    ) -> Result<Ticket> {
        let mut checked = ticket.clone();
        checked.project = project.to_string();
        checked.validate()?;

        let updated = self
            .transaction("update", TxMode::Write, |conn| {
                let id = resolve_ticket_id(conn, project, key)?;
                let now = now_micros();

                let outcome = conn.execute(
                    "UPDATE tickets
                     SET type = ?, title = ?, description = ?, critical_path = ?,
                         status = ?, priority = ?, assigned_to = ?, updated_at = ?
                     WHERE id = ? AND project = ?",
                    &[
                        ticket.ticket_type.as_str().into(),
                        SqlValue::from(&ticket.title),
                        ticket.description.clone().into(),
                        ticket.critical_path.into(),
                        ticket.status.as_str().into(),
                        ticket.priority.as_str().into(),
                        ticket.assigned_to.clone().into(),
                        format_timestamp(&now).into(),
                        id.into(),
                        project.into(),
                    ],
                )?;
                if outcome.rows_affected == 0 {
                    return Err(TicketError::not_found(project, key.to_string()));
                }

                conn.execute(
                    "DELETE FROM ticket_tags WHERE ticket_id = ?",
                    &[id.into()],
                )?;
                insert_tags(conn, id, ticket.tags.iter())?;

                conn.execute(
                    "DELETE FROM ticket_files WHERE ticket_id = ?",
                    &[id.into()],
                )?;
                insert_files(conn, id, &ticket.files)?;

                insert_comments(conn, id, &ticket.comments)?;

                fetch_ticket(conn, project, id, key)
            })
            .map_err(|err| err.into_write("update", &key.to_string()))?;

        info!(id = ?updated.id, project = %project, "Updated ticket");
        Ok(updated)
    }

    /// Delete a ticket and all of its child rows. Returns the deleted id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the key resolves to nothing, or a `Write`
    /// error if a statement fails. Nothing is changed on error.
    pub fn delete_ticket(&mut self, project: &str, key: &TicketKey) -> Result<i64> {
        let id = self
            .transaction("delete", TxMode::Write, |conn| {
                let id = resolve_ticket_id(conn, project, key)?;

                for table in ["ticket_tags", "ticket_files", "ticket_comments"] {
                    let outcome = conn.execute(
                        &format!("DELETE FROM {table} WHERE ticket_id = ?"),
                        &[id.into()],
                    )?;
                    debug!(id, table, rows = outcome.rows_affected, "Deleted child rows");
                }

                let outcome = conn.execute(
                    "DELETE FROM tickets WHERE id = ? AND project = ?",
                    &[id.into(), project.into()],
                )?;
                if outcome.rows_affected == 0 {
                    return Err(TicketError::not_found(project, key.to_string()));
                }
                Ok(id)
            })
            .map_err(|err| err.into_write("delete", &key.to_string()))?;

        info!(id, project = %project, "Deleted ticket");
        Ok(id)
    }

    /// List tickets matching `filters`, newest first, fully hydrated.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a row cannot be decoded.
    pub fn list_tickets(&mut self, filters: &ListFilters) -> Result<Vec<Ticket>> {
        let query = build_list_query(filters);
        debug!(sql = %query.sql, params = query.params.len(), "Listing tickets");

        let tickets = self.transaction("list", TxMode::Read, |conn| {
            let rows = conn.query(&query.sql, &query.params)?;
            let mut tickets = Vec::with_capacity(rows.len());
            for row in &rows {
                let (id, mut ticket) = ticket_from_row(row)?;
                hydrate(conn, &mut ticket, id)?;
                tickets.push(ticket);
            }
            Ok(tickets)
        })?;

        debug!(count = tickets.len(), "Listed tickets");
        Ok(tickets)
    }

    /// Timestamped comment history of one ticket, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the key resolves to no ticket in `project`.
    pub fn comments(&mut self, project: &str, key: &TicketKey) -> Result<Vec<Comment>> {
        self.transaction("comments", TxMode::Read, |conn| {
            let id = resolve_ticket_id(conn, project, key)?;
            let exists = conn.query_opt(
                "SELECT 1 FROM tickets WHERE id = ? AND project = ?",
                &[id.into(), project.into()],
            )?;
            if exists.is_none() {
                return Err(TicketError::not_found(project, key.to_string()));
            }
            load_comment_records(conn, id)
        })
    }
}

/// Turn a caller key into a row id.
///
/// An id is taken as given; the statements that use it are scoped by
/// project and report `NotFound` themselves. A title resolves to the
/// lowest id with that title in the project.
fn resolve_ticket_id(conn: &mut dyn SqlConnection, project: &str, key: &TicketKey) -> Result<i64> {
    match key {
        TicketKey::Id(id) => Ok(*id),
        TicketKey::Title(title) => {
            let row = conn.query_opt(
                "SELECT id FROM tickets WHERE title = ? AND project = ? ORDER BY id LIMIT 1",
                &[title.into(), project.into()],
            )?;
            let row = row.ok_or_else(|| TicketError::not_found(project, key.to_string()))?;
            let id = row.get_i64(0)?;
            debug!(id, title = %title, project = %project, "Resolved ticket title");
            Ok(id)
        }
    }
}

fn fetch_ticket(
    conn: &mut dyn SqlConnection,
    project: &str,
    id: i64,
    key: &TicketKey,
) -> Result<Ticket> {
    let row = conn
        .query_opt(
            &format!("SELECT {TICKET_COLUMNS} FROM tickets t WHERE t.id = ? AND t.project = ?"),
            &[id.into(), project.into()],
        )?
        .ok_or_else(|| TicketError::not_found(project, key.to_string()))?;

    let (id, mut ticket) = ticket_from_row(&row)?;
    hydrate(conn, &mut ticket, id)?;
    Ok(ticket)
}

/// Decode a main-table row laid out as [`TICKET_COLUMNS`].
fn ticket_from_row(row: &Row) -> Result<(i64, Ticket)> {
    let id = row.get_i64(0)?;
    let ticket = Ticket {
        id: Some(id),
        project: row.get_string(1)?,
        ticket_type: parse_column::<TicketType>(row, 2)?,
        title: row.get_string(3)?,
        description: row.get_opt_string(4)?,
        critical_path: row.get_bool(5)?,
        status: parse_column::<Status>(row, 6)?,
        priority: parse_column::<Priority>(row, 7)?,
        created_by: row.get_opt_string(8)?,
        assigned_to: row.get_opt_string(9)?,
        tags: Default::default(),
        files: Vec::new(),
        comments: Vec::new(),
        created_at: parse_timestamp(&row.get_string(10)?, 10)?,
        updated_at: parse_timestamp(&row.get_string(11)?, 11)?,
    };
    Ok((id, ticket))
}

fn parse_column<T>(row: &Row, column: usize) -> Result<T>
where
    T: std::str::FromStr<Err = TicketError>,
{
    row.get_string(column)?
        .parse()
        .map_err(|err: TicketError| TicketError::Decode {
            column,
            reason: err.to_string(),
        })
}

fn insert_tags<'a>(
    conn: &mut dyn SqlConnection,
    id: i64,
    tags: impl Iterator<Item = &'a String>,
) -> Result<()> {
    for tag in tags {
        conn.execute(
            "INSERT INTO ticket_tags (ticket_id, tag) VALUES (?, ?)",
            &[id.into(), tag.into()],
        )?;
    }
    Ok(())
}

fn insert_files(conn: &mut dyn SqlConnection, id: i64, files: &[String]) -> Result<()> {
    for file in files {
        conn.execute(
            "INSERT INTO ticket_files (ticket_id, file_path) VALUES (?, ?)",
            &[id.into(), file.into()],
        )?;
    }
    Ok(())
}

fn insert_comments(conn: &mut dyn SqlConnection, id: i64, comments: &[String]) -> Result<()> {
    for comment in comments {
        conn.execute(
            "INSERT INTO ticket_comments (ticket_id, comment_text, created_at) VALUES (?, ?, ?)",
            &[id.into(), comment.into(), format_timestamp(&now_micros()).into()],
        )?;
    }
    Ok(())
}

/// Current time truncated to what the store keeps.
fn now_micros() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_nanosecond(now.nanosecond() / 1_000 * 1_000)
        .unwrap_or(now)
}

/// Fixed-width RFC 3339 with microseconds, so text order is time order.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a stored timestamp. Plain `YYYY-MM-DD HH:MM:SS` (as written by
/// SQLite's `CURRENT_TIMESTAMP`) is read as UTC.
pub(crate) fn parse_timestamp(raw: &str, column: usize) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|err| TicketError::Decode {
            column,
            reason: format!("bad timestamp '{raw}': {err}"),
        })
}
