//! Database schema definitions and bootstrap.

use crate::error::{Result, TicketError};
use crate::storage::backend::SqlConnection;
use tracing::debug;

/// Main ticket table.
pub const TICKETS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS tickets (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        project TEXT NOT NULL CHECK(length(project) > 0),
        type TEXT NOT NULL CHECK(type IN ('bug', 'feature', 'task')),
        title TEXT NOT NULL CHECK(length(title) > 0),
        description TEXT,
        critical_path INTEGER NOT NULL DEFAULT 0,
        status TEXT NOT NULL DEFAULT 'open'
            CHECK(status IN ('open', 'in-progress', 'closed')),
        priority TEXT NOT NULL DEFAULT 'undefined'
            CHECK(priority IN ('undefined', 'low', 'medium', 'high')),
        created_by TEXT,
        assigned_to TEXT,
        created_at DATETIME NOT NULL,
        updated_at DATETIME NOT NULL
    )";

/// Tags: a set per ticket.
pub const TICKET_TAGS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS ticket_tags (
        ticket_id INTEGER NOT NULL,
        tag TEXT NOT NULL,
        PRIMARY KEY (ticket_id, tag),
        FOREIGN KEY (ticket_id) REFERENCES tickets(id) ON DELETE CASCADE
    )";

/// Files: ordered, duplicates allowed.
pub const TICKET_FILES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS ticket_files (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ticket_id INTEGER NOT NULL,
        file_path TEXT NOT NULL,
        FOREIGN KEY (ticket_id) REFERENCES tickets(id) ON DELETE CASCADE
    )";

/// Comments: append-only, each with its own timestamp.
pub const TICKET_COMMENTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS ticket_comments (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        ticket_id INTEGER NOT NULL,
        comment_text TEXT NOT NULL,
        created_at DATETIME NOT NULL,
        FOREIGN KEY (ticket_id) REFERENCES tickets(id) ON DELETE CASCADE
    )";

pub const INDEXES: &str = r"
    CREATE INDEX IF NOT EXISTS idx_tickets_project ON tickets(project);
    CREATE INDEX IF NOT EXISTS idx_tickets_status ON tickets(status);
    CREATE INDEX IF NOT EXISTS idx_tickets_priority ON tickets(priority);
    CREATE INDEX IF NOT EXISTS idx_tickets_type ON tickets(type);
    CREATE INDEX IF NOT EXISTS idx_tickets_project_title ON tickets(project, title);
    CREATE INDEX IF NOT EXISTS idx_tickets_created_at ON tickets(created_at);
    CREATE INDEX IF NOT EXISTS idx_ticket_tags_tag ON ticket_tags(tag);
    CREATE INDEX IF NOT EXISTS idx_ticket_files_ticket ON ticket_files(ticket_id);
    CREATE INDEX IF NOT EXISTS idx_ticket_comments_ticket ON ticket_comments(ticket_id);
";

/// Bootstrap steps in dependency order: parent table, child tables, indexes.
pub const SCHEMA_STEPS: &[(&str, &str)] = &[
    ("tickets table", TICKETS_TABLE),
    ("ticket_tags table", TICKET_TAGS_TABLE),
    ("ticket_files table", TICKET_FILES_TABLE),
    ("ticket_comments table", TICKET_COMMENTS_TABLE),
    ("indexes", INDEXES),
];

/// Apply the schema to a freshly opened connection.
///
/// Every statement uses `IF NOT EXISTS`, so this is safe on each start and
/// never touches existing rows.
///
/// # Errors
///
/// Returns a `Schema` error naming the first step that failed; later steps
/// are not attempted.
pub fn apply_schema(conn: &mut dyn SqlConnection) -> Result<()> {
    debug!(backend = %conn.backend(), "Initializing database schema");

    for (step, sql) in SCHEMA_STEPS {
        debug!(step = %step, "Applying schema step");
        conn.execute_batch(sql).map_err(|err| TicketError::Schema {
            step: (*step).to_string(),
            source: Box::new(err),
        })?;
    }

    debug!("Database schema initialized");
    Ok(())
}
