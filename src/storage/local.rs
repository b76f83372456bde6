//! Local file-based backend on `SQLite`.

use crate::error::{Result, TicketError};
use crate::storage::backend::{ConnectParams, ExecOutcome, LOCAL_FILE, Row, SqlConnection, SqlValue};
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Connection, ToSql, params_from_iter};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Path that opens a private in-memory database.
pub const MEMORY_PATH: &str = ":memory:";

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Self::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Self::Integer(v) => ToSqlOutput::Borrowed(ValueRef::Integer(*v)),
            Self::Real(v) => ToSqlOutput::Borrowed(ValueRef::Real(*v)),
            Self::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
        })
    }
}

/// A connection to a local `SQLite` database file.
#[derive(Debug)]
pub struct LocalConnection {
    conn: Option<Connection>,
    path: PathBuf,
}

/// Factory for the `local-file` backend.
///
/// # Errors
///
/// Returns `ConfigMissing` without a database path, or a connection error
/// if the directory cannot be created or the database cannot be opened.
pub fn connect(params: &ConnectParams) -> Result<LocalConnection> {
    let path = params
        .db_path
        .as_deref()
        .ok_or_else(|| TicketError::ConfigMissing {
            backend: LOCAL_FILE.to_string(),
            what: "a database path".to_string(),
        })?;

    if path == Path::new(MEMORY_PATH) {
        return LocalConnection::open_in_memory();
    }
    LocalConnection::open(path)
}

impl LocalConnection {
    /// Open (creating if needed) the database at `path`.
    ///
    /// The containing directory is created, foreign keys are enabled and
    /// the connection is pinged before it is returned.
    ///
    /// # Errors
    ///
    /// Returns a connection error if any of those steps fail.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|err| {
                TicketError::connection(
                    LOCAL_FILE,
                    format!("cannot create directory {}: {err}", dir.display()),
                )
            })?;
        }

        debug!(path = %path.display(), "Connecting to SQLite");
        let conn = Connection::open(path).map_err(|err| {
            TicketError::connection(LOCAL_FILE, format!("{}: {err}", path.display()))
        })?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|err| TicketError::connection(LOCAL_FILE, err))?;

        Self::prepare(conn, path.to_path_buf())
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns a connection error if `SQLite` cannot allocate the database.
    pub fn open_in_memory() -> Result<Self> {
        let conn =
            Connection::open_in_memory().map_err(|err| TicketError::connection(LOCAL_FILE, err))?;
        Self::prepare(conn, PathBuf::from(MEMORY_PATH))
    }

    fn prepare(conn: Connection, path: PathBuf) -> Result<Self> {
        // Off by default in SQLite; cascade deletes depend on it.
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|err| TicketError::connection(LOCAL_FILE, err))?;

        let mut local = Self {
            conn: Some(conn),
            path,
        };
        local
            .ping()
            .map_err(|err| TicketError::connection(LOCAL_FILE, err))?;
        debug!(path = %local.path.display(), "SQLite connection established");
        Ok(local)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(TicketError::ConnectionClosed)
    }
}

fn read_value(value: ValueRef<'_>, column: usize) -> Result<SqlValue> {
    match value {
        ValueRef::Null => Ok(SqlValue::Null),
        ValueRef::Integer(v) => Ok(SqlValue::Integer(v)),
        ValueRef::Real(v) => Ok(SqlValue::Real(v)),
        ValueRef::Text(bytes) => String::from_utf8(bytes.to_vec())
            .map(SqlValue::Text)
            .map_err(|err| TicketError::Decode {
                column,
                reason: err.to_string(),
            }),
        ValueRef::Blob(_) => Err(TicketError::Decode {
            column,
            reason: "blob values are not supported".to_string(),
        }),
    }
}

impl SqlConnection for LocalConnection {
    fn backend(&self) -> &str {
        LOCAL_FILE
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome> {
        let conn = self.conn()?;
        let rows = conn.execute(sql, params_from_iter(params.iter()))?;
        Ok(ExecOutcome {
            rows_affected: u64::try_from(rows).unwrap_or(u64::MAX),
            last_insert_id: Some(conn.last_insert_rowid()),
        })
    }

    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(sql)?;
        let column_count = stmt.column_count();
        let mut rows = stmt.query(params_from_iter(params.iter()))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(column_count);
            for column in 0..column_count {
                values.push(read_value(row.get_ref(column)?, column)?);
            }
            out.push(Row::new(values));
        }
        Ok(out)
    }

    fn execute_batch(&mut self, sql: &str) -> Result<()> {
        self.conn()?.execute_batch(sql)?;
        Ok(())
    }

    fn ping(&mut self) -> Result<()> {
        self.conn()?
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let Some(conn) = self.conn.take() else {
            return Ok(());
        };
        debug!(path = %self.path.display(), "Closing SQLite connection");
        conn.close().map_err(|(_, err)| TicketError::Database(err))
    }
}
