//! Backend abstraction: the connection seam, the factory registry, and the
//! owned connection handle.
//!
//! The ticket engine only ever talks to a [`SqlConnection`]. Concrete
//! backends (local `SQLite` file, remote libSQL over HTTP) are produced by
//! factories registered in a [`BackendRegistry`] under a kind name, so new
//! kinds can be added without touching existing ones.

use crate::error::{Result, TicketError};
use crate::storage::schema::apply_schema;
use crate::storage::{local, remote};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Kind name of the local file-based backend.
pub const LOCAL_FILE: &str = "local-file";
/// Kind name of the remote managed backend.
pub const REMOTE: &str = "remote";

/// A value bound to, or read from, a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for SqlValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl<T: Into<Self>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One result row, addressed by column index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    values: Vec<SqlValue>,
}

impl Row {
    #[must_use]
    pub const fn new(values: Vec<SqlValue>) -> Self {
        Self { values }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn value(&self, column: usize) -> Result<&SqlValue> {
        self.values.get(column).ok_or_else(|| TicketError::Decode {
            column,
            reason: format!("row has only {} columns", self.values.len()),
        })
    }

    /// Read an integer column.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the column is missing or not an integer.
    pub fn get_i64(&self, column: usize) -> Result<i64> {
        match self.value(column)? {
            SqlValue::Integer(v) => Ok(*v),
            other => Err(unexpected(column, "integer", other)),
        }
    }

    /// Read a boolean stored as 0/1.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the column is missing or not an integer.
    pub fn get_bool(&self, column: usize) -> Result<bool> {
        match self.value(column)? {
            SqlValue::Integer(v) => Ok(*v != 0),
            SqlValue::Null => Ok(false),
            other => Err(unexpected(column, "boolean", other)),
        }
    }

    /// Read a non-null text column.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the column is missing, null, or not text.
    pub fn get_string(&self, column: usize) -> Result<String> {
        match self.value(column)? {
            SqlValue::Text(v) => Ok(v.clone()),
            other => Err(unexpected(column, "text", other)),
        }
    }

    /// Read a nullable text column.
    ///
    /// # Errors
    ///
    /// Returns a decode error if the column is missing or holds a non-text value.
    pub fn get_opt_string(&self, column: usize) -> Result<Option<String>> {
        match self.value(column)? {
            SqlValue::Null => Ok(None),
            SqlValue::Text(v) => Ok(Some(v.clone())),
            other => Err(unexpected(column, "text or null", other)),
        }
    }
}

fn unexpected(column: usize, expected: &str, found: &SqlValue) -> TicketError {
    TicketError::Decode {
        column,
        reason: format!("expected {expected}, found {found:?}"),
    }
}

/// Outcome of a non-query statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecOutcome {
    pub rows_affected: u64,
    pub last_insert_id: Option<i64>,
}

/// Transaction flavour requested by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    /// Reads only; no write lock is taken up front.
    Read,
    /// Takes the write lock when the transaction starts.
    Write,
}

impl TxMode {
    #[must_use]
    pub const fn begin_sql(self) -> &'static str {
        match self {
            Self::Read => "BEGIN DEFERRED",
            Self::Write => "BEGIN IMMEDIATE",
        }
    }
}

/// A live connection to one SQL store.
///
/// All statement text uses `?` placeholders; values always travel as
/// bound parameters.
pub trait SqlConnection: Send {
    /// Kind name of the backend serving this connection.
    fn backend(&self) -> &str;

    /// Run a statement that returns no rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome>;

    /// Run a statement and collect every result row.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails or a value cannot be decoded.
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>>;

    /// Run one or more parameterless statements.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails.
    fn execute_batch(&mut self, sql: &str) -> Result<()>;

    /// Check the store is reachable.
    ///
    /// # Errors
    ///
    /// Returns an error if the round trip fails.
    fn ping(&mut self) -> Result<()>;

    /// Release the underlying resources. Calling it twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the store reports a failure while closing.
    fn close(&mut self) -> Result<()>;

    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started.
    fn begin(&mut self, mode: TxMode) -> Result<()> {
        self.execute_batch(mode.begin_sql())
    }

    /// # Errors
    ///
    /// Returns an error if the commit fails.
    fn commit(&mut self) -> Result<()> {
        self.execute_batch("COMMIT")
    }

    /// # Errors
    ///
    /// Returns an error if the rollback fails.
    fn rollback(&mut self) -> Result<()> {
        self.execute_batch("ROLLBACK")
    }

    /// Run a query expected to yield at most one row.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    fn query_opt(&mut self, sql: &str, params: &[SqlValue]) -> Result<Option<Row>> {
        Ok(self.query(sql, params)?.into_iter().next())
    }
}

/// Backend-specific connection parameters.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ConnectParams {
    pub db_path: Option<PathBuf>,
    pub remote_url: Option<String>,
    pub auth_token: Option<String>,
}

impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParams")
            .field("db_path", &self.db_path)
            .field("remote_url", &self.remote_url)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl ConnectParams {
    #[must_use]
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: Some(path.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn remote(url: impl Into<String>, auth_token: impl Into<String>) -> Self {
        Self {
            remote_url: Some(url.into()),
            auth_token: Some(auth_token.into()),
            ..Self::default()
        }
    }
}

/// Builds a connection for one backend kind.
pub type ConnectionFactory =
    Box<dyn Fn(&ConnectParams) -> Result<Box<dyn SqlConnection>> + Send + Sync>;

/// Registry of connection factories keyed by backend kind.
pub struct BackendRegistry {
    factories: BTreeMap<String, ConnectionFactory>,
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("kinds", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl BackendRegistry {
    /// An empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// A registry with the built-in `local-file` and `remote` backends.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(LOCAL_FILE, |params| {
            local::connect(params).map(|conn| Box::new(conn) as Box<dyn SqlConnection>)
        });
        registry.register(REMOTE, |params| {
            remote::connect(params).map(|conn| Box::new(conn) as Box<dyn SqlConnection>)
        });
        registry
    }

    /// Register (or replace) the factory for a backend kind.
    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F)
    where
        F: Fn(&ConnectParams) -> Result<Box<dyn SqlConnection>> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Box::new(factory));
    }

    #[must_use]
    pub fn supports(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Open a connection for `kind` and make sure the schema exists.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedBackend` for an unknown kind, the factory's
    /// configuration or connection error, or a `Schema` error if
    /// bootstrapping fails (the connection is closed in that case).
    pub fn connect(&self, kind: &str, params: &ConnectParams) -> Result<DbHandle> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| TicketError::UnsupportedBackend(kind.to_string()))?;

        debug!(backend = %kind, "Opening database connection");
        let mut conn = factory(params)?;

        if let Err(err) = apply_schema(conn.as_mut()) {
            if let Err(close_err) = conn.close() {
                warn!(backend = %kind, error = %close_err, "Failed to close connection after schema error");
            }
            return Err(err);
        }

        info!(backend = %kind, "Database connection established");
        Ok(DbHandle::new(kind, conn))
    }
}

/// Owned handle to the process's single database connection.
pub struct DbHandle {
    kind: String,
    conn: Option<Box<dyn SqlConnection>>,
}

impl fmt::Debug for DbHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbHandle")
            .field("kind", &self.kind)
            .field("closed", &self.conn.is_none())
            .finish()
    }
}

impl DbHandle {
    #[must_use]
    pub fn new(kind: impl Into<String>, conn: Box<dyn SqlConnection>) -> Self {
        Self {
            kind: kind.into(),
            conn: Some(conn),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    /// Borrow the live connection.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionClosed` after [`DbHandle::close`].
    pub fn connection(&mut self) -> Result<&mut dyn SqlConnection> {
        match self.conn.as_mut() {
            Some(conn) => Ok(&mut **conn),
            None => Err(TicketError::ConnectionClosed),
        }
    }

    /// Close the connection. Closing an already closed handle is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if closing fails; the handle is
    /// considered closed either way.
    pub fn close(&mut self) -> Result<()> {
        let Some(mut conn) = self.conn.take() else {
            return Ok(());
        };
        debug!(backend = %self.kind, "Closing database connection");
        conn.close()
    }
}

impl Drop for DbHandle {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(backend = %self.kind, error = %err, "Failed to close database connection");
        }
    }
}
