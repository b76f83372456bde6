//! Remote backend: a libSQL server reached over the Hrana HTTP pipeline.
//!
//! Each call becomes one `POST {url}/v2/pipeline`. Outside a transaction
//! every pipeline ends with a `close` request, so no server stream outlives
//! the call. Between `BEGIN` and `COMMIT`/`ROLLBACK` the stream is kept and
//! its baton is carried from one pipeline to the next.

use crate::error::{Result, TicketError};
use crate::storage::backend::{ConnectParams, ExecOutcome, REMOTE, Row, SqlConnection, SqlValue, TxMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace, warn};

const PIPELINE_PATH: &str = "/v2/pipeline";

/// Body of a pipeline call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRequest {
    pub baton: Option<String>,
    pub requests: Vec<StreamRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamRequest {
    Execute { stmt: Stmt },
    Sequence { sql: String },
    Close,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stmt {
    pub sql: String,
    #[serde(default)]
    pub args: Vec<HranaValue>,
    #[serde(default)]
    pub want_rows: bool,
}

/// A value as it travels on the wire. Integers are sent as strings so
/// 64-bit values survive JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HranaValue {
    Null,
    Integer { value: String },
    Float { value: f64 },
    Text { value: String },
    Blob { base64: String },
}

impl From<&SqlValue> for HranaValue {
    fn from(value: &SqlValue) -> Self {
        match value {
            SqlValue::Null => Self::Null,
            SqlValue::Integer(v) => Self::Integer {
                value: v.to_string(),
            },
            SqlValue::Real(v) => Self::Float { value: *v },
            SqlValue::Text(v) => Self::Text { value: v.clone() },
        }
    }
}

impl HranaValue {
    fn into_sql(self, column: usize) -> Result<SqlValue> {
        match self {
            Self::Null => Ok(SqlValue::Null),
            Self::Integer { value } => value
                .parse()
                .map(SqlValue::Integer)
                .map_err(|err| TicketError::Decode {
                    column,
                    reason: format!("bad integer '{value}': {err}"),
                }),
            Self::Float { value } => Ok(SqlValue::Real(value)),
            Self::Text { value } => Ok(SqlValue::Text(value)),
            Self::Blob { .. } => Err(TicketError::Decode {
                column,
                reason: "blob values are not supported".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResponse {
    #[serde(default)]
    pub baton: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    pub results: Vec<StreamResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamResult {
    Ok { response: StreamResponse },
    Error { error: HranaError },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamResponse {
    Execute { result: StmtResult },
    Sequence,
    Close,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StmtResult {
    #[serde(default)]
    pub cols: Vec<Col>,
    #[serde(default)]
    pub rows: Vec<Vec<HranaValue>>,
    #[serde(default)]
    pub affected_row_count: u64,
    #[serde(default)]
    pub last_insert_rowid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Col {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub decltype: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HranaError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

impl From<HranaError> for TicketError {
    fn from(err: HranaError) -> Self {
        Self::Remote {
            message: err.message,
            code: err.code,
        }
    }
}

/// Carries one pipeline call to the server.
pub trait PipelineTransport: Send {
    /// # Errors
    ///
    /// Returns an error if the call cannot be completed or the server
    /// rejects it as a whole.
    fn send(&mut self, request: &PipelineRequest) -> Result<PipelineResponse>;
}

/// Blocking HTTP transport with bearer-token auth.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    base_url: String,
    auth_token: String,
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpTransport {
    /// # Errors
    ///
    /// Returns a connection error if the HTTP client cannot be built.
    pub fn new(base_url: String, auth_token: String) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|err| TicketError::connection(REMOTE, err))?;
        Ok(Self {
            client,
            base_url,
            auth_token,
        })
    }
}

impl PipelineTransport for HttpTransport {
    fn send(&mut self, request: &PipelineRequest) -> Result<PipelineResponse> {
        let url = format!("{}{PIPELINE_PATH}", self.base_url);
        trace!(url = %url, requests = request.requests.len(), "Sending pipeline");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.auth_token)
            .json(request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TicketError::Remote {
                message: format!("HTTP {status}: {}", body.trim()),
                code: None,
            });
        }

        let body: PipelineResponse = response.json()?;
        if let Some(base_url) = body.base_url.as_deref() {
            self.base_url = normalize_url(base_url);
        }
        Ok(body)
    }
}

/// Rewrite `libsql://` to `https://` and drop trailing slashes.
#[must_use]
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let url = url
        .strip_prefix("libsql://")
        .map_or_else(|| url.to_string(), |rest| format!("https://{rest}"));
    url.trim_end_matches('/').to_string()
}

/// Factory for the `remote` backend.
///
/// # Errors
///
/// Returns `ConfigMissing` when the URL or token is absent or blank, and a
/// connection error when the URL is unusable or the server cannot be reached.
pub fn connect(params: &ConnectParams) -> Result<RemoteConnection> {
    let url = required(params.remote_url.as_deref(), "a database URL (TURSO_URL)")?;
    let token = required(params.auth_token.as_deref(), "an auth token (TURSO_AUTH_TOKEN)")?;

    let url = normalize_url(url);
    if !(url.starts_with("https://") || url.starts_with("http://")) {
        return Err(TicketError::connection(
            REMOTE,
            format!("unsupported URL scheme in '{url}'"),
        ));
    }

    debug!(url = %url, "Connecting to remote database");
    let transport = HttpTransport::new(url.clone(), token.to_string())?;
    let mut conn = RemoteConnection::with_transport(url, Box::new(transport));
    conn.ping()
        .map_err(|err| TicketError::connection(REMOTE, err))?;
    debug!("Remote connection established");
    Ok(conn)
}

fn required<'a>(value: Option<&'a str>, what: &str) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| TicketError::ConfigMissing {
            backend: REMOTE.to_string(),
            what: what.to_string(),
        })
}

/// A connection to a remote libSQL database.
pub struct RemoteConnection {
    url: String,
    transport: Option<Box<dyn PipelineTransport>>,
    baton: Option<String>,
    in_tx: bool,
    // Set when the transaction's stream was lost; cleared by rollback.
    broken: bool,
}

impl fmt::Debug for RemoteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConnection")
            .field("url", &self.url)
            .field("in_tx", &self.in_tx)
            .field("broken", &self.broken)
            .field("closed", &self.transport.is_none())
            .finish_non_exhaustive()
    }
}

impl RemoteConnection {
    #[must_use]
    pub fn with_transport(url: impl Into<String>, transport: Box<dyn PipelineTransport>) -> Self {
        Self {
            url: url.into(),
            transport: Some(transport),
            baton: None,
            in_tx: false,
            broken: false,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub const fn in_transaction(&self) -> bool {
        self.in_tx
    }

    fn run(&mut self, mut requests: Vec<StreamRequest>) -> Result<Vec<StreamResponse>> {
        if self.broken {
            return Err(stream_lost("transaction stream was lost; roll back first"));
        }
        let transport = self
            .transport
            .as_mut()
            .ok_or(TicketError::ConnectionClosed)?;

        let wanted = requests.len();
        let keep_open = self.in_tx;
        if !keep_open {
            requests.push(StreamRequest::Close);
        }

        // Inside a transaction the baton is kept until a reply replaces it,
        // so a failed send can still roll back on the same stream.
        let baton = if keep_open {
            self.baton.clone()
        } else {
            self.baton.take()
        };
        let request = PipelineRequest { baton, requests };
        let response = match transport.send(&request) {
            Ok(response) => response,
            Err(err) => {
                if keep_open {
                    warn!(error = %err, "Pipeline request failed inside a transaction");
                    self.broken = true;
                }
                return Err(err);
            }
        };
        if keep_open {
            self.baton = response.baton;
            if self.baton.is_none() {
                warn!(url = %self.url, "Server ended the transaction stream");
                self.broken = true;
                return Err(stream_lost("server closed the transaction stream"));
            }
        }

        let mut out = Vec::with_capacity(wanted);
        for result in response.results.into_iter().take(wanted) {
            match result {
                StreamResult::Ok { response } => out.push(response),
                StreamResult::Error { error } => return Err(error.into()),
            }
        }
        if out.len() < wanted {
            return Err(TicketError::Remote {
                message: format!("expected {wanted} results, got {}", out.len()),
                code: None,
            });
        }
        Ok(out)
    }

    fn run_stmt(&mut self, sql: &str, params: &[SqlValue], want_rows: bool) -> Result<StmtResult> {
        let stmt = Stmt {
            sql: sql.to_string(),
            args: params.iter().map(HranaValue::from).collect(),
            want_rows,
        };
        match self.run(vec![StreamRequest::Execute { stmt }])?.pop() {
            Some(StreamResponse::Execute { result }) => Ok(result),
            other => Err(TicketError::Remote {
                message: format!("unexpected response to execute: {other:?}"),
                code: None,
            }),
        }
    }
}

impl SqlConnection for RemoteConnection {
    fn backend(&self) -> &str {
        REMOTE
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<ExecOutcome> {
        let result = self.run_stmt(sql, params, false)?;
        let last_insert_id = match result.last_insert_rowid {
            Some(raw) => Some(raw.parse::<i64>().map_err(|err| TicketError::Remote {
                message: format!("bad last_insert_rowid '{raw}': {err}"),
                code: None,
            })?),
            None => None,
        };
        Ok(ExecOutcome {
            rows_affected: result.affected_row_count,
            last_insert_id,
        })
    }

    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>> {
        let result = self.run_stmt(sql, params, true)?;
        result
            .rows
            .into_iter()
            .map(|values| {
                values
                    .into_iter()
                    .enumerate()
                    .map(|(column, value)| value.into_sql(column))
                    .collect::<Result<Vec<_>>>()
                    .map(Row::new)
            })
            .collect()
    }

    fn execute_batch(&mut self, sql: &str) -> Result<()> {
        self.run(vec![StreamRequest::Sequence {
            sql: sql.to_string(),
        }])?;
        Ok(())
    }

    fn ping(&mut self) -> Result<()> {
        self.query("SELECT 1", &[]).map(|_| ())
    }

    fn close(&mut self) -> Result<()> {
        let Some(mut transport) = self.transport.take() else {
            return Ok(());
        };
        debug!(url = %self.url, "Closing remote connection");
        self.in_tx = false;
        self.broken = false;
        if let Some(baton) = self.baton.take() {
            let request = PipelineRequest {
                baton: Some(baton),
                requests: vec![StreamRequest::Close],
            };
            transport.send(&request)?;
        }
        Ok(())
    }

    fn begin(&mut self, mode: TxMode) -> Result<()> {
        self.in_tx = true;
        self.broken = false;
        if let Err(err) = self.execute_batch(mode.begin_sql()) {
            warn!(error = %err, "Failed to begin remote transaction");
            self.in_tx = false;
            self.broken = false;
            self.baton = None;
            return Err(err);
        }
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        if self.broken {
            return Err(stream_lost("cannot commit, transaction stream was lost"));
        }
        // Ending the transaction also ends the stream.
        self.in_tx = false;
        self.execute_batch("COMMIT")
    }

    fn rollback(&mut self) -> Result<()> {
        let broken = std::mem::take(&mut self.broken);
        self.in_tx = false;
        if broken && self.baton.is_none() {
            debug!("Transaction stream already gone, nothing to roll back");
            return Ok(());
        }
        self.execute_batch("ROLLBACK")
    }
}

fn stream_lost(message: &str) -> TicketError {
    TicketError::Remote {
        message: message.to_string(),
        code: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Replays canned responses and records every request.
    struct Scripted {
        sent: Arc<Mutex<Vec<PipelineRequest>>>,
        replies: VecDeque<PipelineResponse>,
    }

    impl PipelineTransport for Scripted {
        fn send(&mut self, request: &PipelineRequest) -> Result<PipelineResponse> {
            self.sent.lock().unwrap().push(request.clone());
            self.replies.pop_front().ok_or_else(|| TicketError::Remote {
                message: "connection reset".into(),
                code: None,
            })
        }
    }

    fn ok(response: StreamResponse) -> StreamResult {
        StreamResult::Ok { response }
    }

    fn reply(baton: Option<&str>, results: Vec<StreamResult>) -> PipelineResponse {
        PipelineResponse {
            baton: baton.map(str::to_string),
            base_url: None,
            results,
        }
    }

    fn scripted(replies: Vec<PipelineResponse>) -> (RemoteConnection, Arc<Mutex<Vec<PipelineRequest>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        let transport = Scripted {
            sent: Arc::clone(&sent),
            replies: replies.into(),
        };
        (
            RemoteConnection::with_transport("https://db.example", Box::new(transport)),
            sent,
        )
    }

    #[test]
    fn request_encoding_matches_wire_format() {
        let request = PipelineRequest {
            baton: None,
            requests: vec![
                StreamRequest::Execute {
                    stmt: Stmt {
                        sql: "SELECT ?".into(),
                        args: vec![
                            HranaValue::from(&SqlValue::Integer(42)),
                            HranaValue::from(&SqlValue::Null),
                        ],
                        want_rows: true,
                    },
                },
                StreamRequest::Close,
            ],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["baton"], serde_json::Value::Null);
        assert_eq!(json["requests"][0]["type"], "execute");
        assert_eq!(json["requests"][0]["stmt"]["args"][0]["type"], "integer");
        assert_eq!(json["requests"][0]["stmt"]["args"][0]["value"], "42");
        assert_eq!(json["requests"][0]["stmt"]["args"][1]["type"], "null");
        assert_eq!(json["requests"][1]["type"], "close");
    }

    #[test]
    fn response_decoding_handles_rows_and_errors() {
        let raw = r#"{
            "baton": null,
            "base_url": null,
            "results": [
                {"type": "ok", "response": {"type": "execute", "result": {
                    "cols": [{"name": "id", "decltype": "INTEGER"}],
                    "rows": [[{"type": "integer", "value": "7"}]],
                    "affected_row_count": 0,
                    "last_insert_rowid": null
                }}},
                {"type": "error", "error": {"message": "no such table: x", "code": "SQLITE_ERROR"}},
                {"type": "ok", "response": {"type": "close"}}
            ]
        }"#;
        let response: PipelineResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.results.len(), 3);
        assert!(matches!(
            &response.results[1],
            StreamResult::Error { error } if error.code.as_deref() == Some("SQLITE_ERROR")
        ));
    }

    #[test]
    fn normalize_rewrites_libsql_scheme() {
        assert_eq!(normalize_url("libsql://db-org.turso.io/"), "https://db-org.turso.io");
        assert_eq!(normalize_url(" https://host:8080 "), "https://host:8080");
    }

    #[test]
    fn connect_requires_url_and_token() {
        let err = connect(&ConnectParams::default()).unwrap_err();
        assert!(matches!(err, TicketError::ConfigMissing { ref what, .. } if what.contains("TURSO_URL")));

        let err = connect(&ConnectParams::remote("https://db.example", "  ")).unwrap_err();
        assert!(matches!(err, TicketError::ConfigMissing { ref what, .. } if what.contains("TURSO_AUTH_TOKEN")));
    }

    #[test]
    fn connect_rejects_unknown_scheme() {
        let err = connect(&ConnectParams::remote("ftp://db.example", "token")).unwrap_err();
        assert!(matches!(err, TicketError::Connection { .. }));
    }

    #[test]
    fn statements_outside_transaction_close_the_stream() {
        let (mut conn, sent) = scripted(vec![reply(
            None,
            vec![
                ok(StreamResponse::Execute {
                    result: StmtResult {
                        affected_row_count: 1,
                        last_insert_rowid: Some("5".into()),
                        ..StmtResult::default()
                    },
                }),
                ok(StreamResponse::Close),
            ],
        )]);

        let outcome = conn.execute("INSERT INTO t VALUES (?)", &[SqlValue::from("a")]).unwrap();
        assert_eq!(outcome.rows_affected, 1);
        assert_eq!(outcome.last_insert_id, Some(5));

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].baton, None);
        assert_eq!(sent[0].requests.last(), Some(&StreamRequest::Close));
    }

    #[test]
    fn transaction_carries_baton_until_commit() {
        let (mut conn, sent) = scripted(vec![
            reply(Some("b1"), vec![ok(StreamResponse::Sequence)]),
            reply(
                Some("b2"),
                vec![ok(StreamResponse::Execute {
                    result: StmtResult::default(),
                })],
            ),
            reply(None, vec![ok(StreamResponse::Sequence), ok(StreamResponse::Close)]),
        ]);

        conn.begin(TxMode::Write).unwrap();
        assert!(conn.in_transaction());
        conn.execute("DELETE FROM t", &[]).unwrap();
        conn.commit().unwrap();
        assert!(!conn.in_transaction());

        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].baton, None);
        assert_eq!(sent[0].requests.len(), 1);
        assert_eq!(sent[1].baton.as_deref(), Some("b1"));
        assert_eq!(sent[1].requests.len(), 1);
        assert_eq!(sent[2].baton.as_deref(), Some("b2"));
        assert_eq!(sent[2].requests.last(), Some(&StreamRequest::Close));
    }

    #[test]
    fn lost_baton_mid_transaction_blocks_further_statements() {
        let (mut conn, sent) = scripted(vec![
            reply(Some("b1"), vec![ok(StreamResponse::Sequence)]),
            reply(
                None,
                vec![ok(StreamResponse::Execute {
                    result: StmtResult::default(),
                })],
            ),
        ]);

        conn.begin(TxMode::Write).unwrap();
        let err = conn.execute("INSERT INTO t VALUES (1)", &[]).unwrap_err();
        assert!(err.is_storage());

        let err = conn.execute("INSERT INTO t VALUES (2)", &[]).unwrap_err();
        assert!(err.to_string().contains("stream was lost"));
        assert!(conn.commit().is_err());
        assert_eq!(sent.lock().unwrap().len(), 2);

        // The server already dropped the stream, so there is nothing to send.
        conn.rollback().unwrap();
        assert!(!conn.in_transaction());
        assert_eq!(sent.lock().unwrap().len(), 2);
    }

    #[test]
    fn failed_send_mid_transaction_rolls_back_on_the_same_stream() {
        let (mut conn, sent) = scripted(vec![reply(
            Some("b1"),
            vec![ok(StreamResponse::Sequence)],
        )]);

        conn.begin(TxMode::Write).unwrap();
        assert!(conn.execute("INSERT INTO t VALUES (1)", &[]).is_err());
        assert!(conn.execute("INSERT INTO t VALUES (2)", &[]).is_err());

        // The rollback itself gets no reply either, but it must target b1.
        assert!(conn.rollback().is_err());
        let sent = sent.lock().unwrap();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[1].baton.as_deref(), Some("b1"));
        let last = &sent[2];
        assert_eq!(last.baton.as_deref(), Some("b1"));
        assert_eq!(
            last.requests[0],
            StreamRequest::Sequence {
                sql: "ROLLBACK".into()
            }
        );
        assert_eq!(last.requests.last(), Some(&StreamRequest::Close));
    }

    #[test]
    fn new_transaction_after_lost_stream_starts_clean() {
        let (mut conn, sent) = scripted(vec![
            reply(Some("b1"), vec![ok(StreamResponse::Sequence)]),
            reply(None, vec![ok(StreamResponse::Sequence)]),
            reply(Some("b2"), vec![ok(StreamResponse::Sequence)]),
            reply(
                Some("b3"),
                vec![ok(StreamResponse::Execute {
                    result: StmtResult::default(),
                })],
            ),
        ]);

        conn.begin(TxMode::Write).unwrap();
        assert!(conn.execute_batch("DELETE FROM t").is_err());
        conn.rollback().unwrap();

        conn.begin(TxMode::Write).unwrap();
        conn.execute("DELETE FROM t", &[]).unwrap();
        let sent = sent.lock().unwrap();
        assert_eq!(sent[2].baton, None);
        assert_eq!(sent[3].baton.as_deref(), Some("b2"));
    }

    #[test]
    fn statement_error_surfaces_server_message() {
        let (mut conn, _) = scripted(vec![reply(
            None,
            vec![
                StreamResult::Error {
                    error: HranaError {
                        message: "UNIQUE constraint failed".into(),
                        code: Some("SQLITE_CONSTRAINT".into()),
                    },
                },
                ok(StreamResponse::Close),
            ],
        )]);

        let err = conn.execute("INSERT", &[]).unwrap_err();
        assert!(err.is_storage());
        assert!(err.to_string().contains("UNIQUE constraint failed"));
    }

    #[test]
    fn query_decodes_values() {
        let (mut conn, _) = scripted(vec![reply(
            None,
            vec![
                ok(StreamResponse::Execute {
                    result: StmtResult {
                        rows: vec![vec![
                            HranaValue::Integer { value: "3".into() },
                            HranaValue::Text { value: "x".into() },
                            HranaValue::Null,
                        ]],
                        ..StmtResult::default()
                    },
                }),
                ok(StreamResponse::Close),
            ],
        )]);

        let rows = conn.query("SELECT 3, 'x', NULL", &[]).unwrap();
        assert_eq!(rows[0].get_i64(0).unwrap(), 3);
        assert_eq!(rows[0].get_string(1).unwrap(), "x");
        assert_eq!(rows[0].get_opt_string(2).unwrap(), None);
    }

    #[test]
    fn close_is_idempotent() {
        let (mut conn, sent) = scripted(Vec::new());
        conn.close().unwrap();
        conn.close().unwrap();
        assert!(sent.lock().unwrap().is_empty());
        assert!(matches!(conn.ping(), Err(TicketError::ConnectionClosed)));
    }
}
