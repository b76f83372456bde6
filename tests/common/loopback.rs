#![allow(dead_code)]

//! An in-process pipeline server backed by `SQLite`, so the remote backend
//! can be driven end to end without a network.

use alexandria::Result;
use alexandria::storage::remote::{
    HranaError, HranaValue, PipelineRequest, PipelineResponse, PipelineTransport, Stmt,
    StmtResult, StreamRequest, StreamResponse, StreamResult,
};
use rusqlite::types::{Value, ValueRef};
use rusqlite::{Connection, params_from_iter};
use std::sync::{Arc, Mutex};

pub type RequestLog = Arc<Mutex<Vec<PipelineRequest>>>;

pub struct LoopbackServer {
    conn: Connection,
    next_baton: u32,
    log: RequestLog,
}

impl LoopbackServer {
    pub fn new() -> (Self, RequestLog) {
        let log = RequestLog::default();
        let server = Self {
            conn: Connection::open_in_memory().expect("open loopback database"),
            next_baton: 0,
            log: Arc::clone(&log),
        };
        (server, log)
    }

    fn execute(&self, stmt: &Stmt) -> rusqlite::Result<StmtResult> {
        let args: Vec<Value> = stmt.args.iter().map(to_value).collect();
        let mut prepared = self.conn.prepare(&stmt.sql)?;
        let columns = prepared.column_count();

        if columns == 0 {
            let changed = prepared.execute(params_from_iter(args))?;
            return Ok(StmtResult {
                affected_row_count: u64::try_from(changed).expect("row count"),
                last_insert_rowid: Some(self.conn.last_insert_rowid().to_string()),
                ..StmtResult::default()
            });
        }

        let mut out = Vec::new();
        let mut rows = prepared.query(params_from_iter(args))?;
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns);
            for column in 0..columns {
                values.push(from_value(row.get_ref(column)?));
            }
            out.push(values);
        }
        Ok(StmtResult {
            rows: out,
            ..StmtResult::default()
        })
    }
}

impl PipelineTransport for LoopbackServer {
    fn send(&mut self, request: &PipelineRequest) -> Result<PipelineResponse> {
        self.log.lock().unwrap().push(request.clone());

        let mut closed = false;
        let mut results = Vec::with_capacity(request.requests.len());
        for item in &request.requests {
            let outcome = match item {
                StreamRequest::Execute { stmt } => self
                    .execute(stmt)
                    .map(|result| StreamResponse::Execute { result }),
                StreamRequest::Sequence { sql } => self
                    .conn
                    .execute_batch(sql)
                    .map(|()| StreamResponse::Sequence),
                StreamRequest::Close => {
                    closed = true;
                    Ok(StreamResponse::Close)
                }
            };
            results.push(match outcome {
                Ok(response) => StreamResult::Ok { response },
                Err(err) => StreamResult::Error {
                    error: HranaError {
                        message: err.to_string(),
                        code: Some("SQLITE_ERROR".to_string()),
                    },
                },
            });
        }

        let baton = if closed {
            None
        } else {
            self.next_baton += 1;
            Some(format!("baton-{}", self.next_baton))
        };
        Ok(PipelineResponse {
            baton,
            base_url: None,
            results,
        })
    }
}

fn to_value(value: &HranaValue) -> Value {
    match value {
        HranaValue::Null | HranaValue::Blob { .. } => Value::Null,
        HranaValue::Integer { value } => Value::Integer(value.parse().expect("integer arg")),
        HranaValue::Float { value } => Value::Real(*value),
        HranaValue::Text { value } => Value::Text(value.clone()),
    }
}

fn from_value(value: ValueRef<'_>) -> HranaValue {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => HranaValue::Null,
        ValueRef::Integer(v) => HranaValue::Integer {
            value: v.to_string(),
        },
        ValueRef::Real(v) => HranaValue::Float { value: v },
        ValueRef::Text(v) => HranaValue::Text {
            value: String::from_utf8_lossy(v).into_owned(),
        },
    }
}
