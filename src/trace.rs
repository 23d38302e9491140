//! Trace records produced by statement executions.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime};

use sea_orm::DbBackend;

use crate::error::ExecutionError;
use crate::params::Params;
use crate::sql::placeholder_count;

static NEXT_STATEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a traced statement, shared by all of its executions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StatementId(u64);

impl StatementId {
    /// Allocate a fresh id. Ids are never reused within a process.
    pub(crate) fn next() -> Self {
        StatementId(NEXT_STATEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for StatementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stmt-{}", self.0)
    }
}

/// An execution that has started but not yet been finalized.
#[derive(Debug)]
pub(crate) struct PendingTrace {
    sql: String,
    params: Params,
    prepared_id: StatementId,
    started_at: SystemTime,
    start: Instant,
}

impl PendingTrace {
    pub(crate) fn start(sql: impl Into<String>, params: Params, prepared_id: StatementId) -> Self {
        Self {
            sql: sql.into(),
            params,
            prepared_id,
            started_at: SystemTime::now(),
            start: Instant::now(),
        }
    }

    /// Stop the clock and produce the finished record.
    pub(crate) fn end(self, error: Option<ExecutionError>, row_count: u64) -> TracedStatement {
        TracedStatement {
            sql: self.sql,
            params: self.params,
            prepared_id: self.prepared_id,
            started_at: self.started_at,
            start: self.start,
            end: Instant::now(),
            error,
            row_count,
        }
    }
}

/// One execution attempt of a prepared statement.
#[derive(Debug, Clone)]
pub struct TracedStatement {
    sql: String,
    params: Params,
    prepared_id: StatementId,
    started_at: SystemTime,
    start: Instant,
    end: Instant,
    error: Option<ExecutionError>,
    row_count: u64,
}

impl TracedStatement {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Parameters in effect for this execution.
    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn prepared_id(&self) -> StatementId {
        self.prepared_id
    }

    /// Wall clock time the execution started.
    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn end(&self) -> Instant {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end.duration_since(self.start)
    }

    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    pub fn error(&self) -> Option<&ExecutionError> {
        self.error.as_ref()
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn error_code(&self) -> Option<i64> {
        self.error.as_ref().map(|e| e.code)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.message.as_str())
    }

    /// The query with its parameters inlined, for display only.
    ///
    /// Returns `None` unless the parameters are positional, numbered `1..=n`
    /// and `n` matches the placeholders in the query. Named, gapped or
    /// under-bound parameters cannot be rendered.
    pub fn sql_with_params(&self, backend: DbBackend) -> Option<String> {
        let values = self.params.positional_values()?;
        if values.len() != placeholder_count(&self.sql, backend) {
            return None;
        }
        if values.is_empty() {
            return Some(self.sql.clone());
        }
        let stmt = sea_orm::Statement::from_sql_and_values(backend, self.sql.as_str(), values);
        Some(stmt.to_string())
    }
}
