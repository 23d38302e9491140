//! Traced connection wrapper and the owner seam used by traced statements.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::config::TracingConfig;
use crate::driver::Connection;
use crate::error::{ErrorMode, ExecutionError};
use crate::statement::TraceableStatement;
use crate::trace::TracedStatement;

/// What a traced statement needs from the connection that prepared it.
pub trait StatementOwner {
    /// Current error-reporting mode.
    fn error_mode(&self) -> ErrorMode;

    /// Accept a finished trace.
    fn record_trace(&self, trace: TracedStatement);

    fn config(&self) -> &TracingConfig;
}

/// A wrapper around a driver connection that prepares traced statements and
/// keeps the traces of every execution.
///
/// # Example
///
/// ```rust,ignore
/// use pdo_tracing::{Params, TracedConnection};
///
/// let conn = TracedConnection::wrap(driver_connection);
/// let mut stmt = conn.prepare("SELECT * FROM users WHERE id = :id")?;
/// stmt.bind_value(":id", 5, None)?;
/// stmt.execute(None)?;
///
/// for trace in conn.executed_statements() {
///     println!("{} took {:?}", trace.sql(), trace.duration());
/// }
/// ```
#[derive(Debug)]
pub struct TracedConnection<C> {
    inner: C,
    config: Arc<TracingConfig>,
    error_mode: Mutex<ErrorMode>,
    traces: Mutex<Vec<TracedStatement>>,
}

impl<C> TracedConnection<C> {
    /// Create a new traced connection with the given configuration.
    pub fn new(connection: C, config: TracingConfig) -> Self {
        Self {
            inner: connection,
            error_mode: Mutex::new(config.error_mode),
            config: Arc::new(config),
            traces: Mutex::new(Vec::new()),
        }
    }

    /// Create a new traced connection with default configuration.
    pub fn wrap(connection: C) -> Self {
        Self::new(connection, TracingConfig::default())
    }

    pub fn inner(&self) -> &C {
        &self.inner
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    pub fn set_error_mode(&self, mode: ErrorMode) {
        *lock(&self.error_mode) = mode;
    }

    /// Traces recorded so far, oldest first.
    pub fn executed_statements(&self) -> Vec<TracedStatement> {
        lock(&self.traces).clone()
    }

    pub fn failed_statements(&self) -> Vec<TracedStatement> {
        lock(&self.traces)
            .iter()
            .filter(|trace| !trace.is_success())
            .cloned()
            .collect()
    }

    /// Sum of the durations of all recorded executions.
    pub fn accumulated_duration(&self) -> Duration {
        lock(&self.traces).iter().map(TracedStatement::duration).sum()
    }

    /// Remove and return every recorded trace.
    pub fn take_traces(&self) -> Vec<TracedStatement> {
        std::mem::take(&mut *lock(&self.traces))
    }
}

impl<C: Connection> TracedConnection<C> {
    /// Prepare a statement whose executions are traced on this connection.
    pub fn prepare(
        &self,
        sql: &str,
    ) -> Result<TraceableStatement<'_, C::Statement, Self>, ExecutionError> {
        let stmt = self.inner.prepare(sql).map_err(|e| {
            tracing::error!(error = %e, db.system = %self.config.db_system(), "Failed to prepare statement");
            e
        })?;
        Ok(TraceableStatement::new(stmt, self))
    }
}

impl<C> StatementOwner for TracedConnection<C> {
    fn error_mode(&self) -> ErrorMode {
        *lock(&self.error_mode)
    }

    fn record_trace(&self, trace: TracedStatement) {
        lock(&self.traces).push(trace);
    }

    fn config(&self) -> &TracingConfig {
        &self.config
    }
}

impl<C> AsRef<C> for TracedConnection<C> {
    fn as_ref(&self) -> &C {
        &self.inner
    }
}

/// Extension trait for easy wrapping of driver connections.
pub trait TracingExt: Sized {
    fn with_tracing(self) -> TracedConnection<Self>;

    fn with_tracing_config(self, config: TracingConfig) -> TracedConnection<Self>;
}

impl<C: Connection> TracingExt for C {
    fn with_tracing(self) -> TracedConnection<Self> {
        TracedConnection::wrap(self)
    }

    fn with_tracing_config(self, config: TracingConfig) -> TracedConnection<Self> {
        TracedConnection::new(self, config)
    }
}

// A panic while holding the lock leaves the data intact, so keep using it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
