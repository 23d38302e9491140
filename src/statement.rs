//! Traced prepared statement wrapper.

use sea_orm::Value;
use tracing::{field, Span};

use crate::config::TracingConfig;
use crate::connection::StatementOwner;
use crate::driver::Statement;
use crate::error::{ErrorInfo, ErrorMode, ExecutionError};
use crate::params::{BindOptions, ParamKey, ParamType, Params, Variable};
use crate::sql::SqlSummary;
use crate::trace::{PendingTrace, StatementId, TracedStatement};

/// A prepared statement whose executions are traced on its owner.
///
/// Bind calls are remembered and forwarded to the driver statement. Each call
/// to [`execute`](TraceableStatement::execute) produces exactly one
/// [`TracedStatement`], handed to the owner whether the execution succeeded,
/// raised an error, or failed silently.
///
/// Errors reach the caller only when the owner's [`ErrorMode`] is
/// `Exception`, exactly as the driver would report them without tracing.
pub struct TraceableStatement<'o, S, O: ?Sized> {
    inner: S,
    owner: &'o O,
    id: StatementId,
    bound: Params,
}

impl<'o, S, O> TraceableStatement<'o, S, O>
where
    S: Statement,
    O: StatementOwner + ?Sized,
{
    pub fn new(inner: S, owner: &'o O) -> Self {
        Self {
            inner,
            owner,
            id: StatementId::next(),
            bound: Params::new(),
        }
    }

    /// Identity shared by every trace of this statement.
    pub fn id(&self) -> StatementId {
        self.id
    }

    pub fn sql(&self) -> &str {
        self.inner.sql()
    }

    /// Values recorded by the bind calls so far.
    pub fn bound_params(&self) -> &Params {
        &self.bound
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    pub fn row_count(&self) -> u64 {
        self.inner.row_count()
    }

    pub fn error_info(&self) -> ErrorInfo {
        self.inner.error_info()
    }

    /// Bind a result column to `var`.
    pub fn bind_column(
        &mut self,
        column: impl Into<ParamKey>,
        var: &Variable,
        options: BindOptions,
    ) -> Result<bool, ExecutionError> {
        let column = column.into();
        tracing::trace!(statement = %self.id, column = %column, "bind_column");
        self.bound.insert(column.clone(), var.get());
        self.inner.bind_column(&column, var, &options)
    }

    /// Bind an input parameter to `var`. The value recorded for the trace is
    /// the one `var` holds now.
    pub fn bind_param(
        &mut self,
        param: impl Into<ParamKey>,
        var: &Variable,
        options: BindOptions,
    ) -> Result<bool, ExecutionError> {
        let param = param.into();
        tracing::trace!(statement = %self.id, param = %param, "bind_param");
        self.bound.insert(param.clone(), var.get());
        self.inner.bind_param(&param, var, &options)
    }

    pub fn bind_value(
        &mut self,
        param: impl Into<ParamKey>,
        value: impl Into<Value>,
        param_type: Option<ParamType>,
    ) -> Result<bool, ExecutionError> {
        let param = param.into();
        let value = value.into();
        tracing::trace!(statement = %self.id, param = %param, "bind_value");
        self.bound.insert(param.clone(), value.clone());
        self.inner.bind_value(&param, &value, param_type)
    }

    /// Execute the statement, optionally with values overriding the bound ones.
    ///
    /// Returns the driver's result. In `Silent` and `Warning` modes a failure
    /// is returned as `Ok(false)`; in `Exception` mode as `Err`.
    pub fn execute(&mut self, params: Option<Params>) -> Result<bool, ExecutionError> {
        let snapshot = self.bound.merged(params.as_ref());
        let span = self.create_span(&snapshot);
        let pending = PendingTrace::start(self.inner.sql(), snapshot, self.id);

        let inner = &mut self.inner;
        let outcome = span.in_scope(|| inner.execute(params.as_ref()));

        // A raised error wins; the silent-failure check only runs without one.
        let (result, mut error) = match outcome {
            Ok(result) => (result, None),
            Err(e) => (false, Some(e)),
        };
        if error.is_none() && !result && !self.owner.error_mode().is_exception() {
            let info = self.inner.error_info();
            tracing::debug!(
                parent: &span,
                sqlstate = %info.sqlstate,
                driver_code = ?info.driver_code,
                "Driver reported failure without raising"
            );
            error = Some(info.to_error());
        }

        let trace = pending.end(error.clone(), self.inner.row_count());
        self.record_span(&span, &trace);
        self.owner.record_trace(trace);

        match error {
            Some(e) if self.owner.error_mode().is_exception() => Err(e),
            _ => Ok(result),
        }
    }

    fn config(&self) -> &TracingConfig {
        self.owner.config()
    }

    fn create_span(&self, snapshot: &Params) -> Span {
        let config = self.config();
        let sql = self.inner.sql();
        let summary = SqlSummary::of(sql);

        let span = tracing::info_span!(
            "db.query",
            otel.name = %summary.span_name(),
            db.system = %config.db_system(),
            db.operation = %summary.operation,
            db.prepared_id = self.id.as_u64(),
            db.sql.table = field::Empty,
            db.statement = field::Empty,
            db.parameters = field::Empty,
            db.name = field::Empty,
            db.rows_affected = field::Empty,
            db.duration_ms = field::Empty,
            otel.status_code = field::Empty,
            error.message = field::Empty,
            slow_query = field::Empty,
        );

        if let Some(table) = &summary.table {
            span.record("db.sql.table", table.as_str());
        }
        if let Some(db_name) = &config.database_name {
            span.record("db.name", db_name.as_str());
        }
        if config.log_statements {
            span.record("db.statement", sql);
        }
        if config.log_parameters {
            span.record("db.parameters", describe(snapshot).as_str());
        }

        span
    }

    fn record_span(&self, span: &Span, trace: &TracedStatement) {
        let config = self.config();
        let duration = trace.duration();
        let duration_ms = duration.as_millis() as i64;
        span.record("db.duration_ms", duration_ms);

        if config.record_row_counts {
            span.record("db.rows_affected", trace.row_count());
        }

        if duration > config.slow_query_threshold {
            span.record("slow_query", true);
            tracing::warn!(
                parent: span,
                duration_ms = duration_ms,
                threshold_ms = config.slow_query_threshold.as_millis() as i64,
                "Slow query detected"
            );
        }

        match trace.error() {
            None => {
                span.record("otel.status_code", "OK");
            }
            Some(e) => {
                span.record("otel.status_code", "ERROR");
                span.record("error.message", e.message.as_str());
                match self.owner.error_mode() {
                    ErrorMode::Warning => tracing::warn!(
                        parent: span,
                        error = %e,
                        code = e.code,
                        "Statement execution failed"
                    ),
                    _ => tracing::error!(
                        parent: span,
                        error = %e,
                        code = e.code,
                        "Statement execution failed"
                    ),
                }
            }
        }
    }
}

impl<S: std::fmt::Debug, O: ?Sized> std::fmt::Debug for TraceableStatement<'_, S, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraceableStatement")
            .field("inner", &self.inner)
            .field("id", &self.id)
            .field("bound", &self.bound)
            .finish_non_exhaustive()
    }
}

fn describe(params: &Params) -> String {
    let parts: Vec<String> = params
        .iter()
        .map(|(key, value)| format!("{key}={value:?}"))
        .collect();
    format!("{{{}}}", parts.join(", "))
}
