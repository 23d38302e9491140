//! Configuration for traced statements.

use std::time::Duration;

use sea_orm::DbBackend;

use crate::error::ErrorMode;

/// Configuration shared by a traced connection and its statements.
///
/// # Example
///
/// ```rust
/// use pdo_tracing::{ErrorMode, TracingConfig};
/// use std::time::Duration;
///
/// let config = TracingConfig::default()
///     .with_error_mode(ErrorMode::Silent)
///     .with_slow_query_threshold(Duration::from_millis(100));
/// ```
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// How execution failures reach the caller.
    /// Default: `ErrorMode::Exception`
    pub error_mode: ErrorMode,

    /// Whether to include the SQL statement in spans.
    /// Default: `false`
    pub log_statements: bool,

    /// Whether to include bound parameters in spans.
    /// Default: `false` (parameters may contain sensitive data)
    pub log_parameters: bool,

    /// Executions slower than this are logged at WARN level.
    /// Default: 500ms
    pub slow_query_threshold: Duration,

    /// Whether to put the row count on spans. Trace records always carry it.
    /// Default: `true`
    pub record_row_counts: bool,

    /// Database name reported on spans.
    /// Default: `None`
    pub database_name: Option<String>,

    /// Backend used for `db.system` and for rendering parameters inline.
    /// Default: `None`
    pub backend: Option<DbBackend>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Exception,
            log_statements: false,
            log_parameters: false,
            slow_query_threshold: Duration::from_millis(500),
            record_row_counts: true,
            database_name: None,
            backend: None,
        }
    }
}

impl TracingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable or disable SQL statement logging in spans.
    pub fn with_statement_logging(mut self, enabled: bool) -> Self {
        self.log_statements = enabled;
        self
    }

    /// Enable or disable parameter logging in spans.
    ///
    /// **Security Warning**: bound values are usually user input. Only enable
    /// in development or controlled environments.
    pub fn with_parameter_logging(mut self, enabled: bool) -> Self {
        self.log_parameters = enabled;
        self
    }

    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = threshold;
        self
    }

    pub fn with_row_count_recording(mut self, enabled: bool) -> Self {
        self.record_row_counts = enabled;
        self
    }

    pub fn with_database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = Some(name.into());
        self
    }

    pub fn with_backend(mut self, backend: DbBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Value of the `db.system` span attribute.
    pub fn db_system(&self) -> &'static str {
        match self.backend {
            Some(DbBackend::Postgres) => "postgresql",
            Some(DbBackend::MySql) => "mysql",
            Some(DbBackend::Sqlite) => "sqlite",
            None => "other_sql",
        }
    }

    /// Full logging, low slow-query threshold.
    ///
    /// **Warning**: Do not use in production as it logs all SQL and parameters.
    pub fn development() -> Self {
        Self {
            log_statements: true,
            log_parameters: true,
            slow_query_threshold: Duration::from_millis(100),
            ..Self::default()
        }
    }

    /// Production-safe configuration with minimal overhead.
    pub fn production() -> Self {
        Self {
            slow_query_threshold: Duration::from_secs(1),
            ..Self::default()
        }
    }
}
