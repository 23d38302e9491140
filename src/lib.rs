//! # pdo-tracing
//!
//! Tracing instrumentation for prepared database statements.
//!
//! A [`TraceableStatement`] wraps a driver's prepared statement. Bind calls are
//! recorded and forwarded; every execution produces one [`TracedStatement`]
//! with the query, the parameters in effect, timing, the row count and any
//! error. The trace is handed to the statement's owner, usually a
//! [`TracedConnection`], and execution also emits a `tracing` span.
//!
//! Instrumentation never changes what the caller sees: errors are returned
//! only when the connection's [`ErrorMode`] is `Exception`, and are otherwise
//! visible only on the trace.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pdo_tracing::prelude::*;
//!
//! let conn = driver_connection.with_tracing();
//! let mut stmt = conn.prepare("SELECT * FROM users WHERE id = :id")?;
//! stmt.bind_value(":id", 5, None)?;
//! stmt.execute(None)?;
//!
//! let trace = &conn.executed_statements()[0];
//! println!("{} rows in {:?}", trace.row_count(), trace.duration());
//! ```
//!
//! ## Configuration
//!
//! ```rust,ignore
//! use pdo_tracing::{ErrorMode, TracingConfig};
//!
//! let config = TracingConfig::default()
//!     .with_error_mode(ErrorMode::Silent)
//!     .with_statement_logging(true)  // Include SQL in spans (default: false)
//!     .with_parameter_logging(false) // Include bound values (default: false)
//!     .with_slow_query_threshold(Duration::from_millis(100));
//!
//! let conn = TracedConnection::new(driver_connection, config);
//! ```
//!
//! ## Span Attributes
//!
//! | Attribute | Description |
//! |-----------|-------------|
//! | `db.system` | From the configured backend, or "other_sql" |
//! | `db.operation` | SQL operation (SELECT, INSERT, UPDATE, DELETE, ...) |
//! | `db.sql.table` | Target table name (when detectable) |
//! | `db.statement` | Full SQL query (when enabled) |
//! | `db.parameters` | Parameters in effect (when enabled) |
//! | `db.prepared_id` | Identity of the prepared statement |
//! | `db.rows_affected` | Row count reported by the driver |
//! | `otel.status_code` | "OK" or "ERROR" |
//! | `error.message` | Error details (on failure) |

mod config;
mod connection;
mod driver;
mod error;
mod params;
mod sql;
mod statement;
mod trace;

#[cfg(test)]
mod test_support;

pub use config::TracingConfig;
pub use connection::{StatementOwner, TracedConnection, TracingExt};
pub use driver::{Connection, Statement};
pub use error::{ErrorInfo, ErrorMode, ExecutionError};
pub use params::{BindOptions, ParamKey, ParamType, Params, Variable};
pub use sql::{Operation, SqlSummary};
pub use statement::TraceableStatement;
pub use trace::{StatementId, TracedStatement};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BindOptions, Connection, ErrorMode, Params, Statement, TraceableStatement,
        TracedConnection, TracingConfig, TracingExt,
    };
}
