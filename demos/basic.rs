//! Basic example showing traced statements over a toy in-memory driver.
//!
//! Run with: cargo run --example basic

use std::collections::HashMap;

use pdo_tracing::prelude::*;
use pdo_tracing::{ErrorInfo, ExecutionError, ParamKey, ParamType, Variable};
use sea_orm::{DbBackend, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Accepts anything starting with SELECT or INSERT; everything else is a
/// syntax error.
struct ToyConnection;

struct ToyStatement {
    sql: String,
    params: HashMap<ParamKey, Value>,
    last_error: ErrorInfo,
    rows: u64,
}

impl Connection for ToyConnection {
    type Statement = ToyStatement;

    fn prepare(&self, sql: &str) -> Result<ToyStatement, ExecutionError> {
        Ok(ToyStatement {
            sql: sql.to_string(),
            params: HashMap::new(),
            last_error: ErrorInfo::new("00000", None, None),
            rows: 0,
        })
    }
}

impl Statement for ToyStatement {
    fn sql(&self) -> &str {
        &self.sql
    }

    fn execute(&mut self, params: Option<&Params>) -> Result<bool, ExecutionError> {
        if let Some(params) = params {
            for (key, value) in params {
                self.params.insert(key.clone(), value.clone());
            }
        }
        let upper = self.sql.trim_start().to_ascii_uppercase();
        if upper.starts_with("SELECT") || upper.starts_with("INSERT") {
            self.rows = 1;
            Ok(true)
        } else {
            self.rows = 0;
            self.last_error = ErrorInfo::new(
                "42000",
                Some(1064),
                Some(format!("syntax error near '{}'", self.sql)),
            );
            Ok(false)
        }
    }

    fn bind_column(
        &mut self,
        _column: &ParamKey,
        _var: &Variable,
        _options: &BindOptions,
    ) -> Result<bool, ExecutionError> {
        Ok(true)
    }

    fn bind_param(
        &mut self,
        param: &ParamKey,
        var: &Variable,
        _options: &BindOptions,
    ) -> Result<bool, ExecutionError> {
        self.params.insert(param.clone(), var.get());
        Ok(true)
    }

    fn bind_value(
        &mut self,
        param: &ParamKey,
        value: &Value,
        _param_type: Option<ParamType>,
    ) -> Result<bool, ExecutionError> {
        self.params.insert(param.clone(), value.clone());
        Ok(true)
    }

    fn error_info(&self) -> ErrorInfo {
        self.last_error.clone()
    }

    fn row_count(&self) -> u64 {
        self.rows
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,pdo_tracing=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let conn = ToyConnection.with_tracing_config(
        TracingConfig::development()
            .with_backend(DbBackend::Sqlite)
            .with_database_name("demo"),
    );

    let mut select = conn.prepare("SELECT * FROM users WHERE id = ?")?;
    select.bind_value(1usize, 5, None)?;
    select.execute(None)?;
    select.execute(Some(Params::positional([6])))?;

    // Switch to silent mode: failures come back as `false` and stay on the trace.
    conn.set_error_mode(ErrorMode::Silent);
    let mut broken = conn.prepare("SELEC name FROM users")?;
    let ok = broken.execute(None)?;
    tracing::info!(ok, "Broken statement returned");

    for trace in conn.executed_statements() {
        let sql = trace
            .sql_with_params(DbBackend::Sqlite)
            .unwrap_or_else(|| trace.sql().to_string());
        tracing::info!(
            prepared_id = %trace.prepared_id(),
            sql = sql.as_str(),
            rows = trace.row_count(),
            error = trace.error_message().unwrap_or(""),
            "Executed statement"
        );
    }
    tracing::info!(
        total = ?conn.accumulated_duration(),
        failed = conn.failed_statements().len(),
        "Done"
    );

    Ok(())
}
