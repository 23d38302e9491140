//! Traits implemented by the underlying database driver.
//!
//! The traced wrappers never talk to a database themselves; everything is
//! forwarded to these.

use sea_orm::Value;

use crate::error::{ErrorInfo, ExecutionError};
use crate::params::{BindOptions, ParamKey, ParamType, Params, Variable};

/// A prepared statement of the underlying driver.
pub trait Statement {
    /// Query text the statement was prepared from.
    fn sql(&self) -> &str;

    /// Run the statement.
    ///
    /// `Ok(false)` is a failure the driver did not raise; the details are then
    /// available from [`Statement::error_info`].
    fn execute(&mut self, params: Option<&Params>) -> Result<bool, ExecutionError>;

    fn bind_column(
        &mut self,
        column: &ParamKey,
        var: &Variable,
        options: &BindOptions,
    ) -> Result<bool, ExecutionError>;

    fn bind_param(
        &mut self,
        param: &ParamKey,
        var: &Variable,
        options: &BindOptions,
    ) -> Result<bool, ExecutionError>;

    fn bind_value(
        &mut self,
        param: &ParamKey,
        value: &Value,
        param_type: Option<ParamType>,
    ) -> Result<bool, ExecutionError>;

    fn error_info(&self) -> ErrorInfo;

    /// Rows affected by the last execution.
    fn row_count(&self) -> u64;
}

/// A driver connection able to prepare statements.
pub trait Connection {
    type Statement: Statement;

    fn prepare(&self, sql: &str) -> Result<Self::Statement, ExecutionError>;
}
