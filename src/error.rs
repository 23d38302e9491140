//! Error types and error-reporting modes.

use thiserror::Error;

/// How failures of an execution reach the caller.
///
/// Regardless of the mode, every failure is recorded on the trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Failures are returned as `Err(ExecutionError)`.
    #[default]
    Exception,
    /// Failures are reported only through the `false` return value.
    Silent,
    /// Like `Silent`, but a warning event is emitted for each failure.
    Warning,
}

impl ErrorMode {
    pub fn is_exception(&self) -> bool {
        matches!(self, ErrorMode::Exception)
    }
}

/// An error raised while executing a statement.
///
/// Drivers return this for native failures; the traced statement also
/// synthesizes one from [`ErrorInfo`] when a driver fails without raising.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ExecutionError {
    pub message: String,
    pub code: i64,
}

impl ExecutionError {
    pub fn new(message: impl Into<String>, code: i64) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}

/// Last error reported by a driver statement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Five character SQLSTATE, `"00000"` when there is no error.
    pub sqlstate: String,
    /// Driver specific error code. Not part of the synthesized
    /// [`ExecutionError`]; it is logged when a silent failure is recorded.
    pub driver_code: Option<i64>,
    pub message: Option<String>,
}

impl ErrorInfo {
    pub fn new(sqlstate: impl Into<String>, driver_code: Option<i64>, message: Option<String>) -> Self {
        Self {
            sqlstate: sqlstate.into(),
            driver_code,
            message,
        }
    }

    /// Numeric code taken from the leading digits of the SQLSTATE.
    ///
    /// `"42000"` becomes `42000`, `"42S02"` becomes `42` and `"HY000"` becomes `0`.
    pub fn numeric_code(&self) -> i64 {
        let digits: String = self
            .sqlstate
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().unwrap_or(0)
    }

    pub fn to_error(&self) -> ExecutionError {
        ExecutionError::new(self.message.clone().unwrap_or_default(), self.numeric_code())
    }
}

impl From<ErrorInfo> for ExecutionError {
    fn from(info: ErrorInfo) -> Self {
        info.to_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_code() {
        assert_eq!(ErrorInfo::new("42000", None, None).numeric_code(), 42000);
        assert_eq!(ErrorInfo::new("42S02", None, None).numeric_code(), 42);
        assert_eq!(ErrorInfo::new("HY000", Some(1), None).numeric_code(), 0);
        assert_eq!(ErrorInfo::default().numeric_code(), 0);
    }

    #[test]
    fn test_error_from_info() {
        let info = ErrorInfo::new("23000", Some(19), Some("UNIQUE constraint failed".into()));
        let err = ExecutionError::from(info);
        assert_eq!(err, ExecutionError::new("UNIQUE constraint failed", 23000));
        assert_eq!(err.to_string(), "UNIQUE constraint failed");
    }

    #[test]
    fn test_default_mode_throws() {
        assert!(ErrorMode::default().is_exception());
        assert!(!ErrorMode::Warning.is_exception());
    }
}
