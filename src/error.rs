//! Errors raised while compiling or running a query.

use crate::expression::ExpressionError;
use thiserror::Error;

/// Errors that abort a `select` call. Nothing is retried internally.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Unknown column: {record}.{field} has no mapped column")]
    UnknownColumn { record: String, field: String },

    #[error("Unsupported expression: {0}")]
    UnsupportedExpression(String),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] ExpressionError),

    #[error("Execution error: {0:#}")]
    Execution(anyhow::Error),

    #[error("Failed to materialize {record} row: {message}")]
    Materialize { record: String, message: String },

    #[error("Expected at most one {record} row, got {count}")]
    MultipleRows { record: String, count: usize },
}

impl QueryError {
    pub fn unsupported(reason: impl Into<String>) -> Self {
        QueryError::UnsupportedExpression(reason.into())
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QueryError::UnknownColumn {
            record: "TestType".to_string(),
            field: "Missing".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unknown column: TestType.Missing has no mapped column"
        );

        let err: QueryError = ExpressionError::DivisionByZero.into();
        assert_eq!(err.to_string(), "Evaluation error: Division by zero");

        let err = QueryError::Execution(
            anyhow::anyhow!("table not found").context("executing SELECT"),
        );
        assert_eq!(
            err.to_string(),
            "Execution error: executing SELECT: table not found"
        );
    }
}
