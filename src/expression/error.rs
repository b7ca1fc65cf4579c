//! Error types for host-side expression evaluation.

use crate::value::DataType;
use std::fmt;

/// Errors that can occur while evaluating a closed expression
#[derive(Debug, Clone, PartialEq)]
pub enum ExpressionError {
    /// Type mismatch in operation
    TypeMismatch {
        expected: DataType,
        actual: Option<DataType>,
        context: String,
    },

    /// Invalid operand types for operator
    InvalidOperandTypes {
        operator: String,
        left_type: Option<DataType>,
        right_type: Option<DataType>,
    },

    /// Division by zero
    DivisionByZero,

    /// NULL value in non-nullable context
    UnexpectedNull { context: String },

    /// Member access on a captured object that has no such member
    UnknownMember { owner: String, member: String },

    /// A column reference reached the host-side evaluator
    NotClosed { expression: String },

    /// Generic evaluation error
    EvaluationError { message: String },
}

impl fmt::Display for ExpressionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionError::TypeMismatch {
                expected,
                actual,
                context,
            } => match actual {
                Some(actual) => write!(
                    f,
                    "Type mismatch in {}: expected {}, got {}",
                    context, expected, actual
                ),
                None => write!(
                    f,
                    "Type mismatch in {}: expected {}, got NULL",
                    context, expected
                ),
            },

            ExpressionError::InvalidOperandTypes {
                operator,
                left_type,
                right_type,
            } => {
                write!(
                    f,
                    "Invalid operand types for operator {}: left={:?}, right={:?}",
                    operator, left_type, right_type
                )
            }

            ExpressionError::DivisionByZero => write!(f, "Division by zero"),

            ExpressionError::UnexpectedNull { context } => {
                write!(f, "Unexpected NULL value in {}", context)
            }

            ExpressionError::UnknownMember { owner, member } => {
                write!(f, "Captured value '{}' has no member '{}'", owner, member)
            }

            ExpressionError::NotClosed { expression } => {
                write!(
                    f,
                    "Expression '{}' references a column and cannot be evaluated host-side",
                    expression
                )
            }

            ExpressionError::EvaluationError { message } => {
                write!(f, "Expression evaluation error: {}", message)
            }
        }
    }
}

impl std::error::Error for ExpressionError {}

/// Result type for expression operations
pub type ExpressionResult<T> = Result<T, ExpressionError>;
