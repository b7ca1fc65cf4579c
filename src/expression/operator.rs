//! Operator definitions for expressions.

use crate::expression::{ExpressionError, ExpressionResult};
use crate::value::{DataType, Value};
use std::cmp::Ordering;

/// Comparison operators, always producing a boolean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    /// Get the SQL spelling for this operator
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    /// The operator that gives the same result with its operands swapped
    pub fn flip(&self) -> Self {
        match self {
            CompareOp::Eq => CompareOp::Eq,
            CompareOp::Ne => CompareOp::Ne,
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Le => CompareOp::Ge,
            CompareOp::Gt => CompareOp::Lt,
            CompareOp::Ge => CompareOp::Le,
        }
    }

    /// Whether this is `=` or `<>`
    pub fn is_equality(&self) -> bool {
        matches!(self, CompareOp::Eq | CompareOp::Ne)
    }

    /// Apply the operator to the ordering of its two operands
    pub fn matches(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
        }
    }

    /// Check if two types are compatible for comparison
    pub fn types_compatible(&self, left: DataType, right: DataType) -> bool {
        // Only same-type comparisons for now; no implicit numeric widening.
        left == right
    }
}

/// Boolean connectives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }

    /// The operand value that decides the result on its own:
    /// `false` for AND, `true` for OR.
    pub fn absorbing_element(&self) -> bool {
        match self {
            LogicalOp::And => false,
            LogicalOp::Or => true,
        }
    }

    /// The operand value that leaves the other operand unchanged
    pub fn identity_element(&self) -> bool {
        !self.absorbing_element()
    }
}

/// Arithmetic operators allowed inside comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl ArithmeticOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
            ArithmeticOp::Mod => "%",
        }
    }

    /// Get the output type of this operator given input types
    pub fn output_type(&self, left: DataType, right: DataType) -> Option<DataType> {
        match (self, left, right) {
            (_, DataType::Int32, DataType::Int32) => Some(DataType::Int32),
            (ArithmeticOp::Add, DataType::Varchar, DataType::Varchar) => Some(DataType::Varchar),
            _ => None,
        }
    }

    /// Apply the operator to two values. NULL propagates.
    pub fn apply(&self, left: &Value, right: &Value) -> ExpressionResult<Value> {
        match (left, right) {
            (Value::Null, _) | (_, Value::Null) => Ok(Value::Null),
            (Value::Int32(a), Value::Int32(b)) => match self {
                ArithmeticOp::Add => Ok(Value::Int32(a.wrapping_add(*b))),
                ArithmeticOp::Sub => Ok(Value::Int32(a.wrapping_sub(*b))),
                ArithmeticOp::Mul => Ok(Value::Int32(a.wrapping_mul(*b))),
                ArithmeticOp::Div | ArithmeticOp::Mod if *b == 0 => {
                    Err(ExpressionError::DivisionByZero)
                }
                ArithmeticOp::Div => Ok(Value::Int32(a.wrapping_div(*b))),
                ArithmeticOp::Mod => Ok(Value::Int32(a.wrapping_rem(*b))),
            },
            (Value::String(a), Value::String(b)) if *self == ArithmeticOp::Add => {
                Ok(Value::String(format!("{}{}", a, b)))
            }
            _ => Err(ExpressionError::InvalidOperandTypes {
                operator: self.as_str().to_string(),
                left_type: left.data_type(),
                right_type: right.data_type(),
            }),
        }
    }
}

/// Order two non-NULL values of the same type
pub fn compare_values(left: &Value, right: &Value) -> ExpressionResult<Ordering> {
    match (left, right) {
        (Value::Int32(a), Value::Int32(b)) => Ok(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        (Value::Boolean(a), Value::Boolean(b)) => Ok(a.cmp(b)),
        _ => Err(ExpressionError::InvalidOperandTypes {
            operator: "comparison".to_string(),
            left_type: left.data_type(),
            right_type: right.data_type(),
        }),
    }
}
