//! Host-side evaluation of closed expressions.
//!
//! Closed subtrees hold no column reference, so they are evaluated here with
//! host semantics (two-valued logic, short-circuit AND/OR, NULL as an ordinary
//! value for equality) and the result is bound as a query parameter.

use crate::expression::operator::{compare_values, CompareOp, LogicalOp};
use crate::expression::{Captured, Expr, ExpressionError, ExpressionResult, Owner};
use crate::value::{DataType, Value};

/// Evaluator for closed expressions
#[derive(Debug, Default, Clone, Copy)]
pub struct LiteralEvaluator;

impl LiteralEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate an expression and return the result
    pub fn evaluate(&self, expr: &Expr) -> ExpressionResult<Value> {
        match expr {
            Expr::Constant(value) => Ok(value.clone()),

            Expr::Capture(capture) => match &capture.value {
                Captured::Scalar(value) => Ok(value.clone()),
                Captured::Object(_) => Err(ExpressionError::EvaluationError {
                    message: format!(
                        "captured object '{}' cannot be used as a value",
                        capture.name
                    ),
                }),
            },

            Expr::MemberAccess { owner, member } => self.evaluate_member(owner, member),

            Expr::Comparison { op, left, right } => {
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                self.evaluate_comparison(*op, &left_val, &right_val)
            }

            Expr::Arithmetic { op, left, right } => {
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                op.apply(&left_val, &right_val)
            }

            Expr::Logical { op, left, right } => self.evaluate_logical(*op, left, right),

            Expr::Not(operand) => {
                let value = self.evaluate_bool(operand, "NOT operand")?;
                Ok(Value::Boolean(!value))
            }
        }
    }

    /// Evaluate an expression that must produce a non-NULL boolean
    pub fn evaluate_bool(&self, expr: &Expr, context: &str) -> ExpressionResult<bool> {
        match self.evaluate(expr)? {
            Value::Boolean(b) => Ok(b),
            Value::Null => Err(ExpressionError::UnexpectedNull {
                context: context.to_string(),
            }),
            other => Err(ExpressionError::TypeMismatch {
                expected: DataType::Boolean,
                actual: other.data_type(),
                context: context.to_string(),
            }),
        }
    }

    fn evaluate_member(&self, owner: &Owner, member: &str) -> ExpressionResult<Value> {
        match owner {
            Owner::Parameter(name) => Err(ExpressionError::NotClosed {
                expression: format!("{}.{}", name, member),
            }),
            Owner::Capture(capture) => match &capture.value {
                Captured::Object(fields) => {
                    fields
                        .get(member)
                        .cloned()
                        .ok_or_else(|| ExpressionError::UnknownMember {
                            owner: capture.name.clone(),
                            member: member.to_string(),
                        })
                }
                Captured::Scalar(_) => Err(ExpressionError::UnknownMember {
                    owner: capture.name.clone(),
                    member: member.to_string(),
                }),
            },
        }
    }

    /// Compare with host semantics: NULL equals NULL, and any ordering
    /// comparison involving NULL is false.
    fn evaluate_comparison(
        &self,
        op: CompareOp,
        left: &Value,
        right: &Value,
    ) -> ExpressionResult<Value> {
        let result = match (left, right) {
            (Value::Null, Value::Null) => op == CompareOp::Eq,
            (Value::Null, _) | (_, Value::Null) => op == CompareOp::Ne,
            _ => op.matches(compare_values(left, right)?),
        };
        Ok(Value::Boolean(result))
    }

    fn evaluate_logical(&self, op: LogicalOp, left: &Expr, right: &Expr) -> ExpressionResult<Value> {
        let context = format!("{} operand", op.as_str());
        let left_val = self.evaluate_bool(left, &context)?;
        if left_val == op.absorbing_element() {
            return Ok(Value::Boolean(left_val));
        }
        let right_val = self.evaluate_bool(right, &context)?;
        Ok(Value::Boolean(right_val))
    }
}
