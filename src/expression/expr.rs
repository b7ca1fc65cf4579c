//! Expression AST definitions.

use crate::expression::operator::{ArithmeticOp, CompareOp, LogicalOp};
use crate::value::Value;
use std::collections::BTreeMap;
use std::fmt;

/// A value captured from the enclosing scope, resolved when the tree is built
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    pub name: String,
    pub value: Captured,
}

/// Captured value: a scalar local or an anonymous object with named members
#[derive(Debug, Clone, PartialEq)]
pub enum Captured {
    Scalar(Value),
    Object(BTreeMap<String, Value>),
}

impl Capture {
    pub fn scalar(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: Captured::Scalar(value.into()),
        }
    }

    pub fn object<K, V>(name: impl Into<String>, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            name: name.into(),
            value: Captured::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Access a member of this capture, e.g. `model.StringValue`
    pub fn member(&self, member: impl Into<String>) -> Expr {
        Expr::member(Owner::Capture(self.clone()), member)
    }
}

/// The object a member access is rooted at
#[derive(Debug, Clone, PartialEq)]
pub enum Owner {
    /// The query's record parameter (`q` in `q => q.IntColumn > 2`)
    Parameter(String),
    /// A captured object
    Capture(Capture),
}

impl Owner {
    pub fn name(&self) -> &str {
        match self {
            Owner::Parameter(name) => name,
            Owner::Capture(capture) => &capture.name,
        }
    }
}

/// Expression tree node
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Literal constant value
    Constant(Value),

    /// `owner.member`
    MemberAccess { owner: Owner, member: String },

    /// Captured local
    Capture(Capture),

    Comparison {
        op: CompareOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Arithmetic {
        op: ArithmeticOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Logical {
        op: LogicalOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    Not(Box<Expr>),
}

impl Expr {
    /// Create a literal expression
    pub fn constant(value: impl Into<Value>) -> Self {
        Expr::Constant(value.into())
    }

    /// Create a scalar capture
    pub fn capture(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Expr::Capture(Capture::scalar(name, value))
    }

    /// Create a member access expression
    pub fn member(owner: Owner, member: impl Into<String>) -> Self {
        Expr::MemberAccess {
            owner,
            member: member.into(),
        }
    }

    /// Create a comparison expression
    pub fn compare(op: CompareOp, left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Expr::Comparison {
            op,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        }
    }

    /// Create an arithmetic expression
    pub fn arithmetic(op: ArithmeticOp, left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Expr::Arithmetic {
            op,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        }
    }

    /// Create a logical expression
    pub fn logical(op: LogicalOp, left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Expr::Logical {
            op,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        }
    }

    /// Create an AND expression
    pub fn and(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::logical(LogicalOp::And, left, right)
    }

    /// Create an OR expression
    pub fn or(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::logical(LogicalOp::Or, left, right)
    }

    /// Create a NOT expression
    pub fn not_expr(operand: impl Into<Expr>) -> Self {
        Expr::Not(Box::new(operand.into()))
    }

    /// Create an equality expression
    pub fn eq(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::compare(CompareOp::Eq, left, right)
    }

    /// Create a not-equal expression
    pub fn ne(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::compare(CompareOp::Ne, left, right)
    }

    /// Create a less-than expression
    pub fn lt(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::compare(CompareOp::Lt, left, right)
    }

    /// Create a less-than-or-equal expression
    pub fn le(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::compare(CompareOp::Le, left, right)
    }

    /// Create a greater-than expression
    pub fn gt(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::compare(CompareOp::Gt, left, right)
    }

    /// Create a greater-than-or-equal expression
    pub fn ge(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::compare(CompareOp::Ge, left, right)
    }

    pub fn add_expr(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::arithmetic(ArithmeticOp::Add, left, right)
    }

    pub fn sub_expr(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::arithmetic(ArithmeticOp::Sub, left, right)
    }

    pub fn mul_expr(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::arithmetic(ArithmeticOp::Mul, left, right)
    }

    pub fn div_expr(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::arithmetic(ArithmeticOp::Div, left, right)
    }

    pub fn rem_expr(left: impl Into<Expr>, right: impl Into<Expr>) -> Self {
        Self::arithmetic(ArithmeticOp::Mod, left, right)
    }
}

impl std::ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::not_expr(self)
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Constant(value)
    }
}

impl From<bool> for Expr {
    fn from(value: bool) -> Self {
        Expr::Constant(Value::Boolean(value))
    }
}

impl From<i32> for Expr {
    fn from(value: i32) -> Self {
        Expr::Constant(Value::Int32(value))
    }
}

impl From<&str> for Expr {
    fn from(value: &str) -> Self {
        Expr::Constant(Value::String(value.to_string()))
    }
}

impl From<String> for Expr {
    fn from(value: String) -> Self {
        Expr::Constant(Value::String(value))
    }
}

impl From<Capture> for Expr {
    fn from(capture: Capture) -> Self {
        Expr::Capture(capture)
    }
}

impl From<&Capture> for Expr {
    fn from(capture: &Capture) -> Self {
        Expr::Capture(capture.clone())
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(value) => write!(f, "{}", value),
            Expr::MemberAccess { owner, member } => write!(f, "{}.{}", owner.name(), member),
            Expr::Capture(capture) => write!(f, "{}", capture.name),
            Expr::Comparison { op, left, right } => {
                let op = match op {
                    CompareOp::Eq => "==",
                    CompareOp::Ne => "!=",
                    other => other.as_str(),
                };
                write!(f, "{} {} {}", left, op, right)
            }
            Expr::Arithmetic { op, left, right } => {
                write!(f, "({} {} {})", left, op.as_str(), right)
            }
            Expr::Logical { op, left, right } => {
                let op = match op {
                    LogicalOp::And => "&&",
                    LogicalOp::Or => "||",
                };
                write!(f, "({} {} {})", left, op, right)
            }
            // Comparisons print bare
            Expr::Not(operand) => match operand.as_ref() {
                Expr::Comparison { .. } => write!(f, "!({})", operand),
                _ => write!(f, "!{}", operand),
            },
        }
    }
}
