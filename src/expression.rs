//! Host expression trees and their host-side evaluation.
//!
//! This module provides:
//! - The expression AST built by predicates (`Expr`, `Capture`, `Owner`)
//! - Operators shared with the SQL side
//! - Closed / column-dependent classification of nodes
//! - Host-side evaluation of closed subtrees

pub mod classify;
pub mod error;
pub mod eval;
pub mod expr;
pub mod operator;
pub mod predicate;

pub use classify::{classify, Classification};
pub use error::{ExpressionError, ExpressionResult};
pub use eval::LiteralEvaluator;
pub use expr::{Capture, Captured, Expr, Owner};
pub use operator::{ArithmeticOp, CompareOp, LogicalOp};
pub use predicate::{Param, Predicate};
