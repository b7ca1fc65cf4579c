//! Typed boolean predicates over a record type.

use crate::expression::{Expr, Owner};
use std::fmt;
use std::marker::PhantomData;

/// Name given to the record parameter when none is chosen
pub const DEFAULT_PARAMETER: &str = "q";

/// The record parameter handed to a predicate builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    name: String,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reference a field of the record, e.g. `q.field("IntColumn")`
    pub fn field(&self, name: impl Into<String>) -> Expr {
        Expr::member(Owner::Parameter(self.name.clone()), name)
    }
}

/// A boolean expression over the fields of `T` plus captured host values
pub struct Predicate<T> {
    parameter: Param,
    body: Expr,
    _record: PhantomData<fn() -> T>,
}

impl<T> Predicate<T> {
    /// Build a predicate from a closure over the record parameter
    pub fn new(build: impl FnOnce(&Param) -> Expr) -> Self {
        Self::named(DEFAULT_PARAMETER, build)
    }

    /// Like [`Predicate::new`] with an explicit parameter name
    pub fn named(parameter: impl Into<String>, build: impl FnOnce(&Param) -> Expr) -> Self {
        let parameter = Param::new(parameter);
        let body = build(&parameter);
        Self::from_parts(parameter, body)
    }

    pub fn from_parts(parameter: Param, body: Expr) -> Self {
        Self {
            parameter,
            body,
            _record: PhantomData,
        }
    }

    pub fn parameter(&self) -> &Param {
        &self.parameter
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self::from_parts(self.parameter.clone(), self.body.clone())
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("parameter", &self.parameter.name)
            .field("body", &self.body)
            .finish()
    }
}

impl<T> fmt::Display for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {}", self.parameter.name, self.body)
    }
}
