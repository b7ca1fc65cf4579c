//! Boundary to whatever actually runs SQL.
//!
//! The compiler hands the executor finished SQL text plus the ordered
//! parameter list and gets rows back. Transport, dialect translation and
//! pooling all live behind this trait.

use crate::sql::SqlParameter;
use crate::value::{FromValue, Value};
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;

/// Runs SQL produced by the compiler
pub trait QueryExecutor {
    /// Execute `sql` with `parameters` bound in order and return the rows in
    /// the order the backend produced them.
    fn execute(&self, sql: &str, parameters: &[SqlParameter]) -> Result<Vec<Row>>;
}

impl<E: QueryExecutor + ?Sized> QueryExecutor for &E {
    fn execute(&self, sql: &str, parameters: &[SqlParameter]) -> Result<Vec<Row>> {
        (**self).execute(sql, parameters)
    }
}

impl<E: QueryExecutor + ?Sized> QueryExecutor for Arc<E> {
    fn execute(&self, sql: &str, parameters: &[SqlParameter]) -> Result<Vec<Row>> {
        (**self).execute(sql, parameters)
    }
}

impl<E: QueryExecutor + ?Sized> QueryExecutor for Box<E> {
    fn execute(&self, sql: &str, parameters: &[SqlParameter]) -> Result<Vec<Row>> {
        (**self).execute(sql, parameters)
    }
}

/// A raw result row: column names shared across the result set plus values
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        debug_assert_eq!(columns.len(), values.len());
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Get a value by column name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|name| name == column)
            .and_then(|index| self.values.get(index))
    }

    /// Get a value by column name converted to a Rust type
    pub fn try_get<T: FromValue>(&self, column: &str) -> Result<T> {
        let value = self
            .get(column)
            .ok_or_else(|| anyhow!("Column '{}' not present in row", column))?;
        T::from_value(value).with_context(|| format!("Failed to read column '{}'", column))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_access() -> Result<()> {
        let columns: Arc<[String]> = vec!["Id".to_string(), "Name".to_string()].into();
        let row = Row::new(columns, vec![Value::Int32(1), Value::Null]);

        assert_eq!(row.get("Id"), Some(&Value::Int32(1)));
        assert_eq!(row.try_get::<i32>("Id")?, 1);
        assert_eq!(row.try_get::<Option<String>>("Name")?, None);
        assert!(row.try_get::<String>("Name").is_err());
        assert!(row.try_get::<i32>("Missing").is_err());
        Ok(())
    }
}
