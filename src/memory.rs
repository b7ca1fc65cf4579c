//! In-memory reference executor.
//!
//! Holds tables as plain row vectors and runs the SELECT subset the predicate
//! compiler produces, with SQL three-valued logic. It backs the command-line
//! demo and the test suites, and doubles as a check that compiled SQL means
//! what the host expression meant.

pub mod lexer;
pub mod parser;
pub mod token;

use crate::catalog::{Record, TableDef};
use crate::executor::{QueryExecutor, Row};
use crate::expression::operator::compare_values;
use crate::expression::LogicalOp;
use crate::sql::SqlParameter;
use crate::value::{DataType, Value};
use anyhow::{anyhow, bail, Context, Result};
use parking_lot::RwLock;
use parser::{Parser, PlaceholderRef, Projection, SqlExpr};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug)]
struct MemoryTable {
    columns: Vec<(String, DataType)>,
    rows: Vec<Vec<Value>>,
}

impl MemoryTable {
    fn column_index(&self, name: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|(column, _)| column == name)
            .ok_or_else(|| anyhow!("Column '{}' not found", name))
    }
}

/// Thread-safe in-memory database
#[derive(Debug, Default)]
pub struct MemoryDatabase {
    tables: RwLock<HashMap<String, MemoryTable>>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with the columns of `table`
    pub fn create_table(&self, table: &TableDef) -> Result<()> {
        let mut tables = self.tables.write();
        if tables.contains_key(&table.table_name) {
            bail!("Table '{}' already exists", table.table_name);
        }

        let columns = table
            .columns
            .iter()
            .map(|column| (column.column_name.clone(), column.column_type))
            .collect();
        tables.insert(
            table.table_name.clone(),
            MemoryTable {
                columns,
                rows: Vec::new(),
            },
        );
        log::debug!("Created table {}", table.table_name);
        Ok(())
    }

    /// Create the table backing record type `T`
    pub fn create_table_for<T: Record>(&self) -> Result<()> {
        self.create_table(&T::table())
    }

    /// Append a row of values in column order
    pub fn insert_values(&self, table_name: &str, values: Vec<Value>) -> Result<()> {
        let mut tables = self.tables.write();
        let table = tables
            .get_mut(table_name)
            .ok_or_else(|| anyhow!("Table '{}' not found", table_name))?;

        if values.len() != table.columns.len() {
            bail!(
                "Table '{}' has {} columns but {} values were supplied",
                table_name,
                table.columns.len(),
                values.len()
            );
        }
        for ((column, data_type), value) in table.columns.iter().zip(&values) {
            if !value.is_null() && !value.is_compatible_with(*data_type) {
                bail!(
                    "Value {} is not valid for column {} of type {}",
                    value,
                    column,
                    data_type
                );
            }
        }

        table.rows.push(values);
        Ok(())
    }

    /// Append a record to its table
    pub fn insert<T: Record>(&self, record: &T) -> Result<()> {
        let table = T::table();
        self.insert_values(&table.table_name, record.to_values())
            .with_context(|| format!("Failed to insert {} record", table.record_name))
    }

    pub fn row_count(&self, table_name: &str) -> Result<usize> {
        self.tables
            .read()
            .get(table_name)
            .map(|table| table.rows.len())
            .ok_or_else(|| anyhow!("Table '{}' not found", table_name))
    }
}

impl QueryExecutor for MemoryDatabase {
    fn execute(&self, sql: &str, parameters: &[SqlParameter]) -> Result<Vec<Row>> {
        log::debug!("Executing: {} ({} parameters)", sql, parameters.len());

        let mut parser = Parser::new(sql)?;
        let statement = parser
            .parse()
            .with_context(|| format!("Failed to parse '{}'", sql))?;
        if parser.positional_count() > parameters.len() {
            bail!(
                "Statement has {} placeholders but {} parameters were bound",
                parser.positional_count(),
                parameters.len()
            );
        }

        let tables = self.tables.read();
        let table = tables
            .get(&statement.table)
            .ok_or_else(|| anyhow!("Table '{}' not found", statement.table))?;

        let projection: Vec<usize> = match &statement.projection {
            Projection::All => (0..table.columns.len()).collect(),
            Projection::Columns(names) => names
                .iter()
                .map(|name| table.column_index(name))
                .collect::<Result<_>>()?,
        };
        let columns: Arc<[String]> = projection
            .iter()
            .map(|&index| table.columns[index].0.clone())
            .collect();

        let mut result = Vec::new();
        for row in &table.rows {
            let context = RowContext {
                table,
                row,
                parameters,
            };
            if let Some(filter) = &statement.filter {
                if truth(&context.eval(filter)?)? != Some(true) {
                    continue;
                }
            }

            let values = projection.iter().map(|&index| row[index].clone()).collect();
            result.push(Row::new(columns.clone(), values));
        }

        log::debug!("Returned {} rows from {}", result.len(), statement.table);
        Ok(result)
    }
}

/// Evaluation state for one candidate row
struct RowContext<'a> {
    table: &'a MemoryTable,
    row: &'a [Value],
    parameters: &'a [SqlParameter],
}

impl RowContext<'_> {
    fn eval(&self, expr: &SqlExpr) -> Result<Value> {
        match expr {
            SqlExpr::Column(name) => Ok(self.row[self.table.column_index(name)?].clone()),
            SqlExpr::Literal(value) => Ok(value.clone()),
            SqlExpr::Placeholder(reference) => self.bind(reference),
            SqlExpr::Compare { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                if left.is_null() || right.is_null() {
                    return Ok(Value::Null);
                }
                Ok(Value::Boolean(op.matches(compare_values(&left, &right)?)))
            }
            SqlExpr::Arithmetic { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Ok(op.apply(&left, &right)?)
            }
            SqlExpr::Logical { op, left, right } => {
                let left = truth(&self.eval(left)?)?;
                if left == Some(op.absorbing_element()) {
                    return Ok(Value::Boolean(op.absorbing_element()));
                }
                let right = truth(&self.eval(right)?)?;
                let result = match (op, left, right) {
                    (_, _, Some(r)) if r == op.absorbing_element() => Some(r),
                    (LogicalOp::And, Some(true), Some(true)) => Some(true),
                    (LogicalOp::Or, Some(false), Some(false)) => Some(false),
                    _ => None,
                };
                Ok(result.map(Value::Boolean).unwrap_or(Value::Null))
            }
            SqlExpr::Not(operand) => Ok(truth(&self.eval(operand)?)?
                .map(|b| Value::Boolean(!b))
                .unwrap_or(Value::Null)),
            SqlExpr::Negate(operand) => match self.eval(operand)? {
                Value::Int32(i) => Ok(Value::Int32(i.wrapping_neg())),
                Value::Null => Ok(Value::Null),
                other => bail!("Cannot negate {}", other),
            },
            SqlExpr::IsNull { expr, negated } => {
                Ok(Value::Boolean(self.eval(expr)?.is_null() != *negated))
            }
        }
    }

    fn bind(&self, reference: &PlaceholderRef) -> Result<Value> {
        let parameter = match reference {
            PlaceholderRef::Positional(index) => self.parameters.get(*index),
            PlaceholderRef::Numbered(n) => {
                let placeholder = format!("${}", n);
                self.parameters.iter().find(|p| p.placeholder == placeholder)
            }
            PlaceholderRef::Named(name) => {
                let placeholder = format!("@{}", name);
                self.parameters.iter().find(|p| p.placeholder == placeholder)
            }
        };

        parameter
            .map(|p| p.value.clone())
            .ok_or_else(|| anyhow!("No parameter bound for placeholder {:?}", reference))
    }
}

/// SQL truth value: `None` is UNKNOWN
fn truth(value: &Value) -> Result<Option<bool>> {
    match value {
        Value::Boolean(b) => Ok(Some(*b)),
        Value::Null => Ok(None),
        other => bail!("Expected a boolean condition, got {}", other),
    }
}
