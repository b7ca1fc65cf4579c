//! Table description for a record type.

use crate::catalog::{ColumnCatalog, ColumnDef};
use crate::value::DataType;

/// Describes how a record type is stored: its table and field→column mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    pub record_name: String,
    pub table_name: String,
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    /// Start a table description; the table is named after the record
    pub fn new(record_name: impl Into<String>) -> Self {
        let record_name = record_name.into();
        Self {
            table_name: record_name.clone(),
            record_name,
            columns: Vec::new(),
        }
    }

    pub fn with_table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Add a field stored in a column of the same name
    pub fn field(mut self, name: impl Into<String>, column_type: DataType) -> Self {
        self.columns.push(ColumnDef::field(name, column_type));
        self
    }

    /// Add a field stored in a differently named column
    pub fn column(
        mut self,
        field_name: impl Into<String>,
        column_name: impl Into<String>,
        column_type: DataType,
    ) -> Self {
        self.columns
            .push(ColumnDef::new(field_name, column_name, column_type));
        self
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(|col| col.column_name.as_str())
            .collect()
    }

    pub fn find_field(&self, field_name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|col| col.field_name == field_name)
    }
}

impl ColumnCatalog for TableDef {
    fn resolve(&self, record_name: &str, field_name: &str) -> Option<&ColumnDef> {
        if record_name != self.record_name {
            return None;
        }
        self.find_field(field_name)
    }
}
