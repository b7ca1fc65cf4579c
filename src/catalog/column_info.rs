//! Column mapping for a single record field.

use crate::value::DataType;

/// Maps a record field to the column that stores it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub field_name: String,
    pub column_name: String,
    pub column_type: DataType,
}

impl ColumnDef {
    pub fn new(
        field_name: impl Into<String>,
        column_name: impl Into<String>,
        column_type: DataType,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            column_name: column_name.into(),
            column_type,
        }
    }

    /// A column named after its field
    pub fn field(name: impl Into<String>, column_type: DataType) -> Self {
        let name = name.into();
        Self::new(name.clone(), name, column_type)
    }
}
