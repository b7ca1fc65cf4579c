//! Resolution of record member accesses to catalog columns.

use crate::catalog::{ColumnCatalog, ColumnDef};
use crate::error::{QueryError, QueryResult};
use crate::expression::Owner;

/// Resolves `q.Field` against the catalog of the queried record
pub struct ColumnResolver<'a> {
    catalog: &'a dyn ColumnCatalog,
    record_name: &'a str,
    parameter: &'a str,
}

impl<'a> ColumnResolver<'a> {
    /// * `record_name` - record the predicate ranges over
    /// * `parameter` - name the predicate binds the record to
    pub fn new(catalog: &'a dyn ColumnCatalog, record_name: &'a str, parameter: &'a str) -> Self {
        Self {
            catalog,
            record_name,
            parameter,
        }
    }

    /// Resolve a member access rooted at the bound parameter
    pub fn resolve(&self, owner: &Owner, member: &str) -> QueryResult<&'a ColumnDef> {
        match owner {
            Owner::Parameter(name) if name == self.parameter => self
                .catalog
                .resolve(self.record_name, member)
                .ok_or_else(|| QueryError::UnknownColumn {
                    record: self.record_name.to_string(),
                    field: member.to_string(),
                }),
            Owner::Parameter(name) => Err(QueryError::unsupported(format!(
                "member access '{}.{}' is not rooted at the query parameter '{}'",
                name, member, self.parameter
            ))),
            Owner::Capture(capture) => Err(QueryError::unsupported(format!(
                "captured value '{}.{}' cannot be resolved to a column",
                capture.name, member
            ))),
        }
    }
}
