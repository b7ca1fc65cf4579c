//! Record catalog: which table and columns back a record type.
//!
//! Table descriptions are built lazily the first time a record type is
//! queried and then shared read-only by every later query.

pub mod column_info;
pub mod table_info;

pub use column_info::ColumnDef;
pub use table_info::TableDef;

use crate::executor::Row;
use crate::value::Value;
use anyhow::Result;
use dashmap::DashMap;
use std::any::TypeId;
use std::sync::{Arc, OnceLock};

/// Field → column lookup used while compiling predicates
pub trait ColumnCatalog {
    /// Resolve `record_name.field_name` to its column, or `None` when unmapped
    fn resolve(&self, record_name: &str, field_name: &str) -> Option<&ColumnDef>;
}

/// A record type that can be queried
pub trait Record: Sized + 'static {
    /// Describe the table backing this record
    fn table() -> TableDef;

    /// Build a record from a row returned by the executor
    fn from_row(row: &Row) -> Result<Self>;

    /// Column values in table order, used to load fixtures
    fn to_values(&self) -> Vec<Value>;
}

/// Cache of table descriptions keyed by record type
#[derive(Debug, Default)]
pub struct CatalogRegistry {
    tables: DashMap<TypeId, Arc<TableDef>>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry
    pub fn global() -> Arc<CatalogRegistry> {
        static GLOBAL: OnceLock<Arc<CatalogRegistry>> = OnceLock::new();
        GLOBAL
            .get_or_init(|| Arc::new(CatalogRegistry::new()))
            .clone()
    }

    /// Get the table description for `T`, building it on first use
    pub fn table_for<T: Record>(&self) -> Arc<TableDef> {
        if let Some(table) = self.tables.get(&TypeId::of::<T>()) {
            return table.clone();
        }

        self.tables
            .entry(TypeId::of::<T>())
            .or_insert_with(|| {
                let table = T::table();
                log::debug!(
                    "Registered record {} as table {} ({} columns)",
                    table.record_name,
                    table.table_name,
                    table.columns.len()
                );
                Arc::new(table)
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::DataType;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    static BUILDS: AtomicUsize = AtomicUsize::new(0);

    struct Counted;

    impl Record for Counted {
        fn table() -> TableDef {
            BUILDS.fetch_add(1, Ordering::SeqCst);
            TableDef::new("Counted").field("Id", DataType::Int32)
        }

        fn from_row(_row: &Row) -> Result<Self> {
            Ok(Counted)
        }

        fn to_values(&self) -> Vec<Value> {
            vec![Value::Int32(0)]
        }
    }

    #[test]
    fn test_table_built_once_and_shared() {
        let registry = Arc::new(CatalogRegistry::new());
        assert!(registry.is_empty());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || registry.table_for::<Counted>())
            })
            .collect();

        let tables: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for table in &tables {
            assert!(Arc::ptr_eq(table, &tables[0]));
        }

        assert_eq!(registry.len(), 1);
        assert_eq!(BUILDS.load(Ordering::SeqCst), 1);
        assert_eq!(tables[0].column_names(), vec!["Id"]);
    }
}
