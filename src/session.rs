//! Query facade: compiles a predicate, runs it and materializes records.

use crate::catalog::{CatalogRegistry, Record, TableDef};
use crate::error::{QueryError, QueryResult};
use crate::executor::QueryExecutor;
use crate::expression::{Expr, Predicate};
use crate::sql::{
    ColumnResolver, FragmentKind, Lowered, PlaceholderStyle, PredicateCompiler, SqlFragment,
    SqlStatement,
};
use crate::value::Value;
use std::sync::Arc;

/// Per-session settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Placeholder spelling used when rendering statements
    pub placeholder_style: PlaceholderStyle,
}

/// Entry point for typed queries against one executor
pub struct Session<E: QueryExecutor> {
    executor: E,
    registry: Arc<CatalogRegistry>,
    config: SessionConfig,
}

impl<E: QueryExecutor> Session<E> {
    /// Create a session using the process-wide catalog registry
    pub fn new(executor: E) -> Self {
        Self::with_config(executor, SessionConfig::default())
    }

    pub fn with_config(executor: E, config: SessionConfig) -> Self {
        Self {
            executor,
            registry: CatalogRegistry::global(),
            config,
        }
    }

    /// Use a private catalog registry instead of the global one
    pub fn with_registry(mut self, registry: Arc<CatalogRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Build the SELECT statement for `predicate` without running it
    pub fn prepare_select<T: Record>(&self, predicate: &Predicate<T>) -> QueryResult<SqlStatement> {
        let table = self.registry.table_for::<T>();
        let resolver = ColumnResolver::new(
            table.as_ref(),
            &table.record_name,
            predicate.parameter().name(),
        );
        let compiler = PredicateCompiler::new(resolver);

        let mut statement = select_clause(&table);
        match compiler.lower(predicate.body())? {
            Lowered::Folded(true) => {}
            Lowered::Folded(false) => {
                statement.push_sql(" WHERE ");
                statement.push_parameter(Value::Boolean(false));
            }
            Lowered::Fragment(filter) => {
                statement.push_sql(" WHERE ");
                statement.append(filter);
            }
        }

        Ok(statement.render(self.config.placeholder_style))
    }

    /// Run `predicate` and return the matching records in executor order
    pub fn select<T: Record>(&self, predicate: &Predicate<T>) -> QueryResult<Vec<T>> {
        let statement = self.prepare_select(predicate)?;
        log::debug!("{} => {}", predicate, statement);
        self.run(&statement)
    }

    /// Every record of `T`
    pub fn select_all<T: Record>(&self) -> QueryResult<Vec<T>> {
        self.select(&Predicate::new(|_| Expr::constant(true)))
    }

    /// The single record matching `predicate`, `None` when nothing matches
    pub fn single<T: Record>(&self, predicate: &Predicate<T>) -> QueryResult<Option<T>> {
        let mut records = self.select(predicate)?;
        match records.len() {
            0 => Ok(None),
            1 => Ok(records.pop()),
            count => Err(QueryError::MultipleRows {
                record: self.registry.table_for::<T>().record_name.clone(),
                count,
            }),
        }
    }

    fn run<T: Record>(&self, statement: &SqlStatement) -> QueryResult<Vec<T>> {
        let rows = self
            .executor
            .execute(&statement.text, &statement.parameters)
            .map_err(QueryError::Execution)?;

        let records = rows
            .iter()
            .map(|row| {
                T::from_row(row).map_err(|err| QueryError::Materialize {
                    record: self.registry.table_for::<T>().record_name.clone(),
                    message: format!("{:#}", err),
                })
            })
            .collect::<QueryResult<Vec<T>>>()?;

        log::debug!("Materialized {} rows", records.len());
        Ok(records)
    }
}

fn select_clause(table: &TableDef) -> SqlFragment {
    SqlFragment::sql(
        format!(
            "SELECT {} FROM {}",
            table.column_names().join(", "),
            table.table_name
        ),
        FragmentKind::Statement,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Row;
    use crate::memory::MemoryDatabase;
    use crate::sql::SqlParameter;
    use crate::value::DataType;
    use anyhow::Result;
    use parking_lot::Mutex;

    #[derive(Debug, PartialEq)]
    struct Account {
        id: i32,
        active: bool,
    }

    impl Record for Account {
        fn table() -> TableDef {
            TableDef::new("Account")
                .with_table_name("accounts")
                .column("Id", "account_id", DataType::Int32)
                .field("Active", DataType::Boolean)
        }

        fn from_row(row: &Row) -> Result<Self> {
            Ok(Account {
                id: row.try_get("account_id")?,
                active: row.try_get("Active")?,
            })
        }

        fn to_values(&self) -> Vec<Value> {
            vec![self.id.into(), self.active.into()]
        }
    }

    fn session() -> Session<MemoryDatabase> {
        let db = MemoryDatabase::new();
        db.create_table_for::<Account>().unwrap();
        for (id, active) in [(1, true), (2, false), (3, true)] {
            db.insert(&Account { id, active }).unwrap();
        }
        Session::new(db).with_registry(Arc::new(CatalogRegistry::new()))
    }

    #[test]
    fn test_prepare_select() {
        let session = session();
        let predicate = Predicate::<Account>::new(|a| Expr::gt(a.field("Id"), 1));
        let statement = session.prepare_select(&predicate).unwrap();
        assert_eq!(
            statement.text,
            "SELECT account_id, Active FROM accounts WHERE account_id > ?"
        );
        assert_eq!(statement.values(), vec![Value::Int32(1)]);
    }

    #[test]
    fn test_folded_predicates() {
        let session = session();

        let always = Predicate::<Account>::new(|_| Expr::capture("flag", true));
        let statement = session.prepare_select(&always).unwrap();
        assert_eq!(statement.text, "SELECT account_id, Active FROM accounts");
        assert!(statement.parameters.is_empty());

        let never = Predicate::<Account>::new(|_| Expr::capture("flag", false));
        let statement = session.prepare_select(&never).unwrap();
        assert_eq!(
            statement.text,
            "SELECT account_id, Active FROM accounts WHERE ?"
        );
        assert_eq!(statement.values(), vec![Value::Boolean(false)]);
        assert!(session.select(&never).unwrap().is_empty());
    }

    #[test]
    fn test_select_and_single() {
        let session = session();

        let active = Predicate::<Account>::new(|a| a.field("Active"));
        let ids: Vec<i32> = session
            .select(&active)
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);

        assert_eq!(session.select_all::<Account>().unwrap().len(), 3);

        let two = Predicate::<Account>::new(|a| Expr::eq(a.field("Id"), 2));
        assert_eq!(
            session.single(&two).unwrap(),
            Some(Account {
                id: 2,
                active: false
            })
        );
        let none = Predicate::<Account>::new(|a| Expr::eq(a.field("Id"), 9));
        assert_eq!(session.single(&none).unwrap(), None);
        assert!(matches!(
            session.single(&active),
            Err(QueryError::MultipleRows { count: 2, .. })
        ));
    }

    #[test]
    fn test_numbered_style() {
        let db = MemoryDatabase::new();
        db.create_table_for::<Account>().unwrap();
        let session = Session::with_config(
            db,
            SessionConfig {
                placeholder_style: PlaceholderStyle::Numbered,
            },
        )
        .with_registry(Arc::new(CatalogRegistry::new()));

        let predicate = Predicate::<Account>::new(|a| {
            Expr::and(Expr::ge(a.field("Id"), 1), Expr::not_expr(a.field("Active")))
        });
        let statement = session.prepare_select(&predicate).unwrap();
        assert_eq!(
            statement.text,
            "SELECT account_id, Active FROM accounts WHERE account_id >= $1 AND NOT (Active = $2)"
        );
        assert!(session.select(&predicate).unwrap().is_empty());
    }

    /// Records what it is asked to run and fails
    #[derive(Default)]
    struct FailingExecutor {
        seen: Mutex<Vec<(String, Vec<SqlParameter>)>>,
    }

    impl QueryExecutor for FailingExecutor {
        fn execute(&self, sql: &str, parameters: &[SqlParameter]) -> Result<Vec<Row>> {
            self.seen.lock().push((sql.to_string(), parameters.to_vec()));
            anyhow::bail!("connection refused")
        }
    }

    #[test]
    fn test_execution_error() {
        let session = Session::new(FailingExecutor::default())
            .with_registry(Arc::new(CatalogRegistry::new()));
        let predicate = Predicate::<Account>::new(|a| Expr::eq(a.field("Id"), 1));

        let err = session.select(&predicate).unwrap_err();
        assert!(matches!(err, QueryError::Execution(_)));
        assert_eq!(err.to_string(), "Execution error: connection refused");

        let seen = session.executor().seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1[0].value, Value::Int32(1));
    }

    #[test]
    fn test_compile_error_skips_executor() {
        let session = Session::new(FailingExecutor::default())
            .with_registry(Arc::new(CatalogRegistry::new()));
        let predicate = Predicate::<Account>::new(|a| Expr::eq(a.field("Missing"), 1));

        assert!(matches!(
            session.select(&predicate),
            Err(QueryError::UnknownColumn { .. })
        ));
        assert!(session.executor().seen.lock().is_empty());
    }

    #[test]
    fn test_materialize_error() {
        #[derive(Debug)]
        struct Strict;
        impl Record for Strict {
            fn table() -> TableDef {
                Account::table()
            }
            fn from_row(row: &Row) -> Result<Self> {
                let _: String = row.try_get("Active")?;
                Ok(Strict)
            }
            fn to_values(&self) -> Vec<Value> {
                Vec::new()
            }
        }

        let session = session();
        let err = session.select_all::<Strict>().unwrap_err();
        assert!(matches!(err, QueryError::Materialize { .. }));
    }
}
