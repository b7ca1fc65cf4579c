pub mod catalog;
pub mod error;
pub mod executor;
pub mod expression;
pub mod memory;
pub mod session;
pub mod sql;
pub mod value;

pub use catalog::{CatalogRegistry, ColumnDef, Record, TableDef};
pub use error::{QueryError, QueryResult};
pub use executor::{QueryExecutor, Row};
pub use expression::{Capture, Expr, Param, Predicate};
pub use memory::MemoryDatabase;
pub use session::{Session, SessionConfig};
pub use sql::{PlaceholderStyle, SqlStatement};
pub use value::{DataType, Value};
