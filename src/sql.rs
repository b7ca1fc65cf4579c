// SQL module - predicate lowering and parameterized SQL output

pub mod compiler;
pub mod fragment;
pub mod resolver;

pub use compiler::{Lowered, PredicateCompiler};
pub use fragment::{FragmentKind, PlaceholderStyle, SqlFragment, SqlParameter, SqlStatement};
pub use resolver::ColumnResolver;
