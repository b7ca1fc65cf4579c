use anyhow::Result;
use std::sync::Arc;
use std::thread;
use vibeql::executor::Row;
use vibeql::{
    Capture, CatalogRegistry, DataType, Expr, MemoryDatabase, PlaceholderStyle, Predicate,
    QueryError, Record, Session, SessionConfig, TableDef, Value,
};

#[derive(Debug, Clone, PartialEq)]
struct TestType {
    int_column: i32,
    bool_column: bool,
    string_column: String,
}

impl Record for TestType {
    fn table() -> TableDef {
        TableDef::new("TestType")
            .field("IntColumn", DataType::Int32)
            .field("BoolColumn", DataType::Boolean)
            .field("StringColumn", DataType::Varchar)
    }

    fn from_row(row: &Row) -> Result<Self> {
        Ok(TestType {
            int_column: row.try_get("IntColumn")?,
            bool_column: row.try_get("BoolColumn")?,
            string_column: row.try_get("StringColumn")?,
        })
    }

    fn to_values(&self) -> Vec<Value> {
        vec![
            self.int_column.into(),
            self.bool_column.into(),
            self.string_column.clone().into(),
        ]
    }
}

fn expected() -> TestType {
    TestType {
        int_column: 3,
        bool_column: true,
        string_column: "4".to_string(),
    }
}

/// `count` generated rows that skip the expected row's IntColumn, plus the
/// expected row, inserted in IntColumn order.
fn establish_context(count: i32, expected: TestType) -> Session<MemoryDatabase> {
    establish_context_with(count, expected, SessionConfig::default())
}

fn establish_context_with(
    count: i32,
    expected: TestType,
    config: SessionConfig,
) -> Session<MemoryDatabase> {
    let db = MemoryDatabase::new();
    db.create_table_for::<TestType>().unwrap();

    let mut rows: Vec<TestType> = (0..)
        .filter(|&i| i != expected.int_column)
        .take(count as usize)
        .map(|i| TestType {
            int_column: i,
            bool_column: false,
            string_column: i.to_string(),
        })
        .collect();
    rows.push(expected);
    rows.sort_by_key(|row| row.int_column);
    for row in &rows {
        db.insert(row).unwrap();
    }

    Session::with_config(db, config).with_registry(Arc::new(CatalogRegistry::new()))
}

fn int_columns(rows: &[TestType]) -> Vec<i32> {
    rows.iter().map(|row| row.int_column).collect()
}

#[test]
fn test_fixture_shape() {
    let session = establish_context(10, expected());
    let rows = session.select_all::<TestType>().unwrap();
    assert_eq!(int_columns(&rows), (0..=10).collect::<Vec<_>>());
    assert_eq!(rows.iter().filter(|row| row.bool_column).count(), 1);
    assert_eq!(rows[3], expected());
}

#[test]
fn test_range_selects_single_row() {
    let session = establish_context(10, expected());
    let predicate = Predicate::<TestType>::new(|q| {
        Expr::and(
            Expr::gt(q.field("IntColumn"), 2),
            Expr::lt(q.field("IntColumn"), 4),
        )
    });

    let rows = session.select(&predicate).unwrap();
    assert_eq!(rows, vec![expected()]);
}

#[test]
fn test_or_with_column_dependent_branches() {
    let session = establish_context(10, expected());
    let predicate = Predicate::<TestType>::new(|q| {
        Expr::or(
            Expr::eq(q.field("IntColumn"), 3),
            Expr::lt(q.field("IntColumn"), 0),
        )
    });

    let rows = session.select(&predicate).unwrap();
    assert_eq!(rows, vec![expected()]);
}

#[test]
fn test_closed_true_branch_selects_everything() {
    let session = establish_context(10, expected());
    let a = Capture::scalar("a", 10);
    let b = Capture::scalar("b", 5);
    let predicate = Predicate::<TestType>::new(|q| {
        Expr::or(Expr::eq(q.field("IntColumn"), 3), Expr::gt(&a, &b))
    });

    let statement = session.prepare_select(&predicate).unwrap();
    assert_eq!(
        statement.text,
        "SELECT IntColumn, BoolColumn, StringColumn FROM TestType"
    );

    let rows = session.select(&predicate).unwrap();
    assert_eq!(rows.len(), 11);
}

#[test]
fn test_negated_column_or_true_capture() {
    let session = establish_context(10, expected());
    let a = Capture::scalar("a", true);
    let predicate = Predicate::<TestType>::new(|q| Expr::or(!q.field("BoolColumn"), &a));

    let rows = session.select(&predicate).unwrap();
    assert!(!rows.is_empty());
    assert!(rows.contains(&expected()));
}

#[test]
fn test_negated_column_or_false_capture() {
    let session = establish_context(10, expected());
    let a = Capture::scalar("a", false);
    let predicate = Predicate::<TestType>::new(|q| Expr::or(!q.field("BoolColumn"), &a));

    let statement = session.prepare_select(&predicate).unwrap();
    assert_eq!(
        statement.text,
        "SELECT IntColumn, BoolColumn, StringColumn FROM TestType WHERE NOT (BoolColumn = ?)"
    );

    let rows = session.select(&predicate).unwrap();
    assert_eq!(rows.len(), 10);
    assert!(!rows.contains(&expected()));
}

#[test]
fn test_captured_model_member() {
    let session = establish_context(10, expected());
    let model = Capture::object("model", [("StringValue", "4")]);
    let predicate = Predicate::<TestType>::new(|q| {
        Expr::and(
            q.field("BoolColumn"),
            Expr::eq(q.field("StringColumn"), model.member("StringValue")),
        )
    });

    let rows = session.select(&predicate).unwrap();
    assert!(rows.contains(&expected()));
}

#[test]
fn test_closed_comparison_operand() {
    let session = establish_context(10, expected());
    let a = Capture::scalar("a", 10);
    let b = Capture::scalar("b", 5);
    let predicate = Predicate::<TestType>::new(|q| {
        Expr::eq(
            q.field("BoolColumn"),
            Expr::and(Expr::ge(&a, &b), Expr::gt(&a, 0)),
        )
    });

    let statement = session.prepare_select(&predicate).unwrap();
    assert!(statement.text.ends_with("WHERE BoolColumn = ?"));
    assert_eq!(statement.values(), vec![Value::Boolean(true)]);

    let rows = session.select(&predicate).unwrap();
    assert!(rows.contains(&expected()));
}

#[test]
fn test_and_fold_never_resolves_right_branch() {
    let session = establish_context(10, expected());
    let enabled = Capture::scalar("enabled", false);
    let predicate = Predicate::<TestType>::new(|q| {
        Expr::and(&enabled, Expr::eq(q.field("NoSuchColumn"), 1))
    });

    let statement = session.prepare_select(&predicate).unwrap();
    assert!(statement.text.ends_with(" WHERE ?"));
    assert_eq!(statement.values(), vec![Value::Boolean(false)]);
    assert!(session.select(&predicate).unwrap().is_empty());
}

#[test]
fn test_or_fold_never_resolves_right_branch() {
    let session = establish_context(10, expected());
    let enabled = Capture::scalar("enabled", true);
    let predicate = Predicate::<TestType>::new(|q| {
        Expr::or(&enabled, Expr::eq(q.field("NoSuchColumn"), 1))
    });

    assert_eq!(session.select(&predicate).unwrap().len(), 11);
}

#[test]
fn test_identity_branch_is_dropped() {
    let session = establish_context(10, expected());
    let a = Capture::scalar("a", 1);
    let with_false = Predicate::<TestType>::new(|q| {
        Expr::or(Expr::eq(q.field("IntColumn"), 3), Expr::lt(&a, 0))
    });
    let plain = Predicate::<TestType>::new(|q| Expr::eq(q.field("IntColumn"), 3));

    assert_eq!(
        session.prepare_select(&with_false).unwrap(),
        session.prepare_select(&plain).unwrap()
    );
}

#[test]
fn test_literals_are_parameterized() {
    let session = establish_context(10, expected());
    let predicate =
        Predicate::<TestType>::new(|q| Expr::eq(q.field("StringColumn"), "4' OR '1'='1"));

    let statement = session.prepare_select(&predicate).unwrap();
    assert!(!statement.text.contains("OR '1'"));
    assert_eq!(statement.parameters.len(), 1);
    assert!(session.select(&predicate).unwrap().is_empty());
}

#[test]
fn test_unknown_column() {
    let session = establish_context(10, expected());
    let predicate = Predicate::<TestType>::new(|q| Expr::eq(q.field("Missing"), 1));

    match session.select(&predicate) {
        Err(QueryError::UnknownColumn { record, field }) => {
            assert_eq!(record, "TestType");
            assert_eq!(field, "Missing");
        }
        other => panic!("Expected UnknownColumn, got {:?}", other),
    }
}

#[test]
fn test_evaluation_error_in_closed_branch() {
    let session = establish_context(10, expected());
    let zero = Capture::scalar("zero", 0);
    let predicate = Predicate::<TestType>::new(|q| {
        Expr::or(
            Expr::eq(q.field("IntColumn"), 3),
            Expr::gt(Expr::div_expr(1, &zero), 0),
        )
    });

    assert!(matches!(
        session.select(&predicate),
        Err(QueryError::Evaluation(_))
    ));
}

#[test]
fn test_placeholder_styles() {
    let cases = [
        (
            PlaceholderStyle::Question,
            "WHERE IntColumn > ? AND StringColumn <> ?",
        ),
        (
            PlaceholderStyle::Numbered,
            "WHERE IntColumn > $1 AND StringColumn <> $2",
        ),
        (
            PlaceholderStyle::Named,
            "WHERE IntColumn > @p0 AND StringColumn <> @p1",
        ),
    ];

    for (style, where_clause) in cases {
        let session = establish_context_with(
            10,
            expected(),
            SessionConfig {
                placeholder_style: style,
            },
        );
        let predicate = Predicate::<TestType>::new(|q| {
            Expr::and(
                Expr::gt(q.field("IntColumn"), 8),
                Expr::ne(q.field("StringColumn"), "9"),
            )
        });

        let statement = session.prepare_select(&predicate).unwrap();
        assert!(statement.text.ends_with(where_clause), "{}", statement.text);
        assert_eq!(int_columns(&session.select(&predicate).unwrap()), vec![10]);
    }
}

#[test]
fn test_concurrent_selects() {
    let session = Arc::new(establish_context(10, expected()));
    let mut handles = vec![];

    for i in 0..4 {
        let session = session.clone();
        handles.push(thread::spawn(move || {
            let predicate = Predicate::<TestType>::new(|q| Expr::ge(q.field("IntColumn"), i));
            session.select(&predicate).unwrap().len()
        }));
    }

    let counts: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(counts, vec![11, 10, 9, 8]);
}
