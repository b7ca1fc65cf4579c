//! vibeql demo - compiles host predicates to SQL and runs them in memory

use anyhow::{Context, Result};
use clap::{Parser as ClapParser, ValueEnum};
use vibeql::executor::Row;
use vibeql::{
    Capture, DataType, Expr, MemoryDatabase, PlaceholderStyle, Predicate, Record, Session,
    SessionConfig, TableDef, Value,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Style {
    Question,
    Numbered,
    Named,
}

impl From<Style> for PlaceholderStyle {
    fn from(style: Style) -> Self {
        match style {
            Style::Question => PlaceholderStyle::Question,
            Style::Numbered => PlaceholderStyle::Numbered,
            Style::Named => PlaceholderStyle::Named,
        }
    }
}

/// vibeql - predicate to SQL compiler demo
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Highest IntColumn among the generated rows
    #[arg(short, long, default_value = "10")]
    rows: i32,

    /// Placeholder spelling in generated SQL
    #[arg(short = 's', long, value_enum, default_value = "question")]
    placeholder_style: Style,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Debug)]
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

/// Filler rows skip IntColumn 3, which is taken by the one row the
/// captured-model scenario should find.
fn load_fixture(db: &MemoryDatabase, filler: i32) -> Result<()> {
    db.create_table_for::<TestType>()?;

    let mut rows: Vec<TestType> = (0..=filler)
        .filter(|&i| i != 3)
        .map(|i| TestType {
            int_column: i,
            bool_column: false,
            string_column: i.to_string(),
        })
        .collect();
    rows.push(TestType {
        int_column: 3,
        bool_column: true,
        string_column: "4".to_string(),
    });
    rows.sort_by_key(|row| row.int_column);

    for row in &rows {
        db.insert(row)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let db = MemoryDatabase::new();
    load_fixture(&db, args.rows).context("Failed to load fixture rows")?;
    let session = Session::with_config(
        db,
        SessionConfig {
            placeholder_style: args.placeholder_style.into(),
        },
    );

    let a = Capture::scalar("a", 10);
    let b = Capture::scalar("b", 5);
    let flag = Capture::scalar("a", true);
    let no_flag = Capture::scalar("a", false);
    let model = Capture::object("model", [("StringValue", "4")]);

    let scenarios: Vec<(&str, Predicate<TestType>)> = vec![
        (
            "range",
            Predicate::new(|q| {
                Expr::and(
                    Expr::gt(q.field("IntColumn"), 2),
                    Expr::lt(q.field("IntColumn"), 4),
                )
            }),
        ),
        (
            "column or impossible column test",
            Predicate::new(|q| {
                Expr::or(
                    Expr::eq(q.field("IntColumn"), 3),
                    Expr::lt(q.field("IntColumn"), 0),
                )
            }),
        ),
        (
            "closed branch folds to true",
            Predicate::new(|q| Expr::or(Expr::eq(q.field("IntColumn"), 3), Expr::gt(&a, &b))),
        ),
        (
            "captured object member",
            Predicate::new(|q| {
                Expr::and(
                    q.field("BoolColumn"),
                    Expr::eq(q.field("StringColumn"), model.member("StringValue")),
                )
            }),
        ),
        (
            "closed comparison operand",
            Predicate::new(|q| {
                Expr::eq(
                    q.field("BoolColumn"),
                    Expr::and(Expr::ge(&a, &b), Expr::gt(&a, 0)),
                )
            }),
        ),
        (
            "negated column or true capture",
            Predicate::new(|q| Expr::or(!q.field("BoolColumn"), &flag)),
        ),
        (
            "negated column or false capture",
            Predicate::new(|q| Expr::or(!q.field("BoolColumn"), &no_flag)),
        ),
    ];

    for (name, predicate) in &scenarios {
        let statement = session.prepare_select(predicate)?;
        let records = session
            .select(predicate)
            .with_context(|| format!("Scenario '{}' failed", name))?;

        println!("{}: {}", name, predicate);
        println!("  sql:    {}", statement.text);
        for parameter in &statement.parameters {
            println!("  bind:   {} = {}", parameter.placeholder, parameter.value);
        }
        println!("  rows:   {}", records.len());
        if let Some(first) = records.first() {
            log::info!(
                "first row: {} {} {:?}",
                first.int_column,
                first.bool_column,
                first.string_column
            );
        }
    }

    Ok(())
}
