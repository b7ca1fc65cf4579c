//! Parameterized SQL fragments.
//!
//! A fragment is a sequence of raw SQL pieces and placeholder slots plus the
//! values bound to those slots, in order. Values are never spliced into the
//! text, and the placeholder spelling is only chosen when the final statement
//! is rendered.

use crate::value::Value;
use std::fmt;

/// How placeholders are spelled in rendered SQL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderStyle {
    /// `?` for every parameter
    #[default]
    Question,
    /// `$1`, `$2`, ...
    Numbered,
    /// `@p0`, `@p1`, ...
    Named,
}

impl PlaceholderStyle {
    /// Placeholder for the parameter at zero-based `index`
    pub fn placeholder(&self, index: usize) -> String {
        match self {
            PlaceholderStyle::Question => "?".to_string(),
            PlaceholderStyle::Numbered => format!("${}", index + 1),
            PlaceholderStyle::Named => format!("@p{}", index),
        }
    }
}

/// A bound parameter as handed to the executor
#[derive(Debug, Clone, PartialEq)]
pub struct SqlParameter {
    pub placeholder: String,
    pub value: Value,
}

/// Shape of the outermost construct of a fragment, used for parenthesization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    /// Column name or other bare operand
    Operand,
    /// A single placeholder
    Parameter,
    /// `a + b`
    Arithmetic,
    /// `a = b`, `a IS NULL`
    Comparison,
    /// `NOT (...)`
    Negation,
    /// `a AND b`
    Conjunction,
    /// `a OR b`
    Disjunction,
    /// Anything else, e.g. a whole statement
    Statement,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Sql(String),
    Placeholder,
}

/// SQL text with ordered bound values
#[derive(Debug, Clone, PartialEq)]
pub struct SqlFragment {
    segments: Vec<Segment>,
    values: Vec<Value>,
    kind: FragmentKind,
}

impl SqlFragment {
    /// Raw SQL text with no parameters
    pub fn sql(text: impl Into<String>, kind: FragmentKind) -> Self {
        Self {
            segments: vec![Segment::Sql(text.into())],
            values: Vec::new(),
            kind,
        }
    }

    /// A single placeholder bound to `value`
    pub fn parameter(value: Value) -> Self {
        Self {
            segments: vec![Segment::Placeholder],
            values: vec![value],
            kind: FragmentKind::Parameter,
        }
    }

    pub fn kind(&self) -> FragmentKind {
        self.kind
    }

    pub fn with_kind(mut self, kind: FragmentKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn push_sql(&mut self, text: &str) {
        match self.segments.last_mut() {
            Some(Segment::Sql(last)) => last.push_str(text),
            _ => self.segments.push(Segment::Sql(text.to_string())),
        }
    }

    pub fn push_parameter(&mut self, value: Value) {
        self.segments.push(Segment::Placeholder);
        self.values.push(value);
    }

    /// Append another fragment, keeping parameter order
    pub fn append(&mut self, other: SqlFragment) {
        for segment in other.segments {
            match segment {
                Segment::Sql(text) => self.push_sql(&text),
                Segment::Placeholder => self.segments.push(Segment::Placeholder),
            }
        }
        self.values.extend(other.values);
    }

    /// Append another fragment inside parentheses
    pub fn append_wrapped(&mut self, other: SqlFragment) {
        self.push_sql("(");
        self.append(other);
        self.push_sql(")");
    }

    /// Bound values in placeholder order
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn placeholder_count(&self) -> usize {
        self.segments
            .iter()
            .filter(|segment| matches!(segment, Segment::Placeholder))
            .count()
    }

    /// Dialect-neutral text with `?` placeholders
    pub fn text(&self) -> String {
        self.render(PlaceholderStyle::Question).text
    }

    /// Render the text and parameter list with the given placeholder style
    pub fn render(&self, style: PlaceholderStyle) -> SqlStatement {
        let mut text = String::new();
        let mut parameters = Vec::with_capacity(self.values.len());
        let mut values = self.values.iter();

        for segment in &self.segments {
            match segment {
                Segment::Sql(sql) => text.push_str(sql),
                Segment::Placeholder => {
                    let placeholder = style.placeholder(parameters.len());
                    text.push_str(&placeholder);
                    // Placeholders and values are pushed together.
                    let value = values.next().cloned().unwrap_or(Value::Null);
                    parameters.push(SqlParameter { placeholder, value });
                }
            }
        }

        SqlStatement { text, parameters }
    }
}

impl fmt::Display for SqlFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Final SQL text plus parameters, ready for a `QueryExecutor`
#[derive(Debug, Clone, PartialEq)]
pub struct SqlStatement {
    pub text: String,
    pub parameters: Vec<SqlParameter>,
}

impl SqlStatement {
    /// Parameter values in order
    pub fn values(&self) -> Vec<Value> {
        self.parameters.iter().map(|p| p.value.clone()).collect()
    }
}

impl fmt::Display for SqlStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison() -> SqlFragment {
        let mut fragment = SqlFragment::sql("IntColumn > ", FragmentKind::Comparison);
        fragment.push_parameter(Value::Int32(2));
        fragment
    }

    #[test]
    fn test_placeholder_styles() {
        assert_eq!(PlaceholderStyle::Question.placeholder(3), "?");
        assert_eq!(PlaceholderStyle::Numbered.placeholder(0), "$1");
        assert_eq!(PlaceholderStyle::Named.placeholder(2), "@p2");
    }

    #[test]
    fn test_append_keeps_order() {
        let mut fragment = comparison();
        fragment.push_sql(" AND ");
        let mut right = SqlFragment::sql("StringColumn = ", FragmentKind::Comparison);
        right.push_parameter(Value::from("4"));
        fragment.append_wrapped(right);

        assert_eq!(fragment.text(), "IntColumn > ? AND (StringColumn = ?)");
        assert_eq!(fragment.values(), &[Value::Int32(2), Value::from("4")]);
        assert_eq!(fragment.placeholder_count(), fragment.values().len());
    }

    #[test]
    fn test_render_numbered() {
        let mut fragment = comparison();
        fragment.push_sql(" OR IntColumn < ");
        fragment.push_parameter(Value::Int32(0));

        let statement = fragment.render(PlaceholderStyle::Numbered);
        assert_eq!(statement.text, "IntColumn > $1 OR IntColumn < $2");
        assert_eq!(
            statement.parameters,
            vec![
                SqlParameter {
                    placeholder: "$1".to_string(),
                    value: Value::Int32(2),
                },
                SqlParameter {
                    placeholder: "$2".to_string(),
                    value: Value::Int32(0),
                },
            ]
        );
        assert_eq!(statement.values(), vec![Value::Int32(2), Value::Int32(0)]);
    }

    #[test]
    fn test_string_values_never_reach_text() {
        let fragment = SqlFragment::parameter(Value::from("'; DROP TABLE t; --"));
        assert_eq!(fragment.text(), "?");
        assert_eq!(fragment.kind(), FragmentKind::Parameter);
    }
}
