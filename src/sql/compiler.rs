//! Predicate compiler: lowers a boolean expression tree to a parameterized
//! SQL fragment.
//!
//! Leaf predicates are classified before they are lowered. Closed nodes are
//! evaluated on the host and bound as parameters; column-dependent nodes
//! become SQL.
//! Logical nodes reproduce host short-circuiting: a closed branch equal to the
//! operator's absorbing element decides the whole node and the sibling is
//! never looked at, while a closed identity branch is dropped.

use crate::error::{QueryError, QueryResult};
use crate::expression::{
    classify, ArithmeticOp, CompareOp, Expr, ExpressionError, LiteralEvaluator, LogicalOp, Owner,
};
use crate::sql::fragment::{FragmentKind, SqlFragment};
use crate::sql::resolver::ColumnResolver;
use crate::value::{DataType, Value};

/// Result of lowering a node in predicate position
#[derive(Debug, Clone, PartialEq)]
pub enum Lowered {
    /// The node folded to a constant truth value
    Folded(bool),
    /// The node needs the database to decide
    Fragment(SqlFragment),
}

impl Lowered {
    /// Turn the result into SQL; a folded value becomes a single bound
    /// boolean parameter.
    pub fn into_fragment(self) -> SqlFragment {
        match self {
            Lowered::Folded(value) => SqlFragment::parameter(Value::Boolean(value)),
            Lowered::Fragment(fragment) => fragment,
        }
    }
}

/// Lowered value-position node (operand of a comparison or arithmetic)
enum Operand {
    Value(Value),
    Sql {
        fragment: SqlFragment,
        data_type: DataType,
        label: String,
    },
}

impl Operand {
    fn data_type(&self) -> Option<DataType> {
        match self {
            Operand::Value(value) => value.data_type(),
            Operand::Sql { data_type, .. } => Some(*data_type),
        }
    }

    fn into_fragment(self) -> SqlFragment {
        match self {
            Operand::Value(value) => SqlFragment::parameter(value),
            Operand::Sql { fragment, .. } => fragment,
        }
    }
}

/// Compiles predicates over one record type
pub struct PredicateCompiler<'a> {
    resolver: ColumnResolver<'a>,
    evaluator: LiteralEvaluator,
}

impl<'a> PredicateCompiler<'a> {
    pub fn new(resolver: ColumnResolver<'a>) -> Self {
        Self {
            resolver,
            evaluator: LiteralEvaluator::new(),
        }
    }

    /// Compile a boolean expression into a WHERE-clause fragment
    pub fn compile(&self, expr: &Expr) -> QueryResult<SqlFragment> {
        Ok(self.lower(expr)?.into_fragment())
    }

    /// Lower a boolean expression, keeping folded results distinguishable
    pub fn lower(&self, expr: &Expr) -> QueryResult<Lowered> {
        match expr {
            // Branches are classified one at a time as they are lowered, left
            // first, so a logical node is never classified as a whole.
            Expr::Logical { op, left, right } => self.lower_logical(*op, left, right),
            Expr::Not(operand) => self.lower_not(operand),
            _ if classify(expr).is_closed() => self.fold(expr),
            Expr::MemberAccess { owner, member } => self
                .lower_bool_column(owner, member)
                .map(Lowered::Fragment),
            Expr::Comparison { op, left, right } => self.lower_comparison(*op, left, right),
            Expr::Arithmetic { .. } => Err(QueryError::unsupported(format!(
                "arithmetic expression '{}' used as a predicate",
                expr
            ))),
            Expr::Constant(_) | Expr::Capture(_) => self.fold(expr),
        }
    }

    fn fold(&self, expr: &Expr) -> QueryResult<Lowered> {
        let value = self.evaluator.evaluate_bool(expr, "predicate")?;
        log::trace!("Folded closed predicate {} to {}", expr, value);
        Ok(Lowered::Folded(value))
    }

    fn lower_logical(&self, op: LogicalOp, left: &Expr, right: &Expr) -> QueryResult<Lowered> {
        let left = match self.lower(left)? {
            Lowered::Folded(value) if value == op.absorbing_element() => {
                log::trace!("{} short-circuited by {} branch", op.as_str(), value);
                return Ok(Lowered::Folded(value));
            }
            Lowered::Folded(value) => {
                debug_assert_eq!(value, op.identity_element());
                log::trace!("{} identity branch dropped", op.as_str());
                return self.lower(right);
            }
            Lowered::Fragment(fragment) => fragment,
        };

        let right = match self.lower(right)? {
            Lowered::Folded(value) if value == op.absorbing_element() => {
                log::trace!("{} absorbed by {} branch", op.as_str(), value);
                return Ok(Lowered::Folded(value));
            }
            Lowered::Folded(value) => {
                debug_assert_eq!(value, op.identity_element());
                log::trace!("{} identity branch dropped", op.as_str());
                return Ok(Lowered::Fragment(left));
            }
            Lowered::Fragment(fragment) => fragment,
        };

        let kind = match op {
            LogicalOp::And => FragmentKind::Conjunction,
            LogicalOp::Or => FragmentKind::Disjunction,
        };
        let mut fragment = SqlFragment::sql("", kind);
        append_logical_branch(&mut fragment, left);
        fragment.push_sql(&format!(" {} ", op.as_str()));
        append_logical_branch(&mut fragment, right);
        Ok(Lowered::Fragment(fragment))
    }

    fn lower_not(&self, operand: &Expr) -> QueryResult<Lowered> {
        match self.lower(operand)? {
            Lowered::Folded(value) => Ok(Lowered::Folded(!value)),
            Lowered::Fragment(inner) => {
                let mut fragment = SqlFragment::sql("NOT ", FragmentKind::Negation);
                fragment.append_wrapped(inner);
                Ok(Lowered::Fragment(fragment))
            }
        }
    }

    /// A bare boolean column in predicate position means `column = true`
    fn lower_bool_column(&self, owner: &Owner, member: &str) -> QueryResult<SqlFragment> {
        let column = self.resolver.resolve(owner, member)?;
        if column.column_type != DataType::Boolean {
            return Err(ExpressionError::TypeMismatch {
                expected: DataType::Boolean,
                actual: Some(column.column_type),
                context: format!("predicate on column {}", column.column_name),
            }
            .into());
        }

        let mut fragment = SqlFragment::sql(
            format!("{} = ", column.column_name),
            FragmentKind::Comparison,
        );
        fragment.push_parameter(Value::Boolean(true));
        Ok(fragment)
    }

    fn lower_comparison(&self, op: CompareOp, left: &Expr, right: &Expr) -> QueryResult<Lowered> {
        let left = self.lower_operand(left)?;
        let right = self.lower_operand(right)?;

        match (left, right) {
            (Operand::Value(l), Operand::Value(r)) => self.fold(&Expr::compare(op, l, r)),
            (sql @ Operand::Sql { .. }, Operand::Value(value)) => {
                self.compare_to_value(op, sql, value).map(Lowered::Fragment)
            }
            // Keep the column on the left: `3 < q.IntColumn` becomes `IntColumn > ?`.
            (Operand::Value(value), sql @ Operand::Sql { .. }) => {
                self.compare_to_value(op.flip(), sql, value).map(Lowered::Fragment)
            }
            (left, right) => {
                let (left_type, right_type) = (left.data_type(), right.data_type());
                match (left_type, right_type) {
                    (Some(l), Some(r)) if op.types_compatible(l, r) => {}
                    _ => {
                        return Err(ExpressionError::InvalidOperandTypes {
                            operator: op.as_str().to_string(),
                            left_type,
                            right_type,
                        }
                        .into())
                    }
                }

                let mut fragment = left.into_fragment().with_kind(FragmentKind::Comparison);
                fragment.push_sql(&format!(" {} ", op.as_str()));
                fragment.append(right.into_fragment());
                Ok(Lowered::Fragment(fragment))
            }
        }
    }

    fn compare_to_value(
        &self,
        op: CompareOp,
        operand: Operand,
        value: Value,
    ) -> QueryResult<SqlFragment> {
        let Operand::Sql {
            fragment: sql,
            data_type,
            label,
        } = operand
        else {
            return Err(QueryError::unsupported(
                "comparison between two host values reached SQL lowering",
            ));
        };

        if value.is_null() {
            if !op.is_equality() {
                return Err(QueryError::unsupported(format!(
                    "ordering comparison '{}' of {} against NULL",
                    op.as_str(),
                    label
                )));
            }
            let mut fragment = sql.with_kind(FragmentKind::Comparison);
            fragment.push_sql(if op == CompareOp::Eq {
                " IS NULL"
            } else {
                " IS NOT NULL"
            });
            return Ok(fragment);
        }

        if !value.is_compatible_with(data_type) {
            return Err(ExpressionError::TypeMismatch {
                expected: data_type,
                actual: value.data_type(),
                context: format!("comparison with {}", label),
            }
            .into());
        }

        let mut fragment = sql.with_kind(FragmentKind::Comparison);
        fragment.push_sql(&format!(" {} ", op.as_str()));
        fragment.push_parameter(value);
        Ok(fragment)
    }

    fn lower_operand(&self, expr: &Expr) -> QueryResult<Operand> {
        if classify(expr).is_closed() {
            return Ok(Operand::Value(self.evaluator.evaluate(expr)?));
        }

        match expr {
            Expr::MemberAccess { owner, member } => {
                let column = self.resolver.resolve(owner, member)?;
                Ok(Operand::Sql {
                    fragment: SqlFragment::sql(column.column_name.clone(), FragmentKind::Operand),
                    data_type: column.column_type,
                    label: column.column_name.clone(),
                })
            }
            Expr::Arithmetic { op, left, right } => self.lower_arithmetic(*op, left, right, expr),
            Expr::Comparison { .. } | Expr::Logical { .. } | Expr::Not(_) => {
                Err(QueryError::unsupported(format!(
                    "boolean expression '{}' used as a comparison operand",
                    expr
                )))
            }
            Expr::Constant(_) | Expr::Capture(_) => {
                Ok(Operand::Value(self.evaluator.evaluate(expr)?))
            }
        }
    }

    fn lower_arithmetic(
        &self,
        op: ArithmeticOp,
        left: &Expr,
        right: &Expr,
        expr: &Expr,
    ) -> QueryResult<Operand> {
        let left = self.lower_operand(left)?;
        let right = self.lower_operand(right)?;

        // A NULL operand takes the type of the other side.
        let (left_type, right_type) = (left.data_type(), right.data_type());
        let data_type = match (left_type, right_type) {
            (Some(l), Some(r)) => op.output_type(l, r),
            (Some(t), None) | (None, Some(t)) => op.output_type(t, t),
            (None, None) => None,
        }
        .ok_or_else(|| ExpressionError::InvalidOperandTypes {
            operator: op.as_str().to_string(),
            left_type,
            right_type,
        })?;

        let mut fragment = SqlFragment::sql("", FragmentKind::Arithmetic);
        append_arithmetic_operand(&mut fragment, left);
        fragment.push_sql(&format!(" {} ", op.as_str()));
        append_arithmetic_operand(&mut fragment, right);

        Ok(Operand::Sql {
            fragment,
            data_type,
            label: expr.to_string(),
        })
    }
}

/// Single comparisons and negations bind tighter than AND/OR; anything else
/// is parenthesized.
fn append_logical_branch(target: &mut SqlFragment, branch: SqlFragment) {
    match branch.kind() {
        FragmentKind::Comparison | FragmentKind::Negation => target.append(branch),
        _ => target.append_wrapped(branch),
    }
}

fn append_arithmetic_operand(target: &mut SqlFragment, operand: Operand) {
    let fragment = operand.into_fragment();
    match fragment.kind() {
        FragmentKind::Arithmetic => target.append_wrapped(fragment),
        _ => target.append(fragment),
    }
}
