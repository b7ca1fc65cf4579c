//! Closed / column-dependent classification of expression nodes.

use crate::expression::{Expr, Owner};

/// How a node relates to the columns of the queried record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No column reference; evaluated host-side and bound as a parameter
    Closed,
    /// Only column references combined by plain comparison/logical operators
    ColumnRef,
    /// Column references combined with closed operands
    Mixed,
}

impl Classification {
    pub fn is_closed(&self) -> bool {
        matches!(self, Classification::Closed)
    }
}

/// Classify a node. The result is derived on every call and never cached,
/// so callers can classify one branch without touching its sibling.
pub fn classify(expr: &Expr) -> Classification {
    #[cfg(test)]
    VISITS.with(|visits| visits.set(visits.get() + 1));

    match expr {
        Expr::Constant(_) | Expr::Capture(_) => Classification::Closed,

        Expr::MemberAccess { owner, .. } => match owner {
            Owner::Parameter(_) => Classification::ColumnRef,
            Owner::Capture(_) => Classification::Closed,
        },

        Expr::Comparison { left, right, .. } | Expr::Logical { left, right, .. } => {
            combine(classify(left), classify(right), true)
        }

        // Arithmetic over columns still needs a closed operand or an
        // enclosing comparison to mean anything, so it is never ColumnRef.
        Expr::Arithmetic { left, right, .. } => {
            combine(classify(left), classify(right), false)
        }

        Expr::Not(operand) => classify(operand),
    }
}

#[cfg(test)]
thread_local! {
    static VISITS: std::cell::Cell<usize> = const { std::cell::Cell::new(0) };
}

/// Nodes classified on this thread since the last call
#[cfg(test)]
pub(crate) fn take_visits() -> usize {
    VISITS.with(|visits| visits.replace(0))
}

fn combine(left: Classification, right: Classification, plain_combinator: bool) -> Classification {
    match (left, right) {
        (Classification::Closed, Classification::Closed) => Classification::Closed,
        (Classification::ColumnRef, Classification::ColumnRef) if plain_combinator => {
            Classification::ColumnRef
        }
        _ => Classification::Mixed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Capture;

    fn q(member: &str) -> Expr {
        Expr::member(Owner::Parameter("q".to_string()), member)
    }

    #[test]
    fn test_leaves() {
        assert_eq!(classify(&Expr::constant(1)), Classification::Closed);
        assert_eq!(classify(&Expr::capture("a", true)), Classification::Closed);
        assert_eq!(classify(&q("IntColumn")), Classification::ColumnRef);

        let model = Capture::object("model", [("StringValue", "4")]);
        assert_eq!(
            classify(&model.member("StringValue")),
            Classification::Closed
        );
    }

    #[test]
    fn test_composites() {
        let a = || Expr::capture("a", 10);
        let b = || Expr::capture("b", 5);

        assert_eq!(classify(&Expr::gt(a(), b())), Classification::Closed);
        assert_eq!(
            classify(&Expr::not_expr(Expr::gt(a(), b()))),
            Classification::Closed
        );
        assert_eq!(
            classify(&Expr::eq(q("IntColumn"), q("IntColumn"))),
            Classification::ColumnRef
        );
        assert_eq!(
            classify(&Expr::not_expr(q("BoolColumn"))),
            Classification::ColumnRef
        );
        assert_eq!(
            classify(&Expr::eq(q("IntColumn"), 3)),
            Classification::Mixed
        );
        assert_eq!(
            classify(&Expr::or(Expr::eq(q("IntColumn"), 3), Expr::gt(a(), b()))),
            Classification::Mixed
        );
        assert_eq!(
            classify(&Expr::add_expr(q("IntColumn"), q("IntColumn"))),
            Classification::Mixed
        );
        assert_eq!(classify(&Expr::add_expr(a(), 1)), Classification::Closed);
    }
}
