//! Structural matching of filter operands against indexed expressions.
//!
//! Binding dispatches on the variant tag. A match either requires nothing
//! (an empty binding list) or requires specific parameters to take the
//! constant values recorded at parameterization time; those parameters are
//! the bindings a cached plan must re-validate before reuse.

use super::model::Expr;

/// Collects every column reference in the expression tree, in tree order.
pub fn tuple_values(expr: &Expr) -> Vec<&Expr> {
    let mut found = Vec::new();
    collect_tuple_values(expr, &mut found);
    found
}

fn collect_tuple_values<'e>(expr: &'e Expr, found: &mut Vec<&'e Expr>) {
    match expr {
        Expr::TupleValue { .. } => found.push(expr),
        Expr::Constant { .. } | Expr::Parameter { .. } => {}
        Expr::Comparison { left, right, .. } => {
            collect_tuple_values(left, found);
            collect_tuple_values(right, found);
        }
        Expr::Operator { operands, .. } => {
            for operand in operands {
                collect_tuple_values(operand, found);
            }
        }
    }
}

/// True when any column reference in the expression belongs to the named
/// table. Tables are compared by name, not alias, so self-joins are outside
/// the supported surface.
pub fn depends_on_table(expr: &Expr, table_name: &str) -> bool {
    tuple_values(expr).iter().any(|tve| match tve {
        Expr::TupleValue { table, .. } => table == table_name,
        _ => false,
    })
}

/// Structurally binds a query expression against an indexed key expression.
///
/// Returns `None` when the shapes do not correspond. Returns `Some(vec![])`
/// for an exact structural match. Where the query side holds a parameter
/// whose recorded original constant equals the indexed constant, the match
/// succeeds and that parameter joins the returned bindings: the plan is
/// reusable only for invocations that pass the same value.
pub fn binding_to_indexed_expression(expr: &Expr, indexed: &Expr) -> Option<Vec<Expr>> {
    if expr == indexed {
        return Some(Vec::new());
    }
    match (expr, indexed) {
        (
            Expr::Parameter {
                original: Some(original),
                ..
            },
            Expr::Constant { .. },
        ) if original.as_ref() == indexed => Some(vec![expr.clone()]),
        (
            Expr::Operator {
                name,
                value_type,
                operands,
            },
            Expr::Operator {
                name: indexed_name,
                value_type: indexed_type,
                operands: indexed_operands,
            },
        ) if name == indexed_name
            && value_type == indexed_type
            && operands.len() == indexed_operands.len() =>
        {
            let mut bindings = Vec::new();
            for (operand, indexed_operand) in operands.iter().zip(indexed_operands) {
                bindings.extend(binding_to_indexed_expression(operand, indexed_operand)?);
            }
            Some(bindings)
        }
        (
            Expr::Comparison { op, left, right },
            Expr::Comparison {
                op: indexed_op,
                left: indexed_left,
                right: indexed_right,
            },
        ) if op == indexed_op => {
            let mut bindings = binding_to_indexed_expression(left, indexed_left)?;
            bindings.extend(binding_to_indexed_expression(right, indexed_right)?);
            Some(bindings)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::{ComparisonOp, ValueType};
    use serde_json::json;

    fn substr(position: Expr) -> Expr {
        Expr::operator(
            "substr",
            ValueType::Varchar,
            vec![
                Expr::tuple_value("docs", 0, "doc", ValueType::Varchar),
                position,
                Expr::constant(json!(1), ValueType::Integer),
            ],
        )
    }

    #[test]
    fn test_exact_match_needs_no_binding() {
        let indexed = substr(Expr::constant(json!(1), ValueType::Integer));
        let query = substr(Expr::constant(json!(1), ValueType::Integer));

        assert_eq!(binding_to_indexed_expression(&query, &indexed), Some(vec![]));
    }

    #[test]
    fn test_parameter_binds_to_indexed_constant() {
        let indexed = substr(Expr::constant(json!(1), ValueType::Integer));
        let param =
            Expr::parameter_for_constant(0, Expr::constant(json!(1), ValueType::Integer));
        let query = substr(param.clone());

        let bindings = binding_to_indexed_expression(&query, &indexed).unwrap();
        assert_eq!(bindings, vec![param]);
    }

    #[test]
    fn test_wrong_original_value_refuses() {
        let indexed = substr(Expr::constant(json!(1), ValueType::Integer));
        let query = substr(Expr::parameter_for_constant(
            0,
            Expr::constant(json!(2), ValueType::Integer),
        ));

        assert_eq!(binding_to_indexed_expression(&query, &indexed), None);
    }

    #[test]
    fn test_bare_parameter_refuses() {
        let indexed = substr(Expr::constant(json!(1), ValueType::Integer));
        let query = substr(Expr::parameter(0, ValueType::Integer));

        assert_eq!(binding_to_indexed_expression(&query, &indexed), None);
    }

    #[test]
    fn test_shape_mismatch_refuses() {
        let indexed = substr(Expr::constant(json!(1), ValueType::Integer));
        let other_fn = Expr::operator(
            "upper",
            ValueType::Varchar,
            vec![Expr::tuple_value("docs", 0, "doc", ValueType::Varchar)],
        );

        assert_eq!(binding_to_indexed_expression(&other_fn, &indexed), None);
    }

    #[test]
    fn test_depends_on_table() {
        let filter = Expr::comparison(
            ComparisonOp::Eq,
            Expr::tuple_value("orders", 0, "id", ValueType::Integer),
            Expr::tuple_value("customers", 0, "order_id", ValueType::Integer),
        );

        assert!(depends_on_table(&filter, "orders"));
        assert!(depends_on_table(&filter, "customers"));
        assert!(!depends_on_table(&filter, "items"));
    }

    #[test]
    fn test_tuple_values_tree_order() {
        let expr = substr(Expr::tuple_value("docs", 1, "offset", ValueType::Integer));
        let refs = tuple_values(&expr);
        assert_eq!(refs.len(), 2);
        assert!(matches!(refs[0], Expr::TupleValue { column_name, .. } if column_name == "doc"));
        assert!(
            matches!(refs[1], Expr::TupleValue { column_name, .. } if column_name == "offset")
        );
    }
}
