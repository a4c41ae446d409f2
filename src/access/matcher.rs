//! Filter-to-index matching and comparison normalization.
//!
//! A filter is usable against an index key component when one of its sides
//! matches the indexed column or expression and the other side is
//! independent of the scanned table. The matcher normalizes the comparison
//! so the indexed side is on the left, reversing the operator when the
//! match was on the right, and reports the parameter bindings the match
//! depends on.

use crate::catalog::Table;
use crate::expression::{
    binding_to_indexed_expression, depends_on_table, ComparisonOp, Expr,
};

/// The result of a successful match between an index key component and a
/// query filter: the filter normalized so its left side is the indexed
/// side, plus the bindings required for a cached plan to reuse the match.
#[derive(Debug, Clone)]
pub(crate) struct IndexableExpression {
    filter: Expr,
    bindings: Vec<Expr>,
}

impl IndexableExpression {
    fn new(filter: Expr, bindings: Vec<Expr>) -> Self {
        Self { filter, bindings }
    }

    /// The normalized comparison.
    pub(crate) fn filter(&self) -> &Expr {
        &self.filter
    }

    /// Parameter bindings required for reuse.
    pub(crate) fn bindings(&self) -> &[Expr] {
        &self.bindings
    }

    /// The GTE lower bound a prefix-LIKE match stands for.
    pub(crate) fn extract_start_from_prefix_like(&self) -> Option<IndexableExpression> {
        Some(Self::new(
            self.filter.gte_filter_from_prefix_like()?,
            self.bindings.clone(),
        ))
    }

    /// The LT upper bound a prefix-LIKE match stands for. `None` when no
    /// string sorts above the prefix region.
    pub(crate) fn extract_end_from_prefix_like(&self) -> Option<IndexableExpression> {
        Some(Self::new(
            self.filter.lt_filter_from_prefix_like()?,
            self.bindings.clone(),
        ))
    }
}

/// Scans `filters` for one usable against the given key component with the
/// target comparator or its alternate, in direct or reversed form. On
/// success the consumed filter is removed from `filters`.
///
/// Exactly one of `covering_expr` (expression index) and `covering_col_id`
/// (simple column index) describes the key component.
pub(crate) fn indexable_expression_from_filters(
    target: ComparisonOp,
    alt_target: ComparisonOp,
    covering_expr: Option<&Expr>,
    covering_col_id: Option<usize>,
    table: &Table,
    filters: &mut Vec<Expr>,
) -> Option<IndexableExpression> {
    for position in 0..filters.len() {
        let matched = match_single_filter(
            &filters[position],
            target,
            alt_target,
            covering_expr,
            covering_col_id,
            table,
        );
        if let Some((normalized, bindings)) = matched {
            filters.remove(position);
            return Some(IndexableExpression::new(normalized, bindings));
        }
    }
    None
}

fn match_single_filter(
    filter: &Expr,
    target: ComparisonOp,
    alt_target: ComparisonOp,
    covering_expr: Option<&Expr>,
    covering_col_id: Option<usize>,
    table: &Table,
) -> Option<(Expr, Vec<Expr>)> {
    let op = filter.comparison_op()?;
    let left = filter.left()?;
    let right = filter.right()?;

    if op == target || op == alt_target {
        if let Some(mut binding) =
            binding_if_valid_indexed_filter_operand(table, left, right, covering_expr, covering_col_id)
        {
            if target != ComparisonOp::Like || apply_like_restrictions(right, &mut binding) {
                return Some((filter.clone(), binding));
            }
        }
    }

    if op == target.reverse() || op == alt_target.reverse() {
        if let Some(mut binding) =
            binding_if_valid_indexed_filter_operand(table, right, left, covering_expr, covering_col_id)
        {
            if target != ComparisonOp::Like || apply_like_restrictions(left, &mut binding) {
                if let Some(normalized) = filter.reverse_comparison() {
                    return Some((normalized, binding));
                }
            }
        }
    }

    None
}

/// LIKE arguments must be prefix patterns known at plan time. A constant
/// qualifies by inspection. A parameter qualifies only when its recorded
/// original constant is a prefix pattern, and then joins the bindings: the
/// cached plan stays correct only for invocations passing that value.
fn apply_like_restrictions(argument: &Expr, binding: &mut Vec<Expr>) -> bool {
    match argument {
        Expr::Parameter {
            original: Some(original),
            ..
        } if original.is_prefix_pattern_constant() => {
            binding.push(argument.clone());
            true
        }
        Expr::Constant { .. } => argument.is_prefix_pattern_constant(),
        _ => false,
    }
}

/// Validates a candidate (indexed-side, other-side) operand split and
/// returns the bindings it requires, or `None` when the split is unusable:
/// the key type would lose precision representing the other side, the
/// other side also references the scanned table, or the indexed side does
/// not match the key component.
fn binding_if_valid_indexed_filter_operand(
    table: &Table,
    indexable_expr: &Expr,
    other_expr: &Expr,
    covering_expr: Option<&Expr>,
    covering_col_id: Option<usize>,
) -> Option<Vec<Expr>> {
    // The scan-time key comparator must not lose precision casting the
    // other side to the indexed type.
    if !indexable_expr
        .value_type()
        .can_exactly_represent(other_expr.value_type())
    {
        return None;
    }
    // Both operands on the scanned table, e.g. "t.a = t.b", is not
    // indexable.
    if depends_on_table(other_expr, &table.name) {
        return None;
    }

    match covering_expr {
        Some(covering) => binding_to_indexed_expression(indexable_expr, covering),
        None => {
            let covering_col_id = covering_col_id?;
            match indexable_expr {
                Expr::TupleValue {
                    table: ref_table,
                    column_index,
                    ..
                } if *column_index == covering_col_id && ref_table == &table.name => {
                    // A plain column match never requires parameter bindings.
                    Some(Vec::new())
                }
                _ => None,
            }
        }
    }
}
