//! Index-order reconciliation with a statement's ORDER BY clause.
//!
//! An index's key order satisfies an ORDER BY when the ORDER BY items match
//! a prefix of the key components, major to minor, all in one direction.
//! Descending is claimed tentatively: the builder later invalidates it when
//! the scan could not actually run in reverse.

use crate::access::path::{AccessPath, SortDirection};
use crate::catalog::Table;
use crate::expression::{binding_to_indexed_expression, Expr};
use crate::statement::ParsedStatement;

/// Tries to use the index scan's inherent ordering for the statement's
/// ORDER BY. On a full match the path's sort direction is set and any
/// parameter bindings the expression matches require are accumulated into
/// `bindings_for_order`; the caller commits those only if the direction
/// survives assembly. On any mismatch both are reset.
///
/// Exactly one of `indexed_exprs` and `indexed_col_ids` describes the key
/// components; `key_component_count` is its length.
pub(crate) fn determine_index_ordering(
    statement: &ParsedStatement,
    table: &Table,
    key_component_count: usize,
    indexed_exprs: Option<&[Expr]>,
    indexed_col_ids: Option<&[usize]>,
    path: &mut AccessPath<'_>,
    bindings_for_order: &mut Vec<Expr>,
) {
    // Only SELECT output has an order to satisfy.
    if !statement.is_select() {
        return;
    }
    let order_bys = statement.order_by();
    // There need to be enough key components for full ORDER BY coverage.
    if order_bys.is_empty() || order_bys.len() > key_component_count {
        return;
    }

    let ascending = order_bys[0].ascending;
    path.sort_direction = if ascending {
        SortDirection::Ascending
    } else {
        SortDirection::Descending
    };

    for (position, item) in order_bys.iter().enumerate() {
        // Mixed directions never match an index laid out one way.
        if item.ascending == ascending {
            match indexed_exprs {
                None => {
                    if let Expr::TupleValue {
                        table: item_table,
                        column_name,
                        ..
                    } = &item.expr
                    {
                        let matches_component = indexed_col_ids
                            .and_then(|ids| ids.get(position))
                            .and_then(|col_id| table.columns.get(*col_id))
                            .is_some_and(|key_column| {
                                item_table == &table.name && column_name == &key_column.name
                            });
                        if matches_component {
                            continue;
                        }
                    }
                }
                Some(exprs) => {
                    if let Some(more) =
                        binding_to_indexed_expression(&item.expr, &exprs[position])
                    {
                        bindings_for_order.extend(more);
                        continue;
                    }
                }
            }
        }
        // The item broke the direction pattern or missed its key component.
        // Undo the tentative result.
        path.sort_direction = SortDirection::Unordered;
        bindings_for_order.clear();
        return;
    }
}
