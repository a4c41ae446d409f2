//! Access-path enumeration and per-index assembly.
//!
//! For each candidate table the planner produces the naive sequential path
//! plus one path per index that can contribute: an equality prefix over the
//! key components, at most one range bound pair at the first uncovered
//! component, and residual post-filters for everything else. Enumeration
//! follows catalog order, so output is reproducible across runs.

use crate::access::matcher::{indexable_expression_from_filters, IndexableExpression};
use crate::access::ordering::determine_index_ordering;
use crate::access::path::{AccessPath, IndexLookupType, IndexUseType, SortDirection};
use crate::catalog::{Catalog, Index, Table};
use crate::expression::{ComparisonOp, Expr};
use crate::statement::ParsedStatement;

/// Enumerates access paths for one statement over one catalog snapshot.
pub struct AccessPlanner<'a> {
    catalog: &'a Catalog,
    statement: &'a ParsedStatement,
}

impl<'a> AccessPlanner<'a> {
    /// Creates a planner over a catalog snapshot and a parsed statement
    pub fn new(catalog: &'a Catalog, statement: &'a ParsedStatement) -> Self {
        Self { catalog, statement }
    }

    /// Paths for the named catalog table, or `None` when the catalog does
    /// not know it. Join tables the catalog does not know are ignored.
    pub fn relevant_access_paths_for(
        &self,
        table_name: &str,
        join_tables: &[&str],
    ) -> Option<Vec<AccessPath<'a>>> {
        let table = self.catalog.table(table_name)?;
        let join_tables: Vec<&Table> = join_tables
            .iter()
            .filter_map(|name| self.catalog.table(name))
            .collect();
        Some(self.relevant_access_paths(table, &join_tables))
    }

    /// All the ways to read `table`, given the join-order successor tables.
    /// The naive sequential scan always comes first; it carries every
    /// single-table filter as a post-filter and every applicable join
    /// predicate in its join slot.
    pub fn relevant_access_paths(
        &self,
        table: &'a Table,
        join_tables: &[&'a Table],
    ) -> Vec<AccessPath<'a>> {
        let mut paths = Vec::new();
        let mut naive = AccessPath::sequential();
        let mut all_filters: Vec<Expr> = Vec::new();

        let filters = self.statement.filters_for_table(&table.name);
        all_filters.extend_from_slice(filters);
        naive.other_exprs.extend_from_slice(filters);

        for join_table in join_tables {
            let join_exprs = self
                .statement
                .join_filters_for_pair(&table.name, &join_table.name);
            all_filters.extend_from_slice(join_exprs);
            naive.join_exprs.extend_from_slice(join_exprs);
        }

        paths.push(naive);

        for index in &table.indexes {
            if let Some(path) = self.access_path_for_index(table, &all_filters, index) {
                paths.push(path);
            }
        }

        paths
    }

    /// The best way to use one index for the given filters, or `None` when
    /// the index cannot contribute: no usable equality prefix or bound and
    /// no useful ordering, a non-scannable index left partially covered, or
    /// a malformed key-expression payload.
    pub fn access_path_for_index(
        &self,
        table: &'a Table,
        filters: &[Expr],
        index: &'a Index,
    ) -> Option<AccessPath<'a>> {
        // Key-component descriptors: expressions for an expression index,
        // column ordinals otherwise. A payload that fails to deserialize
        // skips this candidate; the statement still has its sequential path.
        let indexed_exprs = match index.indexed_expressions() {
            Ok(exprs) => exprs,
            Err(_) => return None,
        };
        let key_component_count = indexed_exprs
            .as_ref()
            .map_or(index.columns.len(), Vec::len);

        // The running pool of filters; each is consumed at most once.
        let mut filters_to_cover: Vec<Expr> = filters.to_vec();

        // Hope for the best: full coverage with equality matches on every
        // key component.
        let mut path = AccessPath::for_index(index);

        // Claim the index's ordering for the statement's ORDER BY. The
        // claim is tentative for descending; reconciliation below may undo
        // it, so the order bindings stay in a scratch list until commit.
        let mut bindings_for_order = Vec::new();
        determine_index_ordering(
            self.statement,
            table,
            key_component_count,
            indexed_exprs.as_deref(),
            (!index.is_expression_index()).then(|| index.columns.as_slice()),
            &mut path,
            &mut bindings_for_order,
        );

        // Equality prefix: cover as many leading key components as the
        // filter pool allows.
        let mut covered_count = 0;
        let mut covering_expr: Option<&Expr> = None;
        let mut covering_col_id: Option<usize> = None;
        while covered_count < key_component_count {
            match indexed_exprs.as_deref() {
                Some(exprs) => covering_expr = Some(&exprs[covered_count]),
                None => covering_col_id = index.columns.get(covered_count).copied(),
            }
            let Some(eq_expr) = indexable_expression_from_filters(
                ComparisonOp::Eq,
                ComparisonOp::Eq,
                covering_expr,
                covering_col_id,
                table,
                &mut filters_to_cover,
            ) else {
                break;
            };
            path.index_exprs.push(eq_expr.filter().clone());
            path.bindings.extend_from_slice(eq_expr.bindings());
            // The equality echoes into the stop condition. A non-empty
            // end_exprs later invalidates descending order everywhere
            // except the full-coverage case.
            path.end_exprs.push(eq_expr.filter().clone());
            covered_count += 1;
        }

        // Full equality coverage: the only acceptable outcome for a
        // non-scannable index, and an early exit for scannable ones.
        if covered_count == key_component_count {
            path.other_exprs.append(&mut filters_to_cover);
            if path.sort_direction != SortDirection::Unordered {
                path.bindings.append(&mut bindings_for_order);
            }
            return Some(path);
        }

        if !index.index_type.is_scannable() {
            return None;
        }

        // A scannable index also accepts range bounds, but only on the key
        // component that was left without an equality.
        let mut starting_bound: Option<IndexableExpression> = None;
        let mut ending_bound: Option<IndexableExpression> = None;
        if !filters_to_cover.is_empty() {
            // A double-ended bound first: one prefix-LIKE filter stands for
            // both a lower and an upper bound. When it fires, an inequality
            // on the same component is deliberately left to post-filtering.
            let double_bound = indexable_expression_from_filters(
                ComparisonOp::Like,
                ComparisonOp::Like,
                covering_expr,
                covering_col_id,
                table,
                &mut filters_to_cover,
            );
            if let Some(double_bound) = double_bound {
                starting_bound = double_bound.extract_start_from_prefix_like();
                ending_bound = double_bound.extract_end_from_prefix_like();
            } else {
                starting_bound = indexable_expression_from_filters(
                    ComparisonOp::Gt,
                    ComparisonOp::Gte,
                    covering_expr,
                    covering_col_id,
                    table,
                    &mut filters_to_cover,
                );
                ending_bound = indexable_expression_from_filters(
                    ComparisonOp::Lt,
                    ComparisonOp::Lte,
                    covering_expr,
                    covering_col_id,
                    table,
                    &mut filters_to_cover,
                );
            }
        }

        // Reverse-scan reconciliation. A descending claim survives only
        // when the backward traversal has a clean starting point: equality
        // echoes or a two-sided range leave none, so the claim is dropped
        // and an explicit sort happens upstream. A sole lower bound swaps
        // into the stop-condition slot; a sole upper bound stays put and
        // initializes the scan at the high end.
        if path.sort_direction == SortDirection::Descending {
            if !path.end_exprs.is_empty()
                || (starting_bound.is_some() && ending_bound.is_some())
            {
                path.sort_direction = SortDirection::Unordered;
            } else if starting_bound.is_some() {
                ending_bound = starting_bound.take();
            }
        }

        if let Some(start) = &starting_bound {
            let comparator = start.filter().clone();
            path.lookup_type = if comparator.comparison_op() == Some(ComparisonOp::Gt) {
                IndexLookupType::Gt
            } else {
                IndexLookupType::Gte
            };
            path.index_exprs.push(comparator);
            path.bindings.extend_from_slice(start.bindings());
            path.use_type = IndexUseType::IndexScan;
        }

        if let Some(end) = &ending_bound {
            path.end_exprs.push(end.filter().clone());
            path.bindings.extend_from_slice(end.bindings());
            path.use_type = IndexUseType::IndexScan;
            if path.lookup_type == IndexLookupType::Eq {
                // Anything other than EQ is enough to enable a multi-key
                // scan.
                path.lookup_type = IndexLookupType::Gte;
            }
        }

        // Index not relevant to the statement at all.
        if path.index_exprs.is_empty()
            && path.end_exprs.is_empty()
            && path.sort_direction == SortDirection::Unordered
        {
            return None;
        }

        // Partial key coverage means the scan key gets padded for the
        // unfiltered components.
        if path.index_exprs.len() < key_component_count {
            if path.use_type == IndexUseType::CoveringUniqueEquality {
                // Padding with null values turns the point lookup into a
                // GTE scan, assuming any value sorts >= null.
                path.use_type = IndexUseType::IndexScan;
                path.lookup_type = IndexLookupType::Gte;
            } else if path.lookup_type == IndexLookupType::Gt {
                // A strict GT scan positioned on a padded prefix key would
                // also admit compound keys equal on the prefix with a
                // non-null tail. Re-checking the bound per row discards
                // them; the comparator appears in both index_exprs and
                // other_exprs on purpose.
                if let Some(start) = &starting_bound {
                    path.other_exprs.push(start.filter().clone());
                }
            }
        }

        // Everything not consumed by the key is a post-filter.
        path.other_exprs.append(&mut filters_to_cover);
        if path.sort_direction != SortDirection::Unordered {
            path.bindings.append(&mut bindings_for_order);
        }
        path.key_iterate = path.use_type == IndexUseType::IndexScan;
        Some(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::IndexType;
    use serde_json::json;

    use crate::expression::ValueType;

    fn catalog_with(table: Table) -> Catalog {
        Catalog::new().with_table(table)
    }

    fn table_ab() -> Table {
        Table::new("t")
            .with_column("a", ValueType::Integer)
            .with_column("b", ValueType::Integer)
            .with_index(Index::on_columns("ix_ab", IndexType::BalancedTree, vec![0, 1]))
    }

    fn eq(col: Expr, v: i64) -> Expr {
        Expr::comparison(
            ComparisonOp::Eq,
            col,
            Expr::constant(json!(v), ValueType::Integer),
        )
    }

    fn gt(col: Expr, v: i64) -> Expr {
        Expr::comparison(
            ComparisonOp::Gt,
            col,
            Expr::constant(json!(v), ValueType::Integer),
        )
    }

    #[test]
    fn test_sequential_path_always_first() {
        let catalog = catalog_with(table_ab());
        let table = catalog.table("t").unwrap();
        let stmt = ParsedStatement::select().with_filter("t", eq(table.column_ref("a").unwrap(), 5));
        let planner = AccessPlanner::new(&catalog, &stmt);

        let paths = planner.relevant_access_paths(table, &[]);

        assert!(paths[0].is_sequential());
        assert_eq!(paths[0].other_exprs.len(), 1);
    }

    #[test]
    fn test_equality_prefix_consumes_filters_in_key_order() {
        let catalog = catalog_with(table_ab());
        let table = catalog.table("t").unwrap();
        // Filters arrive minor-first; the walk still covers (a, b).
        let stmt = ParsedStatement::select()
            .with_filter("t", eq(table.column_ref("b").unwrap(), 7))
            .with_filter("t", eq(table.column_ref("a").unwrap(), 5));
        let planner = AccessPlanner::new(&catalog, &stmt);

        let paths = planner.relevant_access_paths(table, &[]);
        assert_eq!(paths.len(), 2);

        let index_path = &paths[1];
        assert_eq!(index_path.index_exprs.len(), 2);
        assert_eq!(index_path.end_exprs.len(), 2);
        assert_eq!(index_path.lookup_type, IndexLookupType::Eq);
        assert_eq!(index_path.use_type, IndexUseType::CoveringUniqueEquality);
        assert!(index_path.other_exprs.is_empty());
    }

    #[test]
    fn test_gt_padding_refilters_the_bound() {
        let table = Table::new("t")
            .with_column("a", ValueType::Integer)
            .with_column("b", ValueType::Integer)
            .with_column("c", ValueType::Integer)
            .with_index(Index::on_columns(
                "ix_abc",
                IndexType::BalancedTree,
                vec![0, 1, 2],
            ));
        let catalog = catalog_with(table);
        let table = catalog.table("t").unwrap();
        let stmt = ParsedStatement::select()
            .with_filter("t", eq(table.column_ref("a").unwrap(), 5))
            .with_filter("t", gt(table.column_ref("b").unwrap(), 7));
        let planner = AccessPlanner::new(&catalog, &stmt);

        let paths = planner.relevant_access_paths(table, &[]);
        let index_path = &paths[1];

        // Two of three components covered: the strict GT bound lands in
        // index_exprs for positioning AND in other_exprs for re-filtering.
        assert_eq!(index_path.index_exprs.len(), 2);
        assert_eq!(index_path.lookup_type, IndexLookupType::Gt);
        assert_eq!(index_path.other_exprs.len(), 1);
        assert_eq!(
            index_path.other_exprs[0].comparison_op(),
            Some(ComparisonOp::Gt)
        );
    }

    #[test]
    fn test_malformed_expression_index_is_skipped() {
        let bad_index = Index {
            name: "ix_bad".to_string(),
            index_type: IndexType::BalancedTree,
            columns: Vec::new(),
            expressions_json: "{not json".to_string(),
        };
        let table = Table::new("t")
            .with_column("a", ValueType::Integer)
            .with_index(bad_index);
        let catalog = catalog_with(table);
        let table = catalog.table("t").unwrap();
        let stmt = ParsedStatement::select().with_filter("t", eq(table.column_ref("a").unwrap(), 1));
        let planner = AccessPlanner::new(&catalog, &stmt);

        let paths = planner.relevant_access_paths(table, &[]);

        // Only the sequential path: the candidate index was skipped, the
        // statement survived.
        assert_eq!(paths.len(), 1);
        assert!(paths[0].is_sequential());
    }

    #[test]
    fn test_join_predicates_fold_into_candidates() {
        let orders = Table::new("orders")
            .with_column("customer_id", ValueType::Integer)
            .with_index(Index::on_columns("ix_cust", IndexType::BalancedTree, vec![0]));
        let customers = Table::new("customers").with_column("id", ValueType::Integer);
        let catalog = Catalog::new().with_table(orders).with_table(customers);

        let orders = catalog.table("orders").unwrap();
        let customers = catalog.table("customers").unwrap();
        let join = Expr::comparison(
            ComparisonOp::Eq,
            orders.column_ref("customer_id").unwrap(),
            customers.column_ref("id").unwrap(),
        );
        let stmt = ParsedStatement::select().with_join_filter("orders", "customers", join);
        let planner = AccessPlanner::new(&catalog, &stmt);

        let paths = planner.relevant_access_paths(orders, &[customers]);

        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].join_exprs.len(), 1);
        // The join equality drives the index path's key.
        assert_eq!(paths[1].index_exprs.len(), 1);
        assert_eq!(paths[1].use_type, IndexUseType::CoveringUniqueEquality);
    }

    #[test]
    fn test_filter_on_unindexed_column_only_yields_sequential() {
        let table = Table::new("t")
            .with_column("a", ValueType::Integer)
            .with_column("b", ValueType::Integer)
            .with_index(Index::on_columns("ix_a", IndexType::BalancedTree, vec![0]));
        let catalog = catalog_with(table);
        let table = catalog.table("t").unwrap();
        let stmt = ParsedStatement::select().with_filter("t", eq(table.column_ref("b").unwrap(), 3));
        let planner = AccessPlanner::new(&catalog, &stmt);

        let paths = planner.relevant_access_paths(table, &[]);

        assert_eq!(paths.len(), 1);
        assert!(paths[0].is_sequential());
    }

    #[test]
    fn test_lookup_by_name() {
        let catalog = catalog_with(table_ab());
        let stmt = ParsedStatement::select();
        let planner = AccessPlanner::new(&catalog, &stmt);

        let paths = planner.relevant_access_paths_for("t", &[]).unwrap();
        assert!(paths[0].is_sequential());
        assert!(planner.relevant_access_paths_for("missing", &[]).is_none());
    }

    #[test]
    fn test_key_iterate_tracks_multi_key_scans() {
        let catalog = catalog_with(table_ab());
        let table = catalog.table("t").unwrap();

        let point = ParsedStatement::select()
            .with_filter("t", eq(table.column_ref("a").unwrap(), 5))
            .with_filter("t", eq(table.column_ref("b").unwrap(), 7));
        let planner = AccessPlanner::new(&catalog, &point);
        let paths = planner.relevant_access_paths(table, &[]);
        assert!(!paths[1].key_iterate);

        let range = ParsedStatement::select()
            .with_filter("t", gt(table.column_ref("a").unwrap(), 5));
        let planner = AccessPlanner::new(&catalog, &range);
        let paths = planner.relevant_access_paths(table, &[]);
        assert!(paths[1].key_iterate);
    }
}
