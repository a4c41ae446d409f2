//! Converts chosen access paths into scan plan nodes.

use crate::access::AccessPath;
use crate::catalog::{Column, Index, Table};
use crate::expression::Expr;
use crate::plan::errors::{PlanError, PlanResult};
use crate::plan::node::{IndexScanNode, PlanNode, ReceiveNode, SendNode, SeqScanNode};
use crate::statement::ParsedStatement;

/// Emits scan plan nodes for one statement's chosen access paths.
pub struct PlanEmitter<'a> {
    statement: &'a ParsedStatement,
}

impl<'a> PlanEmitter<'a> {
    /// Creates an emitter for a parsed statement
    pub fn new(statement: &'a ParsedStatement) -> Self {
        Self { statement }
    }

    /// The scan node that reads `table` according to `path`: sequential
    /// when the path carries no index, an index scan otherwise. Both attach
    /// the statement's scan-column projection for the table and compute the
    /// output schema from the catalog.
    pub fn access_plan_for_table(
        &self,
        table: &Table,
        path: &AccessPath<'_>,
    ) -> PlanResult<PlanNode> {
        match path.index {
            None => self.seq_scan_plan(table, path),
            Some(index) => self.index_scan_plan(table, index, path),
        }
    }

    fn seq_scan_plan(&self, table: &Table, path: &AccessPath<'_>) -> PlanResult<PlanNode> {
        let scan_columns = self.scan_columns_for(table);
        let output_schema = resolve_output_schema(table, scan_columns.as_deref())?;
        Ok(PlanNode::SeqScan(SeqScanNode {
            target_table: table.name.clone(),
            predicate: Expr::conjoin(path.other_exprs.clone()),
            scan_columns,
            output_schema,
        }))
    }

    fn index_scan_plan(
        &self,
        table: &Table,
        index: &Index,
        path: &AccessPath<'_>,
    ) -> PlanResult<PlanNode> {
        // The search keys are the right-hand sides of the normalized key
        // comparisons, in key order.
        let mut search_keys = Vec::with_capacity(path.index_exprs.len());
        for comparison in &path.index_exprs {
            let rhs = comparison.right().ok_or_else(|| PlanError::MalformedSearchKey {
                index: index.name.clone(),
            })?;
            search_keys.push(rhs.clone());
        }

        let scan_columns = self.scan_columns_for(table);
        let output_schema = resolve_output_schema(table, scan_columns.as_deref())?;
        Ok(PlanNode::IndexScan(IndexScanNode {
            target_table: table.name.clone(),
            target_index: index.name.clone(),
            search_keys,
            lookup_type: path.lookup_type,
            sort_direction: path.sort_direction,
            key_iterate: path.key_iterate,
            bindings: path.bindings.clone(),
            end_expression: Expr::conjoin(path.end_exprs.clone()),
            predicate: Expr::conjoin(path.other_exprs.clone()),
            scan_columns,
            output_schema,
        }))
    }

    /// Wraps a scan for multi-partition execution: the scan runs on every
    /// partition under a send, and the receive above it carries the scan's
    /// output schema for the coordinator fragment.
    pub fn add_send_receive_pair(&self, scan: PlanNode) -> PlanNode {
        let output_schema = scan.output_schema().to_vec();
        PlanNode::Receive(ReceiveNode {
            output_schema,
            child: Box::new(PlanNode::Send(SendNode {
                multi_partition: true,
                child: Box::new(scan),
            })),
        })
    }

    fn scan_columns_for(&self, table: &Table) -> Option<Vec<String>> {
        self.statement
            .scan_columns_for_table(&table.name)
            .map(<[String]>::to_vec)
    }
}

/// The projection columns resolved against the table, or every column when
/// the statement parsed no projection.
fn resolve_output_schema(
    table: &Table,
    scan_columns: Option<&[String]>,
) -> PlanResult<Vec<Column>> {
    match scan_columns {
        None => Ok(table.columns.clone()),
        Some(names) => names
            .iter()
            .map(|name| {
                table
                    .column(name)
                    .cloned()
                    .ok_or_else(|| PlanError::UnknownScanColumn {
                        table: table.name.clone(),
                        column: name.clone(),
                    })
            })
            .collect(),
    }
}
