//! Scan plan node graph emitted by the planner.
//!
//! Nodes serialize as JSON so plan fragments can be shipped to execution
//! sites. The graph here is the leaf end of a statement plan: a sequential
//! or index scan, optionally under a send/receive pair for multi-partition
//! execution.

use serde::{Deserialize, Serialize};

use crate::access::{IndexLookupType, SortDirection};
use crate::catalog::Column;
use crate::expression::Expr;

/// A sequential full-table scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeqScanNode {
    pub target_table: String,
    /// Conjunction of the residual filters, when any.
    pub predicate: Option<Expr>,
    /// Projection parsed from the statement, when any.
    pub scan_columns: Option<Vec<String>>,
    pub output_schema: Vec<Column>,
}

/// An index scan positioned by search keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexScanNode {
    pub target_table: String,
    pub target_index: String,
    /// Right-hand sides of the normalized key comparisons, in key order.
    pub search_keys: Vec<Expr>,
    pub lookup_type: IndexLookupType,
    pub sort_direction: SortDirection,
    pub key_iterate: bool,
    /// Parameter bindings required for cached-plan reuse.
    pub bindings: Vec<Expr>,
    /// Conjunction of the stop conditions, when any.
    pub end_expression: Option<Expr>,
    /// Conjunction of the residual filters, when any.
    pub predicate: Option<Expr>,
    pub scan_columns: Option<Vec<String>>,
    pub output_schema: Vec<Column>,
}

/// Ships a child fragment's rows to the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendNode {
    /// True when the child fragment runs on every partition.
    pub multi_partition: bool,
    pub child: Box<PlanNode>,
}

/// Collects rows produced by a send on the coordinator side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiveNode {
    /// Schema of the collected rows, copied from the wrapped scan.
    pub output_schema: Vec<Column>,
    pub child: Box<PlanNode>,
}

/// One node of the emitted plan graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum PlanNode {
    SeqScan(SeqScanNode),
    IndexScan(IndexScanNode),
    Send(SendNode),
    Receive(ReceiveNode),
}

impl PlanNode {
    /// The schema of the rows this node produces.
    pub fn output_schema(&self) -> &[Column] {
        match self {
            PlanNode::SeqScan(node) => &node.output_schema,
            PlanNode::IndexScan(node) => &node.output_schema,
            PlanNode::Send(node) => node.child.output_schema(),
            PlanNode::Receive(node) => &node.output_schema,
        }
    }

    pub fn as_seq_scan(&self) -> Option<&SeqScanNode> {
        match self {
            PlanNode::SeqScan(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_index_scan(&self) -> Option<&IndexScanNode> {
        match self {
            PlanNode::IndexScan(node) => Some(node),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::ValueType;

    fn schema() -> Vec<Column> {
        vec![Column {
            name: "a".to_string(),
            index: 0,
            value_type: ValueType::Integer,
        }]
    }

    #[test]
    fn test_output_schema_passes_through_send() {
        let scan = PlanNode::SeqScan(SeqScanNode {
            target_table: "t".to_string(),
            predicate: None,
            scan_columns: None,
            output_schema: schema(),
        });
        let send = PlanNode::Send(SendNode {
            multi_partition: true,
            child: Box::new(scan),
        });

        assert_eq!(send.output_schema(), schema().as_slice());
    }

    #[test]
    fn test_plan_node_serde_round_trip() {
        let node = PlanNode::Receive(ReceiveNode {
            output_schema: schema(),
            child: Box::new(PlanNode::Send(SendNode {
                multi_partition: true,
                child: Box::new(PlanNode::SeqScan(SeqScanNode {
                    target_table: "t".to_string(),
                    predicate: None,
                    scan_columns: None,
                    output_schema: schema(),
                })),
            })),
        });

        let payload = serde_json::to_string(&node).unwrap();
        let back: PlanNode = serde_json::from_str(&payload).unwrap();
        assert_eq!(back, node);
    }
}
