//! Human-readable rendering of access paths and emitted plan trees.
//!
//! Output is deterministic: same path, same text.

use std::fmt;

use crate::access::{AccessPath, SortDirection};
use crate::plan::node::PlanNode;

/// Explain rendering of one access path.
#[derive(Debug, Clone)]
pub struct ExplainAccessPath {
    /// "sequential scan" or "index scan via <name>"
    pub access: String,
    pub lookup_type: String,
    pub sort_direction: String,
    pub search_expressions: Vec<String>,
    pub end_expressions: Vec<String>,
    pub post_filters: Vec<String>,
    pub binding_count: usize,
}

impl ExplainAccessPath {
    /// Renders an access path
    pub fn from_path(path: &AccessPath<'_>) -> Self {
        let access = match path.index {
            None => "sequential scan".to_string(),
            Some(index) => format!("index scan via {}", index.name),
        };
        Self {
            access,
            lookup_type: path.lookup_type.as_str().to_string(),
            sort_direction: path.sort_direction.as_str().to_string(),
            search_expressions: path.index_exprs.iter().map(ToString::to_string).collect(),
            end_expressions: path.end_exprs.iter().map(ToString::to_string).collect(),
            post_filters: path
                .other_exprs
                .iter()
                .chain(&path.join_exprs)
                .map(ToString::to_string)
                .collect(),
            binding_count: path.bindings.len(),
        }
    }
}

impl fmt::Display for ExplainAccessPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Access: {}", self.access)?;
        writeln!(f, "Lookup: {}", self.lookup_type)?;
        if self.sort_direction != SortDirection::Unordered.as_str() {
            writeln!(f, "Order: {}", self.sort_direction)?;
        }
        if !self.search_expressions.is_empty() {
            writeln!(f, "Search:")?;
            for expr in &self.search_expressions {
                writeln!(f, "  - {}", expr)?;
            }
        }
        if !self.end_expressions.is_empty() {
            writeln!(f, "Stop:")?;
            for expr in &self.end_expressions {
                writeln!(f, "  - {}", expr)?;
            }
        }
        if !self.post_filters.is_empty() {
            writeln!(f, "Post-filter:")?;
            for expr in &self.post_filters {
                writeln!(f, "  - {}", expr)?;
            }
        }
        if self.binding_count > 0 {
            writeln!(f, "Bindings: {}", self.binding_count)?;
        }
        Ok(())
    }
}

impl fmt::Display for PlanNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        render_node(self, f, 0)
    }
}

fn render_node(node: &PlanNode, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    let pad = "  ".repeat(depth);
    match node {
        PlanNode::SeqScan(scan) => {
            write!(f, "{}SEQ SCAN {}", pad, scan.target_table)?;
            if let Some(predicate) = &scan.predicate {
                write!(f, " WHERE {}", predicate)?;
            }
            writeln!(f)
        }
        PlanNode::IndexScan(scan) => {
            write!(
                f,
                "{}INDEX SCAN {} USING {} ({})",
                pad,
                scan.target_table,
                scan.target_index,
                scan.lookup_type.as_str()
            )?;
            if scan.sort_direction != SortDirection::Unordered {
                write!(f, " {}", scan.sort_direction.as_str())?;
            }
            if let Some(end) = &scan.end_expression {
                write!(f, " UNTIL {}", end)?;
            }
            if let Some(predicate) = &scan.predicate {
                write!(f, " WHERE {}", predicate)?;
            }
            writeln!(f)
        }
        PlanNode::Send(send) => {
            writeln!(
                f,
                "{}SEND{}",
                pad,
                if send.multi_partition {
                    " (all partitions)"
                } else {
                    ""
                }
            )?;
            render_node(&send.child, f, depth + 1)
        }
        PlanNode::Receive(receive) => {
            writeln!(f, "{}RECEIVE", pad)?;
            render_node(&receive.child, f, depth + 1)
        }
    }
}
