//! Access-path records produced by enumeration.

use serde::{Deserialize, Serialize};

use crate::catalog::Index;
use crate::expression::Expr;

/// Operator used to position an index scan at its first key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexLookupType {
    Eq,
    Gt,
    Gte,
}

impl IndexLookupType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexLookupType::Eq => "EQ",
            IndexLookupType::Gt => "GT",
            IndexLookupType::Gte => "GTE",
        }
    }
}

/// How a path uses its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexUseType {
    /// Every key component equality-constrained; the scan hits at most one
    /// key.
    CoveringUniqueEquality,
    /// Multi-key scan.
    IndexScan,
}

/// Scan output order claimed by a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Unordered,
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Unordered => "unordered",
            SortDirection::Ascending => "ascending",
            SortDirection::Descending => "descending",
        }
    }
}

/// One way to read rows from a table, together with the predicate
/// decomposition that makes it sound.
///
/// `index_exprs` are normalized comparisons whose right-hand sides become
/// the scan's search keys; `end_exprs` form the stop condition;
/// `other_exprs` and `join_exprs` are re-checked per retrieved row. A
/// filter is consumed by at most one slot, except that equality-prefix
/// comparisons echo into `end_exprs` and a strict-GT starting bound on a
/// partially covered key is additionally re-filtered through `other_exprs`.
///
/// The path borrows its index from the catalog snapshot; the expression
/// lists own normalized clones and are never mutated after assembly.
#[derive(Debug, Clone)]
pub struct AccessPath<'a> {
    /// The chosen index; `None` is the naive sequential scan.
    pub index: Option<&'a Index>,
    pub use_type: IndexUseType,
    pub lookup_type: IndexLookupType,
    pub sort_direction: SortDirection,
    pub index_exprs: Vec<Expr>,
    pub end_exprs: Vec<Expr>,
    pub other_exprs: Vec<Expr>,
    pub join_exprs: Vec<Expr>,
    /// Parameter expressions that must hold their recorded values for a
    /// cached plan built from this path to be reusable.
    pub bindings: Vec<Expr>,
    /// Whether the scan iterates multiple keys.
    pub key_iterate: bool,
}

impl<'a> AccessPath<'a> {
    /// The naive sequential path every enumeration contains.
    pub fn sequential() -> Self {
        Self {
            index: None,
            use_type: IndexUseType::IndexScan,
            lookup_type: IndexLookupType::Eq,
            sort_direction: SortDirection::Unordered,
            index_exprs: Vec::new(),
            end_exprs: Vec::new(),
            other_exprs: Vec::new(),
            join_exprs: Vec::new(),
            bindings: Vec::new(),
            key_iterate: false,
        }
    }

    /// Starting state for an index path: hope for full equality coverage.
    pub(crate) fn for_index(index: &'a Index) -> Self {
        Self {
            index: Some(index),
            use_type: IndexUseType::CoveringUniqueEquality,
            lookup_type: IndexLookupType::Eq,
            ..Self::sequential()
        }
    }

    pub fn is_sequential(&self) -> bool {
        self.index.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::IndexType;

    #[test]
    fn test_sequential_path_shape() {
        let path = AccessPath::sequential();
        assert!(path.is_sequential());
        assert_eq!(path.sort_direction, SortDirection::Unordered);
        assert!(path.index_exprs.is_empty());
        assert!(!path.key_iterate);
    }

    #[test]
    fn test_index_path_starts_optimistic() {
        let index = Index::on_columns("ix_a", IndexType::BalancedTree, vec![0]);
        let path = AccessPath::for_index(&index);
        assert!(!path.is_sequential());
        assert_eq!(path.use_type, IndexUseType::CoveringUniqueEquality);
        assert_eq!(path.lookup_type, IndexLookupType::Eq);
    }
}
