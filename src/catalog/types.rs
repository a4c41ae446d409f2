//! Catalog snapshot consumed by the planner.
//!
//! Tables, columns, and indexes are plain immutable data. The planner holds
//! borrows into one snapshot for the lifetime of a planning pass; nothing
//! here is mutated after construction. Index iteration follows catalog
//! order, so path enumeration is reproducible across runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::errors::{CatalogError, CatalogResult};
use crate::expression::{Expr, ValueType};

/// A table column: name, ordinal within the table, scalar type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub index: usize,
    pub value_type: ValueType,
}

/// Physical index layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexType {
    /// Ordered tree; supports range iteration.
    BalancedTree,
    /// Hash table; point lookups only.
    Hash,
}

impl IndexType {
    /// Whether the physical order supports range iteration.
    pub fn is_scannable(&self) -> bool {
        matches!(self, IndexType::BalancedTree)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::BalancedTree => "balanced_tree",
            IndexType::Hash => "hash",
        }
    }
}

/// An index over a table.
///
/// A simple index keys on columns, listed by ordinal. An expression index
/// keys on arbitrary expressions, carried as a JSON array in
/// `expressions_json`; a non-empty payload marks the index as an
/// expression index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub name: String,
    pub index_type: IndexType,
    /// Ordinals of the key columns, in key order. Unused for expression
    /// indexes.
    pub columns: Vec<usize>,
    /// JSON-serialized key expressions; empty for a simple column index.
    pub expressions_json: String,
}

impl Index {
    /// Creates a simple column index
    pub fn on_columns(
        name: impl Into<String>,
        index_type: IndexType,
        columns: Vec<usize>,
    ) -> Self {
        Self {
            name: name.into(),
            index_type,
            columns,
            expressions_json: String::new(),
        }
    }

    /// Creates an expression index, serializing the key expressions
    pub fn on_expressions(
        name: impl Into<String>,
        index_type: IndexType,
        expressions: &[Expr],
    ) -> Self {
        Self {
            name: name.into(),
            index_type,
            columns: Vec::new(),
            // Serializing a tree of plain data cannot fail.
            expressions_json: serde_json::to_string(expressions)
                .unwrap_or_default(),
        }
    }

    /// True when the key components are expressions rather than columns
    pub fn is_expression_index(&self) -> bool {
        !self.expressions_json.is_empty()
    }

    /// Deserializes the key expressions.
    ///
    /// `Ok(None)` for a simple column index. A malformed payload is an
    /// error the caller treats as "no viable path for this index", never as
    /// a statement failure.
    pub fn indexed_expressions(&self) -> CatalogResult<Option<Vec<Expr>>> {
        if self.expressions_json.is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&self.expressions_json)
            .map(Some)
            .map_err(|e| CatalogError::malformed_index(&self.name, e))
    }
}

/// A table: named, ordered columns, indexes in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub indexes: Vec<Index>,
}

impl Table {
    /// Creates an empty table
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Appends a column, assigning the next ordinal
    pub fn with_column(mut self, name: impl Into<String>, value_type: ValueType) -> Self {
        let index = self.columns.len();
        self.columns.push(Column {
            name: name.into(),
            index,
            value_type,
        });
        self
    }

    /// Appends an index
    pub fn with_index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Looks up a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// A column reference expression over this table's named column
    pub fn column_ref(&self, name: &str) -> Option<Expr> {
        self.column(name).map(|c| {
            Expr::tuple_value(self.name.clone(), c.index, c.name.clone(), c.value_type)
        })
    }
}

/// An immutable catalog snapshot: tables by name, deterministic iteration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    tables: BTreeMap<String, Table>,
}

impl Catalog {
    /// Creates an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table to the snapshot
    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.insert(table.name.clone(), table);
        self
    }

    /// Looks up a table by name
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Iterates tables in name order
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }
}
