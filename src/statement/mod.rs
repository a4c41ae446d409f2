//! Parsed-statement surface consumed by the planner.
//!
//! The parser and binder live upstream; the planner only needs the
//! per-table filter lists, the join predicates keyed by unordered table
//! pair, the optional scan-column projections, and (for SELECT) the ORDER
//! BY items.

use std::collections::HashMap;

use crate::expression::Expr;

/// One ORDER BY item: the ordering expression and its direction.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub expr: Expr,
    pub ascending: bool,
}

impl OrderByItem {
    pub fn asc(expr: Expr) -> Self {
        Self {
            expr,
            ascending: true,
        }
    }

    pub fn desc(expr: Expr) -> Self {
        Self {
            expr,
            ascending: false,
        }
    }
}

/// An unordered pair of table names keying join predicates.
///
/// Normalized on construction so `(a, b)` and `(b, a)` are the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TablePair {
    first: String,
    second: String,
}

impl TablePair {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let a = a.into();
        let b = b.into();
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }
}

/// Statement kinds the planner distinguishes. Index ordering can only be
/// claimed for SELECT output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Dml,
}

/// The parsed statement handed to the planner.
#[derive(Debug, Clone)]
pub struct ParsedStatement {
    kind: StatementKind,
    table_filters: HashMap<String, Vec<Expr>>,
    join_filters: HashMap<TablePair, Vec<Expr>>,
    scan_columns: HashMap<String, Vec<String>>,
    order_by: Vec<OrderByItem>,
}

impl ParsedStatement {
    /// Creates a SELECT statement
    pub fn select() -> Self {
        Self::new(StatementKind::Select)
    }

    /// Creates a DML statement (INSERT/UPDATE/DELETE scan planning)
    pub fn dml() -> Self {
        Self::new(StatementKind::Dml)
    }

    fn new(kind: StatementKind) -> Self {
        Self {
            kind,
            table_filters: HashMap::new(),
            join_filters: HashMap::new(),
            scan_columns: HashMap::new(),
            order_by: Vec::new(),
        }
    }

    /// Adds a single-table filter predicate
    pub fn with_filter(mut self, table: impl Into<String>, filter: Expr) -> Self {
        self.table_filters
            .entry(table.into())
            .or_default()
            .push(filter);
        self
    }

    /// Adds a join predicate between two tables
    pub fn with_join_filter(
        mut self,
        a: impl Into<String>,
        b: impl Into<String>,
        filter: Expr,
    ) -> Self {
        self.join_filters
            .entry(TablePair::new(a, b))
            .or_default()
            .push(filter);
        self
    }

    /// Adds an ORDER BY item
    pub fn with_order_by(mut self, item: OrderByItem) -> Self {
        self.order_by.push(item);
        self
    }

    /// Sets the scan-column projection for a table
    pub fn with_scan_columns(
        mut self,
        table: impl Into<String>,
        columns: Vec<String>,
    ) -> Self {
        self.scan_columns.insert(table.into(), columns);
        self
    }

    pub fn is_select(&self) -> bool {
        self.kind == StatementKind::Select
    }

    /// Single-table filters for the named table
    pub fn filters_for_table(&self, table: &str) -> &[Expr] {
        self.table_filters.get(table).map_or(&[], Vec::as_slice)
    }

    /// Join predicates for the unordered pair of tables
    pub fn join_filters_for_pair(&self, a: &str, b: &str) -> &[Expr] {
        self.join_filters
            .get(&TablePair::new(a, b))
            .map_or(&[], Vec::as_slice)
    }

    /// The scan-column projection for a table, when one was parsed
    pub fn scan_columns_for_table(&self, table: &str) -> Option<&[String]> {
        self.scan_columns.get(table).map(Vec::as_slice)
    }

    /// ORDER BY items, in statement order
    pub fn order_by(&self) -> &[OrderByItem] {
        &self.order_by
    }
}
