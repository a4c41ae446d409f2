//! Expression model for stratadb's planner.
//!
//! # Design Principles
//!
//! - Tagged variant tree: one enum over the expression kinds, operations
//!   dispatch on the tag
//! - Immutable after construction: normalization produces fresh nodes that
//!   clone the original operands, so statement trees can be shared freely
//! - Serde-native: index key expressions serialize as JSON for catalog
//!   storage

mod binding;
mod like;
mod model;

pub use binding::{binding_to_indexed_expression, depends_on_table, tuple_values};
pub use like::is_prefix_pattern;
pub use model::{ComparisonOp, Expr, ValueType, AND_OPERATOR};
