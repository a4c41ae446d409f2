//! Access-path assembly for stratadb.
//!
//! Enumerates the viable physical access paths for reading a single table
//! and decomposes the statement's filters across them.
//!
//! # Design Principles
//!
//! - Never fail closed: the enumeration always contains the naive
//!   sequential scan; everything else degrades to "no path for this index"
//! - Deterministic: indexes are visited in catalog order, filters in
//!   statement order
//! - Share, don't mutate: paths hold normalized clones; the statement's
//!   expression tree is never touched

mod builder;
mod matcher;
mod ordering;
mod path;

pub use builder::AccessPlanner;
pub use path::{AccessPath, IndexLookupType, IndexUseType, SortDirection};
