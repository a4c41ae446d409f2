//! stratadb - access-path planning core for the strata distributed SQL
//! engine
//!
//! Given a parsed statement and a catalog snapshot, enumerate the physical
//! access paths for reading a single table and emit scan plan nodes.

pub mod access;
pub mod catalog;
pub mod expression;
pub mod plan;
pub mod statement;
