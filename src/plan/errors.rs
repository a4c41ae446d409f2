//! # Plan Emission Errors

use thiserror::Error;

/// Result type for plan emission
pub type PlanResult<T> = Result<T, PlanError>;

/// Plan emission errors
///
/// Emission is the one planner layer that resolves names against the
/// catalog, so it is the one layer that can fail.
#[derive(Debug, Clone, Error)]
pub enum PlanError {
    #[error("Unknown scan column '{column}' in table '{table}'")]
    UnknownScanColumn { table: String, column: String },

    #[error("Access path for index '{index}' carries a malformed comparison")]
    MalformedSearchKey { index: String },
}
