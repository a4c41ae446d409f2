//! Scan-node emission for stratadb.
//!
//! Turns a chosen access path into the leaf of a statement plan: a
//! sequential or index scan node, optionally wrapped in a send/receive
//! pair for multi-partition execution. Emission is additive; it never
//! revisits the matching decisions baked into the path.

mod emitter;
mod errors;
mod explain;
mod node;

pub use emitter::PlanEmitter;
pub use errors::{PlanError, PlanResult};
pub use explain::ExplainAccessPath;
pub use node::{IndexScanNode, PlanNode, ReceiveNode, SendNode, SeqScanNode};
