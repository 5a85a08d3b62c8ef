//! Batch scheduler: partitions candidates and drives execution.
//!
//! Two execution paths, one result contract:
//! - **Sequential**: a single logical worker, batches in candidate order
//! - **Parallel**: a fixed worker pool over disjoint batches, merged through
//!   a single aggregation point
//!
//! The match result *set* is invariant across paths, batch sizes, and worker
//! counts; the aggregator's final sort makes the output byte-identical too.

pub mod batching;
pub mod parallel;
pub mod sequential;

pub use batching::{Batch, BatchIter};
pub use parallel::run_parallel;
pub use sequential::run_sequential;
