//! Process-level parallelism.
//!
//! The REXI engine talks to other processes only through
//! [`ParallelRuntime`]: a broadcast of the input state and a sum-reduction
//! of the partial results. [`SingleProcess`] is the trivial runtime;
//! [`LocalCluster`] runs several ranks as threads of one process.
//!
//! [`StateExchange`] is the point-to-point contract used by time-parallel
//! drivers.

mod cluster;
mod exchange;
mod runtime;

pub use cluster::{ClusterRank, LocalCluster};
pub use exchange::StateExchange;
pub use runtime::{ParallelRuntime, SingleProcess};
