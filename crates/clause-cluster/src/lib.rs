//! Leader clustering for the clause analysis engine (4.H).

mod leader;
mod naming;
mod stats;

pub use leader::ClusteringEngine;
pub use naming::generate_cluster_name;
pub use stats::{compute as cluster_statistics, ClusterStatistics};
