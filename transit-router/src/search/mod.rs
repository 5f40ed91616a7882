//! Shortest-path search over graph snapshots.
//!
//! A standard Dijkstra search with a pluggable weight criterion. The
//! network is sized in the hundreds to low thousands of stops, so no
//! spatial pruning is needed.

mod criterion;
mod dijkstra;

pub use criterion::{Criterion, InvalidCriterion, SortKey};
pub use dijkstra::{PathHop, PathResult, SearchError, shortest_path};
