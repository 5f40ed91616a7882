//! Versioned transit graph: snapshot model, construction and storage.

mod builder;
mod model;
mod store;

pub use builder::{BuildError, BuildResult, BuildWarning, GraphBuilder};
pub use model::{
    Edge, GraphVersion, RouteGraph, RouteMembership, StopNode, TRANSFER_PENALTY_MIN, TransferStop,
    Traversal,
};
pub use store::{GraphStore, VersionInfo};
