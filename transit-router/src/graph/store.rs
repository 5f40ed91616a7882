//! Versioned storage for published graph snapshots.
//!
//! The store owns every published version and hands out the current
//! latest. Publication happens entirely under one write guard, so readers
//! never observe zero or two latest graphs. Snapshots themselves are
//! immutable; superseded versions are kept, not deleted.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::info;

use super::model::RouteGraph;

/// A snapshot as held by the store, with its publication flags.
#[derive(Debug, Clone)]
struct StoredVersion {
    graph: Arc<RouteGraph>,
    is_latest: bool,
    is_active: bool,
}

/// Summary of one stored version, for operator inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct VersionInfo {
    pub id: String,
    pub built_at: DateTime<Utc>,
    pub node_count: usize,
    pub edge_count: usize,
    pub is_latest: bool,
    pub is_active: bool,
}

/// Holds published graph versions and hands out the current latest.
#[derive(Debug, Default)]
pub struct GraphStore {
    versions: RwLock<Vec<StoredVersion>>,
}

impl GraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a snapshot, superseding the current latest.
    ///
    /// Marks every stored version non-latest, then inserts the new version
    /// as latest and active, all under one write guard.
    pub fn publish(&self, graph: RouteGraph) -> Arc<RouteGraph> {
        let graph = Arc::new(graph);
        let mut versions = self.versions.write().unwrap_or_else(|e| e.into_inner());
        for stored in versions.iter_mut() {
            stored.is_latest = false;
        }
        versions.push(StoredVersion {
            graph: Arc::clone(&graph),
            is_latest: true,
            is_active: true,
        });
        info!(
            version = %graph.version().id,
            stored_versions = versions.len(),
            "published route graph"
        );
        graph
    }

    /// The current latest active snapshot, if any has been published.
    pub fn latest(&self) -> Option<Arc<RouteGraph>> {
        let versions = self.versions.read().unwrap_or_else(|e| e.into_inner());
        versions
            .iter()
            .rev()
            .find(|v| v.is_latest && v.is_active)
            .map(|v| Arc::clone(&v.graph))
    }

    /// Number of stored versions, including superseded ones.
    pub fn version_count(&self) -> usize {
        let versions = self.versions.read().unwrap_or_else(|e| e.into_inner());
        versions.len()
    }

    /// Summaries of every stored version, oldest first.
    pub fn versions(&self) -> Vec<VersionInfo> {
        let versions = self.versions.read().unwrap_or_else(|e| e.into_inner());
        versions
            .iter()
            .map(|v| VersionInfo {
                id: v.graph.version().id.clone(),
                built_at: v.graph.version().built_at,
                node_count: v.graph.node_count(),
                edge_count: v.graph.edge_count(),
                is_latest: v.is_latest,
                is_active: v.is_active,
            })
            .collect()
    }
}
