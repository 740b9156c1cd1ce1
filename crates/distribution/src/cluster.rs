//! Managed cluster and application records.
//!
//! Only the fields that influence shard assignment are modelled.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A managed cluster.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    /// Stable unique identifier; the hashing and sorting key.
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// API server URL. Applications point at clusters through this value.
    #[serde(default)]
    pub server: String,
    /// Shard requested by an operator. Honoured only when it is a valid
    /// index for the current replica count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard: Option<i64>,
}

impl Cluster {
    pub fn new(id: impl Into<String>, name: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            server: server.into(),
            shard: None,
        }
    }

    pub fn with_shard(mut self, shard: i64) -> Self {
        self.shard = Some(shard);
        self
    }

    /// The operator-pinned shard, if it is in `0..replicas`.
    pub fn pinned_shard(&self, replicas: usize) -> Option<usize> {
        let shard = usize::try_from(self.shard?).ok()?;
        (shard < replicas).then_some(shard)
    }
}

/// An application deployed to a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub name: String,
    /// API server URL of the destination cluster.
    pub destination_server: String,
}

impl Application {
    pub fn new(name: impl Into<String>, destination_server: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            destination_server: destination_server.into(),
        }
    }
}

/// Source of the current cluster list. Called on every decision so
/// clusters added or removed on the fly are picked up.
pub type ClusterAccessor = Arc<dyn Fn() -> Vec<Cluster> + Send + Sync>;

/// Source of the current application list.
pub type AppAccessor = Arc<dyn Fn() -> Vec<Application> + Send + Sync>;

/// Accessor over a fixed list.
pub fn cluster_accessor(clusters: Vec<Cluster>) -> ClusterAccessor {
    Arc::new(move || clusters.clone())
}

/// Accessor over a fixed list.
pub fn app_accessor(apps: Vec<Application>) -> AppAccessor {
    Arc::new(move || apps.clone())
}

/// Clusters sorted by id.
pub(crate) fn sorted_by_id(mut clusters: Vec<Cluster>) -> Vec<Cluster> {
    clusters.sort_by(|a, b| a.id.cmp(&b.id));
    clusters
}
