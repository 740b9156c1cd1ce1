//! Per-replica cluster filter.

use std::sync::Arc;

use tracing::warn;

use crate::cluster::Cluster;
use crate::error::{DistributionError, Result};
use crate::strategy::DistributionStrategy;

/// Decides whether this replica reconciles a given cluster.
#[derive(Clone)]
pub struct ClusterFilter {
    strategy: Arc<dyn DistributionStrategy>,
    replicas: usize,
    shard: usize,
}

impl ClusterFilter {
    /// Filter for replica `shard` out of `replicas`.
    pub fn new(
        strategy: Arc<dyn DistributionStrategy>,
        replicas: usize,
        shard: usize,
    ) -> Result<Self> {
        if shard >= replicas {
            return Err(DistributionError::ShardOutOfRange { shard, replicas });
        }
        Ok(Self {
            strategy,
            replicas,
            shard,
        })
    }

    pub fn shard(&self) -> usize {
        self.shard
    }

    /// Shard that owns `cluster`. A pinned shard outside the replica range
    /// is reported and the strategy decides instead.
    pub fn owner(&self, cluster: Option<&Cluster>) -> Option<usize> {
        if let Some(requested) = cluster.and_then(|c| c.shard) {
            if let Some(shard) = cluster.and_then(|c| c.pinned_shard(self.replicas)) {
                return Some(shard);
            }
            warn!(
                requested,
                replicas = self.replicas,
                name = cluster.map(|c| c.name.as_str()).unwrap_or_default(),
                "specified cluster shard is not an available shard, assigning automatically"
            );
        }
        self.strategy.shard_for(cluster)
    }

    /// Whether this replica should process `cluster`.
    pub fn accepts(&self, cluster: Option<&Cluster>) -> bool {
        self.owner(cluster) == Some(self.shard)
    }
}
