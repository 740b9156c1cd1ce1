//! Single-shard strategy.

use crate::cluster::Cluster;
use crate::strategy::DistributionStrategy;

/// Sends every cluster to shard 0.
///
/// Kept for API compatibility with deployments that run a single
/// controller; not selectable by algorithm name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoShardingStrategy;

impl DistributionStrategy for NoShardingStrategy {
    fn shard_for(&self, _cluster: Option<&Cluster>) -> Option<usize> {
        Some(0)
    }

    fn name(&self) -> &'static str {
        "NoShardingStrategy"
    }
}
