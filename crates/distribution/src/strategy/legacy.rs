//! Legacy hash-modulo strategy.
//!
//! # Algorithm
//!
//! 1. No replicas: unassigned
//! 2. In-cluster: shard 0
//! 3. Valid pinned shard: that shard
//! 4. Empty id: shard 0
//! 5. Otherwise: `fnv1a32(id) % replicas`
//!
//! Stateless, so every replica reaches the same answer without seeing the
//! cluster list. The price is that nothing keeps shards balanced.

use tracing::debug;

use crate::cluster::Cluster;
use crate::strategy::DistributionStrategy;

#[derive(Debug, Clone, Copy)]
pub struct LegacyStrategy {
    replicas: usize,
}

impl LegacyStrategy {
    pub fn new(replicas: usize) -> Self {
        Self { replicas }
    }
}

impl DistributionStrategy for LegacyStrategy {
    fn shard_for(&self, cluster: Option<&Cluster>) -> Option<usize> {
        if self.replicas == 0 {
            debug!(replicas = self.replicas, "no replicas, cluster stays unassigned");
            return None;
        }
        let Some(cluster) = cluster else {
            debug!("in-cluster: shard 0");
            return Some(0);
        };
        if let Some(shard) = cluster.pinned_shard(self.replicas) {
            return Some(shard);
        }
        if cluster.id.is_empty() {
            return Some(0);
        }

        let shard = fnv1a(cluster.id.as_bytes()) as usize % self.replicas;
        debug!(id = %cluster.id, shard, "cluster shard computed");
        Some(shard)
    }

    fn name(&self) -> &'static str {
        "LegacyStrategy"
    }
}

/// FNV-1a hash (32-bit).
fn fnv1a(data: &[u8]) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for &byte in data {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}
