//! Consistent hashing with bounded loads.
//!
//! # Algorithm
//!
//! 1. Put shards `"0"` .. `"replicas-1"` on a [`ShardSelector`]
//! 2. Walk clusters in id order
//! 3. For each cluster, `get_least(cluster.id)` picks the first shard on the
//!    ring under the load cap
//! 4. The shard's load becomes its running count of applications, so a
//!    cluster with many applications weighs more than an empty one
//!
//! Shards end up with a similar number of applications, and adding a shard
//! or a cluster only moves the clusters whose ring neighbourhood changed.
//!
//! # Performance
//!
//! The whole assignment is rebuilt on every call: O(replicas * vnodes) ring
//! construction plus one bounded walk per cluster. Callers that decide many
//! clusters at once should use [`BoundedLoadsStrategy::assignments`].

use std::collections::HashMap;

use shardring::partitioner::Blake3Partitioner;
use shardring::ring::DEFAULT_REPLICATION_FACTOR;
use shardring::{Partitioner, SelectorBuilder};
use tracing::{debug, error, warn};

use crate::cluster::{sorted_by_id, AppAccessor, Application, Cluster, ClusterAccessor};
use crate::error::Result;
use crate::strategy::DistributionStrategy;

pub struct BoundedLoadsStrategy<P: Partitioner = Blake3Partitioner> {
    clusters: ClusterAccessor,
    apps: AppAccessor,
    replicas: usize,
    partitioner: P,
    replication_factor: usize,
}

impl BoundedLoadsStrategy<Blake3Partitioner> {
    pub fn new(clusters: ClusterAccessor, apps: AppAccessor, replicas: usize) -> Self {
        Self {
            clusters,
            apps,
            replicas,
            partitioner: Blake3Partitioner,
            replication_factor: DEFAULT_REPLICATION_FACTOR,
        }
    }
}

impl<P: Partitioner + Clone> BoundedLoadsStrategy<P> {
    /// Hash function of the internal ring.
    pub fn with_partitioner<Q: Partitioner + Clone>(self, partitioner: Q) -> BoundedLoadsStrategy<Q> {
        BoundedLoadsStrategy {
            clusters: self.clusters,
            apps: self.apps,
            replicas: self.replicas,
            partitioner,
            replication_factor: self.replication_factor,
        }
    }

    /// Virtual nodes per shard on the internal ring.
    pub fn with_replication_factor(mut self, replication_factor: usize) -> Self {
        self.replication_factor = replication_factor;
        self
    }

    /// Shard index for every known cluster id.
    ///
    /// Fails with [`DistributionError::Ring`](crate::DistributionError::Ring)
    /// when clusters exist but there are no shards to place them on.
    pub fn assignments(&self) -> Result<HashMap<String, usize>> {
        let clusters = sorted_by_id((self.clusters)());
        let app_counts = app_distribution(&(self.apps)());

        let selector = SelectorBuilder::new()
            .with_partitioner(self.partitioner.clone())
            .with_replication_factor(self.replication_factor)
            .build();
        let mut apps_by_shard: HashMap<String, i64> = HashMap::with_capacity(self.replicas);
        for index in 0..self.replicas {
            let shard = index.to_string();
            selector.add(&shard);
            apps_by_shard.insert(shard, 0);
        }

        let mut assignments = HashMap::with_capacity(clusters.len());
        for cluster in &clusters {
            let shard = selector.get_least(&cluster.id)?;
            let index = match shard.parse::<usize>() {
                Ok(index) => index,
                Err(_) => {
                    error!(id = %cluster.id, %shard, "ring returned a name that is not a shard index");
                    continue;
                }
            };
            assignments.insert(cluster.id.clone(), index);

            let apps = app_counts.get(&cluster.server).copied().unwrap_or(0);
            let load = apps_by_shard.entry(shard.clone()).or_insert(0);
            *load += apps;
            selector.update_load(&shard, *load);
        }
        Ok(assignments)
    }
}

impl<P: Partitioner + Clone> DistributionStrategy for BoundedLoadsStrategy<P> {
    fn shard_for(&self, cluster: Option<&Cluster>) -> Option<usize> {
        if self.replicas == 0 {
            warn!(replicas = self.replicas, "the number of replicas is lower than 1");
            return None;
        }
        let Some(cluster) = cluster else {
            return Some(0);
        };
        if let Some(shard) = cluster.pinned_shard(self.replicas) {
            return Some(shard);
        }

        // A cluster that left the list must not keep a shard.
        if !(self.clusters)().iter().any(|c| c.id == cluster.id) {
            warn!(id = %cluster.id, "cluster not found in cluster list");
            return None;
        }
        let shard = match self.assignments() {
            Ok(assignments) => assignments.get(&cluster.id).copied(),
            Err(err) => {
                warn!(id = %cluster.id, %err, "failed to compute shard assignments");
                return None;
            }
        };
        match shard {
            Some(shard) => debug!(id = %cluster.id, shard, "cluster shard computed"),
            None => warn!(id = %cluster.id, "cluster not found in shard assignments"),
        }
        shard
    }

    fn name(&self) -> &'static str {
        "BoundedLoadsStrategy"
    }
}

/// Number of applications per destination server URL.
fn app_distribution(apps: &[Application]) -> HashMap<String, i64> {
    let mut counts = HashMap::new();
    for app in apps {
        *counts.entry(app.destination_server.clone()).or_insert(0) += 1;
    }
    counts
}
