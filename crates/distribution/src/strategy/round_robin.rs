//! Round-robin strategy.
//!
//! Clusters are sorted by id and dealt out to shards in turn: the cluster
//! at rank `i` goes to shard `i % replicas`. Shards differ by at most one
//! cluster, but inserting or removing a cluster shifts the rank of every
//! cluster after it.

use tracing::{debug, warn};

use crate::cluster::{sorted_by_id, Cluster, ClusterAccessor};
use crate::strategy::DistributionStrategy;

pub struct RoundRobinStrategy {
    clusters: ClusterAccessor,
    replicas: usize,
}

impl RoundRobinStrategy {
    pub fn new(clusters: ClusterAccessor, replicas: usize) -> Self {
        Self { clusters, replicas }
    }
}

impl DistributionStrategy for RoundRobinStrategy {
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

        let clusters = sorted_by_id((self.clusters)());
        debug!(count = clusters.len(), "ranking clusters");
        let Some(rank) = clusters.iter().position(|c| c.id == cluster.id) else {
            warn!(id = %cluster.id, "cluster not found in cluster list");
            return None;
        };
        let shard = rank % self.replicas;
        debug!(id = %cluster.id, shard, "cluster shard computed");
        Some(shard)
    }

    fn name(&self) -> &'static str {
        "RoundRobinStrategy"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::cluster_accessor;

    fn cluster(id: &str) -> Cluster {
        Cluster::new(id, format!("cluster{id}"), format!("https://kubernetes.default.svc?{id}"))
    }

    fn five() -> Vec<Cluster> {
        ["1", "2", "3", "4", "5"].into_iter().map(cluster).collect()
    }

    #[test]
    fn test_no_replicas_unassigned() {
        let strategy = RoundRobinStrategy::new(cluster_accessor(five()), 0);
        assert_eq!(strategy.shard_for(None), None);
        for c in five() {
            assert_eq!(strategy.shard_for(Some(&c)), None);
        }
    }

    #[test]
    fn test_modulo_of_rank() {
        let expected = [
            (1, [0, 0, 0, 0, 0]),
            (2, [0, 1, 0, 1, 0]),
            (3, [0, 1, 2, 0, 1]),
        ];
        for (replicas, shards) in expected {
            let strategy = RoundRobinStrategy::new(cluster_accessor(five()), replicas);
            assert_eq!(strategy.shard_for(None), Some(0));
            for (c, shard) in five().iter().zip(shards) {
                assert_eq!(strategy.shard_for(Some(c)), Some(shard), "replicas={replicas}");
            }
        }
    }

    #[test]
    fn test_rank_ignores_input_order() {
        let mut shuffled = five();
        shuffled.reverse();
        let strategy = RoundRobinStrategy::new(cluster_accessor(shuffled), 2);
        assert_eq!(strategy.shard_for(Some(&cluster("1"))), Some(0));
        assert_eq!(strategy.shard_for(Some(&cluster("2"))), Some(1));
    }

    #[test]
    fn test_pinned_shard_wins() {
        let mut clusters = five();
        clusters[4] = cluster("5").with_shard(1);
        let strategy = RoundRobinStrategy::new(cluster_accessor(clusters), 4);
        assert_eq!(strategy.shard_for(Some(&cluster("5").with_shard(1))), Some(1));
        assert_eq!(strategy.shard_for(Some(&cluster("4").with_shard(1))), Some(1));
    }

    #[test]
    fn test_cluster_added_and_removed() {
        let strategy = RoundRobinStrategy::new(cluster_accessor(five()), 2);
        assert_eq!(strategy.shard_for(Some(&cluster("6"))), None);

        let mut six = five();
        six.push(cluster("6"));
        let strategy = RoundRobinStrategy::new(cluster_accessor(six), 2);
        assert_eq!(strategy.shard_for(Some(&cluster("6"))), Some(1));

        let strategy = RoundRobinStrategy::new(cluster_accessor(five()), 2);
        assert_eq!(strategy.shard_for(Some(&cluster("6"))), None);
    }
}
