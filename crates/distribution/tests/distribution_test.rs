//! End-to-end tests: strategies behind per-replica filters.

use std::collections::HashMap;
use std::sync::Arc;

use distribution::cluster::{app_accessor, cluster_accessor};
use distribution::{
    strategy_for, Application, BoundedLoadsStrategy, Cluster, ClusterFilter, DistributionStrategy,
    RingSettings, ShardingAlgorithm,
};
use proptest::prelude::*;

fn fleet(n: usize) -> Vec<Cluster> {
    (0..n)
        .map(|i| Cluster::new(format!("{i:04}"), format!("cluster-{i}"), format!("https://cluster-{i}.example")))
        .collect()
}

fn apps(clusters: &[Cluster]) -> Vec<Application> {
    clusters
        .iter()
        .enumerate()
        .flat_map(|(i, c)| (0..(i % 4 + 1)).map(move |a| Application::new(format!("app-{i}-{a}"), c.server.clone())))
        .collect()
}

fn filters(algorithm: ShardingAlgorithm, clusters: &[Cluster], replicas: usize) -> Vec<ClusterFilter> {
    let strategy: Arc<dyn DistributionStrategy> = Arc::from(strategy_for(
        algorithm,
        cluster_accessor(clusters.to_vec()),
        app_accessor(apps(clusters)),
        replicas,
        RingSettings::default(),
    ));
    (0..replicas)
        .map(|shard| ClusterFilter::new(Arc::clone(&strategy), replicas, shard).unwrap())
        .collect()
}

#[test]
fn test_every_cluster_has_exactly_one_owner() {
    let clusters = fleet(40);
    for algorithm in ShardingAlgorithm::ALL {
        let filters = filters(algorithm, &clusters, 3);
        for cluster in &clusters {
            let owners = filters.iter().filter(|f| f.accepts(Some(cluster))).count();
            assert_eq!(owners, 1, "{algorithm}: cluster {} has {owners} owners", cluster.id);
        }
        assert_eq!(filters.iter().filter(|f| f.accepts(None)).count(), 1);
    }
}

#[test]
fn test_bounded_loads_moves_fewer_clusters_than_round_robin() {
    let clusters = fleet(60);
    let apps = apps(&clusters);

    let bounded = |replicas| {
        BoundedLoadsStrategy::new(cluster_accessor(clusters.clone()), app_accessor(apps.clone()), replicas)
            .with_replication_factor(100)
            .assignments()
            .unwrap()
    };
    let before = bounded(3);
    let after = bounded(4);
    let bounded_moved = before.iter().filter(|(id, shard)| after[*id] != **shard).count();

    // Round-robin deals by rank, so growing from 3 to 4 shards moves most clusters.
    let round_robin = |replicas| -> HashMap<String, usize> {
        let strategy = strategy_for(
            ShardingAlgorithm::RoundRobin,
            cluster_accessor(clusters.clone()),
            app_accessor(vec![]),
            replicas,
            RingSettings::default(),
        );
        clusters
            .iter()
            .map(|c| (c.id.clone(), strategy.shard_for(Some(c)).unwrap()))
            .collect()
    };
    let rr_before = round_robin(3);
    let rr_after = round_robin(4);
    let rr_moved = rr_before.iter().filter(|(id, shard)| rr_after[*id] != **shard).count();

    assert!(
        bounded_moved < rr_moved,
        "bounded loads moved {bounded_moved}, round-robin moved {rr_moved}"
    );
}

#[test]
fn test_removed_cluster_is_unassigned_everywhere() {
    let mut clusters = fleet(10);
    let gone = clusters.pop().unwrap();
    for algorithm in [ShardingAlgorithm::RoundRobin, ShardingAlgorithm::ConsistentHashing] {
        let filters = filters(algorithm, &clusters, 2);
        assert!(filters.iter().all(|f| !f.accepts(Some(&gone))), "{algorithm}");
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn single_owner_for_any_fleet(
        ids in prop::collection::btree_set("[a-z0-9-]{1,12}", 1..20),
        replicas in 1usize..5,
        algorithm in prop::sample::select(ShardingAlgorithm::ALL.to_vec()),
    ) {
        let clusters: Vec<Cluster> = ids
            .iter()
            .map(|id| Cluster::new(id.clone(), id.clone(), format!("https://{id}")))
            .collect();
        let filters = filters(algorithm, &clusters, replicas);
        for cluster in &clusters {
            let owners = filters.iter().filter(|f| f.accepts(Some(cluster))).count();
            prop_assert_eq!(owners, 1);
        }
    }
}
