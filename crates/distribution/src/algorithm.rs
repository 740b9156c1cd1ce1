//! Sharding algorithm selection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use shardring::partitioner::PartitionerKind;
use shardring::ring::DEFAULT_REPLICATION_FACTOR;
use tracing::{debug, warn};

use crate::cluster::{AppAccessor, ClusterAccessor};
use crate::error::DistributionError;
use crate::strategy::{
    BoundedLoadsStrategy, DistributionStrategy, LegacyStrategy, RoundRobinStrategy,
};

/// Named sharding algorithm, as configured on the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShardingAlgorithm {
    #[default]
    #[serde(rename = "legacy")]
    Legacy,
    #[serde(rename = "round-robin")]
    RoundRobin,
    #[serde(rename = "consistent-hashing")]
    ConsistentHashing,
}

impl ShardingAlgorithm {
    pub const ALL: [ShardingAlgorithm; 3] = [
        ShardingAlgorithm::Legacy,
        ShardingAlgorithm::RoundRobin,
        ShardingAlgorithm::ConsistentHashing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ShardingAlgorithm::Legacy => "legacy",
            ShardingAlgorithm::RoundRobin => "round-robin",
            ShardingAlgorithm::ConsistentHashing => "consistent-hashing",
        }
    }

    /// Parse `name`, falling back to the default algorithm with a warning
    /// when it is not recognised.
    pub fn parse_or_default(name: &str) -> Self {
        name.parse().unwrap_or_else(|err: DistributionError| {
            warn!(%err, default = %ShardingAlgorithm::default(), "unsupported distribution type, using default");
            ShardingAlgorithm::default()
        })
    }
}

impl fmt::Display for ShardingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShardingAlgorithm {
    type Err = DistributionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShardingAlgorithm::ALL
            .into_iter()
            .find(|algorithm| algorithm.as_str() == s)
            .ok_or_else(|| DistributionError::UnknownAlgorithm(s.to_string()))
    }
}

/// Hash ring configuration for the consistent-hashing algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingSettings {
    pub partitioner: PartitionerKind,
    pub replication_factor: usize,
}

impl Default for RingSettings {
    fn default() -> Self {
        Self {
            partitioner: PartitionerKind::default(),
            replication_factor: DEFAULT_REPLICATION_FACTOR,
        }
    }
}

/// Build the strategy for `algorithm` over the given cluster and
/// application sources. `ring` only affects consistent hashing.
pub fn strategy_for(
    algorithm: ShardingAlgorithm,
    clusters: ClusterAccessor,
    apps: AppAccessor,
    replicas: usize,
    ring: RingSettings,
) -> Box<dyn DistributionStrategy> {
    debug!(%algorithm, replicas, "using distribution function");
    match algorithm {
        ShardingAlgorithm::Legacy => Box::new(LegacyStrategy::new(replicas)),
        ShardingAlgorithm::RoundRobin => Box::new(RoundRobinStrategy::new(clusters, replicas)),
        ShardingAlgorithm::ConsistentHashing => Box::new(
            BoundedLoadsStrategy::new(clusters, apps, replicas)
                .with_partitioner(ring.partitioner)
                .with_replication_factor(ring.replication_factor),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{app_accessor, cluster_accessor, Cluster};

    #[test]
    fn test_parse_names() {
        assert_eq!("legacy".parse::<ShardingAlgorithm>(), Ok(ShardingAlgorithm::Legacy));
        assert_eq!("round-robin".parse::<ShardingAlgorithm>(), Ok(ShardingAlgorithm::RoundRobin));
        assert_eq!(
            "consistent-hashing".parse::<ShardingAlgorithm>(),
            Ok(ShardingAlgorithm::ConsistentHashing)
        );
        assert_eq!(
            "unknown".parse::<ShardingAlgorithm>(),
            Err(DistributionError::UnknownAlgorithm("unknown".into()))
        );
    }

    #[test]
    fn test_unknown_falls_back_to_legacy() {
        assert_eq!(ShardingAlgorithm::parse_or_default("unknown"), ShardingAlgorithm::Legacy);
        assert_eq!(
            ShardingAlgorithm::parse_or_default("round-robin"),
            ShardingAlgorithm::RoundRobin
        );
    }

    #[test]
    fn test_serde_names_match_display() {
        for algorithm in ShardingAlgorithm::ALL {
            let json = serde_json::to_string(&algorithm).unwrap();
            assert_eq!(json, format!("\"{algorithm}\""));
        }
    }

    #[test]
    fn test_strategy_for_picks_implementation() {
        let clusters = cluster_accessor(vec![Cluster::new("1", "one", "https://one")]);
        let apps = app_accessor(vec![]);
        let names: Vec<_> = ShardingAlgorithm::ALL
            .into_iter()
            .map(|a| strategy_for(a, clusters.clone(), apps.clone(), 2, RingSettings::default()).name())
            .collect();
        assert_eq!(
            names,
            ["LegacyStrategy", "RoundRobinStrategy", "BoundedLoadsStrategy"]
        );
    }
}
