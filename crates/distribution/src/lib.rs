//! Cluster distribution across controller shards.
//!
//! This crate decides, for every managed cluster, which controller replica
//! reconciles it:
//! - Distribution strategies (legacy hash-modulo, round-robin, consistent
//!   hashing with bounded loads, no sharding)
//! - Algorithm selection by name
//! - A per-replica cluster filter
//! - Shard inference from a StatefulSet-style hostname

pub mod algorithm;
pub mod cluster;
pub mod error;
pub mod filter;
pub mod infer;
pub mod strategy;

pub use algorithm::{strategy_for, RingSettings, ShardingAlgorithm};
pub use cluster::{Application, Cluster};
pub use error::{DistributionError, Result};
pub use filter::ClusterFilter;
pub use infer::infer_shard;
pub use strategy::{
    BoundedLoadsStrategy, DistributionStrategy, LegacyStrategy, NoShardingStrategy,
    RoundRobinStrategy,
};
