//! Error types for cluster distribution.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DistributionError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DistributionError {
    /// Sharding algorithm name not recognised.
    #[error("unknown sharding algorithm '{0}' (expected one of: legacy, round-robin, consistent-hashing)")]
    UnknownAlgorithm(String),
    /// This replica's shard index does not exist for the replica count.
    #[error("shard {shard} is out of range for {replicas} replicas")]
    ShardOutOfRange { shard: usize, replicas: usize },
    #[error(transparent)]
    Ring(#[from] shardring::Error),
}
