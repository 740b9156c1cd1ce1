//! Distribution strategy abstractions.
//!
//! A distribution strategy maps a cluster to the index of the controller
//! shard that reconciles it. Different strategies optimize for different
//! goals:
//!
//! - **LegacyStrategy**: hash of the cluster id modulo the replica count.
//!   Stateless and cheap, but shards can end up unevenly loaded.
//! - **RoundRobinStrategy**: rank in the id-sorted cluster list modulo the
//!   replica count. Even (+/- 1), but most clusters move when the list changes.
//! - **BoundedLoadsStrategy**: consistent hashing with bounded loads,
//!   weighted by applications per cluster. Close to even and stable under
//!   membership changes.
//! - **NoShardingStrategy**: everything on shard 0.
//!
//! All strategies agree on two rules: the in-cluster destination (`None`)
//! goes to shard 0, and a valid operator-pinned shard always wins.

pub mod bounded_loads;
pub mod legacy;
pub mod none;
pub mod round_robin;

pub use bounded_loads::BoundedLoadsStrategy;
pub use legacy::LegacyStrategy;
pub use none::NoShardingStrategy;
pub use round_robin::RoundRobinStrategy;

use crate::cluster::Cluster;

/// Trait for distribution strategies.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (Send + Sync) as they are shared
/// between reconciliation workers.
pub trait DistributionStrategy: Send + Sync {
    /// Shard index for `cluster`.
    ///
    /// `None` as input is the in-cluster destination, which has no cluster
    /// record. `None` as output means the cluster is assigned to no shard,
    /// e.g. because there are no replicas or the cluster no longer exists.
    fn shard_for(&self, cluster: Option<&Cluster>) -> Option<usize>;

    /// Strategy name (for logging/debugging).
    fn name(&self) -> &'static str;
}
