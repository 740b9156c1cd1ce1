//! Consistent hashing with bounded loads for shard assignment.
//!
//! This crate decides which controller replica ("shard") owns which key:
//! - Partitioners hashing labels and keys onto a 64-bit ring
//! - Virtual nodes spreading each shard over the ring
//! - A hash ring answering successor queries with wraparound
//! - Load tracking with a 1.25x-of-average cap
//! - A lock-guarded selector combining all of the above
//!
//! It performs no I/O and keeps no state across restarts; callers re-add the
//! known shards at startup.

pub mod error;
pub mod load;
pub mod partitioner;
pub mod ring;
pub mod selector;
pub mod token;
pub mod vnode;

pub use error::{Error, Result};
pub use load::LoadTracker;
pub use partitioner::{Partitioner, PartitionerKind};
pub use ring::HashRing;
pub use selector::{ExhaustedPolicy, SelectorBuilder, ShardSelector};
pub use token::Token;
pub use vnode::VirtualNode;
