//! Partitioner abstraction for the shard ring.
//!
//! Partitioners turn server virtual-node labels and lookup keys into
//! [`Token`](crate::token::Token)s. Every implementation here is seedless, so
//! two processes that add the same servers compute the same ring.

pub mod blake;
pub mod kind;
pub mod sip;
pub mod traits;
pub mod xxh3;

pub use blake::Blake3Partitioner;
pub use kind::PartitionerKind;
pub use sip::SipPartitioner;
pub use traits::Partitioner;
pub use xxh3::Xxh3Partitioner;
