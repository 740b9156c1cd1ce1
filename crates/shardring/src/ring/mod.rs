//! Consistent hash ring implementation.
//!
//! The ring manages virtual node positions and answers successor queries
//! for keys. It carries no locking of its own; see
//! [`ShardSelector`](crate::selector::ShardSelector) for the thread-safe
//! facade.

pub mod ring;

pub use ring::{HashRing, DEFAULT_REPLICATION_FACTOR};
