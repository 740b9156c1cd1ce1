//! Virtual node abstractions.
//!
//! # Virtual Nodes (VNodes) Concept
//!
//! Each shard is placed on the ring many times (the *replication factor*,
//! 1000 by default). Spreading a shard over many coordinates gives:
//!
//! 1. **Better Load Distribution**: more tokens = smoother split of the key space
//! 2. **Gradual Rebalancing**: when a shard joins or leaves, only keys whose
//!    nearest successor belonged to it move
//!
//! # Performance Characteristics
//!
//! - **Memory**: O(v) per shard where v = replication factor
//! - **Lookup**: O(log n) where n = total vnodes
//! - **Membership change**: O(v log n)

use std::fmt;
use std::sync::Arc;

use crate::partitioner::Partitioner;
use crate::token::Token;

/// A virtual node on the hash ring.
///
/// # Invariants
///
/// - The token of vnode `i` of server `s` is always `hash(s ++ i)`, with `i`
///   rendered in decimal. Removing a server recomputes exactly these tokens.
/// - Two vnodes hashing to the same token overwrite each other (last write
///   wins).
/// - Labels are not unique across servers: `"a-1"` vnode 12 and `"a-11"`
///   vnode 2 are both `"a-112"`. The same goes for shards `"1"` and `"11"`
///   once the replication factor reaches 12. The server added last owns such
///   a token, so with names like these the ring depends on insertion order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualNode {
    /// Token position on the ring.
    pub token: Token,

    /// Name of the server that owns this virtual node.
    ///
    /// Shared between all vnodes of the same server, so cloning a vnode is
    /// a refcount bump.
    pub server: Arc<str>,
}

impl VirtualNode {
    /// Create a new virtual node.
    #[inline]
    pub fn new(token: Token, server: Arc<str>) -> Self {
        Self { token, server }
    }

    /// Create vnode number `index` for `server`.
    ///
    /// The label is the server name directly followed by the decimal index
    /// (`"shard-1"`, vnode 12 -> `"shard-112"`).
    pub fn for_server<P: Partitioner + ?Sized>(
        partitioner: &P,
        server: &Arc<str>,
        index: usize,
    ) -> Self {
        let label = format!("{}{}", server, index);
        Self::new(partitioner.partition_str(&label), Arc::clone(server))
    }

    #[inline]
    pub fn token(&self) -> Token {
        self.token
    }

    #[inline]
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Clockwise distance to another virtual node.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> u64 {
        self.token.distance_to(&other.token)
    }
}

impl fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VNode(token={}, server={})", self.token, self.server)
    }
}
