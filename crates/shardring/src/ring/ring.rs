//! Hash ring data structure.
//!
//! Holds a `BTreeMap<Token, server>` of virtual nodes. Lookups descend the
//! tree for the first token at or after the key's token and wrap to the
//! smallest token when they run off the end.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound::{Excluded, Unbounded};
use std::sync::Arc;

use tracing::debug;

use crate::partitioner::{Blake3Partitioner, Partitioner};
use crate::token::Token;
use crate::vnode::VirtualNode;

/// Default number of virtual nodes per server.
pub const DEFAULT_REPLICATION_FACTOR: usize = 1000;

/// Ordered ring of virtual nodes.
#[derive(Debug, Clone)]
pub struct HashRing<P: Partitioner = Blake3Partitioner> {
    /// Virtual node positions: ring position -> owning server.
    vnodes: BTreeMap<Token, Arc<str>>,
    partitioner: P,
    replication_factor: usize,
}

impl Default for HashRing<Blake3Partitioner> {
    fn default() -> Self {
        Self::new(Blake3Partitioner, DEFAULT_REPLICATION_FACTOR)
    }
}

impl<P: Partitioner> HashRing<P> {
    pub fn new(partitioner: P, replication_factor: usize) -> Self {
        Self {
            vnodes: BTreeMap::new(),
            partitioner,
            replication_factor,
        }
    }

    pub fn replication_factor(&self) -> usize {
        self.replication_factor
    }

    pub fn partitioner(&self) -> &P {
        &self.partitioner
    }

    /// Hash a lookup key onto the ring.
    #[inline]
    pub fn token_for(&self, key: &str) -> Token {
        self.partitioner.partition_str(key)
    }

    /// Place `replication_factor` virtual nodes for `server`.
    ///
    /// Does not check whether the server is already present; re-inserting
    /// overwrites the same tokens with the same owner.
    pub fn insert_server(&mut self, server: &str) {
        let server: Arc<str> = Arc::from(server);
        for index in 0..self.replication_factor {
            let vnode = VirtualNode::for_server(&self.partitioner, &server, index);
            self.vnodes.insert(vnode.token, vnode.server);
        }
        debug!(%server, vnodes = self.replication_factor, "added server to ring");
    }

    /// Remove the virtual nodes of `server`, returning how many were removed.
    ///
    /// Tokens are recomputed from the name. A token that was overwritten by
    /// another server's colliding vnode is left alone.
    pub fn remove_server(&mut self, server: &str) -> usize {
        let server: Arc<str> = Arc::from(server);
        let mut removed = 0;
        for index in 0..self.replication_factor {
            let vnode = VirtualNode::for_server(&self.partitioner, &server, index);
            let owned = self
                .vnodes
                .get(&vnode.token)
                .is_some_and(|owner| *owner == vnode.server);
            if owned {
                self.vnodes.remove(&vnode.token);
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(%server, removed, "removed server from ring");
        }
        removed
    }

    /// Owner of the first virtual node at or after `token`, wrapping to the
    /// smallest token. `None` only when the ring is empty.
    pub fn successor(&self, token: Token) -> Option<&Arc<str>> {
        self.vnodes
            .range(token..)
            .next()
            .or_else(|| self.vnodes.iter().next())
            .map(|(_, server)| server)
    }

    /// One full lap of the ring starting strictly after `token`.
    ///
    /// Every virtual node is yielded exactly once; a vnode sitting exactly
    /// on `token` comes last.
    pub fn lap_after(&self, token: Token) -> impl Iterator<Item = (Token, &Arc<str>)> + '_ {
        self.vnodes
            .range((Excluded(token), Unbounded))
            .chain(self.vnodes.range(..=token))
            .map(|(token, server)| (*token, server))
    }

    /// Number of virtual nodes on the ring.
    pub fn len(&self) -> usize {
        self.vnodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vnodes.is_empty()
    }

    /// All virtual nodes in token order (for debugging).
    pub fn vnodes(&self) -> Vec<VirtualNode> {
        self.vnodes
            .iter()
            .map(|(token, server)| VirtualNode::new(*token, Arc::clone(server)))
            .collect()
    }

    /// Fraction of the key space each server owns.
    ///
    /// A vnode owns the arc from its predecessor (exclusive) up to itself
    /// (inclusive). Fractions sum to 1.0 on a non-empty ring.
    pub fn ownership(&self) -> HashMap<String, f64> {
        let mut owned: HashMap<String, f64> = HashMap::new();
        let Some((&last, _)) = self.vnodes.iter().next_back() else {
            return owned;
        };
        if self.vnodes.len() == 1 {
            if let Some(server) = self.successor(last) {
                owned.insert(server.to_string(), 1.0);
            }
            return owned;
        }

        const CIRCLE: f64 = u64::MAX as f64 + 1.0;
        let mut previous = last;
        for (token, server) in &self.vnodes {
            let arc = previous.distance_to(token) as f64 / CIRCLE;
            *owned.entry(server.to_string()).or_insert(0.0) += arc;
            previous = *token;
        }
        owned
    }
}
