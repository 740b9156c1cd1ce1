//! Core partitioner trait definitions.

use crate::token::Token;

/// A partitioner converts keys into tokens for placement on the hash ring.
///
/// Partitioners are stateless and thread-safe, allowing concurrent
/// token generation without synchronization overhead.
pub trait Partitioner: Send + Sync + 'static {
    /// Converts a key into a token.
    fn partition(&self, key: &[u8]) -> Token;

    /// Convenience wrapper over [`Partitioner::partition`] for string keys.
    fn partition_str(&self, key: &str) -> Token {
        self.partition(key.as_bytes())
    }

    /// Returns the name of this partitioner.
    fn name(&self) -> &'static str;
}
