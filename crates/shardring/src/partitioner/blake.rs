//! BLAKE3 partitioner, the default.

use crate::partitioner::traits::Partitioner;
use crate::token::Token;

/// Truncates a BLAKE3 digest to its first 8 bytes, read little-endian.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Partitioner;

impl Partitioner for Blake3Partitioner {
    fn partition(&self, key: &[u8]) -> Token {
        let digest = ::blake3::hash(key);
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest.as_bytes()[..8]);
        Token(u64::from_le_bytes(head))
    }

    fn name(&self) -> &'static str {
        "Blake3Partitioner"
    }
}
