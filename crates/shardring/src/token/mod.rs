//! Ring coordinates.
//!
//! A [`Token`] is a position on the 64-bit circle. Server virtual nodes and
//! lookup keys are both hashed to tokens; ownership of a key is decided by
//! the first virtual node token at or after the key's token, wrapping at
//! `u64::MAX`.

use std::fmt;

/// A position on the 64-bit hash ring.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Token(pub u64);

impl Token {
    /// Minimum token value (start of ring).
    pub const MIN: Token = Token(0);
    /// Maximum token value (end of ring).
    pub const MAX: Token = Token(u64::MAX);

    /// Raw coordinate.
    #[inline]
    pub fn value(self) -> u64 {
        self.0
    }

    /// Clockwise distance from `self` to `other`.
    ///
    /// Wraps past `u64::MAX`, so the distance from a token to itself is 0
    /// and the distance to its predecessor is `u64::MAX`.
    #[inline]
    pub fn distance_to(&self, other: &Self) -> u64 {
        other.0.wrapping_sub(self.0)
    }
}

impl From<u64> for Token {
    fn from(value: u64) -> Self {
        Token(value)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
