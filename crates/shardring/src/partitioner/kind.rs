//! Runtime-selectable partitioner.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::partitioner::{Blake3Partitioner, Partitioner, SipPartitioner, Xxh3Partitioner};
use crate::token::Token;

/// Partitioner chosen from configuration rather than at compile time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionerKind {
    #[default]
    Blake3,
    Siphash,
    Xxh3,
}

impl PartitionerKind {
    pub const ALL: [PartitionerKind; 3] = [
        PartitionerKind::Blake3,
        PartitionerKind::Siphash,
        PartitionerKind::Xxh3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PartitionerKind::Blake3 => "blake3",
            PartitionerKind::Siphash => "siphash",
            PartitionerKind::Xxh3 => "xxh3",
        }
    }
}

impl Partitioner for PartitionerKind {
    fn partition(&self, key: &[u8]) -> Token {
        match self {
            PartitionerKind::Blake3 => Blake3Partitioner.partition(key),
            PartitionerKind::Siphash => SipPartitioner.partition(key),
            PartitionerKind::Xxh3 => Xxh3Partitioner.partition(key),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            PartitionerKind::Blake3 => Blake3Partitioner.name(),
            PartitionerKind::Siphash => SipPartitioner.name(),
            PartitionerKind::Xxh3 => Xxh3Partitioner.name(),
        }
    }
}

impl fmt::Display for PartitionerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown partitioner name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown partitioner '{0}' (expected one of: blake3, siphash, xxh3)")]
pub struct UnknownPartitioner(pub String);

impl FromStr for PartitionerKind {
    type Err = UnknownPartitioner;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PartitionerKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPartitioner(s.to_string()))
    }
}
