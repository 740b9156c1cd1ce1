//! Error types for the shard ring.

use thiserror::Error;

/// Result type alias for the shard ring.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by ring lookups.
///
/// Everything else that can go "wrong" (mutating an unknown server, removing
/// a server twice) is a silent no-op and never surfaces here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The ring holds no servers, so no key can be placed.
    #[error("no hosts added to the ring")]
    NoHosts,
    /// Ring and load bookkeeping disagree. This is a caller bug and must not
    /// be retried.
    #[error("invariant violated: {0}")]
    InvariantViolated(String),
}
