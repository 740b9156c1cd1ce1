//! Shard inference from the replica's hostname.
//!
//! StatefulSet pods are named `<name>-<ordinal>`; the ordinal is the shard.

use tracing::warn;

/// Shard index encoded at the end of `hostname`.
///
/// Falls back to shard 0 (with a warning) when the last `-`-separated
/// component is not a number.
pub fn infer_shard(hostname: &str) -> usize {
    let suffix = hostname.rsplit('-').next().unwrap_or(hostname);
    match suffix.parse::<usize>() {
        Ok(shard) => shard,
        Err(_) => {
            warn!(%hostname, "hostname should end with shard number separated by '-'");
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordinal_suffix() {
        assert_eq!(infer_shard("example-shard-3"), 3);
        assert_eq!(infer_shard("argocd-application-controller-12"), 12);
    }

    #[test]
    fn test_missing_ordinal_defaults_to_zero() {
        assert_eq!(infer_shard("exampleshard"), 0);
        assert_eq!(infer_shard("example-shard"), 0);
        assert_eq!(infer_shard("trailing-"), 0);
        assert_eq!(infer_shard(""), 0);
    }

    #[test]
    fn test_bare_number() {
        assert_eq!(infer_shard("7"), 7);
    }
}
