//! Command-line and environment configuration.
//!
//! Every controller-level setting can come from a flag or from the same
//! environment variable the controller reads, flags winning.

use std::io::{self, Write};

use anyhow::Context;
use clap::Parser;
use distribution::{RingSettings, ShardingAlgorithm};
use shardring::partitioner::PartitionerKind;
use shardring::ring::DEFAULT_REPLICATION_FACTOR;
use shardring::{SelectorBuilder, ShardSelector};
use tracing_subscriber::EnvFilter;

use crate::commands::{Command, CommandResult};

#[derive(Debug, Parser)]
#[command(
    name = "shardctl",
    version,
    about = "Inspect how managed clusters are distributed across controller shards"
)]
pub struct CliConfig {
    /// Number of controller replicas.
    #[arg(long, env = "ARGOCD_CONTROLLER_REPLICAS", default_value_t = 1, global = true)]
    pub replicas: usize,

    /// Shard index of this replica. Negative or unset means "infer from
    /// the hostname".
    #[arg(
        long,
        env = "ARGOCD_CONTROLLER_SHARD",
        allow_negative_numbers = true,
        global = true
    )]
    pub shard: Option<i64>,

    /// Cluster distribution algorithm: legacy, round-robin or
    /// consistent-hashing. Unknown names fall back to legacy.
    #[arg(
        long,
        env = "ARGOCD_CONTROLLER_SHARDING_ALGORITHM",
        default_value = "legacy",
        global = true
    )]
    pub sharding_algorithm: String,

    /// Virtual nodes per shard on the hash ring.
    #[arg(long, default_value_t = DEFAULT_REPLICATION_FACTOR, global = true)]
    pub replication_factor: usize,

    /// Hash function for the ring: blake3, siphash or xxh3.
    #[arg(long, default_value_t = PartitionerKind::default(), global = true)]
    pub partitioner: PartitionerKind,

    /// Log level used when RUST_LOG is not set.
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl CliConfig {
    /// Set up logging and run the selected command against stdout.
    pub fn run(self) -> CommandResult {
        setup_tracing(&self.log_level);
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.command.execute(&self, &mut out)?;
        out.flush().context("flushing stdout")
    }

    pub fn algorithm(&self) -> ShardingAlgorithm {
        ShardingAlgorithm::parse_or_default(&self.sharding_algorithm)
    }

    /// Configured shard, if it is a usable index.
    pub fn configured_shard(&self) -> Option<usize> {
        self.shard.and_then(|shard| usize::try_from(shard).ok())
    }

    pub fn ring_settings(&self) -> RingSettings {
        RingSettings {
            partitioner: self.partitioner,
            replication_factor: self.replication_factor,
        }
    }

    /// Ring with shards `"0"` .. `"replicas-1"`.
    pub fn selector(&self) -> ShardSelector<PartitionerKind> {
        (0..self.replicas)
            .fold(
                SelectorBuilder::new()
                    .with_partitioner(self.partitioner)
                    .with_replication_factor(self.replication_factor),
                |builder, shard| builder.add_server(shard.to_string()),
            )
            .build()
    }
}

/// Initialize the `tracing` subscriber with the given level filter.
///
/// Respects `RUST_LOG` env var if set, otherwise uses the config value.
/// Logs go to stderr so command output stays machine readable.
fn setup_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliConfig {
        CliConfig::try_parse_from(std::iter::once("shardctl").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--replicas", "1", "inspect"]);
        assert_eq!(config.replication_factor, DEFAULT_REPLICATION_FACTOR);
        assert_eq!(config.partitioner, PartitionerKind::Blake3);
        assert!(matches!(config.command, Command::Inspect));
    }

    #[test]
    fn test_negative_shard_means_unset() {
        let config = parse(&["--shard", "-1", "inspect"]);
        assert_eq!(config.shard, Some(-1));
        assert_eq!(config.configured_shard(), None);
        assert_eq!(parse(&["--shard", "2", "inspect"]).configured_shard(), Some(2));
    }

    #[test]
    fn test_algorithm_fallback() {
        let config = parse(&["--sharding-algorithm", "bogus", "inspect"]);
        assert_eq!(config.algorithm(), ShardingAlgorithm::Legacy);
        let config = parse(&["--sharding-algorithm", "consistent-hashing", "inspect"]);
        assert_eq!(config.algorithm(), ShardingAlgorithm::ConsistentHashing);
    }

    #[test]
    fn test_selector_has_one_server_per_replica() {
        let config = parse(&[
            "--replicas",
            "3",
            "--replication-factor",
            "10",
            "--partitioner",
            "xxh3",
            "inspect",
        ]);
        let selector = config.selector();
        let mut servers = selector.servers();
        servers.sort();
        assert_eq!(servers, ["0", "1", "2"]);
        assert_eq!(selector.partitioner_name(), "Xxh3Partitioner");
        assert_eq!(selector.replication_factor(), 10);
        assert_eq!(
            config.ring_settings(),
            RingSettings {
                partitioner: PartitionerKind::Xxh3,
                replication_factor: 10,
            }
        );
    }

    #[test]
    fn test_unknown_partitioner_rejected() {
        let result =
            CliConfig::try_parse_from(["shardctl", "--partitioner", "murmur3", "inspect"]);
        assert!(result.is_err());
    }
}
