//! CLI tool for inspecting shard assignment.
//!
//! Provides commands for:
//! - Looking up the shard that owns a key
//! - Assigning an inventory of clusters to shards
//! - Listing the clusters this replica should reconcile
//! - Inspecting ring ownership and load caps

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult, Inventory};
pub use config::CliConfig;
