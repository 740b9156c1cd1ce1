//! shardctl subcommands.
//!
//! Each command has a pure core returning a serialisable report, and an
//! `execute` wrapper that reads inputs and writes the report as JSON.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Subcommand;
use distribution::cluster::{app_accessor, cluster_accessor};
use distribution::{
    infer_shard, strategy_for, Application, Cluster, ClusterFilter, DistributionStrategy,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::CliConfig;

pub type CommandResult = anyhow::Result<()>;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the shard owning each key.
    Lookup {
        /// Keys to place, e.g. cluster ids.
        #[arg(required = true)]
        keys: Vec<String>,

        /// Use bounded-load placement. Each key adds one unit of load to its
        /// shard, as if work had started on it.
        #[arg(long)]
        least: bool,
    },
    /// Assign every cluster of an inventory file to a shard.
    Assign {
        /// JSON file with `clusters` and `applications` arrays.
        #[arg(short, long)]
        input: PathBuf,
    },
    /// List the clusters of an inventory file that this replica owns.
    Filter {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// Show ring ownership and load caps for the configured shards.
    Inspect,
}

/// Clusters and applications known to the controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    #[serde(default)]
    pub clusters: Vec<Cluster>,
    #[serde(default)]
    pub applications: Vec<Application>,
}

impl Inventory {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading inventory {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing inventory {}", path.display()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupReport {
    pub owners: BTreeMap<String, String>,
    pub loads: BTreeMap<String, i64>,
    pub max_load: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssignReport {
    pub algorithm: String,
    pub replicas: usize,
    /// Cluster id -> shard, `null` when unassigned.
    pub assignments: BTreeMap<String, Option<usize>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    pub shard: usize,
    pub clusters: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    pub partitioner: String,
    pub replication_factor: usize,
    pub ownership: BTreeMap<String, f64>,
    pub max_load: i64,
}

impl Command {
    pub fn execute(&self, config: &CliConfig, out: &mut dyn Write) -> CommandResult {
        match self {
            Command::Lookup { keys, least } => write_json(out, &lookup(config, keys, *least)?),
            Command::Assign { input } => {
                let inventory = Inventory::load(input)?;
                write_json(out, &assign(config, &inventory))
            }
            Command::Filter { input } => {
                let inventory = Inventory::load(input)?;
                let shard = match config.configured_shard() {
                    Some(shard) => shard,
                    None => {
                        let hostname = hostname::get().context("resolving hostname")?;
                        let shard = infer_shard(&hostname.to_string_lossy());
                        info!(shard, "inferred shard from hostname");
                        shard
                    }
                };
                write_json(out, &filter(config, &inventory, shard)?)
            }
            Command::Inspect => write_json(out, &inspect(config)),
        }
    }
}

fn write_json<T: Serialize>(out: &mut dyn Write, report: &T) -> CommandResult {
    serde_json::to_writer_pretty(&mut *out, report).context("writing report")?;
    writeln!(out).context("writing report")
}

pub fn lookup(config: &CliConfig, keys: &[String], least: bool) -> anyhow::Result<LookupReport> {
    let selector = config.selector();
    let mut owners = BTreeMap::new();
    for key in keys {
        let owner = if least {
            let owner = selector.get_least(key)?;
            selector.inc(&owner);
            owner
        } else {
            selector.get(key)?
        };
        debug!(%key, %owner, "placed key");
        owners.insert(key.clone(), owner);
    }
    Ok(LookupReport {
        owners,
        loads: selector.get_loads().into_iter().collect(),
        max_load: selector.max_load(),
    })
}

fn strategy(config: &CliConfig, inventory: &Inventory) -> Box<dyn DistributionStrategy> {
    strategy_for(
        config.algorithm(),
        cluster_accessor(inventory.clusters.clone()),
        app_accessor(inventory.applications.clone()),
        config.replicas,
        config.ring_settings(),
    )
}

pub fn assign(config: &CliConfig, inventory: &Inventory) -> AssignReport {
    let strategy = strategy(config, inventory);
    let assignments = inventory
        .clusters
        .iter()
        .map(|cluster| (cluster.id.clone(), strategy.shard_for(Some(cluster))))
        .collect();
    AssignReport {
        algorithm: config.algorithm().to_string(),
        replicas: config.replicas,
        assignments,
    }
}

pub fn filter(config: &CliConfig, inventory: &Inventory, shard: usize) -> anyhow::Result<FilterReport> {
    if config.replicas == 0 {
        bail!("no replicas configured, nothing to filter for");
    }
    let strategy: Arc<dyn DistributionStrategy> = Arc::from(strategy(config, inventory));
    let filter = ClusterFilter::new(strategy, config.replicas, shard)?;
    let clusters = inventory
        .clusters
        .iter()
        .filter(|cluster| filter.accepts(Some(*cluster)))
        .map(|cluster| cluster.id.clone())
        .collect();
    Ok(FilterReport { shard, clusters })
}

pub fn inspect(config: &CliConfig) -> InspectReport {
    let selector = config.selector();
    InspectReport {
        partitioner: selector.partitioner_name().to_string(),
        replication_factor: selector.replication_factor(),
        ownership: selector.ownership().into_iter().collect(),
        max_load: selector.max_load(),
    }
}
