//! CLI command definitions

use clap::Args;

/// Provision a cluster's cloud prerequisites
#[derive(Debug, Args, Clone)]
pub struct ProvisionCommand {
    /// Path to a cluster spec YAML file
    #[arg(short, long)]
    pub file: Option<String>,

    /// Cluster name (overrides the spec file)
    #[arg(long)]
    pub name: Option<String>,

    /// Provider identifier: aws, azure, digitalocean, gce
    #[arg(long)]
    pub provider: Option<String>,

    /// Cloud region
    #[arg(long)]
    pub region: Option<String>,

    /// SSH public key material for node access
    #[arg(long)]
    pub ssh_public_key: Option<String>,

    /// Timeout for a single cloud CLI call, in seconds
    #[arg(long, default_value_t = 600)]
    pub cloud_timeout_secs: u64,

    /// Don't persist the cluster record
    #[arg(long)]
    pub no_store: bool,
}

/// Show registered steps and per-provider pipeline order
#[derive(Debug, Args, Clone)]
pub struct StepsCommand {
    /// Only show the pipeline for this provider
    #[arg(short, long)]
    pub provider: Option<String>,
}

/// List stored clusters
#[derive(Debug, Args, Clone)]
pub struct ClustersCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Delete a stored cluster record
#[derive(Debug, Args, Clone)]
pub struct DeleteCommand {
    /// Cluster id to delete
    pub cluster_id: String,
}
