//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{ClustersCommand, DeleteCommand, ProvisionCommand, StepsCommand};

/// Provision Kubernetes clusters with reversible step pipelines
#[derive(Debug, Parser, Clone)]
#[command(name = "kubeforge")]
#[command(author = "kubeforge Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Provision Kubernetes clusters across cloud providers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Provision a cluster's cloud prerequisites
    Provision(ProvisionCommand),

    /// Show registered steps and per-provider pipeline order
    Steps(StepsCommand),

    /// List stored clusters
    Clusters(ClustersCommand),

    /// Delete a stored cluster record
    Delete(DeleteCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

use std::ffi::OsString;
