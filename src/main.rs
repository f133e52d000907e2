mod cli;
mod cloud;
mod core;
mod execution;
mod persistence;
mod steps;

use anyhow::{Context, Result};
use cli::commands::{ClustersCommand, DeleteCommand, ProvisionCommand, StepsCommand};
use cli::output::*;
use cli::{Cli, Command};
use cloud::CloudClients;
use crate::core::{CancelToken, Cluster, ClusterSpec, ClusterState, Provider};
use execution::{catalog, Engine, ExecutionError};
use persistence::{ClusterStore, SqliteClusterStore};
use std::sync::Arc;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    // Execute command
    match &cli.command {
        Command::Provision(cmd) => provision(cmd).await?,
        Command::Steps(cmd) => show_steps(cmd)?,
        Command::Clusters(cmd) => list_clusters(cmd).await?,
        Command::Delete(cmd) => delete_cluster(cmd).await?,
    }

    Ok(())
}

/// Build the cluster spec from the file and flag overrides.
fn resolve_spec(cmd: &ProvisionCommand) -> Result<ClusterSpec> {
    let mut spec = match &cmd.file {
        Some(path) => ClusterSpec::from_file(path).context("Failed to load cluster spec")?,
        None => {
            let name = cmd
                .name
                .clone()
                .context("either --file or --name is required")?;
            let provider = cmd
                .provider
                .clone()
                .context("either --file or --provider is required")?;
            let region = cmd
                .region
                .clone()
                .context("either --file or --region is required")?;
            ClusterSpec {
                name,
                provider: provider.parse::<Provider>()?,
                region,
                ssh_public_key: None,
                vpc_cidr: None,
                vnet_cidr: None,
            }
        }
    };

    if let Some(name) = &cmd.name {
        spec.name = name.clone();
    }
    if let Some(provider) = &cmd.provider {
        spec.provider = provider.parse::<Provider>()?;
    }
    if let Some(region) = &cmd.region {
        spec.region = region.clone();
    }
    if let Some(key) = &cmd.ssh_public_key {
        spec.ssh_public_key = Some(key.clone());
    }

    spec.validate()?;
    Ok(spec)
}

async fn provision(cmd: &ProvisionCommand) -> Result<()> {
    let spec = resolve_spec(cmd)?;

    let cluster_id = Cluster::short_id();
    println!(
        "{} Provisioning cluster {} ({}) on {}",
        ROCKET,
        style(&spec.name).bold(),
        style(&cluster_id).dim(),
        style(spec.provider).cyan()
    );

    let mut cfg = spec.into_config(cluster_id);

    // Wire the engine against the real cloud CLIs
    let clients = CloudClients::from_cli(cmd.cloud_timeout_secs);
    let registry = Arc::new(steps::builtin_registry(&clients));
    let engine = Engine::new(registry);

    // Ctrl-C cancels the run; completed steps still roll back.
    let token = CancelToken::new();
    {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                println!("\n{} Cancelling; rolling back completed steps...", WARN);
                token.cancel();
            }
        });
    }

    let spinner = create_spinner(format!("running {}", catalog::PRE_PROVISION));
    let mut sink = ConsoleSink::new(spinner.clone());

    let result = engine.pre_provision(&token, &mut sink, &mut cfg).await;
    spinner.finish_and_clear();

    let state = if result.is_ok() {
        ClusterState::Ready
    } else {
        ClusterState::Failed
    };

    // Persist the record so created resources stay attributable
    if !cmd.no_store {
        let cluster = Cluster::from_config(cfg.clone(), state);
        let store = SqliteClusterStore::with_default_path().await?;
        store.save(&cluster).await?;
        println!(
            "{} Cluster record saved (ID: {})",
            INFO,
            style(&cluster.id).dim()
        );
    }

    match result {
        Ok(()) => {
            println!(
                "{} {} provisioned {}",
                CHECK,
                style(&cfg.cluster_name).bold(),
                style("successfully").green()
            );
            Ok(())
        }
        Err(err) => {
            println!(
                "{} {} {}",
                CROSS,
                style(&cfg.cluster_name).bold(),
                style("failed").red()
            );
            report_failure(&err);
            std::process::exit(1);
        }
    }
}

/// Print the full error chain plus any rollback failures.
fn report_failure(err: &ExecutionError) {
    for failure in err.rollback_failures() {
        println!("  {} {}", WARN, style(failure).yellow());
    }

    let mut chain: Vec<String> = Vec::new();
    let mut source: Option<&dyn std::error::Error> = Some(err);
    while let Some(current) = source {
        chain.push(current.to_string());
        source = current.source();
    }
    error!("{}", chain.join(": "));
}

fn show_steps(cmd: &StepsCommand) -> Result<()> {
    let providers: Vec<Provider> = match &cmd.provider {
        Some(name) => vec![name.parse::<Provider>()?],
        None => Provider::ALL.to_vec(),
    };

    // The registry is only consulted for metadata here; the CLI clients are
    // never invoked.
    let clients = CloudClients::from_cli(60);
    let registry = steps::builtin_registry(&clients);

    for provider in providers {
        let names = catalog::pre_provision_steps(provider);
        println!(
            "{} {} ({} steps)",
            INFO,
            style(provider).bold(),
            style(names.len()).cyan()
        );
        for name in names {
            match registry.get(name) {
                Some(step) => println!(
                    "  {} - {}",
                    style(name).cyan(),
                    style(step.description()).dim()
                ),
                None => println!("  {} - {}", style(name).cyan(), style("unregistered!").red()),
            }
        }
    }

    Ok(())
}

async fn list_clusters(cmd: &ClustersCommand) -> Result<()> {
    let store = SqliteClusterStore::with_default_path().await?;
    let clusters = store.list_all().await?;

    if clusters.is_empty() {
        println!("{} No clusters found", INFO);
        return Ok(());
    }

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&clusters)?);
    } else {
        println!("{} Clusters:", INFO);
        for cluster in &clusters {
            println!("  {}", format_cluster_row(cluster));
        }
    }

    Ok(())
}

async fn delete_cluster(cmd: &DeleteCommand) -> Result<()> {
    let store = SqliteClusterStore::with_default_path().await?;

    match store.get(&cmd.cluster_id).await? {
        Some(cluster) => {
            store.delete(&cmd.cluster_id).await?;
            println!(
                "{} Deleted cluster record {} ({})",
                CHECK,
                style(&cluster.name).bold(),
                style(&cluster.id).dim()
            );
        }
        None => {
            println!("{} Cluster {} not found", WARN, style(&cmd.cluster_id).dim());
        }
    }

    Ok(())
}
