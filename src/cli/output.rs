//! CLI output formatting

use crate::core::{Cluster, ClusterState, ProgressSink};
use async_trait::async_trait;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");

/// Create the provisioning spinner
pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Progress sink that prints step narration above the active spinner.
pub struct ConsoleSink {
    bar: ProgressBar,
}

impl ConsoleSink {
    pub fn new(bar: ProgressBar) -> Self {
        Self { bar }
    }
}

#[async_trait]
impl ProgressSink for ConsoleSink {
    async fn append(&mut self, line: &str) {
        self.bar.println(format!("  {}", style(line).dim()));
    }
}

/// Format a cluster state for display
pub fn format_state(state: ClusterState) -> String {
    match state {
        ClusterState::Provisioning => style("PROVISIONING").yellow().to_string(),
        ClusterState::Ready => style("READY").green().to_string(),
        ClusterState::Failed => style("FAILED").red().to_string(),
    }
}

/// Format a cluster record as a one-line row
pub fn format_cluster_row(cluster: &Cluster) -> String {
    format!(
        "{} {} - {} - {} ({}) - {}",
        match cluster.state {
            ClusterState::Ready => CHECK,
            ClusterState::Failed => CROSS,
            ClusterState::Provisioning => SPINNER,
        },
        style(&cluster.id).dim(),
        style(&cluster.name).bold(),
        cluster.provider,
        cluster.region,
        format_state(cluster.state)
    )
}
