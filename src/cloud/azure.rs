//! Azure client backed by the `az` CLI

use crate::cloud::{AzureApi, CloudError};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Client that shells out to the official `az` CLI with `--output json`.
#[derive(Debug, Clone)]
pub struct AzureCli {
    bin: String,
    timeout_secs: u64,
}

impl AzureCli {
    pub fn new(bin: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            bin: bin.into(),
            timeout_secs,
        }
    }

    async fn run(&self, args: &[&str]) -> Result<Value, CloudError> {
        debug!(args = ?args, "invoking az cli");

        let result = timeout(
            Duration::from_secs(self.timeout_secs),
            Command::new(&self.bin)
                .args(args)
                .args(["--output", "json"])
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| CloudError::Timeout(self.timeout_secs))?;

        let output =
            result.map_err(|e| CloudError::Spawn(format!("{}: {}", self.bin, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let code = output.status.code().unwrap_or(-1);
            warn!("az exited with code {}: {}", code, stderr.trim());
            return Err(CloudError::Command {
                program: self.bin.clone(),
                code,
                stderr: stderr.trim().to_string(),
            });
        }

        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

#[async_trait]
impl AzureApi for AzureCli {
    async fn create_resource_group(&self, name: &str, location: &str) -> Result<(), CloudError> {
        self.run(&["group", "create", "--name", name, "--location", location])
            .await?;
        Ok(())
    }

    async fn delete_resource_group(&self, name: &str) -> Result<(), CloudError> {
        self.run(&["group", "delete", "--name", name, "--yes"]).await?;
        Ok(())
    }

    async fn create_virtual_network(
        &self,
        resource_group: &str,
        name: &str,
        address_prefix: &str,
    ) -> Result<(), CloudError> {
        self.run(&[
            "network",
            "vnet",
            "create",
            "--resource-group",
            resource_group,
            "--name",
            name,
            "--address-prefix",
            address_prefix,
        ])
        .await?;
        Ok(())
    }

    async fn delete_virtual_network(
        &self,
        resource_group: &str,
        name: &str,
    ) -> Result<(), CloudError> {
        self.run(&[
            "network",
            "vnet",
            "delete",
            "--resource-group",
            resource_group,
            "--name",
            name,
        ])
        .await?;
        Ok(())
    }
}
