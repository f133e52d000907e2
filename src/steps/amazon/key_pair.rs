//! SSH key pair import step

use crate::cloud::AwsApi;
use crate::core::{CancelToken, ProgressSink, ProvisionConfig, Step, StepError};
use crate::steps::amazon::{key_pair_name, STEP_IMPORT_KEY_PAIR};
use anyhow::anyhow;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Imports the operator's public key so nodes are reachable over SSH.
pub struct ImportKeyPair {
    aws: Arc<dyn AwsApi>,
}

impl ImportKeyPair {
    pub fn new(aws: Arc<dyn AwsApi>) -> Self {
        Self { aws }
    }
}

#[async_trait]
impl Step for ImportKeyPair {
    fn name(&self) -> &str {
        STEP_IMPORT_KEY_PAIR
    }

    fn description(&self) -> &str {
        "Import the cluster SSH key pair"
    }

    async fn run(
        &self,
        token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        token.ensure_active()?;

        if cfg.ssh_public_key.trim().is_empty() {
            return Err(anyhow!("ssh public key is not set").into());
        }

        let name = key_pair_name(&cfg.cluster_name);
        out.append(&format!("importing key pair {}", name)).await;
        let fingerprint = self
            .aws
            .import_key_pair(&cfg.region, &name, &cfg.ssh_public_key)
            .await?;

        info!(key = %name, fingerprint = %fingerprint, "imported key pair");
        cfg.aws.key_pair_name = Some(name);
        cfg.aws.key_fingerprint = Some(fingerprint);
        Ok(())
    }

    async fn rollback(
        &self,
        _token: &CancelToken,
        out: &mut dyn ProgressSink,
        cfg: &mut ProvisionConfig,
    ) -> Result<(), StepError> {
        let Some(name) = cfg.aws.key_pair_name.take() else {
            return Ok(());
        };
        cfg.aws.key_fingerprint = None;

        out.append(&format!("deleting key pair {}", name)).await;
        self.aws.delete_key_pair(&cfg.region, &name).await?;
        Ok(())
    }
}
